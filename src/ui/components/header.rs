//! Top bar: greeting, language picker, clear, settings and logout

use crate::language::Language;
use crate::state::Account;
use crate::ui::state::{UiAction, UiState};
use crate::ui::theme::Theme;
use egui::{Align, Layout, RichText};

pub struct Header<'a> {
    account: &'a Account,
    state: &'a mut UiState,
    language: Language,
    has_messages: bool,
    theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(
        account: &'a Account,
        state: &'a mut UiState,
        language: Language,
        has_messages: bool,
        theme: &'a Theme,
    ) -> Self {
        Self {
            account,
            state,
            language,
            has_messages,
            theme,
        }
    }

    pub fn show(self, ui: &mut egui::Ui) -> Vec<UiAction> {
        let mut actions = Vec::new();

        ui.horizontal(|ui| {
            ui.label(
                RichText::new("Horizon")
                    .size(20.0)
                    .strong()
                    .color(self.theme.text_primary),
            );
            if let Some(name) = self.account.display_name() {
                ui.label(
                    RichText::new(format!("Hi, {}", name))
                        .size(14.0)
                        .color(self.theme.text_muted),
                );
            }

            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                let logout = ui.button("Log out");
                logout.widget_info(|| {
                    egui::WidgetInfo::labeled(egui::WidgetType::Button, true, "Log out")
                });
                if logout.clicked() {
                    actions.push(UiAction::Logout);
                }

                let settings = ui.selectable_label(self.state.settings_open, "⚙");
                settings.widget_info(|| {
                    egui::WidgetInfo::labeled(egui::WidgetType::Button, true, "Settings")
                });
                if settings.clicked() {
                    if self.state.settings_open {
                        self.state.close_settings();
                    } else {
                        self.state.open_settings(self.account);
                    }
                }

                let clear = ui.add_enabled(self.has_messages, egui::Button::new("🗑"));
                clear.widget_info(|| {
                    egui::WidgetInfo::labeled(
                        egui::WidgetType::Button,
                        self.has_messages,
                        "Clear history",
                    )
                });
                if clear.on_hover_text("Clear history").clicked() {
                    actions.push(UiAction::ClearHistory);
                }

                let mut selected = self.language;
                egui::ComboBox::from_id_salt("language")
                    .selected_text(selected.label())
                    .show_ui(ui, |ui| {
                        for language in Language::ALL {
                            ui.selectable_value(&mut selected, language, language.label());
                        }
                    });
                if selected != self.language {
                    actions.push(UiAction::SetLanguage(selected));
                }
            });
        });

        actions
    }
}
