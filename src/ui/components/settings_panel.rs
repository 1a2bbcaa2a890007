//! Account settings: profile, password, theme and account deletion

use crate::ui::components::login_panel::{primary_button, secondary_button, text_field};
use crate::ui::state::{UiAction, UiState};
use crate::ui::theme::Theme;
use egui::RichText;

pub struct SettingsPanel<'a> {
    state: &'a mut UiState,
    notice: Option<&'a str>,
    theme: &'a Theme,
}

impl<'a> SettingsPanel<'a> {
    pub fn new(state: &'a mut UiState, notice: Option<&'a str>, theme: &'a Theme) -> Self {
        Self {
            state,
            notice,
            theme,
        }
    }

    pub fn show(self, ui: &mut egui::Ui) -> Vec<UiAction> {
        let mut actions = Vec::new();
        let Self {
            state,
            notice,
            theme,
        } = self;

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.set_max_width(360.0);

                let back = secondary_button(ui, true, theme, "Back to chat");
                if back.clicked() {
                    state.close_settings();
                    return;
                }

                if let Some(notice) = notice {
                    let label = ui.label(RichText::new(notice).color(theme.text_secondary));
                    label.widget_info(|| {
                        egui::WidgetInfo::labeled(
                            egui::WidgetType::Label,
                            true,
                            format!("Settings notice: {}", notice),
                        )
                    });
                }
                if let Some(error) = &state.form_error {
                    let label = ui.label(RichText::new(error).color(theme.error));
                    label.widget_info(|| {
                        egui::WidgetInfo::labeled(
                            egui::WidgetType::Label,
                            true,
                            format!("Form error: {}", error),
                        )
                    });
                }

                section(ui, theme, "Profile");
                text_field(ui, true, &mut state.display_name, "settings_name", "Display name", false);
                text_field(ui, true, &mut state.avatar_url, "settings_avatar", "Avatar URL", false);
                if primary_button(ui, true, theme, "Save profile").clicked() {
                    state.form_error = None;
                    actions.push(UiAction::UpdateProfile(state.profile_update()));
                }

                section(ui, theme, "Password");
                text_field(
                    ui,
                    true,
                    &mut state.current_password,
                    "settings_current",
                    "Current password",
                    true,
                );
                text_field(ui, true, &mut state.new_password, "settings_new", "New password", true);
                text_field(
                    ui,
                    true,
                    &mut state.confirm_password,
                    "settings_confirm",
                    "Confirm password",
                    true,
                );
                if primary_button(ui, true, theme, "Change password").clicked() {
                    if state.current_password.is_empty() {
                        state.form_error = Some("Enter your current password".to_string());
                    } else if let Some(new_password) = state.take_new_password() {
                        actions.push(UiAction::ChangePassword {
                            current_password: std::mem::take(&mut state.current_password),
                            new_password,
                        });
                    }
                }

                section(ui, theme, "Appearance");
                ui.checkbox(&mut state.light_theme, "Light theme");

                section(ui, theme, "Account");
                if state.confirm_delete {
                    ui.label(
                        RichText::new("This removes your account and its history.")
                            .color(theme.error),
                    );
                    ui.horizontal(|ui| {
                        let confirm = primary_button(ui, true, theme, "Confirm delete");
                        let cancel = secondary_button(ui, true, theme, "Cancel");
                        if confirm.clicked() {
                            actions.push(UiAction::DeleteAccount);
                        }
                        if confirm.clicked() || cancel.clicked() {
                            state.confirm_delete = false;
                        }
                    });
                } else if secondary_button(ui, true, theme, "Delete account").clicked() {
                    state.confirm_delete = true;
                }
            });

        actions
    }
}

fn section(ui: &mut egui::Ui, theme: &Theme, title: &str) {
    ui.add_space(theme.spacing);
    ui.label(
        RichText::new(title)
            .size(16.0)
            .strong()
            .color(theme.text_primary),
    );
}
