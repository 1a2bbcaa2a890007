//! Connectivity banner and dismissible notices

use crate::ui::state::UiAction;
use crate::ui::theme::Theme;
use egui::{Align, Color32, Layout, RichText};

/// Text of the transport failure banner
pub const CONNECTIVITY_MESSAGE: &str =
    "Could not connect to server. Please ensure backend is running.";

pub struct StatusBanner<'a> {
    connectivity: bool,
    notice: Option<&'a str>,
    theme: &'a Theme,
}

impl<'a> StatusBanner<'a> {
    pub fn new(connectivity: bool, notice: Option<&'a str>, theme: &'a Theme) -> Self {
        Self {
            connectivity,
            notice,
            theme,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.connectivity && self.notice.is_none()
    }

    pub fn show(self, ui: &mut egui::Ui) -> Vec<UiAction> {
        let mut actions = Vec::new();

        if self.connectivity {
            strip(ui, self.theme, self.theme.error, |ui| {
                let label = ui.label(RichText::new(CONNECTIVITY_MESSAGE).color(Color32::WHITE));
                label.widget_info(|| {
                    egui::WidgetInfo::labeled(egui::WidgetType::Label, true, "Connection banner")
                });
            });
        }

        if let Some(notice) = self.notice {
            strip(ui, self.theme, self.theme.warning.gamma_multiply(0.8), |ui| {
                ui.label(RichText::new(notice).color(Color32::WHITE));
                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    let dismiss = ui.small_button("✕");
                    dismiss.widget_info(|| {
                        egui::WidgetInfo::labeled(egui::WidgetType::Button, true, "Dismiss notice")
                    });
                    if dismiss.clicked() {
                        actions.push(UiAction::DismissNotice);
                    }
                });
            });
        }

        actions
    }
}

fn strip(ui: &mut egui::Ui, theme: &Theme, fill: Color32, add_contents: impl FnOnce(&mut egui::Ui)) {
    egui::Frame::none()
        .fill(fill)
        .rounding(theme.button_rounding)
        .inner_margin(egui::Margin::symmetric(12.0, 8.0))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal_wrapped(add_contents);
        });
}
