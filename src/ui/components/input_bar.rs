//! Input bar component
//!
//! Text entry and send. A typed question supersedes a turn that is thinking
//! or speaking, so the bar is only locked while the microphone is open.

use crate::controller::VoiceStatus;
use crate::ui::state::{UiAction, UiState};
use crate::ui::theme::Theme;
use egui::{Key, RichText, Vec2};

pub struct InputBar<'a> {
    state: &'a mut UiState,
    status: VoiceStatus,
    theme: &'a Theme,
}

impl<'a> InputBar<'a> {
    pub fn new(state: &'a mut UiState, status: VoiceStatus, theme: &'a Theme) -> Self {
        Self {
            state,
            status,
            theme,
        }
    }

    pub fn show(self, ui: &mut egui::Ui) -> Vec<UiAction> {
        let mut actions = Vec::new();
        let enabled = !self.status.is_listening();

        egui::Frame::none()
            .fill(self.theme.bg_secondary)
            .rounding(self.theme.card_rounding)
            .inner_margin(self.theme.spacing_sm)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let hint = if enabled {
                        "Type a question..."
                    } else {
                        "Listening..."
                    };
                    let text_edit = egui::TextEdit::singleline(&mut self.state.input_text)
                        .id(egui::Id::new("message_input"))
                        .hint_text(hint)
                        .desired_width(ui.available_width() - 56.0)
                        .font(egui::TextStyle::Body)
                        .margin(egui::Margin::symmetric(12.0, 8.0));

                    let response = ui.add_enabled(enabled, text_edit);
                    response.widget_info(|| {
                        egui::WidgetInfo::labeled(egui::WidgetType::TextEdit, enabled, "Message input")
                    });

                    // Singleline edits give up focus on Enter
                    let submitted =
                        response.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter));

                    let can_send = enabled && !self.state.input_text.trim().is_empty();
                    let button_color = if can_send {
                        self.theme.primary
                    } else {
                        self.theme.text_muted
                    };
                    let button = egui::Button::new(
                        RichText::new("➤").size(18.0).color(egui::Color32::WHITE),
                    )
                    .min_size(Vec2::splat(44.0))
                    .rounding(self.theme.button_rounding)
                    .fill(button_color);

                    let send = ui.add_enabled(can_send, button);
                    send.widget_info(|| {
                        egui::WidgetInfo::labeled(egui::WidgetType::Button, can_send, "Send message")
                    });
                    let clicked = send.on_hover_text("Send (Enter)").clicked();

                    if (submitted || clicked) && can_send {
                        if let Some(text) = self.state.take_input() {
                            actions.push(UiAction::SubmitText(text));
                        }
                    }
                });
            });

        actions
    }
}
