//! Message list component
//!
//! Displays the conversation history. AI answers show their spoken summary
//! with the longer detail behind a toggle.

use crate::messages::Message;
use crate::ui::state::{UiAction, UiState};
use crate::ui::theme::Theme;
use egui::{self, Align, Color32, RichText, Vec2};

pub struct MessageList<'a> {
    messages: &'a [Message],
    /// Read-aloud is offered only when no turn is running
    idle: bool,
    state: &'a mut UiState,
    theme: &'a Theme,
}

impl<'a> MessageList<'a> {
    pub fn new(
        messages: &'a [Message],
        idle: bool,
        state: &'a mut UiState,
        theme: &'a Theme,
    ) -> Self {
        Self {
            messages,
            idle,
            state,
            theme,
        }
    }

    pub fn show(mut self, ui: &mut egui::Ui) -> Vec<UiAction> {
        let mut actions = Vec::new();

        egui::ScrollArea::vertical()
            .id_salt("messages")
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                ui.add_space(self.theme.spacing);

                if self.messages.is_empty() {
                    self.show_empty_state(ui);
                } else {
                    for message in self.messages {
                        self.show_message(ui, message, &mut actions);
                        ui.add_space(self.theme.spacing_sm);
                    }
                }

                ui.add_space(self.theme.spacing);
            });

        actions
    }

    fn show_empty_state(&self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(60.0);
            ui.label(
                RichText::new("Ask me anything")
                    .size(22.0)
                    .color(self.theme.text_primary),
            );
            ui.add_space(self.theme.spacing_sm);
            ui.label(
                RichText::new("Tap the orb and speak, or type your question below.")
                    .size(14.0)
                    .color(self.theme.text_muted),
            );
        });
    }

    fn show_message(&mut self, ui: &mut egui::Ui, message: &Message, actions: &mut Vec<UiAction>) {
        let is_user = message.is_user();
        let align = if is_user { Align::RIGHT } else { Align::LEFT };
        let (bubble, text_color) = if is_user {
            (self.theme.user_bubble, Color32::WHITE)
        } else {
            (self.theme.assistant_bubble, self.theme.text_primary)
        };

        ui.with_layout(egui::Layout::top_down(align), |ui| {
            ui.label(
                RichText::new(if is_user { "You" } else { "Horizon" })
                    .size(12.0)
                    .color(self.theme.text_muted),
            );
            ui.add_space(2.0);

            let max_width = ui.available_width() * 0.8;
            egui::Frame::none()
                .fill(bubble)
                .rounding(self.theme.bubble_rounding)
                .inner_margin(egui::Margin::symmetric(12.0, 8.0))
                .show(ui, |ui| {
                    ui.set_max_width(max_width);
                    if is_user {
                        let response = ui.label(RichText::new(&message.text).color(text_color));
                        response.widget_info(|| {
                            egui::WidgetInfo::labeled(
                                egui::WidgetType::Label,
                                true,
                                format!("User message: {}", message.text),
                            )
                        });
                    } else {
                        self.show_answer(ui, message, text_color);
                    }
                });

            ui.horizontal(|ui| {
                ui.label(
                    RichText::new(message.timestamp.format("%H:%M").to_string())
                        .size(10.0)
                        .color(self.theme.text_muted),
                );
                self.show_message_actions(ui, message, actions);
            });
        });
    }

    fn show_answer(&mut self, ui: &mut egui::Ui, message: &Message, text_color: Color32) {
        let summary = message.spoken_summary();
        let response = ui.label(RichText::new(summary).color(text_color));
        response.widget_info(|| {
            egui::WidgetInfo::labeled(
                egui::WidgetType::Label,
                true,
                format!("Assistant message: {}", summary),
            )
        });

        let Some(detail) = message.detail() else {
            return;
        };
        let expanded = self.state.is_expanded(&message.id);
        if expanded {
            ui.add_space(4.0);
            ui.separator();
            ui.label(RichText::new(detail).size(13.0).color(self.theme.text_secondary));
        }
        let toggle = ui.add(
            egui::Button::new(
                RichText::new(if expanded { "Hide details" } else { "Show details" })
                    .size(12.0)
                    .color(self.theme.primary),
            )
            .frame(false),
        );
        toggle.widget_info(|| {
            egui::WidgetInfo::labeled(
                egui::WidgetType::Button,
                true,
                format!("Details {}", message.id),
            )
        });
        if toggle.clicked() {
            self.state.toggle_detail(&message.id);
        }
    }

    fn show_message_actions(&self, ui: &mut egui::Ui, message: &Message, actions: &mut Vec<UiAction>) {
        let small = |icon: &str| {
            egui::Button::new(RichText::new(icon).size(12.0).color(self.theme.text_muted))
                .frame(false)
                .min_size(Vec2::splat(20.0))
        };

        let read = ui.add_enabled(self.idle, small("🔊"));
        read.widget_info(|| {
            egui::WidgetInfo::labeled(
                egui::WidgetType::Button,
                self.idle,
                format!("Read aloud {}", message.id),
            )
        });
        if read.on_hover_text("Read aloud").clicked() {
            actions.push(UiAction::ReadAloud(message.id.clone()));
        }

        let delete = ui.add(small("🗑"));
        delete.widget_info(|| {
            egui::WidgetInfo::labeled(
                egui::WidgetType::Button,
                true,
                format!("Delete {}", message.id),
            )
        });
        if delete.on_hover_text("Delete message").clicked() {
            actions.push(UiAction::DeleteMessage(message.id.clone()));
        }
    }
}
