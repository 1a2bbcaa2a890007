//! Voice orb
//!
//! The one-button voice control. A click starts listening when idle, sends
//! the capture while listening and interrupts the turn while thinking or
//! speaking. Right-click or Escape discards a capture. Space does the same
//! as a click when no text field has focus.

use crate::controller::VoiceStatus;
use crate::ui::state::UiAction;
use crate::ui::theme::Theme;
use egui::{Color32, Key, Pos2, Rect, RichText, Sense, Stroke, Vec2};

const ORB_SIZE: f32 = 96.0;
const ORB_RADIUS: f32 = 40.0;

pub struct VoiceOrb<'a> {
    status: VoiceStatus,
    /// Microphone level, 0.0 to 1.0
    level: f32,
    theme: &'a Theme,
}

impl<'a> VoiceOrb<'a> {
    pub fn new(status: VoiceStatus, theme: &'a Theme) -> Self {
        Self {
            status,
            level: 0.0,
            theme,
        }
    }

    pub fn level(mut self, level: f32) -> Self {
        self.level = level.clamp(0.0, 1.0);
        self
    }

    pub fn show(self, ui: &mut egui::Ui) -> Vec<UiAction> {
        let mut actions = Vec::new();

        ui.vertical_centered(|ui| {
            let (rect, response) = ui.allocate_exact_size(Vec2::splat(ORB_SIZE), Sense::click());
            let status = self.status;
            response.widget_info(|| {
                egui::WidgetInfo::labeled(egui::WidgetType::Button, true, "Voice orb")
            });

            if ui.is_rect_visible(rect) {
                self.paint(ui, rect, response.hovered());
            }

            if response.clicked() {
                actions.push(UiAction::MicTap);
            }
            let escape_pressed = ui.input(|i| i.key_pressed(Key::Escape));
            if (response.secondary_clicked() || escape_pressed) && status.is_listening() {
                actions.push(UiAction::CancelListening);
            }

            let space_pressed = ui.input(|i| i.key_pressed(Key::Space));
            let any_widget_focused = ui.memory(|m| m.focused().is_some());
            if space_pressed && !any_widget_focused {
                actions.push(UiAction::MicTap);
            }

            response.on_hover_text(self.tooltip());

            ui.add_space(self.theme.spacing_sm);
            let status_label = ui.label(
                RichText::new(self.caption())
                    .size(13.0)
                    .color(self.caption_color()),
            );
            status_label.widget_info(|| {
                egui::WidgetInfo::labeled(
                    egui::WidgetType::Label,
                    true,
                    format!("Status: {}", status),
                )
            });
        });

        actions
    }

    fn paint(&self, ui: &egui::Ui, rect: Rect, hovered: bool) {
        let painter = ui.painter();
        let center = rect.center();
        let base = self.theme.status_color(self.status);
        let fill = if hovered && self.status.is_idle() {
            base.gamma_multiply(1.2)
        } else {
            base
        };

        painter.circle_filled(center, ORB_RADIUS, fill);

        match self.status {
            VoiceStatus::Idle => {
                if hovered {
                    painter.circle_stroke(
                        center,
                        ORB_RADIUS + 1.0,
                        Stroke::new(2.0, base.gamma_multiply(0.6)),
                    );
                }
                draw_mic_icon(painter, center);
            }
            VoiceStatus::Listening => {
                self.draw_level_ring(ui, painter, center);
                draw_stop_icon(painter, center);
            }
            VoiceStatus::Thinking => draw_thinking_dots(ui, painter, center),
            VoiceStatus::Speaking => {
                self.draw_pulsing_ring(ui, painter, center);
                draw_stop_icon(painter, center);
            }
        }
    }

    /// Ring that grows with the microphone level
    fn draw_level_ring(&self, ui: &egui::Ui, painter: &egui::Painter, center: Pos2) {
        let radius = ORB_RADIUS + 2.0 + self.level * 6.0;
        painter.circle_stroke(
            center,
            radius,
            Stroke::new(2.0 + self.level * 2.0, self.theme.listening.gamma_multiply(0.7)),
        );
        ui.ctx().request_repaint();
    }

    fn draw_pulsing_ring(&self, ui: &egui::Ui, painter: &egui::Painter, center: Pos2) {
        let t = ui.ctx().input(|i| i.time);
        let pulse = ((t * 3.0).sin() * 0.5 + 0.5) as f32;

        painter.circle_stroke(
            center,
            ORB_RADIUS + 2.0 + pulse * 6.0,
            Stroke::new(
                2.0 + pulse * 2.0,
                self.theme.speaking.gamma_multiply((1.0 - pulse) * 0.6),
            ),
        );

        ui.ctx().request_repaint();
    }

    fn caption(&self) -> &'static str {
        match self.status {
            VoiceStatus::Idle => "Tap to speak",
            VoiceStatus::Listening => "Listening...",
            VoiceStatus::Thinking => "Thinking...",
            VoiceStatus::Speaking => "Speaking...",
        }
    }

    fn caption_color(&self) -> Color32 {
        match self.status {
            VoiceStatus::Idle => self.theme.text_muted,
            other => self.theme.status_color(other),
        }
    }

    fn tooltip(&self) -> &'static str {
        match self.status {
            VoiceStatus::Idle => "Click to speak (Space)",
            VoiceStatus::Listening => "Click to send (Space)\nRight-click or Esc to cancel",
            VoiceStatus::Thinking | VoiceStatus::Speaking => "Click to stop (Space)",
        }
    }
}

fn draw_stop_icon(painter: &egui::Painter, center: Pos2) {
    painter.rect_filled(
        Rect::from_center_size(center, Vec2::splat(20.0)),
        3.0,
        Color32::WHITE,
    );
}

fn draw_thinking_dots(ui: &egui::Ui, painter: &egui::Painter, center: Pos2) {
    let angle = ui.ctx().input(|i| i.time) * 3.0;

    for i in 0..3 {
        let dot_angle = angle + (i as f64 * std::f64::consts::TAU / 3.0);
        let radius = 12.0;
        let dot_pos = egui::pos2(
            center.x + (dot_angle.cos() as f32 * radius),
            center.y + (dot_angle.sin() as f32 * radius),
        );
        let alpha = 1.0 - (i as f32 * 0.3);
        painter.circle_filled(dot_pos, 4.0, Color32::from_white_alpha((255.0 * alpha) as u8));
    }

    ui.ctx().request_repaint();
}

fn draw_mic_icon(painter: &egui::Painter, center: Pos2) {
    let color = Color32::WHITE;
    let stroke = Stroke::new(2.5, color);

    let body = Rect::from_center_size(egui::pos2(center.x, center.y - 4.0), Vec2::new(12.0, 20.0));
    painter.rect_filled(body, 6.0, color);

    // Stand arc, approximated by segments
    let arc_center = egui::pos2(center.x, center.y + 2.0);
    let arc_radius = 13.0;
    let segments = 10;
    for i in 0..segments {
        let start = std::f32::consts::PI * (i as f32 / segments as f32);
        let end = std::f32::consts::PI * ((i + 1) as f32 / segments as f32);
        painter.line_segment(
            [
                egui::pos2(
                    arc_center.x - arc_radius * start.cos(),
                    arc_center.y + arc_radius * start.sin(),
                ),
                egui::pos2(
                    arc_center.x - arc_radius * end.cos(),
                    arc_center.y + arc_radius * end.sin(),
                ),
            ],
            stroke,
        );
    }

    let stem_top = arc_center.y + arc_radius;
    painter.line_segment(
        [egui::pos2(center.x, stem_top), egui::pos2(center.x, stem_top + 6.0)],
        stroke,
    );
    painter.line_segment(
        [
            egui::pos2(center.x - 8.0, stem_top + 6.0),
            egui::pos2(center.x + 8.0, stem_top + 6.0),
        ],
        stroke,
    );
}
