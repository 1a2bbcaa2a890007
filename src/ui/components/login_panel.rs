//! Login, registration and password reset forms shown while signed out

use crate::ui::state::{AuthMode, UiAction, UiState};
use crate::ui::theme::Theme;
use egui::{Key, RichText, Vec2};

pub struct LoginPanel<'a> {
    state: &'a mut UiState,
    busy: bool,
    notice: Option<&'a str>,
    theme: &'a Theme,
}

impl<'a> LoginPanel<'a> {
    pub fn new(state: &'a mut UiState, busy: bool, notice: Option<&'a str>, theme: &'a Theme) -> Self {
        Self {
            state,
            busy,
            notice,
            theme,
        }
    }

    pub fn show(self, ui: &mut egui::Ui) -> Vec<UiAction> {
        let mut actions = Vec::new();
        let Self {
            state,
            busy,
            notice,
            theme,
        } = self;
        let enabled = !busy;

        ui.vertical_centered(|ui| {
            ui.add_space(60.0);
            ui.label(
                RichText::new("Horizon")
                    .size(28.0)
                    .strong()
                    .color(theme.text_primary),
            );
            ui.label(
                RichText::new("Your voice assistant")
                    .size(14.0)
                    .color(theme.text_muted),
            );
            ui.add_space(theme.spacing_lg);

            egui::Frame::none()
                .fill(theme.bg_secondary)
                .rounding(theme.card_rounding)
                .inner_margin(theme.spacing)
                .show(ui, |ui| {
                    ui.set_max_width(300.0);

                    text_field(ui, enabled, &mut state.username, "login_username", "Username", false);

                    match state.auth_mode {
                        AuthMode::SignIn => sign_in_form(ui, state, enabled, theme, &mut actions),
                        AuthMode::ResetPassword => {
                            reset_form(ui, state, enabled, theme, &mut actions)
                        }
                    }

                    if let Some(error) = &state.form_error {
                        ui.add_space(theme.spacing_sm);
                        let label = ui.label(RichText::new(error).color(theme.error));
                        label.widget_info(|| {
                            egui::WidgetInfo::labeled(
                                egui::WidgetType::Label,
                                true,
                                format!("Form error: {}", error),
                            )
                        });
                    }

                    if busy {
                        ui.add_space(theme.spacing_sm);
                        ui.spinner();
                    }
                });

            if let Some(notice) = notice {
                ui.add_space(theme.spacing);
                let label = ui.label(RichText::new(notice).color(theme.text_secondary));
                label.widget_info(|| {
                    egui::WidgetInfo::labeled(egui::WidgetType::Label, true, format!("Notice: {}", notice))
                });
            }
        });

        actions
    }
}

fn sign_in_form(
    ui: &mut egui::Ui,
    state: &mut UiState,
    enabled: bool,
    theme: &Theme,
    actions: &mut Vec<UiAction>,
) {
    let password = text_field(ui, enabled, &mut state.password, "login_password", "Password", true);
    let submitted = password.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter));

    ui.add_space(theme.spacing_sm);

    ui.horizontal(|ui| {
        let login = primary_button(ui, enabled, theme, "Log in");
        let register = secondary_button(ui, enabled, theme, "Register");

        if (login.clicked() || submitted) && enabled {
            if let Some((username, password)) = state.take_credentials() {
                actions.push(UiAction::Login { username, password });
            }
        } else if register.clicked() {
            if let Some((username, password)) = state.take_credentials() {
                actions.push(UiAction::Register { username, password });
            }
        }
    });

    let forgot = ui.add_enabled(enabled, egui::Button::new("Forgot password?").frame(false));
    forgot.widget_info(|| {
        egui::WidgetInfo::labeled(egui::WidgetType::Button, enabled, "Forgot password?")
    });
    if forgot.clicked() {
        state.set_auth_mode(AuthMode::ResetPassword);
    }
}

fn reset_form(
    ui: &mut egui::Ui,
    state: &mut UiState,
    enabled: bool,
    theme: &Theme,
    actions: &mut Vec<UiAction>,
) {
    text_field(ui, enabled, &mut state.new_password, "reset_new", "New password", true);
    text_field(ui, enabled, &mut state.confirm_password, "reset_confirm", "Confirm password", true);

    ui.add_space(theme.spacing_sm);

    ui.horizontal(|ui| {
        let reset = primary_button(ui, enabled, theme, "Reset password");
        let back = secondary_button(ui, enabled, theme, "Back to login");

        if reset.clicked() {
            let username = state.username.trim().to_string();
            if username.is_empty() {
                state.form_error = Some("Enter your username".to_string());
            } else if let Some(new_password) = state.take_new_password() {
                actions.push(UiAction::ResetPassword {
                    username,
                    new_password,
                });
                state.set_auth_mode(AuthMode::SignIn);
            }
        } else if back.clicked() {
            state.set_auth_mode(AuthMode::SignIn);
        }
    });
}

pub(crate) fn text_field(
    ui: &mut egui::Ui,
    enabled: bool,
    text: &mut String,
    id: &str,
    label: &'static str,
    password: bool,
) -> egui::Response {
    let response = ui.add_enabled(
        enabled,
        egui::TextEdit::singleline(text)
            .id(egui::Id::new(id))
            .hint_text(label)
            .password(password)
            .desired_width(f32::INFINITY),
    );
    response.widget_info(|| egui::WidgetInfo::labeled(egui::WidgetType::TextEdit, enabled, label));
    response
}

pub(crate) fn primary_button(
    ui: &mut egui::Ui,
    enabled: bool,
    theme: &Theme,
    label: &'static str,
) -> egui::Response {
    let response = ui.add_enabled(
        enabled,
        egui::Button::new(RichText::new(label).color(egui::Color32::WHITE))
            .min_size(Vec2::new(120.0, 36.0))
            .rounding(theme.button_rounding)
            .fill(theme.primary),
    );
    response.widget_info(|| egui::WidgetInfo::labeled(egui::WidgetType::Button, enabled, label));
    response
}

pub(crate) fn secondary_button(
    ui: &mut egui::Ui,
    enabled: bool,
    theme: &Theme,
    label: &'static str,
) -> egui::Response {
    let response = ui.add_enabled(
        enabled,
        egui::Button::new(label)
            .min_size(Vec2::new(120.0, 36.0))
            .rounding(theme.button_rounding),
    );
    response.widget_info(|| egui::WidgetInfo::labeled(egui::WidgetType::Button, enabled, label));
    response
}
