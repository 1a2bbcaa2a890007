//! Main application struct and eframe integration

use crate::audio::AudioDevices;
use crate::orchestrator::OrchestratorHandle;
use crate::state::{AppCommand, AppEvent, AppStateSnapshot};
use crate::ui::components::{
    Header, InputBar, LoginPanel, MessageList, SettingsPanel, StatusBanner, VoiceOrb,
};
use crate::ui::state::{UiAction, UiState};
use crate::ui::theme::Theme;
use egui::{CentralPanel, TopBottomPanel};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Repaint interval while nothing animates, so orchestrator events are seen
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Main Horizon application
pub struct HorizonApp {
    handle: OrchestratorHandle,
    devices: AudioDevices,
    ui_state: UiState,
}

impl HorizonApp {
    pub fn new(cc: &eframe::CreationContext<'_>, handle: OrchestratorHandle) -> Self {
        let mut ui_state = UiState::new();
        if ui_state.take_theme_change() {
            Theme::for_preference(ui_state.light_theme).apply(&cc.egui_ctx);
        }

        Self {
            handle,
            devices: AudioDevices::new(),
            ui_state,
        }
    }

    /// Drain orchestrator events, running device work on this thread
    fn pump_events(&mut self, ctx: &egui::Context) {
        while let Some(event) = self.handle.try_recv_event() {
            match event {
                AppEvent::StateChanged => {}
                AppEvent::Error(message) => warn!("Orchestrator reported: {}", message),
                AppEvent::Shutdown => {
                    info!("Orchestrator stopped, closing window");
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
                device_event => {
                    for cmd in self.devices.handle_event(device_event) {
                        self.send(cmd);
                    }
                }
            }
        }

        for cmd in self.devices.poll() {
            self.send(cmd);
        }
    }

    fn send(&self, cmd: AppCommand) {
        if let Err(e) = self.handle.send_command(cmd) {
            error!("{}", e);
        }
    }
}

impl eframe::App for HorizonApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.pump_events(ctx);

        let snapshot = self.handle.state().snapshot();
        if snapshot.banner_visible {
            self.send(AppCommand::Tick);
        }

        let actions = render(
            ctx,
            &snapshot,
            &mut self.ui_state,
            self.devices.input_level(),
        );
        for action in actions {
            debug!("UI action: {:?}", action);
            if action == UiAction::Logout {
                self.ui_state.reset();
            }
            self.send(action.into());
        }

        if snapshot.status.is_idle() {
            ctx.request_repaint_after(POLL_INTERVAL);
        } else {
            ctx.request_repaint();
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        info!("Window closing");
        self.send(AppCommand::Shutdown);
    }
}

/// Render one frame from a snapshot. Returns what the user asked for.
pub fn render(
    ctx: &egui::Context,
    snapshot: &AppStateSnapshot,
    ui_state: &mut UiState,
    input_level: f32,
) -> Vec<UiAction> {
    let mut actions = Vec::new();
    let theme = &Theme::for_preference(ui_state.light_theme);
    if ui_state.take_theme_change() {
        theme.apply(ctx);
    }

    if !snapshot.account.is_signed_in() {
        if ui_state.settings_open {
            ui_state.close_settings();
        }
        CentralPanel::default()
            .frame(egui::Frame::none().fill(theme.bg_primary).inner_margin(theme.spacing))
            .show(ctx, |ui| {
                let notice = snapshot
                    .auth_notice
                    .as_deref()
                    .or(snapshot.notice.as_deref());
                actions.extend(
                    LoginPanel::new(ui_state, snapshot.account.is_authenticating(), notice, theme)
                        .show(ui),
                );
            });
        return actions;
    }

    TopBottomPanel::top("header")
        .frame(egui::Frame::none().fill(theme.bg_secondary).inner_margin(12.0))
        .show(ctx, |ui| {
            actions.extend(
                Header::new(
                    &snapshot.account,
                    ui_state,
                    snapshot.language,
                    !snapshot.messages.is_empty(),
                    theme,
                )
                .show(ui),
            );
        });

    let banner = StatusBanner::new(snapshot.banner_visible, snapshot.notice.as_deref(), theme);
    if !banner.is_empty() {
        TopBottomPanel::top("banner")
            .frame(egui::Frame::none().fill(theme.bg_primary).inner_margin(theme.spacing_sm))
            .show(ctx, |ui| {
                actions.extend(banner.show(ui));
            });
    }

    TopBottomPanel::bottom("controls")
        .frame(egui::Frame::none().fill(theme.bg_primary).inner_margin(theme.spacing))
        .show(ctx, |ui| {
            actions.extend(VoiceOrb::new(snapshot.status, theme).level(input_level).show(ui));
            ui.add_space(theme.spacing_sm);
            actions.extend(InputBar::new(ui_state, snapshot.status, theme).show(ui));
        });

    CentralPanel::default()
        .frame(egui::Frame::none().fill(theme.bg_primary).inner_margin(theme.spacing_sm))
        .show(ctx, |ui| {
            if ui_state.settings_open {
                actions.extend(
                    SettingsPanel::new(ui_state, snapshot.settings_notice.as_deref(), theme)
                        .show(ui),
                );
            } else {
                actions.extend(
                    MessageList::new(&snapshot.messages, snapshot.status.is_idle(), ui_state, theme)
                        .show(ui),
                );
            }
        });

    actions
}
