//! egui/eframe desktop shell for Horizon

mod app;
pub mod components;
mod state;
mod theme;

pub use app::{render, HorizonApp};
pub use state::{UiAction, UiState};
pub use theme::Theme;

use crate::config::HorizonConfig;
use crate::orchestrator::OrchestratorHandle;

/// Open the window and run the frame loop until it closes
pub fn run(config: &HorizonConfig, handle: OrchestratorHandle) -> eframe::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window_width, config.window_height])
            .with_min_inner_size([360.0, 480.0])
            .with_title("Horizon"),
        ..Default::default()
    };

    eframe::run_native(
        "Horizon",
        options,
        Box::new(|cc| Ok(Box::new(HorizonApp::new(cc, handle)))),
    )
}
