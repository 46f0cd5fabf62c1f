mod app;
mod color;
mod data;
mod state;
mod ui;

use anyhow::Context;
use app::CrashboardApp;
use eframe::egui;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    // The dataset is loaded exactly once; a load failure aborts startup.
    let table = data::loader::shared()
        .context("cannot start dashboard without the collision dataset")?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Motor Vehicle Collisions in NYC",
        options,
        Box::new(move |_cc| Ok(Box::new(CrashboardApp::new(table)))),
    )
    .map_err(|e| anyhow::anyhow!("dashboard exited with an error: {e}"))
}
