//! FlowChat - A desktop chat client for a Flowise conversational-AI endpoint
//!
//! Architecture:
//! - Main thread: runs the egui UI
//! - Backend thread: runs a Tokio runtime for async HTTP requests
//! - Communication via crossbeam channels (lock-free, sync-safe)

use eframe::egui;

use flowchat::app::FlowChatApp;

fn main() -> eframe::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([480.0, 640.0])
            .with_min_inner_size([360.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "FlowChat",
        options,
        Box::new(|cc| Ok(Box::new(FlowChatApp::new(cc)))),
    )
}
