//! UI rendering modules for the FlowChat client.
//!
//! This module contains all egui-based rendering code:
//! - `messages`: transcript rendering and HTML segmenting
//! - `theme`: colors and styling utilities

mod messages;
mod theme;

pub use messages::*;
pub use theme::*;
