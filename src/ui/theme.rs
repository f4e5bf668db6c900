//! Color scheme for the chat panel.

use eframe::egui::Color32;

/// Colors for transcript and status rendering
pub mod msg_colors {
    use super::Color32;

    pub const TIMESTAMP: Color32 = Color32::from_gray(140);
    pub const USER: Color32 = Color32::from_rgb(0x66, 0xCC, 0xFF);
    pub const BOT: Color32 = Color32::from_rgb(0x99, 0xCC, 0x99);
    pub const TYPING: Color32 = Color32::from_gray(160);
    pub const LINK: Color32 = Color32::from_rgb(0x66, 0x99, 0xFF);
    pub const STATUS_ONLINE: Color32 = Color32::from_rgb(0x80, 0xC8, 0x78);
    pub const STATUS_OFFLINE: Color32 = Color32::from_rgb(0xE0, 0x7A, 0x5F);
}

/// Accent color for a sender label.
pub fn role_color(role: crate::transcript::Role) -> Color32 {
    match role {
        crate::transcript::Role::User => msg_colors::USER,
        crate::transcript::Role::Bot => msg_colors::BOT,
    }
}
