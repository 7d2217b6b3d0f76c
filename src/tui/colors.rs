//! Color constants for the terminal user interface.

use ratatui::style::Color;

use crate::fields::{Priority, Status};

/// Header and status bar background.
pub const ACCENT: Color = Color::Rgb(0, 80, 0);
/// Delete confirmation background.
pub const DARK_RED: Color = Color::Rgb(114, 0, 0);
/// Used for High priority
pub const GOLD: Color = Color::Rgb(255, 215, 0);

pub fn status_color(status: Status) -> Color {
    match status {
        Status::Pending => Color::White,
        Status::InProgress => Color::Cyan,
        Status::Completed => Color::DarkGray,
    }
}

pub fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::Low => Color::Gray,
        Priority::Medium => Color::White,
        Priority::High => GOLD,
    }
}
