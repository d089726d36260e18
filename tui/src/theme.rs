//! Theme configuration for the dashboard.
//!
//! Defines color schemes that control how status colors, borders and the
//! header are drawn. Themes are serializable and selected by name from the
//! configuration file or `--theme`.

use serde::{Deserialize, Serialize};

use crate::cards::StatusColor;


/// A named color that can be converted to ANSI escape sequences or a
/// ratatui color.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    Default,
    Red,
    Green,
    Yellow,
    Blue,
    Cyan,
    Magenta,
    White,
    Gray,
    DarkGray,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    Rgb(u8, u8, u8),
}


impl Color {
    /// Return the ANSI foreground escape sequence for this color.
    pub fn ansi_fg(&self) -> String {
        match self {
            Color::Default => "\x1b[39m".to_string(),
            Color::Red => "\x1b[31m".to_string(),
            Color::Green => "\x1b[32m".to_string(),
            Color::Yellow => "\x1b[33m".to_string(),
            Color::Blue => "\x1b[34m".to_string(),
            Color::Cyan => "\x1b[36m".to_string(),
            Color::Magenta => "\x1b[35m".to_string(),
            Color::White => "\x1b[37m".to_string(),
            Color::Gray => "\x1b[90m".to_string(),
            Color::DarkGray => "\x1b[38;5;238m".to_string(),
            Color::BrightRed => "\x1b[91m".to_string(),
            Color::BrightGreen => "\x1b[92m".to_string(),
            Color::BrightYellow => "\x1b[93m".to_string(),
            Color::BrightBlue => "\x1b[94m".to_string(),
            Color::Rgb(r, g, b) => format!("\x1b[38;2;{};{};{}m", r, g, b),
        }
    }

    /// Return the equivalent ratatui color.
    pub fn to_ratatui(self) -> ratatui::style::Color {
        use ratatui::style::Color as R;
        match self {
            Color::Default => R::Reset,
            Color::Red => R::Red,
            Color::Green => R::Green,
            Color::Yellow => R::Yellow,
            Color::Blue => R::Blue,
            Color::Cyan => R::Cyan,
            Color::Magenta => R::Magenta,
            Color::White => R::White,
            Color::Gray => R::Gray,
            Color::DarkGray => R::DarkGray,
            Color::BrightRed => R::LightRed,
            Color::BrightGreen => R::LightGreen,
            Color::BrightYellow => R::LightYellow,
            Color::BrightBlue => R::LightBlue,
            Color::Rgb(r, g, b) => R::Rgb(r, g, b),
        }
    }
}


/// A complete color theme for the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Theme {
    pub name: String,
    pub header: Color,
    pub accent: Color,
    pub border: Color,
    pub muted: Color,
    pub healthy: Color,
    pub warning: Color,
    pub critical: Color,
    pub neutral: Color,
}


impl Theme {
    /// Dark terminal theme. The default.
    pub fn default_dark() -> Self {
        Theme {
            name: "dark".to_string(),
            header: Color::White,
            accent: Color::BrightBlue,
            border: Color::DarkGray,
            muted: Color::Gray,
            healthy: Color::BrightGreen,
            warning: Color::BrightYellow,
            critical: Color::BrightRed,
            neutral: Color::Gray,
        }
    }

    /// Light terminal theme.
    pub fn default_light() -> Self {
        Theme {
            name: "light".to_string(),
            header: Color::Default,
            accent: Color::Blue,
            border: Color::Gray,
            muted: Color::DarkGray,
            healthy: Color::Green,
            warning: Color::Yellow,
            critical: Color::Red,
            neutral: Color::DarkGray,
        }
    }

    /// Minimal theme: no bright colors, only basic ANSI.
    pub fn minimal() -> Self {
        Theme {
            name: "minimal".to_string(),
            header: Color::Default,
            accent: Color::Default,
            border: Color::Default,
            muted: Color::Default,
            healthy: Color::Green,
            warning: Color::Yellow,
            critical: Color::Red,
            neutral: Color::Default,
        }
    }

    /// Names accepted by [`Theme::by_name`].
    pub fn names() -> &'static [&'static str] {
        &["dark", "light", "minimal"]
    }

    /// Look up a built-in theme by name (case-insensitive).
    pub fn by_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "dark" => Some(Theme::default_dark()),
            "light" => Some(Theme::default_light()),
            "minimal" => Some(Theme::minimal()),
            _ => None,
        }
    }

    /// Concrete color for a semantic status color.
    pub fn status(&self, color: StatusColor) -> Color {
        match color {
            StatusColor::Green => self.healthy,
            StatusColor::Yellow => self.warning,
            StatusColor::Red => self.critical,
            StatusColor::Neutral => self.neutral,
        }
    }
}


impl Default for Theme {
    fn default() -> Self {
        Theme::default_dark()
    }
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
