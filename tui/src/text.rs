//! Plain-text card grid for `rca once`.
//!
//! Lays [`CardDescriptor`]s out as rounded boxes in up to three columns and
//! returns the result as a `String`. Colors are ANSI escapes from the theme
//! and can be switched off for pipes.

use rca_core::types::StatusSummary;

use crate::cards::{CardDescriptor, LOADING_TEXT};
use crate::grid::columns_for_width;
use crate::render::{
    self, paint, split_line, BOLD, BOX_BL, BOX_BR, BOX_H, BOX_TL, BOX_TR, BOX_V,
};
use crate::theme::Theme;


/// Horizontal space between cards.
pub const GAP: usize = 2;

/// Narrowest card the text renderer will draw.
pub const MIN_CARD_WIDTH: usize = 20;

/// Width used when stdout is not a terminal.
pub const FALLBACK_WIDTH: usize = 80;


/// Renders cards to strings with a given theme and terminal width.
pub struct TextGrid<'a> {
    pub theme: &'a Theme,
    pub width: usize,
    pub color: bool,
}


impl<'a> TextGrid<'a> {
    pub fn new(theme: &'a Theme, width: usize, color: bool) -> Self {
        TextGrid { theme, width, color }
    }

    /// Render the full grid. Cards keep snapshot order, left to right then
    /// top to bottom.
    pub fn render(&self, cards: &[CardDescriptor]) -> String {
        if cards.is_empty() {
            return "No resources reported.\n".to_string();
        }

        let columns = columns_for_width(self.width);
        let card_width = self.card_width(columns);
        let gap = " ".repeat(GAP);

        let mut out = String::new();
        for row in cards.chunks(columns) {
            let rendered: Vec<Vec<String>> = row
                .iter()
                .map(|card| self.card_lines(card, card_width))
                .collect();
            let height = rendered.iter().map(Vec::len).max().unwrap_or(0);
            for line in 0..height {
                let parts: Vec<&str> = rendered
                    .iter()
                    .map(|lines| lines.get(line).map(String::as_str).unwrap_or(""))
                    .collect();
                out.push_str(parts.join(&gap).trim_end());
                out.push('\n');
            }
        }
        out
    }

    /// The placeholder shown before any snapshot exists.
    pub fn render_loading(&self) -> String {
        format!("{}\n", paint(LOADING_TEXT, &self.theme.accent.ansi_fg(), self.color))
    }

    fn card_width(&self, columns: usize) -> usize {
        let available = self.width.saturating_sub(GAP * (columns - 1));
        (available / columns).max(MIN_CARD_WIDTH)
    }

    /// Render one card as lines of exactly `width` visible characters.
    pub fn card_lines(&self, card: &CardDescriptor, width: usize) -> Vec<String> {
        let inner = width.saturating_sub(4);
        let status_fg = self.theme.status(card.color).ansi_fg();
        let muted_fg = self.theme.muted.ansi_fg();

        let horizontal: String = std::iter::repeat(BOX_H).take(width.saturating_sub(2)).collect();
        let top = paint(
            &format!("{}{}{}", BOX_TL, horizontal, BOX_TR),
            &status_fg,
            self.color,
        );
        let bottom = paint(
            &format!("{}{}{}", BOX_BL, horizontal, BOX_BR),
            &status_fg,
            self.color,
        );
        let side = paint(&BOX_V.to_string(), &status_fg, self.color);

        let icon = paint(card.icon.glyph(), &status_fg, self.color);
        let region = paint(&card.region, &muted_fg, self.color);
        let title = paint(&render::truncate(&card.title, inner), BOLD, self.color);
        let subtitle = paint(&render::truncate(&card.subtitle, inner), &muted_fg, self.color);
        let label = paint(&format!("\u{25cf} {}", card.label), &status_fg, self.color);

        let body = [
            split_line(&icon, &region, inner),
            render::pad_right(&title, inner),
            render::pad_right(&subtitle, inner),
            render::pad_right(&label, inner),
        ];

        let mut lines = Vec::with_capacity(body.len() + 2);
        lines.push(top);
        for content in body {
            lines.push(format!("{} {} {}", side, content, side));
        }
        lines.push(bottom);
        lines
    }
}


/// Current terminal width, or [`FALLBACK_WIDTH`] when it cannot be queried.
pub fn terminal_width() -> usize {
    crossterm::terminal::size()
        .map(|(columns, _)| usize::from(columns))
        .unwrap_or(FALLBACK_WIDTH)
}


/// One-line per-status count, e.g. `● 2 healthy  ● 1 warning  ● 0 critical  3 total`.
pub fn summary_line(summary: &StatusSummary) -> String {
    let mut line = format!(
        "\u{25cf} {} healthy  \u{25cf} {} warning  \u{25cf} {} critical",
        summary.healthy, summary.warning, summary.critical
    );
    if summary.unknown > 0 {
        line.push_str(&format!("  \u{25cb} {} unknown", summary.unknown));
    }
    line.push_str(&format!("  {} total", summary.total()));
    line
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
