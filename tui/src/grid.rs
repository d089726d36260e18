//! Resource grid: renders card descriptors with ratatui widgets.
//!
//! Bridges the pure mapping in [`crate::cards`] with ratatui's layout
//! system. Cards are laid out left to right in one to three columns
//! depending on the available width; rows scroll vertically.
//!
//! Motion is derived from a frame counter supplied by the caller, so the
//! same inputs always produce the same buffer.

use std::time::Duration;

use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Paragraph};

use crate::cards::{Animation, CardDescriptor, LOADING_TEXT};
use crate::theme::Theme;


/// Height of one card including its border.
pub const CARD_HEIGHT: u16 = 6;

/// Vertical space reserved per grid row. The spare line lets bouncing
/// cards move without overlapping the next row.
pub const ROW_HEIGHT: u16 = CARD_HEIGHT + 1;

/// Horizontal space between cards.
pub const COLUMN_GAP: u16 = 2;


/// Number of card columns for a given width: 1, 2 or 3.
pub fn columns_for_width(width: usize) -> usize {
    if width >= 110 {
        3
    } else if width >= 70 {
        2
    } else {
        1
    }
}


/// Number of grid rows needed for `card_count` cards.
pub fn total_rows(card_count: usize, columns: usize) -> usize {
    card_count.div_ceil(columns.max(1))
}


/// Number of grid rows that fit in `height` lines (at least one).
pub fn visible_rows(height: u16) -> usize {
    usize::from((height / ROW_HEIGHT).max(1))
}


/// Largest useful scroll offset for the given card count and area.
pub fn max_scroll(card_count: usize, area: Rect) -> usize {
    let columns = columns_for_width(usize::from(area.width));
    total_rows(card_count, columns).saturating_sub(visible_rows(area.height))
}


/// Pulse alternates emphasis roughly once per second at a 250 ms frame rate.
pub fn pulse_bright(frame: u64) -> bool {
    (frame / 4) % 2 == 0
}


/// Bounce drops the card by one line on alternating half-second phases.
pub fn bounce_offset(frame: u64) -> u16 {
    if (frame / 2) % 2 == 1 {
        1
    } else {
        0
    }
}


/// Everything the grid needs for one frame.
pub struct GridView<'a> {
    pub cards: &'a [CardDescriptor],
    pub theme: &'a Theme,
    /// Time since the grid first appeared; gates each card's entrance.
    pub since_snapshot: Duration,
    /// Animation frame counter.
    pub frame: u64,
    /// Index of the first visible grid row.
    pub scroll_row: usize,
}


/// Render the card grid into `area`.
pub fn render_grid(frame: &mut Frame, area: Rect, view: &GridView) {
    if view.cards.is_empty() {
        let empty = Paragraph::new("No resources reported.")
            .style(Style::default().fg(view.theme.muted.to_ratatui()));
        frame.render_widget(empty, area);
        return;
    }

    let columns = columns_for_width(usize::from(area.width));
    let gaps = COLUMN_GAP * (columns as u16 - 1);
    let card_width = area.width.saturating_sub(gaps) / columns as u16;
    let rows_visible = visible_rows(area.height);

    for (index, card) in view.cards.iter().enumerate() {
        if view.since_snapshot < card.entrance_delay {
            continue;
        }
        let row = index / columns;
        let column = index % columns;
        if row < view.scroll_row || row >= view.scroll_row + rows_visible {
            continue;
        }

        let lift = match card.animation {
            Animation::Bounce => bounce_offset(view.frame),
            Animation::Pulse | Animation::Static => 0,
        };
        let slot = Rect {
            x: area.x + column as u16 * (card_width + COLUMN_GAP),
            y: area.y + (row - view.scroll_row) as u16 * ROW_HEIGHT + lift,
            width: card_width,
            height: CARD_HEIGHT,
        };
        let rect = slot.intersection(area);
        if rect.height < CARD_HEIGHT {
            continue;
        }
        render_card(frame, rect, card, view);
    }
}


/// Render a single card into `rect`.
fn render_card(frame: &mut Frame, rect: Rect, card: &CardDescriptor, view: &GridView) {
    let status = view.theme.status(card.color).to_ratatui();
    let muted = view.theme.muted.to_ratatui();

    let emphasis = match card.animation {
        Animation::Pulse if !pulse_bright(view.frame) => Modifier::DIM,
        _ => Modifier::empty(),
    };

    let block = Block::bordered()
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(status).add_modifier(emphasis));
    let inner = block.inner(rect);
    frame.render_widget(block, rect);

    let lines = Layout::vertical([Constraint::Length(1); 4]).split(inner);

    let top = Layout::horizontal([Constraint::Length(2), Constraint::Min(0)]).split(lines[0]);
    frame.render_widget(
        Paragraph::new(Span::styled(card.icon.glyph(), Style::default().fg(status))),
        top[0],
    );
    frame.render_widget(
        Paragraph::new(Span::styled(card.region.as_str(), Style::default().fg(muted)))
            .alignment(Alignment::Right),
        top[1],
    );

    frame.render_widget(
        Paragraph::new(Span::styled(
            card.title.as_str(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        lines[1],
    );
    frame.render_widget(
        Paragraph::new(Span::styled(card.subtitle.as_str(), Style::default().fg(muted))),
        lines[2],
    );
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("\u{25cf} ", Style::default().fg(status)),
            Span::styled(
                card.label.as_str(),
                Style::default().fg(status).add_modifier(Modifier::BOLD | emphasis),
            ),
        ])),
        lines[3],
    );
}


/// Render the single loading indicator shown before the first snapshot.
pub fn render_loading(frame: &mut Frame, area: Rect, theme: &Theme, frame_count: u64) {
    let modifier = if pulse_bright(frame_count) {
        Modifier::BOLD
    } else {
        Modifier::DIM
    };
    let indicator = Paragraph::new(LOADING_TEXT)
        .style(Style::default().fg(theme.accent.to_ratatui()).add_modifier(modifier));
    frame.render_widget(indicator, area);
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
