//! TUI runner: ratatui event loop with terminal setup and cleanup.
//!
//! The [`Tui`] struct owns the ratatui terminal and the application state
//! machine ([`App`]). [`Tui::run`] starts an [`InventoryPoller`] and drives
//! one cooperative loop: key events, snapshot updates and redraw ticks are
//! interleaved with `tokio::select!`, and every pass redraws the frame.

use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{Event, EventStream, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use futures::StreamExt;
use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Paragraph, Wrap};
use ratatui::Terminal;
use tokio::time::MissedTickBehavior;

use rca_core::poller::{InventoryPoller, LatestSnapshot};
use rca_core::types::InventorySnapshot;

use crate::app::{App, AppAction, AppState, Key};
use crate::cards::{describe_all, CardDescriptor};
use crate::grid::{self, GridView};
use crate::text::summary_line;
use crate::theme::Theme;


/// Title shown in the header bar.
pub const TITLE: &str = "RCA AGENT \u{2014} Live Inventory";

/// Redraw period; also the animation frame length.
pub const FRAME_RATE: Duration = Duration::from_millis(250);


/// Everything needed to draw one frame.
///
/// Extracted from `Tui` so that `terminal.draw()` can borrow its closure
/// argument without conflicting with the `&mut self` borrow on the terminal.
pub struct RenderState<'a> {
    pub app: &'a App,
    pub theme: &'a Theme,
    pub snapshot: Option<&'a InventorySnapshot>,
    pub cards: &'a [CardDescriptor],
    pub since_snapshot: Duration,
    pub source: &'a str,
    pub interval: Duration,
}


/// The main TUI application runner.
///
/// Manages terminal raw mode, the alternate screen and the ratatui terminal
/// backend. The terminal is restored on drop, including on early return.
pub struct Tui {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    app: App,
    theme: Theme,
}


/// Snapshot-derived state the loop keeps between frames.
struct Displayed {
    snapshot: LatestSnapshot,
    cards: Vec<CardDescriptor>,
    /// When the grid first became visible; entrance delays count from here.
    shown_at: Instant,
}


impl Displayed {
    fn new(snapshot: LatestSnapshot) -> Self {
        let cards = snapshot.as_deref().map(describe_all).unwrap_or_default();
        Displayed {
            snapshot,
            cards,
            shown_at: Instant::now(),
        }
    }

    /// Swap in a new snapshot. Only the first snapshot after loading
    /// restarts the entrance clock.
    fn replace(&mut self, snapshot: LatestSnapshot) {
        if self.snapshot.is_none() {
            self.shown_at = Instant::now();
        }
        self.cards = snapshot.as_deref().map(describe_all).unwrap_or_default();
        self.snapshot = snapshot;
    }
}


impl Tui {
    /// Create a new TUI, entering raw mode and the alternate screen.
    ///
    /// If setup fails after raw mode is on, the terminal is restored before
    /// the error is returned.
    pub fn new(theme: Theme) -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        let terminal = or_restore(
            || {
                let mut stdout = io::stdout();
                execute!(stdout, EnterAlternateScreen)?;
                Terminal::new(CrosstermBackend::new(stdout))
            },
            || {
                let _ = execute!(io::stdout(), LeaveAlternateScreen);
                let _ = terminal::disable_raw_mode();
            },
        )?;

        Ok(Self {
            terminal,
            app: App::new(),
            theme,
        })
    }

    /// Start `poller`, run the event loop until quit is requested, then stop
    /// the poller and restore the terminal.
    pub async fn run(&mut self, poller: &mut InventoryPoller) -> Result<(), io::Error> {
        let mut updates = poller.subscribe();
        poller.start();

        let source = poller.source_description();
        let interval = poller.interval();
        let mut displayed = Displayed::new(updates.borrow_and_update().clone());
        let mut events = EventStream::new();
        let mut ticker = tokio::time::interval(FRAME_RATE);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(event = "tui.session.started", source = %source);

        let result = loop {
            let state = RenderState {
                app: &self.app,
                theme: &self.theme,
                snapshot: displayed.snapshot.as_deref(),
                cards: &displayed.cards,
                since_snapshot: displayed.shown_at.elapsed(),
                source: &source,
                interval,
            };
            if let Err(e) = self.terminal.draw(|frame| render_frame(frame, &state)) {
                break Err(e);
            }

            tokio::select! {
                _ = ticker.tick() => {
                    self.app.tick();
                }
                changed = updates.changed() => {
                    if changed.is_err() {
                        break Ok(());
                    }
                    displayed.replace(updates.borrow_and_update().clone());
                    tracing::debug!(
                        event = "tui.snapshot.received",
                        resource_count = displayed.cards.len(),
                    );
                }
                next = events.next() => match next {
                    Some(Ok(Event::Key(key_event))) if key_event.kind == KeyEventKind::Press => {
                        let key = crossterm_to_key(key_event.code, key_event.modifiers);
                        if self.handle_key(key, displayed.cards.len(), poller) {
                            break Ok(());
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => break Err(e),
                    None => break Ok(()),
                },
            }

            if let Ok(area) = self.grid_area() {
                self.app.clamp_scroll(grid::max_scroll(displayed.cards.len(), area));
            }
        };

        poller.stop();
        tracing::info!(event = "tui.session.ended", ok = result.is_ok());
        self.shutdown()?;
        result
    }

    // -------------------------------------------------------------------
    // Action handling
    // -------------------------------------------------------------------

    /// Route a key through the app. Returns `true` if the application
    /// should quit.
    fn handle_key(&mut self, key: Key, card_count: usize, poller: &InventoryPoller) -> bool {
        let area = match self.grid_area() {
            Ok(area) => area,
            Err(_) => return false,
        };
        let max_offset = grid::max_scroll(card_count, area);
        let page_size = grid::visible_rows(area.height);

        match self.app.handle_key(key, max_offset, page_size) {
            Some(AppAction::Quit) => true,
            Some(AppAction::Refresh) => {
                // The spawned fetch publishes through the watch channel.
                drop(poller.refresh_now());
                false
            }
            None => false,
        }
    }

    /// The main content area for the current terminal size.
    fn grid_area(&self) -> Result<Rect, io::Error> {
        let size = self.terminal.size()?;
        Ok(layout(Rect::new(0, 0, size.width, size.height))[1])
    }

    // -------------------------------------------------------------------
    // Shutdown
    // -------------------------------------------------------------------

    /// Restore the terminal to its normal state.
    fn shutdown(&mut self) -> Result<(), io::Error> {
        terminal::disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}


impl Drop for Tui {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
    }
}


/// Run `setup`; on failure run `restore` before handing back the error.
fn or_restore<T>(
    setup: impl FnOnce() -> io::Result<T>,
    restore: impl FnOnce(),
) -> io::Result<T> {
    setup().inspect_err(|_| restore())
}


// ---------------------------------------------------------------------------
// Rendering (free functions to avoid borrow conflicts)
// ---------------------------------------------------------------------------

/// Split the screen into header, main content and footer.
fn layout(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // header
            Constraint::Min(3),    // main content
            Constraint::Length(1), // footer
        ])
        .split(area)
}

/// Render the full screen layout: header, main content, footer.
pub fn render_frame(frame: &mut Frame, state: &RenderState) {
    let chunks = layout(frame.area());

    render_header(frame, chunks[0], state);
    render_main(frame, chunks[1], state);
    render_footer(frame, chunks[2], state);
}

fn render_header(frame: &mut Frame, area: Rect, state: &RenderState) {
    let theme = state.theme;
    let live = if state.snapshot.is_some() {
        Span::styled(" \u{25cf} live", Style::default().fg(theme.healthy.to_ratatui()))
    } else {
        Span::styled(" \u{25cb} connecting", Style::default().fg(theme.muted.to_ratatui()))
    };
    let line = Line::from(vec![
        Span::styled(
            TITLE,
            Style::default()
                .fg(theme.header.to_ratatui())
                .add_modifier(Modifier::BOLD),
        ),
        live,
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

/// Dispatch main-area rendering based on the current app state.
fn render_main(frame: &mut Frame, area: Rect, state: &RenderState) {
    match state.app.state {
        AppState::HelpView => render_help(frame, area, state.theme),
        AppState::Dashboard => match state.snapshot {
            None => grid::render_loading(frame, area, state.theme, state.app.frame),
            Some(snapshot) if snapshot.is_empty() => {
                let empty = Paragraph::new("No resources reported.")
                    .style(Style::default().fg(state.theme.muted.to_ratatui()));
                frame.render_widget(empty, area);
            }
            Some(_) => {
                let view = GridView {
                    cards: state.cards,
                    theme: state.theme,
                    since_snapshot: state.since_snapshot,
                    frame: state.app.frame,
                    scroll_row: state.app.scroll_offset,
                };
                grid::render_grid(frame, area, &view);
            }
        },
    }
}

fn render_help(frame: &mut Frame, area: Rect, theme: &Theme) {
    let help_text = concat!(
        "RCA Agent Help\n",
        "\n",
        "  q  Esc    Quit\n",
        "  Ctrl-C    Quit\n",
        "  r         Refresh now\n",
        "  j/k       Scroll down/up\n",
        "  PgDn/PgUp Scroll a page\n",
        "  g/G       Jump to top/bottom\n",
        "  ?         Toggle this help\n",
    );
    let paragraph = Paragraph::new(help_text)
        .block(
            Block::bordered()
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(theme.border.to_ratatui()))
                .title("Help"),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

/// Status counts on the left, data source and poll period on the right.
fn render_footer(frame: &mut Frame, area: Rect, state: &RenderState) {
    let theme = state.theme;
    let counts = match state.snapshot {
        Some(snapshot) => summary_line(&snapshot.summary()),
        None => "waiting for first snapshot".to_string(),
    };
    let source = format!(
        "{} every {}s  ? help",
        state.source,
        format_seconds(state.interval)
    );

    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(source.chars().count() as u16)])
        .split(area);

    frame.render_widget(
        Paragraph::new(counts).style(Style::default().fg(theme.accent.to_ratatui())),
        halves[0],
    );
    frame.render_widget(
        Paragraph::new(source)
            .alignment(Alignment::Right)
            .style(Style::default().fg(theme.muted.to_ratatui())),
        halves[1],
    );
}

/// `5000ms` -> `5`, `2500ms` -> `2.5`.
fn format_seconds(interval: Duration) -> String {
    let millis = interval.as_millis();
    if millis % 1000 == 0 {
        format!("{}", millis / 1000)
    } else {
        format!("{}", interval.as_secs_f64())
    }
}


// ---------------------------------------------------------------------------
// Key conversion
// ---------------------------------------------------------------------------

/// Convert a crossterm `KeyCode` + `KeyModifiers` into our domain `Key` type.
pub fn crossterm_to_key(code: KeyCode, modifiers: KeyModifiers) -> Key {
    if modifiers.contains(KeyModifiers::CONTROL) {
        if let KeyCode::Char(ch) = code {
            return Key::Ctrl(ch);
        }
    }
    match code {
        KeyCode::Char(ch) => Key::Char(ch),
        KeyCode::Enter => Key::Enter,
        KeyCode::Esc => Key::Escape,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        _ => Key::Other,
    }
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::buffer::Buffer;
    use rca_core::types::Resource;

    fn draw(width: u16, height: u16, state: &RenderState) -> Buffer {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| render_frame(f, state)).unwrap();
        terminal.backend().buffer().clone()
    }

    fn text(buffer: &Buffer) -> String {
        let width = usize::from(buffer.area.width);
        let mut out = String::new();
        for row in buffer.content.chunks(width) {
            for cell in row {
                out.push_str(cell.symbol());
            }
            out.push('\n');
        }
        out
    }

    fn state<'a>(
        app: &'a App,
        theme: &'a Theme,
        snapshot: Option<&'a InventorySnapshot>,
        cards: &'a [CardDescriptor],
    ) -> RenderState<'a> {
        RenderState {
            app,
            theme,
            snapshot,
            cards,
            since_snapshot: Duration::from_secs(10),
            source: "http://localhost:8000/inventory",
            interval: Duration::from_millis(5000),
        }
    }

    #[test]
    fn loading_frame_shows_title_and_placeholder() {
        let app = App::new();
        let theme = Theme::default();
        let out = text(&draw(100, 12, &state(&app, &theme, None, &[])));
        assert!(out.contains("RCA AGENT"));
        assert!(out.contains("Live Inventory"));
        assert!(out.contains("Scanning infrastructure..."));
        assert!(out.contains("waiting for first snapshot"));
        assert!(out.contains("every 5s"));
    }

    #[test]
    fn snapshot_frame_shows_cards_and_counts() {
        let app = App::new();
        let theme = Theme::default();
        let snapshot = InventorySnapshot::new(vec![
            Resource::new("i-1", "EC2", "healthy", "us-east-1"),
            Resource::new("db-1", "RDS", "critical", "us-west-2"),
        ]);
        let cards = describe_all(&snapshot);
        let out = text(&draw(100, 14, &state(&app, &theme, Some(&snapshot), &cards)));
        assert!(out.contains("i-1"));
        assert!(out.contains("db-1"));
        assert!(out.contains("CRITICAL"));
        assert!(out.contains("1 healthy"));
        assert!(out.contains("1 critical"));
        assert!(!out.contains("Scanning infrastructure"));
    }

    #[test]
    fn empty_snapshot_is_not_loading() {
        let app = App::new();
        let theme = Theme::default();
        let snapshot = InventorySnapshot::new(Vec::new());
        let out = text(&draw(120, 10, &state(&app, &theme, Some(&snapshot), &[])));
        assert!(out.contains("No resources reported."));
        assert!(!out.contains("Scanning infrastructure"));
        assert!(out.contains("0 total"));
    }

    #[test]
    fn help_view_lists_keys() {
        let mut app = App::new();
        app.state = AppState::HelpView;
        let theme = Theme::default();
        let out = text(&draw(80, 16, &state(&app, &theme, None, &[])));
        assert!(out.contains("RCA Agent Help"));
        assert!(out.contains("Refresh now"));
    }

    fn shared(ids: &[&str]) -> LatestSnapshot {
        Some(std::sync::Arc::new(InventorySnapshot::new(
            ids.iter()
                .map(|id| Resource::new(*id, "EC2", "healthy", "us-east-1"))
                .collect(),
        )))
    }

    #[test]
    fn first_snapshot_restarts_entrance_clock() {
        let mut displayed = Displayed::new(None);
        let created = displayed.shown_at;
        assert!(displayed.cards.is_empty());

        std::thread::sleep(Duration::from_millis(5));
        displayed.replace(shared(&["i-1"]));
        assert!(displayed.shown_at > created);
        assert_eq!(displayed.cards.len(), 1);
    }

    #[test]
    fn later_snapshots_replace_cards_in_place() {
        let mut displayed = Displayed::new(None);
        displayed.replace(shared(&["i-1"]));
        let shown_at = displayed.shown_at;

        std::thread::sleep(Duration::from_millis(5));
        displayed.replace(shared(&["i-1", "i-2"]));
        assert_eq!(displayed.shown_at, shown_at);
        assert_eq!(displayed.cards.len(), 2);
        assert_eq!(displayed.cards[1].title, "i-2");
    }

    #[test]
    fn failed_setup_restores_terminal() {
        let mut restored = false;
        let result: io::Result<()> = or_restore(
            || Err(io::Error::new(io::ErrorKind::Other, "no tty")),
            || restored = true,
        );
        assert_eq!(result.unwrap_err().to_string(), "no tty");
        assert!(restored);
    }

    #[test]
    fn successful_setup_leaves_terminal_alone() {
        let mut restored = false;
        let value = or_restore(|| Ok(7), || restored = true).unwrap();
        assert_eq!(value, 7);
        assert!(!restored);
    }

    #[test]
    fn format_seconds_whole_and_fractional() {
        assert_eq!(format_seconds(Duration::from_millis(5000)), "5");
        assert_eq!(format_seconds(Duration::from_millis(2500)), "2.5");
    }

    #[test]
    fn crossterm_char_to_key() {
        let key = crossterm_to_key(KeyCode::Char('r'), KeyModifiers::NONE);
        assert_eq!(key, Key::Char('r'));
    }

    #[test]
    fn crossterm_ctrl_to_key() {
        let key = crossterm_to_key(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(key, Key::Ctrl('c'));
    }

    #[test]
    fn crossterm_escape_to_key() {
        assert_eq!(crossterm_to_key(KeyCode::Esc, KeyModifiers::NONE), Key::Escape);
    }

    #[test]
    fn crossterm_navigation_keys() {
        assert_eq!(crossterm_to_key(KeyCode::Up, KeyModifiers::NONE), Key::Up);
        assert_eq!(crossterm_to_key(KeyCode::Down, KeyModifiers::NONE), Key::Down);
        assert_eq!(crossterm_to_key(KeyCode::PageUp, KeyModifiers::NONE), Key::PageUp);
        assert_eq!(crossterm_to_key(KeyCode::End, KeyModifiers::NONE), Key::End);
    }

    #[test]
    fn crossterm_unmapped_key_is_other() {
        assert_eq!(crossterm_to_key(KeyCode::F(5), KeyModifiers::NONE), Key::Other);
        assert_eq!(crossterm_to_key(KeyCode::Tab, KeyModifiers::NONE), Key::Other);
    }
}
