//! Dashboard application state.
//!
//! Tracks which view the user is looking at, the grid scroll position and
//! the animation frame counter, and routes key presses to actions. The
//! `App` struct does not perform I/O or talk to the poller; the runner in
//! [`crate::tui`] turns its actions into side effects.


// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// The current view the user is looking at.
#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    /// The resource grid (or the loading indicator before the first snapshot).
    Dashboard,
    /// Key binding overview.
    HelpView,
}


// ---------------------------------------------------------------------------
// AppAction
// ---------------------------------------------------------------------------

/// An action produced by the application in response to user input.
#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    /// Quit the application.
    Quit,
    /// Fetch the inventory now instead of waiting for the next tick.
    Refresh,
}


// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// Top-level UI state for the dashboard.
pub struct App {
    /// Current view state.
    pub state: AppState,
    /// First visible grid row.
    pub scroll_offset: usize,
    /// Frames drawn since start; drives pulse and bounce.
    pub frame: u64,
}


impl App {
    /// Create a new App showing the dashboard.
    pub fn new() -> Self {
        App {
            state: AppState::Dashboard,
            scroll_offset: 0,
            frame: 0,
        }
    }

    /// Advance the animation clock by one frame.
    pub fn tick(&mut self) {
        self.frame = self.frame.wrapping_add(1);
    }

    /// Keep the scroll offset inside `0..=max_offset`, e.g. after a new
    /// snapshot shrank the grid or the terminal was resized.
    pub fn clamp_scroll(&mut self, max_offset: usize) {
        self.scroll_offset = self.scroll_offset.min(max_offset);
    }

    // -------------------------------------------------------------------
    // Input processing
    // -------------------------------------------------------------------

    /// Process a key event and return an optional action.
    ///
    /// `max_offset` bounds downward scrolling; `page_size` is the number of
    /// grid rows on screen.
    pub fn handle_key(&mut self, key: Key, max_offset: usize, page_size: usize) -> Option<AppAction> {
        if key == Key::Ctrl('c') {
            return Some(AppAction::Quit);
        }
        match self.state {
            AppState::HelpView => self.handle_help_key(key),
            AppState::Dashboard => self.handle_dashboard_key(key, max_offset, page_size),
        }
    }

    fn handle_help_key(&mut self, key: Key) -> Option<AppAction> {
        match key {
            Key::Char('q') => Some(AppAction::Quit),
            Key::Escape | Key::Char('?') | Key::Enter => {
                self.state = AppState::Dashboard;
                None
            }
            _ => None,
        }
    }

    fn handle_dashboard_key(
        &mut self,
        key: Key,
        max_offset: usize,
        page_size: usize,
    ) -> Option<AppAction> {
        match key {
            Key::Char('q') | Key::Escape => Some(AppAction::Quit),
            Key::Char('?') => {
                self.state = AppState::HelpView;
                None
            }
            Key::Char('r') => Some(AppAction::Refresh),
            Key::Char('j') | Key::Down => {
                self.scroll_down(max_offset);
                None
            }
            Key::Char('k') | Key::Up => {
                self.scroll_up();
                None
            }
            Key::PageDown => {
                self.page_down(page_size, max_offset);
                None
            }
            Key::PageUp => {
                self.page_up(page_size);
                None
            }
            Key::Char('g') | Key::Home => {
                self.scroll_offset = 0;
                None
            }
            Key::Char('G') | Key::End => {
                self.scroll_offset = max_offset;
                None
            }
            _ => None,
        }
    }

    // -------------------------------------------------------------------
    // Scroll helpers
    // -------------------------------------------------------------------

    /// Scroll up by one row.
    pub fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(1);
    }

    /// Scroll down by one row, clamping to `max_offset`.
    pub fn scroll_down(&mut self, max_offset: usize) {
        if self.scroll_offset < max_offset {
            self.scroll_offset += 1;
        }
    }

    /// Scroll up by a page.
    pub fn page_up(&mut self, page_size: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(page_size.max(1));
    }

    /// Scroll down by a page, clamping to `max_offset`.
    pub fn page_down(&mut self, page_size: usize, max_offset: usize) {
        self.scroll_offset = (self.scroll_offset + page_size.max(1)).min(max_offset);
    }
}


impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}


// ---------------------------------------------------------------------------
// Key
// ---------------------------------------------------------------------------

/// A simplified key event for the TUI.
#[derive(Debug, Clone, PartialEq)]
pub enum Key {
    Char(char),
    Enter,
    Escape,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    Ctrl(char),
    Other,
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
