//! RCA Agent terminal UI.
//!
//! Turns inventory snapshots into status cards and draws them, either as a
//! live ratatui dashboard or as plain text for one-shot output.
//!
//! # Modules
//!
//! - [`app`] -- View state, scrolling and key routing
//! - [`cards`] -- Pure mapping from a resource to its card descriptor
//! - [`grid`] -- ratatui card grid, loading indicator and motion
//! - [`render`] -- ANSI formatting and box-drawing helpers
//! - [`text`] -- Plain-text card grid and summary line
//! - [`theme`] -- Color themes
//! - [`tui`] -- Terminal setup and the async event loop

pub mod app;
pub mod cards;
pub mod grid;
pub mod render;
pub mod text;
pub mod theme;
pub mod tui;
