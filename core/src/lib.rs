//! RCA dashboard core: inventory model, polling loop and configuration.
//!
//! # Modules
//!
//! - [`types`] -- resources and inventory snapshots as they arrive on the wire
//! - [`source`] -- where snapshots come from (HTTP, scripted mock)
//! - [`poller`] -- the timer-driven fetch loop and its latest-snapshot cell
//! - [`config`] -- layered configuration (defaults, TOML, environment)
//! - [`errors`] -- fetch and config error types
//! - [`logging`] -- structured JSON logging setup

pub mod config;
pub mod errors;
pub mod logging;
pub mod poller;
pub mod source;
pub mod types;
