use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Where structured log lines are written.
#[derive(Debug, Clone, PartialEq)]
pub enum LogTarget {
    Stderr,
    /// Appended to; parent directories are created. Used while the
    /// dashboard owns the terminal.
    File(PathBuf),
}

/// Initialize JSON logging.
///
/// When `quiet` is true, only error-level events are emitted; otherwise
/// info-level and above. `RUST_LOG` directives are honoured on top.
pub fn init_logging(quiet: bool, target: LogTarget) -> std::io::Result<()> {
    let directive = if quiet { "rca=error" } else { "rca=info" };
    let filter = EnvFilter::from_default_env()
        .add_directive(directive.parse().expect("Invalid log directive"));

    match target {
        LogTarget::Stderr => {
            tracing_subscriber::registry()
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_current_span(false)
                        .with_span_list(false),
                )
                .with(filter)
                .init();
        }
        LogTarget::File(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            tracing_subscriber::registry()
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file))
                        .with_current_span(false)
                        .with_span_list(false),
                )
                .with(filter)
                .init();
        }
    }
    Ok(())
}
