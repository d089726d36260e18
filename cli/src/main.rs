//! RCA CLI: the command-line entry point for the inventory dashboard.
//!
//! # Usage
//!
//! ```text
//! rca                         # live dashboard
//! rca watch --interval-ms 2000
//! rca once --endpoint http://inventory.internal:9000
//! ```

use std::error::Error;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use rca_core::config::{load_hierarchy, ConfigOverrides, DashboardConfig};
use rca_core::errors::{ConfigError, RcaError};
use rca_core::logging::{init_logging, LogTarget};
use rca_core::poller::InventoryPoller;
use rca_core::source::{HttpInventorySource, InventorySource};
use rca_tui::cards::describe_all;
use rca_tui::text::{summary_line, terminal_width, TextGrid};
use rca_tui::theme::Theme;
use rca_tui::tui::Tui;


/// Live infrastructure inventory dashboard
#[derive(Parser, Debug)]
#[command(name = "rca", version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Base URL of the inventory service
    #[arg(long, global = true, value_name = "URL")]
    endpoint: Option<String>,

    /// Milliseconds between polls
    #[arg(long, global = true, value_name = "MS")]
    interval_ms: Option<u64>,

    /// Color theme: dark, light or minimal
    #[arg(long, global = true, value_name = "NAME")]
    theme: Option<String>,

    /// Configuration file layered over the user config
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,
}


#[derive(Subcommand, Debug, Clone, Copy, PartialEq)]
enum Commands {
    /// Open the live dashboard (default)
    Watch,
    /// Fetch the inventory once and print it
    Once,
}


impl Cli {
    /// The command-line configuration layer.
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            endpoint: self.endpoint.clone(),
            poll_interval_ms: self.interval_ms,
            theme: self.theme.clone(),
            ..Default::default()
        }
    }
}


/// Exit status for errors the user can fix (bad flags, config values).
const EXIT_USAGE: i32 = 2;


fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("rca: {}", e);
        process::exit(exit_code(e.as_ref()));
    }
}


/// `2` for configuration mistakes, `1` for everything else, including a
/// failed fetch in `once`.
fn exit_code(err: &(dyn Error + 'static)) -> i32 {
    match err.downcast_ref::<ConfigError>() {
        Some(config) if config.is_user_error() => EXIT_USAGE,
        _ => 1,
    }
}


fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = resolve_config(&cli)?;
    let theme = resolve_theme(&config.theme)?;
    let command = cli.command.unwrap_or(Commands::Watch);

    if let Some(target) = log_target(command, &config) {
        init_logging(cli.quiet, target)?;
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    match command {
        Commands::Watch => watch(&runtime, &config, theme),
        Commands::Once => once(&runtime, &config, &theme),
    }
}


/// Defaults, config files and environment, then command-line flags.
fn resolve_config(cli: &Cli) -> Result<DashboardConfig, ConfigError> {
    let config = load_hierarchy(cli.config.as_deref())?.merged(cli.overrides());
    config.validate()?;
    Ok(config)
}


fn resolve_theme(name: &str) -> Result<Theme, ConfigError> {
    Theme::by_name(name).ok_or_else(|| ConfigError::InvalidConfiguration {
        message: format!(
            "unknown theme '{}' (expected one of: {})",
            name,
            Theme::names().join(", ")
        ),
    })
}


/// The dashboard owns the terminal, so it logs to a file; without a cache
/// dir or explicit `log_file` it does not log at all.
fn log_target(command: Commands, config: &DashboardConfig) -> Option<LogTarget> {
    match command {
        Commands::Watch => config.resolved_log_file().map(LogTarget::File),
        Commands::Once => Some(LogTarget::Stderr),
    }
}


fn watch(
    runtime: &tokio::runtime::Runtime,
    config: &DashboardConfig,
    theme: Theme,
) -> Result<(), Box<dyn Error>> {
    let source = HttpInventorySource::from_config(config)?;
    let mut poller = InventoryPoller::new(Arc::new(source), config.poll_interval());

    runtime.block_on(async {
        let mut tui = Tui::new(theme)?;
        tui.run(&mut poller).await
    })?;
    Ok(())
}


fn once(
    runtime: &tokio::runtime::Runtime,
    config: &DashboardConfig,
    theme: &Theme,
) -> Result<(), Box<dyn Error>> {
    let source = HttpInventorySource::from_config(config)?;

    let snapshot = runtime.block_on(source.fetch()).map_err(|e| {
        tracing::error!(
            event = "cli.once.fetch_failed",
            error = %e,
            error_code = e.error_code(),
        );
        e
    })?;

    let stdout = std::io::stdout();
    let color = stdout.is_terminal() && std::env::var_os("NO_COLOR").is_none();
    let width = if stdout.is_terminal() {
        terminal_width()
    } else {
        rca_tui::text::FALLBACK_WIDTH
    };

    let grid = TextGrid::new(theme, width, color);
    print!("{}", grid.render(&describe_all(&snapshot)));
    println!("{}", summary_line(&snapshot.summary()));
    Ok(())
}
