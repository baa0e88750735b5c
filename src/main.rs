use std::io::IsTerminal;

use clap::Parser;
use question_tracker::cli::commands::Cli;
use question_tracker::cli::handlers;
use tracing_subscriber::EnvFilter;

/// Log to stderr. `-v` flags win over `[log] level`; RUST_LOG wins over both.
fn setup_logging(verbosity: u8, configured: Option<&str>) {
    let level = match verbosity {
        0 => configured.unwrap_or("warn"),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    let configured = if cli.verbose == 0 {
        handlers::configured_log_level(cli.tracker_dir.as_deref())
    } else {
        None
    };
    setup_logging(cli.verbose, configured.as_deref());

    if let Err(e) = handlers::dispatch(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
