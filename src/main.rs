//! shell-term binary entry point.
//!
//! Drives the engine against a local shell: connect, submit the `--exec`
//! lines, let the output settle, then print the screen.

use std::process::ExitCode;
use std::sync::Arc;

use shell_term::cli::{self, Args};
use shell_term::config::Config;
use shell_term::logging;
use shell_term::pty::{default_shell, LocalConnector};
use shell_term::session::{LifecycleEvent, SessionKey, SessionRegistry};
use shell_term::stream::ShellStreamController;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {}", e);
            eprintln!("Try 'shell-term --help' for more information.");
            return ExitCode::FAILURE;
        }
    };

    if args.help {
        cli::print_help();
        return ExitCode::SUCCESS;
    }

    if args.version {
        cli::print_version();
        return ExitCode::SUCCESS;
    }

    let config = match Config::load(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init_with_level(config.log_filter()) {
        eprintln!("warning: logging already initialized: {}", e);
    }

    match run(&args, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &Args, config: &Config) -> shell_term::Result<()> {
    info!("shell-term v{}", env!("CARGO_PKG_VERSION"));

    let registry = Arc::new(SessionRegistry::with_max_idle(config.max_idle()));
    registry.on_lifecycle(LifecycleEvent::Start)?;

    let shell = args.shell.clone().unwrap_or_else(default_shell);
    let key = args.key.clone().unwrap_or_else(|| SessionKey::server("local"));
    let controller = ShellStreamController::new(
        key,
        Arc::clone(&registry),
        Arc::new(LocalConnector::new(shell.clone())),
        config.stream_config(),
    );

    info!("Starting {}", shell);
    controller.connect().await?;

    // Give the shell a moment to print its prompt
    tokio::time::sleep(config.stream_config().poll_interval * 5).await;

    for line in &args.exec {
        controller.send_line(line).await?;
    }

    tokio::select! {
        _ = tokio::time::sleep(args.wait()) => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted");
        }
    }

    println!("{}", controller.plain_text()?);

    controller.shutdown().await?;
    let closed = registry.on_lifecycle(LifecycleEvent::Teardown)?;
    info!("Closed {} pooled session(s)", closed);

    Ok(())
}
