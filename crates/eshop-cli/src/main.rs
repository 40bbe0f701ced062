//! eshop - a terminal storefront for the remote e-commerce API.
//!
//! Each subcommand is one view of the storefront: sign-in, sign-up,
//! the product list, product details and the order flow.

mod cli;
mod views;

use std::io;
use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::Cli;
use eshop_core::{ApiError, CheckoutError};
use views::App;

/// Exit code used when the user has to sign in first
const EXIT_LOGIN_REQUIRED: u8 = 2;

/// Initialize the tracing subscriber for logging.
/// Logs go to stderr, or to `log_file` when one is given.
fn init_tracing(log_file: Option<&Path>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    match log_file {
        Some(path) => {
            let dir = path.parent().unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .map(|n| n.to_os_string())
                .unwrap_or_else(|| "eshop.log".into());
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .with(filter)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(io::stderr))
                .with(filter)
                .init();
            None
        }
    }
}

/// True when the failure means "go to the login view"
fn requires_login(err: &anyhow::Error) -> bool {
    if let Some(e) = err.downcast_ref::<ApiError>() {
        return e.requires_login();
    }
    if let Some(e) = err.downcast_ref::<CheckoutError>() {
        return e.requires_login();
    }
    false
}

/// HTTP status behind a failed command, if the API produced one
fn api_status(err: &anyhow::Error) -> Option<u16> {
    if let Some(e) = err.downcast_ref::<ApiError>() {
        return e.status();
    }
    match err.downcast_ref::<CheckoutError>() {
        Some(CheckoutError::Api(e)) => e.status(),
        _ => None,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _guard = init_tracing(cli.log_file.as_deref());
    info!("eshop starting");

    let result: Result<()> = async {
        let app = App::new()?;
        app.run(cli.command).await
    }
    .await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if requires_login(&e) => {
            eprintln!("{}", e);
            eprintln!("Please sign in with `eshop login` and try again.");
            ExitCode::from(EXIT_LOGIN_REQUIRED)
        }
        Err(e) => {
            let status = api_status(&e);
            error!(error = %e, status = ?status, "Command failed");
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
