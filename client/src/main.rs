//! Client entry-point: loads settings, wires adapters, and runs one command.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;
use tracing::{debug, warn};
use tracing_subscriber::{EnvFilter, fmt};

use grading_admin::ClientSettings;
use grading_admin::domain::ports::{CredentialStore, HttpTransport, Navigator};
use grading_admin::domain::{GradingApi, SessionClient};
use grading_admin::inbound::cli::{CliArgs, CommandRunner, ConsoleNavigator};
use grading_admin::outbound::http::{HttpTokenRefresher, ReqwestTransport};
use grading_admin::outbound::storage::FileCredentialStore;

fn main() -> ExitCode {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .json()
        .try_init()
    {
        eprintln!("tracing init failed: {e}");
    }

    let runtime = match Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            eprintln!("create Tokio runtime: {error}");
            return ExitCode::FAILURE;
        }
    };
    match runtime.block_on(async_main()) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("{error}");
            ExitCode::FAILURE
        }
    }
}

async fn async_main() -> io::Result<ExitCode> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(error) => {
            if let Err(print_error) = error.print() {
                warn!(error = %print_error, "failed to print usage");
            }
            return Ok(ExitCode::from(u8::try_from(error.exit_code()).unwrap_or(2)));
        }
    };
    let settings = ClientSettings::load_from_iter([OsString::from("grading-admin")])
        .map_err(|error| io::Error::other(format!("load settings: {error}")))?;
    let base_url = settings.api_url().map_err(io::Error::other)?;
    debug!(api_url = %base_url, "settings loaded");

    let transport: Arc<dyn HttpTransport> = Arc::new(
        ReqwestTransport::new(base_url, settings.request_timeout())
            .map_err(|error| io::Error::other(format!("build http client: {error}")))?,
    );
    let store: Arc<dyn CredentialStore> = Arc::new(
        FileCredentialStore::open(settings.credentials_dir()).map_err(io::Error::other)?,
    );
    let console = Arc::new(ConsoleNavigator::new());
    let navigator: Arc<dyn Navigator> = console.clone();

    let session = SessionClient::new(
        Arc::clone(&transport),
        Arc::clone(&store),
        Arc::new(HttpTokenRefresher::new(Arc::clone(&transport))),
        Arc::clone(&navigator),
    );
    let api = Arc::new(GradingApi::new(Arc::new(session), transport));
    let mut runner = CommandRunner::new(api, store, navigator);

    let report = runner.run(args.command).await;
    for line in &report.lines {
        println!("{line}");
    }
    if !report.succeeded {
        warn!(destination = ?console.current(), "command failed");
    }
    Ok(ExitCode::from(report.exit_code()))
}
