use clap::Parser;
use rti_core::RtiError;
use tracing_subscriber::EnvFilter;

mod cli;
pub mod exit_codes;

use cli::args::Cli;
use cli::commands::dispatch;

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let code = match dispatch(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("fatal: {e:#}");
            exit_code_for(&e)
        }
    };
    std::process::exit(code);
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<RtiError>() {
        Some(RtiError::Auth { .. }) => exit_codes::AUTH_FAILED,
        Some(RtiError::Network { .. }) => exit_codes::NETWORK_ERROR,
        Some(other) => other.exit_code(),
        None => exit_codes::CONFIG_ERROR,
    }
}
