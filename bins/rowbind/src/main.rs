mod config;
mod error;
mod run;

use clap::Parser;
use config::Cli;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run::run(&cli) {
        tracing::error!(error = %e, "materialization failed");
        std::process::exit(1);
    }
}
