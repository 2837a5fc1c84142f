use std::process::ExitCode;

use claimdesk_core::config::{AppConfig, LoadOptions};

fn init_logging(config: &AppConfig) {
    use claimdesk_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Logging is initialized before any other work; a broken config still
    // gets a default subscriber so the failure itself is reported.
    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => init_logging(&config),
        Err(_) => {
            tracing_subscriber::fmt().with_target(false).compact().init();
        }
    }

    claimdesk_cli::run().await
}
