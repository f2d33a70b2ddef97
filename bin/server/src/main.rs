use reservation_relay_server::{config::ServerConfig, error::StartupError};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = match ServerConfig::load() {
        Ok(config) => config,
        Err(report) => {
            let error = StartupError::Config {
                details: report.to_string(),
            };
            tracing::error!(error = %error, "Failed to start");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!("Loaded configuration");

    match reservation_relay_server::run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(report) => {
            tracing::error!(error = %report, "Server failed");
            ExitCode::FAILURE
        }
    }
}
