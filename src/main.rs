use std::net::TcpListener;
use std::sync::Arc;

use auth_api::configuration::get_configuration;
use auth_api::startup::{build_auth_service, run};
use auth_api::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let configuration = get_configuration();

    // Structured logging, JSON unless configured otherwise
    let json_logs = configuration
        .as_ref()
        .map_or(true, |c| c.application.json_logs);
    init_telemetry(json_logs);

    let configuration = match configuration {
        Ok(config) => {
            tracing::info!("Configuration loaded successfully");
            config
        }
        Err(e) => {
            tracing::error!("Failed to read configuration: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Configuration error",
            ));
        }
    };

    tracing::info!(
        name = %configuration.application.name,
        version = %configuration.application.version,
        "Starting application"
    );

    if configuration.uses_development_secret() {
        tracing::warn!("Using the development JWT secret; set APP_JWT__SECRET in production");
    }

    let auth_service = build_auth_service(&configuration).map_err(|e| {
        tracing::error!("Failed to build auth service: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "Auth service error")
    })?;

    let address = configuration.application.address();
    let listener = TcpListener::bind(&address)?;
    tracing::info!("Server listening on: {}", address);

    let server = run(listener, Arc::new(auth_service), &configuration)?;
    server.await
}
