use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialise structured logging.
///
/// `RUST_LOG` controls the level (default `info`); `json` selects JSON lines
/// over the human-readable format. Safe to call more than once: later calls
/// leave the first subscriber in place.
pub fn init_telemetry(json: bool) {
    let registry = tracing_subscriber::registry().with(env_filter());

    let result = if json {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout).json())
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
            .try_init()
    };

    if result.is_err() {
        tracing::debug!("Telemetry already initialised");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_initialisation_does_not_panic() {
        init_telemetry(false);
        init_telemetry(true);
        tracing::info!("still logging");
    }
}
