use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_LEVEL: &str = "info,residencia_backend=debug,residencia_database=debug,\
                                 tower_http=debug,hyper=info,tokio_postgres=info";

/// Logs to stdout. `RUST_LOG` overrides the default filter.
pub fn setup_telemetry() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
