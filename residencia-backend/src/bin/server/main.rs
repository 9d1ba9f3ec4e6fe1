mod telemetry;

use std::sync::Arc;

use residencia_backend::error::AppError;
use residencia_backend::mail::LogMailer;
use residencia_backend::scheduler::Scheduler;
use residencia_backend::{run_server, AppState};
use residencia_config::get_config;
use residencia_database::{get_database_connection, migrate};
use telemetry::setup_telemetry;
use tokio::sync::watch;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = get_config()?;
    setup_telemetry();

    if config.auth.insecure_dev_mode {
        warn!("insecure dev mode is on, every request is treated as the administrator");
    }

    let pool = get_database_connection(&config.database_url, config.database_max_connections)?;
    migrate(&pool).await?;

    let mailer = Arc::new(LogMailer::new(config.notifications.sender.clone()));
    let (shutdown, shutdown_receiver) = watch::channel(false);

    let scheduler = if config.notifications.enabled {
        let scheduler = Scheduler::new(
            pool.clone(),
            mailer.clone(),
            config.notifications.clone(),
        )?;
        Some(tokio::spawn(scheduler.run(shutdown_receiver)))
    } else {
        info!("scheduled notifications are disabled");
        None
    };

    let address = config.listen_address;
    let result = run_server(address, AppState::new(pool.clone(), config, mailer)).await;

    let _ = shutdown.send(true);
    if let Some(scheduler) = scheduler {
        if let Err(err) = scheduler.await {
            error!("scheduler task failed: {err}");
        }
    }
    pool.close();
    result
}
