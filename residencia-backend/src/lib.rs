pub mod auth;
pub mod error;
pub mod extract;
pub mod mail;
pub mod notifications;
pub mod response;
pub mod routes;
pub mod scheduler;
pub mod services;
pub mod validation;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::FromRef;
use axum::middleware::from_fn_with_state;
use axum::routing::get;
use axum::{Json, Router};
use error::AppError;
use residencia_config::Config;
use residencia_database::Pool;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::auth::{authenticate, TokenKeys};
use crate::mail::Mailer;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub pool: Pool,
    pub config: Arc<Config>,
    pub keys: TokenKeys,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    #[must_use]
    pub fn new(pool: Pool, config: Config, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            pool,
            keys: TokenKeys::from_config(&config.auth),
            config: Arc::new(config),
            mailer,
        }
    }
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Residencia API" }))
}

async fn fallback() -> AppError {
    AppError::NotFound("route not found".to_owned())
}

/// Everything under `/api` except login needs a token (or dev mode).
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .merge(routes::auth::router())
        .nest("/residentes", routes::residents::router())
        .nest("/habitaciones", routes::rooms::router())
        .nest("/personal", routes::staff::router())
        .nest("/medicamentos", routes::medications::router())
        .nest("/tratamientos", routes::treatments::router())
        .nest("/actividades", routes::activities::router())
        .nest("/dietas", routes::diets::router())
        .nest("/visitas", routes::visits::router())
        .nest("/incidencias", routes::incidents::router())
        .nest("/notificaciones", routes::notifications::router())
        .route_layer(from_fn_with_state(state.clone(), authenticate));

    let api = Router::new()
        .merge(routes::auth::public_router())
        .merge(protected);

    // layers are in reverse order
    Router::new()
        .route("/", get(root))
        .nest("/api", api)
        .fallback(fallback)
        .with_state(state)
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

pub async fn run_server(address: SocketAddr, state: AppState) -> Result<(), AppError> {
    serve(TcpListener::bind(address).await?, state).await
}

/// Serves on an already bound listener until [`shutdown_signal`] resolves.
pub async fn serve(listener: TcpListener, state: AppState) -> Result<(), AppError> {
    info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!("failed to listen for Ctrl+C: {err}");
            core::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!("failed to install SIGTERM handler: {err}");
                core::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = core::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    warn!("shutdown requested");
}
