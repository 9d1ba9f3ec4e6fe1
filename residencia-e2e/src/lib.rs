//! Starts the API against a real PostgreSQL and talks to it over plain HTTP/1.

use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{header, Method, Request, StatusCode};
use hyper_util::rt::TokioIo;
use residencia_backend::mail::LogMailer;
use residencia_backend::{serve, AppState};
use residencia_config::{AuthConfig, Config, NotificationConfig, OccupancyConfig};
use residencia_database::{get_database_connection, migrate};
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tracing::warn;

#[derive(thiserror::Error, Debug)]
pub enum E2eError {
    #[error("DATABASE_URL is not set")]
    MissingDatabaseUrl,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("HTTP error: {0}")]
    Hyper(#[from] hyper::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] hyper::http::Error),
    #[error("invalid JSON response: {0}")]
    Json(#[from] serde_json::Error),
    #[error("backend error: {0}")]
    Backend(#[from] residencia_backend::error::AppError),
    #[error("database error: {0}")]
    Database(#[from] residencia_database::DatabaseError),
}

pub type Result<T> = std::result::Result<T, E2eError>;

/// A running server in insecure dev mode, so every request acts as the administrator.
pub struct TestServer {
    address: SocketAddr,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("info,residencia_backend=debug")
            .with_test_writer()
            .try_init();

        let database_url = std::env::var("DATABASE_URL").map_err(|_| E2eError::MissingDatabaseUrl)?;
        let config = Config {
            listen_address: SocketAddr::from(([127, 0, 0, 1], 0)),
            database_url,
            database_max_connections: 4,
            auth: AuthConfig {
                jwt_secret: None,
                token_lifetime_hours: 1,
                insecure_dev_mode: true,
            },
            occupancy: OccupancyConfig::default(),
            notifications: NotificationConfig {
                enabled: false,
                ..NotificationConfig::default()
            },
        };
        let pool = get_database_connection(&config.database_url, config.database_max_connections)?;
        migrate(&pool).await?;

        let listener = TcpListener::bind(config.listen_address).await?;
        let address = listener.local_addr()?;
        let mailer = Arc::new(LogMailer::new(config.notifications.sender.clone()));
        let state = AppState::new(pool, config, mailer);
        tokio::spawn(async move {
            if let Err(err) = serve(listener, state).await {
                warn!("test server stopped: {err}");
            }
        });
        Ok(Self { address })
    }

    /// Sends one request on a fresh connection and returns the status and the JSON body.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<(StatusCode, Value)> {
        let stream = TcpStream::connect(self.address).await?;
        let (mut sender, connection) =
            hyper::client::conn::http1::handshake(TokioIo::new(stream)).await?;
        tokio::spawn(async move {
            if let Err(err) = connection.await {
                warn!("connection failed: {err}");
            }
        });

        let body = body.map_or_else(Bytes::new, |body| Bytes::from(body.to_string()));
        let request = Request::builder()
            .method(method)
            .uri(path)
            .header(header::HOST, self.address.to_string())
            .header(header::CONTENT_TYPE, "application/json")
            .body(Full::new(body))?;

        let response = sender.send_request(request).await?;
        let status = response.status();
        let bytes = response.into_body().collect().await?.to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };
        Ok((status, value))
    }

    pub async fn get(&self, path: &str) -> Result<(StatusCode, Value)> {
        self.request(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<(StatusCode, Value)> {
        self.request(Method::POST, path, Some(body)).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> Result<(StatusCode, Value)> {
        self.request(Method::PUT, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<(StatusCode, Value)> {
        self.request(Method::DELETE, path, None).await
    }
}

/// A room number and national ID prefix unlikely to collide with earlier runs.
#[must_use]
pub fn unique_seed() -> i32 {
    rand::random::<i32>().rem_euclid(900_000) + 100_000
}
