pub mod error;
pub mod models;
pub mod occupancy;
pub mod repositories;
pub mod schema;

use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::scoped_futures::ScopedBoxFuture;
use diesel_async::{AsyncConnection, SimpleAsyncConnection};
pub use diesel_async::AsyncPgConnection;
pub use error::DatabaseError;
pub use occupancy::PgOccupancyStore;
use tracing::info;

// https://github.com/tokio-rs/axum/tree/main/examples/diesel-async-postgres

pub type Pool = diesel_async::pooled_connection::deadpool::Pool<AsyncPgConnection>;

const SCHEMA: &str = include_str!("../migrations/0001_initial.sql");

/// Builds the pool. No connection is opened until the first checkout.
pub fn get_database_connection(database_url: &str, max_size: usize) -> Result<Pool, DatabaseError> {
    let config = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
    Ok(Pool::builder(config).max_size(max_size).build()?)
}

/// Creates missing tables and indexes. Safe to run on every start.
pub async fn migrate(pool: &Pool) -> Result<(), DatabaseError> {
    let mut connection = pool.get().await?;
    let connection: &mut AsyncPgConnection = &mut connection;
    connection.batch_execute(SCHEMA).await?;
    info!("database schema is up to date");
    Ok(())
}

/// Checks out a connection and runs `callback` inside one transaction on it.
/// The transaction is rolled back when the callback returns an error.
pub async fn transaction<'a, R, E, F>(pool: &Pool, callback: F) -> Result<R, E>
where
    F: for<'r> FnOnce(&'r mut AsyncPgConnection) -> ScopedBoxFuture<'a, 'r, Result<R, E>>
        + Send
        + 'a,
    E: From<diesel::result::Error> + From<DatabaseError> + Send + 'a,
    R: Send + 'a,
{
    let mut connection = pool.get().await.map_err(DatabaseError::from)?;
    let connection: &mut AsyncPgConnection = &mut connection;
    connection.transaction(callback).await
}
