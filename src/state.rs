//! Shared application state for all routes.

use sqlx::SqlitePool;

#[derive(Clone)]
pub struct AppState {
    /// Each request takes its own connection (and transaction) from the pool.
    pub pool: SqlitePool,
}
