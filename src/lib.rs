pub mod appresult;
pub mod db;
pub mod friends;
pub mod posts;
pub mod session;
pub mod users;

use axum::extract::FromRef;
use sqlx::SqlitePool;

pub use appresult::{AppError, AppResult};

#[derive(Clone, FromRef)]
pub struct AppState {
    pub db_pool: SqlitePool,
}
