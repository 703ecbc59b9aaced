use std::str::FromStr;

use flicksy::{db, users};
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use uuid::Uuid;

/// In-memory store with the real schema. Single connection so every query
/// sees the same database.
pub async fn pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);

    let db_pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .unwrap();
    db::init(&db_pool).await.unwrap();
    db_pool
}

pub async fn user(db_pool: &SqlitePool, name: &str) -> Uuid {
    users::create_user(db_pool, name.to_string(), None, None, None)
        .await
        .unwrap()
        .uuid
}
