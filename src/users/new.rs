use axum::{Json, debug_handler, extract::State};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;
use tracing::info;
use uuid::Uuid;

use crate::{
    AppError, AppResult,
    db::{self, User},
    session::USER_ID,
};

#[derive(Deserialize)]
pub(crate) struct NewUserQuery {
    name: String,
    profession: Option<String>,
    location: Option<String>,
    avatar_url: Option<String>,
}

#[debug_handler]
pub(crate) async fn new_user(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Json(NewUserQuery { name, profession, location, avatar_url }): Json<NewUserQuery>,
) -> AppResult<Json<User>> {
    let user = create_user(&db_pool, name, profession, location, avatar_url).await?;
    session.insert(USER_ID, user.uuid).await?;
    Ok(Json(user))
}

pub async fn create_user(
    db_pool: &SqlitePool,
    name: String,
    profession: Option<String>,
    location: Option<String>,
    avatar_url: Option<String>,
) -> AppResult<User> {
    if name.trim().is_empty() {
        return Err(AppError::Validation("name must not be empty"));
    }

    let uuid = Uuid::now_v7();
    let created_at = db::now();
    sqlx::query(
        "INSERT INTO users (uuid,name,profession,location,avatar_url,verified,created_at) VALUES (?,?,?,?,?,0,?)",
    )
    .bind(uuid.to_string())
    .bind(&name)
    .bind(&profession)
    .bind(&location)
    .bind(&avatar_url)
    .bind(created_at)
    .execute(db_pool)
    .await?;

    info!("u/{uuid} registered as {name}");

    Ok(User { uuid, name, profession, location, avatar_url, verified: false, created_at })
}
