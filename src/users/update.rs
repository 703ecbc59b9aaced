use axum::{Json, debug_handler, extract::State};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{
    AppError, AppResult,
    db::{PublicUser, UserRow},
    session,
};

#[derive(Debug, Default, Deserialize)]
pub struct UserChanges {
    pub name: Option<String>,
    pub profession: Option<String>,
    pub location: Option<String>,
    pub avatar_url: Option<String>,
}

#[debug_handler]
pub(crate) async fn update(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Json(changes): Json<UserChanges>,
) -> AppResult<Json<PublicUser>> {
    let actor = session::require_user(&session).await?;
    Ok(Json(update_user(&db_pool, actor, changes).await?))
}

pub async fn update_user(
    db_pool: &SqlitePool,
    actor: Uuid,
    UserChanges { name, profession, location, avatar_url }: UserChanges,
) -> AppResult<PublicUser> {
    if name.is_none() && profession.is_none() && location.is_none() && avatar_url.is_none() {
        return Err(AppError::Validation("nothing to update"));
    }
    if matches!(&name, Some(n) if n.trim().is_empty()) {
        return Err(AppError::Validation("name must not be empty"));
    }

    let done = sqlx::query(
        "UPDATE users SET name=COALESCE(?,name), profession=COALESCE(?,profession),
         location=COALESCE(?,location), avatar_url=COALESCE(?,avatar_url) WHERE uuid=?",
    )
    .bind(&name)
    .bind(&profession)
    .bind(&location)
    .bind(&avatar_url)
    .bind(actor.to_string())
    .execute(db_pool)
    .await?;
    if done.rows_affected() == 0 {
        return Err(AppError::NotFound("user"));
    }

    let row: UserRow = sqlx::query_as(
        "SELECT uuid,name,profession,location,avatar_url,verified FROM users WHERE uuid=?",
    )
    .bind(actor.to_string())
    .fetch_one(db_pool)
    .await?;

    Ok(PublicUser::try_from_row(row)?)
}
