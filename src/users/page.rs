use axum::{
    Json, debug_handler,
    extract::{Path, State},
};
use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    AppError, AppResult,
    db::{PublicUser, UserRow},
};

#[derive(Debug, Serialize)]
pub struct Profile {
    #[serde(flatten)]
    pub user: PublicUser,
    pub created_at: i64,
    pub friends: Vec<PublicUser>,
    pub views: i64,
}

#[debug_handler]
pub(crate) async fn page(
    State(db_pool): State<SqlitePool>,
    Path(uuid): Path<Uuid>,
) -> AppResult<Json<Profile>> {
    Ok(Json(get_user(&db_pool, uuid).await?))
}

pub async fn get_user(db_pool: &SqlitePool, uuid: Uuid) -> AppResult<Profile> {
    let Some((name, profession, location, avatar_url, verified, created_at)): Option<(
        String,
        Option<String>,
        Option<String>,
        Option<String>,
        bool,
        i64,
    )> = sqlx::query_as(
        "SELECT name,profession,location,avatar_url,verified,created_at FROM users WHERE uuid=?",
    )
    .bind(uuid.to_string())
    .fetch_optional(db_pool)
    .await?
    else {
        return Err(AppError::NotFound("user"));
    };

    let rows: Vec<UserRow> = sqlx::query_as(
        "SELECT u.uuid,u.name,u.profession,u.location,u.avatar_url,u.verified
         FROM friends f JOIN users u ON u.uuid = f.friend_id
         WHERE f.user_id=? ORDER BY u.uuid",
    )
    .bind(uuid.to_string())
    .fetch_all(db_pool)
    .await?;
    let friends = rows
        .into_iter()
        .map(PublicUser::try_from_row)
        .collect::<Result<Vec<_>, _>>()?;

    let (views,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM profile_views WHERE owner_id=?")
        .bind(uuid.to_string())
        .fetch_one(db_pool)
        .await?;

    Ok(Profile {
        user: PublicUser { uuid, name, profession, location, avatar_url, verified },
        created_at,
        friends,
        views,
    })
}
