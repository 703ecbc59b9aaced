use axum::{
    Json, debug_handler,
    extract::{Path, State},
};
use serde::Serialize;
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{AppError, AppResult, session};

#[derive(Debug, Serialize)]
pub struct ViewCount {
    pub views: i64,
}

#[debug_handler]
pub(crate) async fn view(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Path(uuid): Path<Uuid>,
) -> AppResult<Json<ViewCount>> {
    let actor = session::require_user(&session).await?;
    Ok(Json(record_view(&db_pool, actor, uuid).await?))
}

/// Counts each viewer once; self-views succeed but never count.
pub async fn record_view(db_pool: &SqlitePool, actor: Uuid, owner_id: Uuid) -> AppResult<ViewCount> {
    if sqlx::query_as::<_, ()>("SELECT 1 FROM users WHERE uuid=?")
        .bind(owner_id.to_string())
        .fetch_optional(db_pool)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound("user"));
    }

    if actor != owner_id {
        sqlx::query("INSERT OR IGNORE INTO profile_views (owner_id,viewer_id) VALUES (?,?)")
            .bind(owner_id.to_string())
            .bind(actor.to_string())
            .execute(db_pool)
            .await?;
    }

    let (views,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM profile_views WHERE owner_id=?")
        .bind(owner_id.to_string())
        .fetch_one(db_pool)
        .await?;

    Ok(ViewCount { views })
}
