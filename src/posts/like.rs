use axum::{
    Json, debug_handler,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{AppError, AppResult, session};

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LikeTarget {
    Post,
    Comment,
    Reply,
}

impl LikeTarget {
    fn tables(self) -> (&'static str, &'static str, &'static str) {
        match self {
            LikeTarget::Post => ("posts", "post_likes", "post_id"),
            LikeTarget::Comment => ("comments", "comment_likes", "comment_id"),
            LikeTarget::Reply => ("replies", "reply_likes", "reply_id"),
        }
    }

    fn name(self) -> &'static str {
        match self {
            LikeTarget::Post => "post",
            LikeTarget::Comment => "comment",
            LikeTarget::Reply => "reply",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LikeState {
    pub liked: bool,
    pub likes: i64,
}

#[debug_handler]
pub(crate) async fn like(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Path((kind, uuid)): Path<(LikeTarget, Uuid)>,
) -> AppResult<Json<LikeState>> {
    let actor = session::require_user(&session).await?;
    Ok(Json(toggle_like(&db_pool, actor, kind, uuid).await?))
}

/// Flips the actor's membership in the target's like set. There is no
/// separate unlike operation; calling twice restores the prior state.
pub async fn toggle_like(
    db_pool: &SqlitePool,
    actor: Uuid,
    target: LikeTarget,
    id: Uuid,
) -> AppResult<LikeState> {
    let (table, like_table, fk) = target.tables();
    let mut tx = db_pool.begin().await?;

    if sqlx::query_as::<_, ()>(&format!("SELECT 1 FROM {table} WHERE uuid=?"))
        .bind(id.to_string())
        .fetch_optional(&mut *tx)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound(target.name()));
    }

    let removed = sqlx::query(&format!("DELETE FROM {like_table} WHERE {fk}=? AND user_id=?"))
        .bind(id.to_string())
        .bind(actor.to_string())
        .execute(&mut *tx)
        .await?
        .rows_affected();

    let liked = removed == 0;
    if liked {
        sqlx::query(&format!("INSERT INTO {like_table} ({fk},user_id) VALUES (?,?)"))
            .bind(id.to_string())
            .bind(actor.to_string())
            .execute(&mut *tx)
            .await?;
    }

    let (likes,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {like_table} WHERE {fk}=?"))
        .bind(id.to_string())
        .fetch_one(&mut *tx)
        .await?;
    tx.commit().await?;

    Ok(LikeState { liked, likes })
}
