use axum::{
    Json, debug_handler,
    extract::{Path, State},
};
use serde::Serialize;
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{AppError, AppResult, db::PublicUser, session};

use super::comment::{CommentDetail, list_comments};

#[derive(Debug, Serialize)]
pub struct PostDetail {
    pub uuid: Uuid,
    pub author: PublicUser,
    pub body: String,
    pub media_url: Option<String>,
    pub created_at: i64,
    pub likes: i64,
    pub liked: bool,
    pub comments: Vec<CommentDetail>,
}

#[debug_handler]
pub(crate) async fn page(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Path(uuid): Path<Uuid>,
) -> AppResult<Json<PostDetail>> {
    let actor = session::require_user(&session).await?;
    Ok(Json(get_post(&db_pool, actor, uuid).await?))
}

#[debug_handler]
pub(crate) async fn remove(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Path(uuid): Path<Uuid>,
) -> AppResult<()> {
    let actor = session::require_user(&session).await?;
    delete_post(&db_pool, actor, uuid).await
}

pub async fn get_post(db_pool: &SqlitePool, actor: Uuid, post_id: Uuid) -> AppResult<PostDetail> {
    let Some((body, media_url, created_at, u_uuid, name, profession, location, avatar_url, verified, likes, liked)): Option<(
        String,
        Option<String>,
        i64,
        String,
        String,
        Option<String>,
        Option<String>,
        Option<String>,
        bool,
        i64,
        bool,
    )> = sqlx::query_as(
        "SELECT p.body, p.media_url, p.created_at,
                u.uuid, u.name, u.profession, u.location, u.avatar_url, u.verified,
                (SELECT COUNT(*) FROM post_likes l WHERE l.post_id = p.uuid),
                EXISTS(SELECT 1 FROM post_likes l WHERE l.post_id = p.uuid AND l.user_id = ?)
         FROM posts p JOIN users u ON u.uuid = p.author_id
         WHERE p.uuid=?",
    )
    .bind(actor.to_string())
    .bind(post_id.to_string())
    .fetch_optional(db_pool)
    .await?
    else {
        return Err(AppError::NotFound("post"));
    };

    let comments = list_comments(db_pool, post_id).await?;

    Ok(PostDetail {
        uuid: post_id,
        author: PublicUser::try_from_row((
            u_uuid, name, profession, location, avatar_url, verified,
        ))?,
        body,
        media_url,
        created_at,
        likes,
        liked,
        comments,
    })
}

pub async fn delete_post(db_pool: &SqlitePool, actor: Uuid, post_id: Uuid) -> AppResult<()> {
    let mut tx = db_pool.begin().await?;

    let Some((author_id,)): Option<(String,)> =
        sqlx::query_as("SELECT author_id FROM posts WHERE uuid=?")
            .bind(post_id.to_string())
            .fetch_optional(&mut *tx)
            .await?
    else {
        return Err(AppError::NotFound("post"));
    };
    if author_id != actor.to_string() {
        return Err(AppError::Forbidden("only the author can delete a post"));
    }

    // comments, replies and like rows go with it (ON DELETE CASCADE)
    sqlx::query("DELETE FROM posts WHERE uuid=?")
        .bind(post_id.to_string())
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    Ok(())
}
