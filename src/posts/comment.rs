use std::collections::HashMap;

use axum::{
    Json, debug_handler,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{
    AppError, AppResult,
    db::{self, PublicUser},
    session,
};

#[derive(Debug, Serialize)]
pub struct ReplyDetail {
    pub uuid: Uuid,
    pub author: PublicUser,
    pub body: String,
    pub created_at: i64,
    pub likes: i64,
}

#[derive(Debug, Serialize)]
pub struct CommentDetail {
    pub uuid: Uuid,
    pub author: PublicUser,
    pub body: String,
    pub created_at: i64,
    pub likes: i64,
    pub replies: Vec<ReplyDetail>,
}

#[derive(Deserialize)]
pub(crate) struct CommentQuery {
    body: String,
}

#[debug_handler]
pub(crate) async fn comment(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Path(post_id): Path<Uuid>,
    Json(CommentQuery { body }): Json<CommentQuery>,
) -> AppResult<Json<CommentDetail>> {
    let actor = session::require_user(&session).await?;
    Ok(Json(add_comment(&db_pool, actor, post_id, body).await?))
}

#[debug_handler]
pub(crate) async fn comments(
    State(db_pool): State<SqlitePool>,
    Path(post_id): Path<Uuid>,
) -> AppResult<Json<Vec<CommentDetail>>> {
    Ok(Json(list_comments(&db_pool, post_id).await?))
}

#[debug_handler]
pub(crate) async fn reply(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Path((post_id, comment_id)): Path<(Uuid, Uuid)>,
    Json(CommentQuery { body }): Json<CommentQuery>,
) -> AppResult<Json<ReplyDetail>> {
    let actor = session::require_user(&session).await?;
    Ok(Json(add_reply(&db_pool, actor, post_id, comment_id, body).await?))
}

pub async fn add_comment(
    db_pool: &SqlitePool,
    actor: Uuid,
    post_id: Uuid,
    body: String,
) -> AppResult<CommentDetail> {
    if body.trim().is_empty() {
        return Err(AppError::Validation("comment must not be empty"));
    }
    if sqlx::query_as::<_, ()>("SELECT 1 FROM posts WHERE uuid=?")
        .bind(post_id.to_string())
        .fetch_optional(db_pool)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound("post"));
    }

    let author = super::author(db_pool, actor).await?;
    let uuid = Uuid::now_v7();
    let created_at = db::now();
    sqlx::query("INSERT INTO comments (uuid,post_id,author_id,body,created_at) VALUES (?,?,?,?,?)")
        .bind(uuid.to_string())
        .bind(post_id.to_string())
        .bind(actor.to_string())
        .bind(&body)
        .bind(created_at)
        .execute(db_pool)
        .await?;

    Ok(CommentDetail { uuid, author, body, created_at, likes: 0, replies: Vec::new() })
}

pub async fn add_reply(
    db_pool: &SqlitePool,
    actor: Uuid,
    post_id: Uuid,
    comment_id: Uuid,
    body: String,
) -> AppResult<ReplyDetail> {
    if body.trim().is_empty() {
        return Err(AppError::Validation("reply must not be empty"));
    }
    if sqlx::query_as::<_, ()>("SELECT 1 FROM comments WHERE uuid=? AND post_id=?")
        .bind(comment_id.to_string())
        .bind(post_id.to_string())
        .fetch_optional(db_pool)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound("comment"));
    }

    let author = super::author(db_pool, actor).await?;
    let uuid = Uuid::now_v7();
    let created_at = db::now();
    sqlx::query("INSERT INTO replies (uuid,comment_id,author_id,body,created_at) VALUES (?,?,?,?,?)")
        .bind(uuid.to_string())
        .bind(comment_id.to_string())
        .bind(actor.to_string())
        .bind(&body)
        .bind(created_at)
        .execute(db_pool)
        .await?;

    Ok(ReplyDetail { uuid, author, body, created_at, likes: 0 })
}

/// The full comment sequence of a post in insertion order, replies nested.
pub async fn list_comments(db_pool: &SqlitePool, post_id: Uuid) -> AppResult<Vec<CommentDetail>> {
    if sqlx::query_as::<_, ()>("SELECT 1 FROM posts WHERE uuid=?")
        .bind(post_id.to_string())
        .fetch_optional(db_pool)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound("post"));
    }

    let reply_rows: Vec<(String, String, String, i64, String, String, Option<String>, Option<String>, Option<String>, bool, i64)> =
        sqlx::query_as(
            "SELECT r.comment_id, r.uuid, r.body, r.created_at,
                    u.uuid, u.name, u.profession, u.location, u.avatar_url, u.verified,
                    (SELECT COUNT(*) FROM reply_likes l WHERE l.reply_id = r.uuid)
             FROM replies r JOIN users u ON u.uuid = r.author_id
             WHERE r.comment_id IN (SELECT uuid FROM comments WHERE post_id=?)
             ORDER BY r.uuid",
        )
        .bind(post_id.to_string())
        .fetch_all(db_pool)
        .await?;

    let mut replies_by_comment: HashMap<String, Vec<ReplyDetail>> = HashMap::new();
    for (comment_id, uuid, body, created_at, u_uuid, name, profession, location, avatar_url, verified, likes) in
        reply_rows
    {
        replies_by_comment.entry(comment_id).or_default().push(ReplyDetail {
            uuid: Uuid::parse_str(&uuid)?,
            author: PublicUser::try_from_row((
                u_uuid, name, profession, location, avatar_url, verified,
            ))?,
            body,
            created_at,
            likes,
        });
    }

    let rows: Vec<(String, String, i64, String, String, Option<String>, Option<String>, Option<String>, bool, i64)> =
        sqlx::query_as(
            "SELECT c.uuid, c.body, c.created_at,
                    u.uuid, u.name, u.profession, u.location, u.avatar_url, u.verified,
                    (SELECT COUNT(*) FROM comment_likes l WHERE l.comment_id = c.uuid)
             FROM comments c JOIN users u ON u.uuid = c.author_id
             WHERE c.post_id=? ORDER BY c.uuid",
        )
        .bind(post_id.to_string())
        .fetch_all(db_pool)
        .await?;

    rows.into_iter()
        .map(|(uuid, body, created_at, u_uuid, name, profession, location, avatar_url, verified, likes)| {
            Ok(CommentDetail {
                replies: replies_by_comment.remove(&uuid).unwrap_or_default(),
                uuid: Uuid::parse_str(&uuid)?,
                author: PublicUser::try_from_row((
                    u_uuid, name, profession, location, avatar_url, verified,
                ))?,
                body,
                created_at,
                likes,
            })
        })
        .collect()
}
