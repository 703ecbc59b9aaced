use axum::{
    Json, debug_handler,
    extract::{Path, Query, State},
};
use futures_util::TryStreamExt;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{AppError, AppResult, db::PublicUser, session};

#[derive(Debug, Serialize)]
pub struct FeedPost {
    pub uuid: Uuid,
    pub author: PublicUser,
    pub body: String,
    pub media_url: Option<String>,
    pub created_at: i64,
    pub likes: i64,
    pub liked: bool,
    pub comments: i64,
}

#[derive(Debug, Serialize)]
pub struct FeedPage {
    pub posts: Vec<FeedPost>,
    pub next_cursor: Option<Uuid>,
}

// like counts only; the full like sets stay in the store
const FEED_SELECT: &str =
    "SELECT p.uuid, p.body, p.media_url, p.created_at,
            u.uuid, u.name, u.profession, u.location, u.avatar_url, u.verified,
            (SELECT COUNT(*) FROM post_likes l WHERE l.post_id = p.uuid),
            EXISTS(SELECT 1 FROM post_likes l WHERE l.post_id = p.uuid AND l.user_id = ?),
            (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.uuid)
     FROM posts p JOIN users u ON u.uuid = p.author_id";

type FeedRow = (
    String,
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
    i64,
);

fn feed_post(
    (uuid, body, media_url, created_at, u_uuid, name, profession, location, avatar_url, verified, likes, liked, comments): FeedRow,
) -> AppResult<FeedPost> {
    Ok(FeedPost {
        uuid: Uuid::parse_str(&uuid)?,
        author: PublicUser::try_from_row((u_uuid, name, profession, location, avatar_url, verified))?,
        body,
        media_url,
        created_at,
        likes,
        liked,
        comments,
    })
}

#[derive(Deserialize)]
pub(crate) struct FeedQuery {
    cursor: Option<Uuid>,
    limit: Option<i64>,
}

#[debug_handler]
pub(crate) async fn list(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Query(FeedQuery { cursor, limit }): Query<FeedQuery>,
) -> AppResult<Json<FeedPage>> {
    let actor = session::require_user(&session).await?;
    Ok(Json(feed(&db_pool, actor, cursor, limit.unwrap_or(20)).await?))
}

/// One page of the feed, newest first. Passing the returned cursor back
/// picks the sequence up exactly where it stopped.
pub async fn feed(
    db_pool: &SqlitePool,
    actor: Uuid,
    cursor: Option<Uuid>,
    limit: i64,
) -> AppResult<FeedPage> {
    let limit = limit.clamp(1, 50);
    let sql = format!("{FEED_SELECT} WHERE ? IS NULL OR p.uuid < ? ORDER BY p.uuid DESC LIMIT ?");
    let cursor = cursor.map(|c| c.to_string());

    let mut rows = sqlx::query_as::<_, FeedRow>(&sql)
        .bind(actor.to_string())
        .bind(&cursor)
        .bind(&cursor)
        .bind(limit)
        .fetch(db_pool);

    let mut posts = Vec::new();
    while let Some(row) = rows.try_next().await? {
        posts.push(feed_post(row)?);
    }

    let next_cursor = if posts.len() as i64 == limit {
        posts.last().map(|p| p.uuid)
    } else {
        None
    };

    Ok(FeedPage { posts, next_cursor })
}

#[debug_handler]
pub(crate) async fn by_user(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Path(uuid): Path<Uuid>,
) -> AppResult<Json<Vec<FeedPost>>> {
    let actor = session::require_user(&session).await?;
    Ok(Json(user_posts(&db_pool, actor, uuid).await?))
}

pub async fn user_posts(
    db_pool: &SqlitePool,
    actor: Uuid,
    author_id: Uuid,
) -> AppResult<Vec<FeedPost>> {
    if sqlx::query_as::<_, ()>("SELECT 1 FROM users WHERE uuid=?")
        .bind(author_id.to_string())
        .fetch_optional(db_pool)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound("user"));
    }

    let sql = format!("{FEED_SELECT} WHERE p.author_id = ? ORDER BY p.uuid DESC");
    let rows: Vec<FeedRow> = sqlx::query_as(&sql)
        .bind(actor.to_string())
        .bind(author_id.to_string())
        .fetch_all(db_pool)
        .await?;

    rows.into_iter().map(feed_post).collect()
}
