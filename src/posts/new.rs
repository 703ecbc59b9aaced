use axum::{Json, debug_handler, extract::State};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{
    AppError, AppResult,
    db::{self, Post},
    session,
};

#[derive(Deserialize)]
pub(crate) struct NewPostQuery {
    body: Option<String>,
    media_url: Option<String>,
}

#[debug_handler]
pub(crate) async fn new_post(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Json(NewPostQuery { body, media_url }): Json<NewPostQuery>,
) -> AppResult<Json<Post>> {
    let actor = session::require_user(&session).await?;
    Ok(Json(create_post(&db_pool, actor, body.unwrap_or_default(), media_url).await?))
}

pub async fn create_post(
    db_pool: &SqlitePool,
    actor: Uuid,
    body: String,
    media_url: Option<String>,
) -> AppResult<Post> {
    if body.trim().is_empty() && media_url.is_none() {
        return Err(AppError::Validation("a post needs text or media"));
    }

    let post = Post {
        uuid: Uuid::now_v7(),
        author_id: actor,
        body,
        media_url,
        created_at: db::now(),
    };
    sqlx::query("INSERT INTO posts (uuid,author_id,body,media_url,created_at) VALUES (?,?,?,?,?)")
        .bind(post.uuid.to_string())
        .bind(post.author_id.to_string())
        .bind(&post.body)
        .bind(&post.media_url)
        .bind(post.created_at)
        .execute(db_pool)
        .await?;

    Ok(post)
}
