mod comment;
mod feed;
mod like;
mod new;
mod page;

use axum::{
    Router,
    routing::{get, post},
};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    AppError, AppResult, AppState,
    db::{PublicUser, UserRow},
};

pub use comment::{CommentDetail, ReplyDetail, add_comment, add_reply, list_comments};
pub use feed::{FeedPage, FeedPost, feed, user_posts};
pub use like::{LikeState, LikeTarget, toggle_like};
pub use new::create_post;
pub use page::{PostDetail, delete_post, get_post};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(feed::list))
        .route("/new", post(new::new_post))
        .route("/user/{uuid}", get(feed::by_user))
        .route("/like/{kind}/{uuid}", post(like::like))
        .route("/{uuid}", get(page::page).delete(page::remove))
        .route("/{uuid}/comments", get(comment::comments).post(comment::comment))
        .route("/{uuid}/comments/{comment}", post(comment::reply))
}

pub(crate) async fn author(db_pool: &SqlitePool, uuid: Uuid) -> AppResult<PublicUser> {
    let Some(row): Option<UserRow> = sqlx::query_as(
        "SELECT uuid,name,profession,location,avatar_url,verified FROM users WHERE uuid=?",
    )
    .bind(uuid.to_string())
    .fetch_optional(db_pool)
    .await?
    else {
        return Err(AppError::NotFound("user"));
    };

    Ok(PublicUser::try_from_row(row)?)
}
