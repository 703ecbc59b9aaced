use axum::{Json, debug_handler, extract::State};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{
    AppError, AppResult,
    db::{self, FriendRequest, PublicUser},
    session,
};

#[derive(Deserialize)]
pub(crate) struct SendRequestQuery {
    to: Uuid,
}

#[debug_handler]
pub(crate) async fn send(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Json(SendRequestQuery { to }): Json<SendRequestQuery>,
) -> AppResult<Json<FriendRequest>> {
    let actor = session::require_user(&session).await?;
    Ok(Json(send_friend_request(&db_pool, actor, to).await?))
}

pub async fn send_friend_request(
    db_pool: &SqlitePool,
    actor: Uuid,
    to: Uuid,
) -> AppResult<FriendRequest> {
    if actor == to {
        return Err(AppError::Validation("cannot send a friend request to yourself"));
    }

    let mut tx = db_pool.begin().await?;

    if sqlx::query_as::<_, ()>("SELECT 1 FROM users WHERE uuid=?")
        .bind(to.to_string())
        .fetch_optional(&mut *tx)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound("user"));
    }

    if sqlx::query_as::<_, ()>("SELECT 1 FROM friends WHERE user_id=? AND friend_id=?")
        .bind(actor.to_string())
        .bind(to.to_string())
        .fetch_optional(&mut *tx)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("already friends"));
    }

    if sqlx::query_as::<_, ()>(
        "SELECT 1 FROM friend_requests
         WHERE (requester_id=? AND recipient_id=?) OR (requester_id=? AND recipient_id=?)",
    )
    .bind(actor.to_string())
    .bind(to.to_string())
    .bind(to.to_string())
    .bind(actor.to_string())
    .fetch_optional(&mut *tx)
    .await?
    .is_some()
    {
        return Err(AppError::Conflict("a friend request is already pending"));
    }

    let request = FriendRequest {
        uuid: Uuid::now_v7(),
        requester_id: actor,
        recipient_id: to,
        created_at: db::now(),
    };
    sqlx::query(
        "INSERT INTO friend_requests (uuid,requester_id,recipient_id,created_at) VALUES (?,?,?,?)",
    )
    .bind(request.uuid.to_string())
    .bind(request.requester_id.to_string())
    .bind(request.recipient_id.to_string())
    .bind(request.created_at)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;

    Ok(request)
}

#[derive(Debug, Serialize)]
pub struct IncomingRequest {
    pub uuid: Uuid,
    pub from: PublicUser,
    pub created_at: i64,
}

#[debug_handler]
pub(crate) async fn incoming(
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Json<Vec<IncomingRequest>>> {
    let actor = session::require_user(&session).await?;
    Ok(Json(incoming_requests(&db_pool, actor).await?))
}

pub async fn incoming_requests(
    db_pool: &SqlitePool,
    actor: Uuid,
) -> AppResult<Vec<IncomingRequest>> {
    let rows: Vec<(String, i64, String, String, Option<String>, Option<String>, Option<String>, bool)> =
        sqlx::query_as(
            "SELECT r.uuid, r.created_at, u.uuid, u.name, u.profession, u.location, u.avatar_url, u.verified
             FROM friend_requests r JOIN users u ON u.uuid = r.requester_id
             WHERE r.recipient_id=? ORDER BY r.uuid DESC",
        )
        .bind(actor.to_string())
        .fetch_all(db_pool)
        .await?;

    rows.into_iter()
        .map(|(uuid, created_at, u_uuid, name, profession, location, avatar_url, verified)| {
            Ok(IncomingRequest {
                uuid: Uuid::parse_str(&uuid)?,
                from: PublicUser::try_from_row((
                    u_uuid, name, profession, location, avatar_url, verified,
                ))?,
                created_at,
            })
        })
        .collect()
}
