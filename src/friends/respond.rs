use axum::{
    Json, debug_handler,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{AppError, AppResult, session};

#[derive(Deserialize)]
pub(crate) struct RespondQuery {
    accept: bool,
}

#[derive(Debug, Serialize)]
pub struct RespondOutcome {
    pub accepted: bool,
}

#[debug_handler]
pub(crate) async fn respond(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Path(uuid): Path<Uuid>,
    Json(RespondQuery { accept }): Json<RespondQuery>,
) -> AppResult<Json<RespondOutcome>> {
    let actor = session::require_user(&session).await?;
    Ok(Json(respond_request(&db_pool, actor, uuid, accept).await?))
}

pub async fn respond_request(
    db_pool: &SqlitePool,
    actor: Uuid,
    request_id: Uuid,
    accept: bool,
) -> AppResult<RespondOutcome> {
    let mut tx = db_pool.begin().await?;

    // claim and remove in one statement so a concurrent respond loses cleanly
    let Some((requester_id,)): Option<(String,)> = sqlx::query_as(
        "DELETE FROM friend_requests WHERE uuid=? AND recipient_id=? RETURNING requester_id",
    )
    .bind(request_id.to_string())
    .bind(actor.to_string())
    .fetch_optional(&mut *tx)
    .await?
    else {
        return Err(AppError::NotFound("friend request"));
    };

    if accept {
        sqlx::query("INSERT OR IGNORE INTO friends (user_id,friend_id) VALUES (?,?),(?,?)")
            .bind(actor.to_string())
            .bind(&requester_id)
            .bind(&requester_id)
            .bind(actor.to_string())
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    Ok(RespondOutcome { accepted: accept })
}
