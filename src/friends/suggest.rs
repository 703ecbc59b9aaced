use axum::{
    Json, debug_handler,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{AppResult, db::PublicUser, session};

#[derive(Deserialize)]
pub(crate) struct SuggestQuery {
    limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct Suggestion {
    #[serde(flatten)]
    pub user: PublicUser,
    pub mutual_friends: i64,
}

#[debug_handler]
pub(crate) async fn suggested(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Query(SuggestQuery { limit }): Query<SuggestQuery>,
) -> AppResult<Json<Vec<Suggestion>>> {
    let actor = session::require_user(&session).await?;
    Ok(Json(suggest_friends(&db_pool, actor, limit.unwrap_or(15)).await?))
}

/// Everyone the actor is not yet connected to, most shared friends first.
/// Ties break on descending uuid, i.e. newest account first, so the slice
/// is the same for the same store state.
pub async fn suggest_friends(
    db_pool: &SqlitePool,
    actor: Uuid,
    limit: i64,
) -> AppResult<Vec<Suggestion>> {
    let actor = actor.to_string();
    let rows: Vec<(String, String, Option<String>, Option<String>, Option<String>, bool, i64)> =
        sqlx::query_as(
            "SELECT u.uuid, u.name, u.profession, u.location, u.avatar_url, u.verified,
                    (SELECT COUNT(*) FROM friends m
                     WHERE m.user_id = u.uuid
                       AND m.friend_id IN (SELECT friend_id FROM friends WHERE user_id=?)) AS mutual_friends
             FROM users u
             WHERE u.uuid <> ?
               AND u.uuid NOT IN (SELECT friend_id FROM friends WHERE user_id=?)
               AND u.uuid NOT IN (SELECT requester_id FROM friend_requests WHERE recipient_id=?)
               AND u.uuid NOT IN (SELECT recipient_id FROM friend_requests WHERE requester_id=?)
             ORDER BY mutual_friends DESC, u.uuid DESC
             LIMIT ?",
        )
        .bind(&actor)
        .bind(&actor)
        .bind(&actor)
        .bind(&actor)
        .bind(&actor)
        .bind(limit.max(0))
        .fetch_all(db_pool)
        .await?;

    rows.into_iter()
        .map(|(uuid, name, profession, location, avatar_url, verified, mutual_friends)| {
            Ok(Suggestion {
                user: PublicUser::try_from_row((
                    uuid, name, profession, location, avatar_url, verified,
                ))?,
                mutual_friends,
            })
        })
        .collect()
}
