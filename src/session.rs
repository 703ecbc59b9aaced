use tower_sessions::Session;
use uuid::Uuid;

use crate::{AppError, AppResult};

pub const USER_ID: &str = "user_id";

/// The signed-in user, as established by the session layer. The id is
/// trusted as-is; credentials were checked upstream.
pub async fn require_user(session: &Session) -> AppResult<Uuid> {
    session
        .get::<Uuid>(USER_ID)
        .await?
        .ok_or(AppError::Forbidden("not signed in"))
}
