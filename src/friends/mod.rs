mod request;
mod respond;
mod suggest;

use axum::{
    Router,
    routing::{get, post},
};

use crate::AppState;

pub use request::{IncomingRequest, incoming_requests, send_friend_request};
pub use respond::{RespondOutcome, respond_request};
pub use suggest::{Suggestion, suggest_friends};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/request", post(request::send))
        .route("/requests", get(request::incoming))
        .route("/requests/{uuid}", post(respond::respond))
        .route("/suggested", get(suggest::suggested))
}
