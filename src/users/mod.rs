mod new;
mod page;
mod update;
mod views;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::AppState;

pub use new::create_user;
pub use page::{Profile, get_user};
pub use update::{UserChanges, update_user};
pub use views::{ViewCount, record_view};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/new", post(new::new_user))
        .route("/me", put(update::update))
        .route("/{uuid}", get(page::page))
        .route("/{uuid}/view", post(views::view))
}
