use axum::Router;
use flicksy::{AppState, db, friends, posts, users};
use tower_http::cors::{Any, CorsLayer};
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer, cookie::SameSite};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("flicksy=info")),
        )
        .init();

    let db_url = dotenv::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://flicksy.db".to_string());
    let db_pool = db::connect(&db_url).await?;
    db::init(&db_pool).await?;

    // the session layer is the actor context; ids stored here are trusted
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(30)));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app_state = AppState { db_pool };

    let app = Router::new()
        .nest("/u", users::router())
        .nest("/f", friends::router())
        .nest("/p", posts::router())
        .with_state(app_state)
        .layer(session_layer)
        .layer(cors);

    let port = dotenv::var("PORT").unwrap_or_else(|_| "8800".to_string());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
