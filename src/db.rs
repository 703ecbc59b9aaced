use std::str::FromStr;

use serde::Serialize;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use uuid::Uuid;

// Ids are v7 uuids stored as text, so id order is creation order.
// Set-valued fields (friends, likes, views) are rows whose primary key
// carries the membership-at-most-once invariant.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    uuid TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    profession TEXT,
    location TEXT,
    avatar_url TEXT,
    verified INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL
);

-- symmetric: rows (a,b) and (b,a) are written and removed together
CREATE TABLE IF NOT EXISTS friends (
    user_id TEXT NOT NULL REFERENCES users(uuid) ON DELETE CASCADE,
    friend_id TEXT NOT NULL REFERENCES users(uuid) ON DELETE CASCADE,
    PRIMARY KEY (user_id, friend_id)
);

CREATE TABLE IF NOT EXISTS friend_requests (
    uuid TEXT PRIMARY KEY,
    requester_id TEXT NOT NULL REFERENCES users(uuid) ON DELETE CASCADE,
    recipient_id TEXT NOT NULL REFERENCES users(uuid) ON DELETE CASCADE,
    created_at INTEGER NOT NULL
);

-- at most one pending request per unordered pair
CREATE UNIQUE INDEX IF NOT EXISTS friend_requests_pair
    ON friend_requests (min(requester_id, recipient_id), max(requester_id, recipient_id));

CREATE TABLE IF NOT EXISTS profile_views (
    owner_id TEXT NOT NULL REFERENCES users(uuid) ON DELETE CASCADE,
    viewer_id TEXT NOT NULL REFERENCES users(uuid) ON DELETE CASCADE,
    PRIMARY KEY (owner_id, viewer_id)
);

CREATE TABLE IF NOT EXISTS posts (
    uuid TEXT PRIMARY KEY,
    author_id TEXT NOT NULL REFERENCES users(uuid) ON DELETE CASCADE,
    body TEXT NOT NULL,
    media_url TEXT,
    created_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS posts_author ON posts (author_id);

CREATE TABLE IF NOT EXISTS comments (
    uuid TEXT PRIMARY KEY,
    post_id TEXT NOT NULL REFERENCES posts(uuid) ON DELETE CASCADE,
    author_id TEXT NOT NULL REFERENCES users(uuid) ON DELETE CASCADE,
    body TEXT NOT NULL,
    created_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS comments_post ON comments (post_id);

CREATE TABLE IF NOT EXISTS replies (
    uuid TEXT PRIMARY KEY,
    comment_id TEXT NOT NULL REFERENCES comments(uuid) ON DELETE CASCADE,
    author_id TEXT NOT NULL REFERENCES users(uuid) ON DELETE CASCADE,
    body TEXT NOT NULL,
    created_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS replies_comment ON replies (comment_id);

CREATE TABLE IF NOT EXISTS post_likes (
    post_id TEXT NOT NULL REFERENCES posts(uuid) ON DELETE CASCADE,
    user_id TEXT NOT NULL REFERENCES users(uuid) ON DELETE CASCADE,
    PRIMARY KEY (post_id, user_id)
);

CREATE TABLE IF NOT EXISTS comment_likes (
    comment_id TEXT NOT NULL REFERENCES comments(uuid) ON DELETE CASCADE,
    user_id TEXT NOT NULL REFERENCES users(uuid) ON DELETE CASCADE,
    PRIMARY KEY (comment_id, user_id)
);

CREATE TABLE IF NOT EXISTS reply_likes (
    reply_id TEXT NOT NULL REFERENCES replies(uuid) ON DELETE CASCADE,
    user_id TEXT NOT NULL REFERENCES users(uuid) ON DELETE CASCADE,
    PRIMARY KEY (reply_id, user_id)
);
"#;

pub async fn connect(url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(16)
        .connect_with(options)
        .await
}

pub async fn init(db_pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(SCHEMA).execute(db_pool).await?;
    Ok(())
}

pub fn now() -> i64 {
    time::OffsetDateTime::now_utc().unix_timestamp()
}

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub uuid: Uuid,
    pub name: String,
    pub profession: Option<String>,
    pub location: Option<String>,
    pub avatar_url: Option<String>,
    pub verified: bool,
    pub created_at: i64,
}

/// What other users get to see of a profile.
#[derive(Debug, Clone, Serialize)]
pub struct PublicUser {
    pub uuid: Uuid,
    pub name: String,
    pub profession: Option<String>,
    pub location: Option<String>,
    pub avatar_url: Option<String>,
    pub verified: bool,
}

pub(crate) type UserRow = (String, String, Option<String>, Option<String>, Option<String>, bool);

impl PublicUser {
    pub(crate) fn try_from_row(
        (uuid, name, profession, location, avatar_url, verified): UserRow,
    ) -> Result<Self, uuid::Error> {
        Ok(PublicUser {
            uuid: Uuid::parse_str(&uuid)?,
            name,
            profession,
            location,
            avatar_url,
            verified,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FriendRequest {
    pub uuid: Uuid,
    pub requester_id: Uuid,
    pub recipient_id: Uuid,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Post {
    pub uuid: Uuid,
    pub author_id: Uuid,
    pub body: String,
    pub media_url: Option<String>,
    pub created_at: i64,
}
