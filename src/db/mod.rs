//! Database module for SQLite persistence.
//!
//! SQLite is the record store behind every workflow.

mod repository;

pub use repository::*;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

/// Initialize the database connection pool and run migrations.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    // Run embedded migrations
    run_migrations(&pool).await?;

    Ok(pool)
}

/// Run database migrations.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS categories (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            slug TEXT NOT NULL UNIQUE,
            type TEXT NOT NULL CHECK (type IN ('article', 'video')),
            icon TEXT,
            sort_order INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        );

        INSERT OR IGNORE INTO categories (id, name, slug, type, icon, sort_order, created_at) VALUES
            ('cat-community-news', '社区动态', 'community-news', 'article', NULL, 1, datetime('now')),
            ('cat-policy', '政策解读', 'policy', 'article', NULL, 2, datetime('now')),
            ('cat-neighbour-stories', '邻里故事', 'neighbour-stories', 'video', NULL, 3, datetime('now')),
            ('cat-events', '活动现场', 'events', 'video', NULL, 4, datetime('now'));
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS posts (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            slug TEXT NOT NULL UNIQUE,
            excerpt TEXT,
            content TEXT,
            cover_image TEXT,
            category_id TEXT,
            type TEXT NOT NULL CHECK (type IN ('article', 'video')),
            video_url TEXT,
            external_link TEXT,
            status TEXT NOT NULL DEFAULT 'draft' CHECK (status IN ('draft', 'published')),
            view_count INTEGER NOT NULL DEFAULT 0 CHECK (view_count >= 0),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS post_drafts (
            id TEXT PRIMARY KEY,
            post_id TEXT NOT NULL UNIQUE REFERENCES posts(id) ON DELETE CASCADE,
            title TEXT NOT NULL,
            slug TEXT NOT NULL,
            excerpt TEXT,
            content TEXT,
            cover_image TEXT,
            category_id TEXT,
            type TEXT NOT NULL CHECK (type IN ('article', 'video')),
            video_url TEXT,
            external_link TEXT,
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS wishlist (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            category TEXT NOT NULL DEFAULT 'old_renovation',
            status TEXT NOT NULL DEFAULT 'pending',
            priority TEXT NOT NULL DEFAULT 'medium',
            contact_name TEXT,
            contact_phone TEXT,
            contact_email TEXT,
            admin_reply TEXT,
            replied_at TEXT,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS wishlist_notes (
            id TEXT PRIMARY KEY,
            wishlist_id TEXT NOT NULL REFERENCES wishlist(id) ON DELETE CASCADE,
            content TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_roles (
            user_id TEXT PRIMARY KEY,
            role TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS sessions (
            token TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            created_at TEXT NOT NULL,
            expires_at TEXT
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes for common queries
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_posts_status_type_created ON posts(status, type, created_at);
        CREATE INDEX IF NOT EXISTS idx_posts_category ON posts(category_id);
        CREATE INDEX IF NOT EXISTS idx_wishlist_created_at ON wishlist(created_at);
        CREATE INDEX IF NOT EXISTS idx_wishlist_status ON wishlist(status);
        CREATE INDEX IF NOT EXISTS idx_wishlist_notes_wishlist ON wishlist_notes(wishlist_id, created_at);
        CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id);
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
