use crate::models::{CreateUserOutcome, User, Visit};
use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};

pub const RECENT_VISITS_LIMIT: i64 = 10;

/// Users and visits in a single SQLite file.
#[derive(Clone)]
pub struct RecordStore {
    pool: SqlitePool,
    db_path: PathBuf,
}

impl RecordStore {
    /// Opens (creating if missing) the database file and applies the schema.
    pub async fn connect(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();
        tracing::info!("Opening SQLite database at: {}", db_path.display());

        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create database directory: {}", parent.display())
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .with_context(|| {
                format!("Failed to connect to SQLite database at: {}", db_path.display())
            })?;

        let store = Self { pool, db_path };
        store
            .run_migrations()
            .await
            .context("Failed to run database migrations")?;

        Ok(store)
    }

    async fn run_migrations(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username VARCHAR(80) NOT NULL UNIQUE,
                email VARCHAR(120) NOT NULL UNIQUE,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS visits (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT NOT NULL,
                page VARCHAR(100)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn db_exists(&self) -> bool {
        self.db_path.exists()
    }

    pub async fn record_visit(&self, page: &str) -> Result<Visit> {
        let timestamp = Utc::now();
        let result = sqlx::query("INSERT INTO visits (timestamp, page) VALUES (?, ?)")
            .bind(timestamp)
            .bind(page)
            .execute(&self.pool)
            .await
            .context("Failed to record visit")?;

        Ok(Visit {
            id: result.last_insert_rowid(),
            timestamp,
            page: page.to_string(),
        })
    }

    /// Inserts a user unless the username or email is already taken. The
    /// username is checked first, so a request that collides on both reports
    /// the username.
    pub async fn create_user(&self, username: &str, email: &str) -> Result<CreateUserOutcome> {
        if self.username_exists(username).await? {
            return Ok(CreateUserOutcome::UsernameTaken(username.to_string()));
        }
        if self.email_exists(email).await? {
            return Ok(CreateUserOutcome::EmailTaken(email.to_string()));
        }

        let inserted = sqlx::query("INSERT INTO users (username, email, created_at) VALUES (?, ?, ?)")
            .bind(username)
            .bind(email)
            .bind(Utc::now())
            .execute(&self.pool)
            .await;

        match inserted {
            Ok(_) => Ok(CreateUserOutcome::Created(username.to_string())),
            // A concurrent insert can slip past the checks above; the UNIQUE
            // constraint still holds, so report it the same way.
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                if self.username_exists(username).await? {
                    Ok(CreateUserOutcome::UsernameTaken(username.to_string()))
                } else {
                    Ok(CreateUserOutcome::EmailTaken(email.to_string()))
                }
            }
            Err(e) => Err(e).context("Failed to create user"),
        }
    }

    async fn username_exists(&self, username: &str) -> Result<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE username = ? LIMIT 1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to look up username")?;
        Ok(found.is_some())
    }

    async fn email_exists(&self, email: &str) -> Result<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE email = ? LIMIT 1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to look up email")?;
        Ok(found.is_some())
    }

    /// All users, newest first.
    pub async fn list_users(&self) -> Result<Vec<User>> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, email, created_at FROM users ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list users")
    }

    pub async fn recent_visits(&self, limit: i64) -> Result<Vec<Visit>> {
        sqlx::query_as::<_, Visit>(
            "SELECT id, timestamp, COALESCE(page, '') AS page FROM visits ORDER BY timestamp DESC, id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list visits")
    }

    pub async fn count_users(&self) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count users")
    }

    pub async fn count_visits(&self) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM visits")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count visits")
    }
}
