//! SqliteFeedbackStore - FeedbackStore trait implementation for SQLite

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use std::path::PathBuf;
use tracing::{debug, info};

use pinpoint_core::{
    Error, Feedback, FeedbackKind, FeedbackStore, Result, Severity, Share, User,
};

/// Schema version this build reads and writes
pub const SCHEMA_VERSION: i64 = 1;

/// SQLite-backed feedback store
#[derive(Clone)]
pub struct SqliteFeedbackStore {
    pool: SqlitePool,
}

impl SqliteFeedbackStore {
    /// Open (or create) the database at `db_path`
    ///
    /// The path is used as given; callers expand `~` beforehand. Missing
    /// parent directories are created.
    ///
    /// # Errors
    /// - `Error::Store` if the connection or schema setup fails, or if the
    ///   database carries an unsupported schema version
    pub async fn new(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();

        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(
                SqliteConnectOptions::new()
                    .filename(&db_path)
                    .create_if_missing(true)
                    .foreign_keys(true)
                    .journal_mode(SqliteJournalMode::Wal)
                    .synchronous(SqliteSynchronous::Normal),
            )
            .await
            .map_err(|e| Error::Store(format!("Failed to open SQLite database: {}", e)))?;

        let store = Self::from_pool(pool).await?;
        info!(path = %db_path.display(), "Opened feedback database");
        Ok(store)
    }

    /// Wrap an existing pool, creating the schema if needed
    pub async fn from_pool(pool: SqlitePool) -> Result<Self> {
        initialize_schema(&pool).await?;

        let version: i64 = sqlx::query_scalar("SELECT MAX(version) FROM schema_version")
            .fetch_one(&pool)
            .await
            .map_err(store_error("read schema version"))?;

        if version != SCHEMA_VERSION {
            return Err(Error::Store(format!(
                "Unsupported schema version: {}",
                version
            )));
        }

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close all pooled connections
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

async fn initialize_schema(pool: &SqlitePool) -> Result<()> {
    let statements = [
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        )
        "#,
        "INSERT OR IGNORE INTO schema_version (version) VALUES (1)",
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            name TEXT,
            token_hash TEXT NOT NULL UNIQUE,
            created_at TEXT NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS feedback (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            path TEXT NOT NULL,
            type TEXT NOT NULL,
            severity TEXT NOT NULL DEFAULT 'medium',
            screenshot TEXT,
            session_id TEXT NOT NULL,
            user_id TEXT REFERENCES users(id) ON DELETE SET NULL,
            created_at TEXT NOT NULL
        )
        "#,
        "CREATE INDEX IF NOT EXISTS idx_feedback_session ON feedback(session_id, created_at DESC)",
        "CREATE INDEX IF NOT EXISTS idx_feedback_user ON feedback(user_id)",
        r#"
        CREATE TABLE IF NOT EXISTS shared_feedback (
            id TEXT PRIMARY KEY,
            feedback_id TEXT NOT NULL REFERENCES feedback(id) ON DELETE CASCADE,
            shared_by_id TEXT NOT NULL REFERENCES users(id),
            shared_with_id TEXT NOT NULL REFERENCES users(id),
            can_edit BOOLEAN NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )
        "#,
        "CREATE INDEX IF NOT EXISTS idx_shared_feedback_feedback ON shared_feedback(feedback_id)",
        "CREATE INDEX IF NOT EXISTS idx_shared_feedback_with ON shared_feedback(shared_with_id)",
    ];

    for statement in statements {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(store_error("initialize schema"))?;
    }

    debug!("Feedback schema ready");
    Ok(())
}

#[derive(sqlx::FromRow)]
struct FeedbackRow {
    id: String,
    title: String,
    description: String,
    path: String,
    #[sqlx(rename = "type")]
    kind: String,
    severity: String,
    screenshot: Option<String>,
    session_id: String,
    user_id: Option<String>,
    created_at: String,
}

impl TryFrom<FeedbackRow> for Feedback {
    type Error = Error;

    fn try_from(row: FeedbackRow) -> Result<Self> {
        Ok(Feedback {
            id: row.id,
            title: row.title,
            description: row.description,
            path: row.path,
            kind: FeedbackKind::from(row.kind),
            severity: Severity::from(row.severity),
            screenshot: row.screenshot,
            session_id: row.session_id,
            user_id: row.user_id,
            created_at: parse_timestamp(&row.created_at)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    email: String,
    name: Option<String>,
    created_at: String,
}

impl TryFrom<UserRow> for User {
    type Error = Error;

    fn try_from(row: UserRow) -> Result<Self> {
        Ok(User {
            id: row.id,
            email: row.email,
            name: row.name,
            created_at: parse_timestamp(&row.created_at)?,
        })
    }
}

const FEEDBACK_COLUMNS: &str =
    "id, title, description, path, type, severity, screenshot, session_id, user_id, created_at";

#[async_trait]
impl FeedbackStore for SqliteFeedbackStore {
    async fn insert_feedback(&self, feedback: &Feedback) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO feedback (
                id, title, description, path, type, severity,
                screenshot, session_id, user_id, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&feedback.id)
        .bind(&feedback.title)
        .bind(&feedback.description)
        .bind(&feedback.path)
        .bind(feedback.kind.as_str())
        .bind(feedback.severity.as_str())
        .bind(&feedback.screenshot)
        .bind(&feedback.session_id)
        .bind(&feedback.user_id)
        .bind(format_timestamp(&feedback.created_at))
        .execute(&self.pool)
        .await
        .map_err(store_error("insert feedback"))?;

        Ok(())
    }

    async fn list_feedback_by_session(&self, session_id: &str) -> Result<Vec<Feedback>> {
        // rowid breaks ties between records created within the same microsecond
        let query = format!(
            "SELECT {} FROM feedback WHERE session_id = ? ORDER BY created_at DESC, rowid DESC",
            FEEDBACK_COLUMNS
        );
        let rows: Vec<FeedbackRow> = sqlx::query_as(&query)
            .bind(session_id)
            .fetch_all(&self.pool)
            .await
            .map_err(store_error("list feedback"))?;

        rows.into_iter().map(Feedback::try_from).collect()
    }

    async fn find_owned_feedback(
        &self,
        feedback_id: &str,
        user_id: &str,
    ) -> Result<Option<Feedback>> {
        let query = format!(
            "SELECT {} FROM feedback WHERE id = ? AND user_id = ?",
            FEEDBACK_COLUMNS
        );
        let row: Option<FeedbackRow> = sqlx::query_as(&query)
            .bind(feedback_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error("find feedback"))?;

        row.map(Feedback::try_from).transpose()
    }

    async fn insert_user(&self, user: &User, token_hash: &str) -> Result<()> {
        let result = sqlx::query(
            "INSERT INTO users (id, email, name, token_hash, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(token_hash)
        .bind(format_timestamp(&user.created_at))
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Err(
                Error::Validation(format!("Email already registered: {}", user.email)),
            ),
            Err(e) => Err(store_error("insert user")(e)),
        }
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row: Option<UserRow> =
            sqlx::query_as("SELECT id, email, name, created_at FROM users WHERE email = ?")
                .bind(email)
                .fetch_optional(&self.pool)
                .await
                .map_err(store_error("find user"))?;

        row.map(User::try_from).transpose()
    }

    async fn find_user_by_token_hash(&self, token_hash: &str) -> Result<Option<User>> {
        let row: Option<UserRow> =
            sqlx::query_as("SELECT id, email, name, created_at FROM users WHERE token_hash = ?")
                .bind(token_hash)
                .fetch_optional(&self.pool)
                .await
                .map_err(store_error("find user"))?;

        row.map(User::try_from).transpose()
    }

    async fn insert_share(&self, share: &Share) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO shared_feedback (
                id, feedback_id, shared_by_id, shared_with_id, can_edit, created_at
            ) VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&share.id)
        .bind(&share.feedback_id)
        .bind(&share.shared_by_id)
        .bind(&share.shared_with_id)
        .bind(share.can_edit)
        .bind(format_timestamp(&share.created_at))
        .execute(&self.pool)
        .await
        .map_err(store_error("insert share"))?;

        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(store_error("ping database"))?;
        Ok(())
    }
}

fn store_error(action: &'static str) -> impl Fn(sqlx::Error) -> Error {
    move |e| Error::Store(format!("Failed to {}: {}", action, e))
}

/// Fixed-width RFC 3339 so that text ordering matches time ordering
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| Error::Store(format!("Invalid timestamp '{}': {}", value, e)))
}
