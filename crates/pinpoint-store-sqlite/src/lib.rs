//! SQLite feedback storage for Pinpoint
//!
//! This crate implements the `FeedbackStore` trait on top of a SQLite
//! database accessed through an `sqlx` connection pool.
//!
//! # Features
//! - WAL journal with a bounded connection pool
//! - Schema created on startup and checked against a version table
//! - Session listing served from a `(session_id, created_at)` index
//!
//! # Example
//! ```no_run
//! # use pinpoint_store_sqlite::SqliteFeedbackStore;
//! # async fn example() -> pinpoint_core::Result<()> {
//! let store = SqliteFeedbackStore::new("/var/lib/pinpoint/feedback.db").await?;
//! # Ok(())
//! # }
//! ```

mod sqlite_store;

pub use sqlite_store::{SCHEMA_VERSION, SqliteFeedbackStore};
