//! Pinpoint feedback server
//!
//! HTTP API for collecting website feedback, building session reports and
//! sharing feedback between registered users. The binary in `main.rs` wires
//! configuration, logging and the SQLite store around [`api::router`].

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod middleware;

pub use app::AppState;
pub use config::ServerConfig;
pub use error::ApiError;
