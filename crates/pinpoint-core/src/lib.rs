//! Pinpoint Core Types and Services
//!
//! This crate provides the fundamental types and operations used throughout Pinpoint:
//! - Feedback, user and share records
//! - The `FeedbackStore` persistence trait
//! - Feedback, report and sharing services
//! - Client-side session identity and paginated report documents
//! - Core error types

pub mod document;
pub mod error;
pub mod feedback;
pub mod report;
pub mod service;
pub mod session;
pub mod share;
pub mod store;
pub mod token;

pub use error::{Error, Result};
pub use feedback::{Feedback, FeedbackKind, NewFeedback, Severity};
pub use report::{Report, ReportFormat, ReportGenerator};
pub use service::FeedbackService;
pub use session::SessionIdentity;
pub use share::{Share, ShareRequest, SharingService, User};
pub use store::FeedbackStore;
