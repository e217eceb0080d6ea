//! Shared types, errors, and configuration for ledgersync.
//!
//! This crate provides common types used across all other crates:
//! - Protocol revision tags for the accounting server API
//! - Currency symbol placement settings
//! - Typed IDs for stable row identity
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
