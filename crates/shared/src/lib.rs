//! Shared types, errors, and configuration for Exotic Markets.
//!
//! This crate provides common types used across all other crates:
//! - Token amounts with decimal precision
//! - Account and contract addresses
//! - Typed IDs for notifications and pending transactions
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
