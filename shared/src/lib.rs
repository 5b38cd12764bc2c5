//! Shared library for the shop invoicing service
//!
//! This library contains the ambient pieces used by the service crate:
//! - Configuration loading from the environment
//! - The error type and its HTTP mapping
//! - PostgreSQL pool construction
//! - Response envelope types

pub mod config;
pub mod database;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use database::DatabaseService;
pub use error::{AppError, FieldViolation, Result};
pub use types::*;
