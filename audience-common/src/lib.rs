//! # Audience Common Library
//!
//! Shared code for the Audience user-list crates including:
//! - Domain models (users, tracks, collections, supporter records)
//! - Event types (ListEvent enum) and the EventBus
//! - Configuration loading
//! - Common error types

pub mod config;
pub mod error;
pub mod events;
pub mod models;

pub use error::{Error, Result};
pub use models::Id;
