//! Error types for audience-lists

use audience_common::Id;
use thiserror::Error;

/// Result type for list operations
pub type Result<T> = std::result::Result<T, ListError>;

/// User-list errors
///
/// A missing entity is not an error: providers return an empty page.
#[derive(Debug, Error)]
pub enum ListError {
    /// Transport failure talking to the discovery API
    #[error("Network error: {0}")]
    Network(String),

    /// Discovery API answered with a non-success status
    #[error("API error {0}: {1}")]
    Api(u16, String),

    /// Response body did not match the expected shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// Request was cancelled before the page arrived
    #[error("Request cancelled")]
    Cancelled,

    /// Another page for the same list and entity is still loading
    #[error("A {list} page for entity {id} is already loading")]
    AlreadyLoading { list: &'static str, id: Id },

    /// Writing auxiliary page data (e.g. supporter ranks) failed
    #[error("Failed to process extra page data: {0}")]
    ExtraProcessing(String),

    /// audience-common error
    #[error("Common error: {0}")]
    Common(#[from] audience_common::Error),
}

