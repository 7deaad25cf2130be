//! Remote "related users" API
//!
//! [`RelatedUsersApi`] is the only I/O the list providers perform.
//! [`DiscoveryClient`] implements it over HTTP; tests substitute fakes.

mod discovery;

pub use discovery::DiscoveryClient;

use crate::error::Result;
use async_trait::async_trait;
use audience_common::models::{Id, UserSummary};
use serde::{Deserialize, Serialize};

/// Request shape shared by every related-users endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchParams {
    /// Maximum number of users to return
    pub limit: u32,
    pub offset: u64,
    /// Track, playlist or user the list is about
    pub entity_id: Id,
    /// Logged-in user, lets the API fill `does_current_user_follow`
    pub current_user_id: Option<Id>,
}

/// One row of a user's top supporters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupporterResponse {
    pub rank: u32,
    pub amount: String,
    pub sender: UserSummary,
}

/// One row of the users a user supports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportingResponse {
    pub rank: u32,
    pub amount: String,
    pub receiver: UserSummary,
}

/// Paginated related-users endpoints
///
/// Implementations return at most `params.limit` users, in the order the
/// backend ranks them. Failures propagate unchanged; nothing here retries.
#[async_trait]
pub trait RelatedUsersApi: Send + Sync {
    async fn followers(&self, params: FetchParams) -> Result<Vec<UserSummary>>;

    async fn following(&self, params: FetchParams) -> Result<Vec<UserSummary>>;

    /// Users the current user follows who also follow `entity_id`
    async fn mutuals(&self, params: FetchParams) -> Result<Vec<UserSummary>>;

    async fn track_reposts(&self, params: FetchParams) -> Result<Vec<UserSummary>>;

    async fn track_favorites(&self, params: FetchParams) -> Result<Vec<UserSummary>>;

    async fn playlist_reposts(&self, params: FetchParams) -> Result<Vec<UserSummary>>;

    async fn playlist_favorites(&self, params: FetchParams) -> Result<Vec<UserSummary>>;

    async fn supporters(&self, params: FetchParams) -> Result<Vec<SupporterResponse>>;

    async fn supporting(&self, params: FetchParams) -> Result<Vec<SupportingResponse>>;
}
