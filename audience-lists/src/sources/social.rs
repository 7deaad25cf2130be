//! Follow-graph lists for a user

use super::below_total;
use crate::api::{FetchParams, RelatedUsersApi};
use crate::error::Result;
use crate::provider::{FetchedUsers, UserListSource};
use crate::repository::UserCache;
use async_trait::async_trait;
use audience_common::models::{Id, UserSummary};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocialKind {
    Followers,
    Following,
    /// Followers of the user that the logged-in user also follows
    Mutuals,
}

pub struct SocialSource {
    kind: SocialKind,
    api: Arc<dyn RelatedUsersApi>,
    users: Arc<dyn UserCache>,
}

impl SocialSource {
    pub fn new(kind: SocialKind, api: Arc<dyn RelatedUsersApi>, users: Arc<dyn UserCache>) -> Self {
        Self { kind, api, users }
    }

    pub fn kind(&self) -> SocialKind {
        self.kind
    }
}

#[async_trait]
impl UserListSource for SocialSource {
    type Entity = UserSummary;
    type Extra = ();

    fn name(&self) -> &'static str {
        match self.kind {
            SocialKind::Followers => "followers",
            SocialKind::Following => "following",
            SocialKind::Mutuals => "mutuals",
        }
    }

    fn get_existing_entity(&self, id: Id) -> Option<UserSummary> {
        self.users.get_user(id)
    }

    fn extract_user_id_subset(&self, _entity: &UserSummary) -> Vec<Id> {
        Vec::new()
    }

    async fn fetch_all_users_for_entity(&self, params: FetchParams) -> Result<FetchedUsers<()>> {
        let users = match self.kind {
            SocialKind::Followers => self.api.followers(params).await?,
            SocialKind::Following => self.api.following(params).await?,
            SocialKind::Mutuals => self.api.mutuals(params).await?,
        };
        Ok(FetchedUsers::new(users))
    }

    fn can_fetch_more_users(&self, user: &UserSummary, combined_ids: &[Id]) -> bool {
        let total = match self.kind {
            SocialKind::Followers => user.follower_count,
            SocialKind::Following => user.followee_count,
            SocialKind::Mutuals => user.current_user_followee_follow_count,
        };
        below_total(combined_ids, total)
    }
}
