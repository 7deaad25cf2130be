//! Repost and favorite lists for tracks and playlists

use super::below_total;
use crate::api::{FetchParams, RelatedUsersApi};
use crate::error::Result;
use crate::provider::{FetchedUsers, UserListSource};
use crate::repository::EntityRepository;
use async_trait::async_trait;
use audience_common::models::{Collection, Id, Track, UserRef};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngagementTarget {
    Track,
    Playlist,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engagement {
    Reposts,
    Favorites,
}

/// Content that can be reposted and favorited
pub trait Engageable: Send + Sync {
    const TARGET: EngagementTarget;

    fn repost_count(&self) -> u64;
    fn save_count(&self) -> u64;
    fn followee_reposts(&self) -> &[UserRef];
    fn followee_saves(&self) -> &[UserRef];
    fn has_current_user_reposted(&self) -> bool;
    fn has_current_user_saved(&self) -> bool;
}

impl Engageable for Track {
    const TARGET: EngagementTarget = EngagementTarget::Track;

    fn repost_count(&self) -> u64 {
        self.repost_count
    }
    fn save_count(&self) -> u64 {
        self.save_count
    }
    fn followee_reposts(&self) -> &[UserRef] {
        &self.followee_reposts
    }
    fn followee_saves(&self) -> &[UserRef] {
        &self.followee_saves
    }
    fn has_current_user_reposted(&self) -> bool {
        self.has_current_user_reposted
    }
    fn has_current_user_saved(&self) -> bool {
        self.has_current_user_saved
    }
}

impl Engageable for Collection {
    const TARGET: EngagementTarget = EngagementTarget::Playlist;

    fn repost_count(&self) -> u64 {
        self.repost_count
    }
    fn save_count(&self) -> u64 {
        self.save_count
    }
    fn followee_reposts(&self) -> &[UserRef] {
        &self.followee_reposts
    }
    fn followee_saves(&self) -> &[UserRef] {
        &self.followee_saves
    }
    fn has_current_user_reposted(&self) -> bool {
        self.has_current_user_reposted
    }
    fn has_current_user_saved(&self) -> bool {
        self.has_current_user_saved
    }
}

/// Reposters or favoriters of a track or playlist
///
/// Followees who engaged are listed first, and the logged-in user is
/// included when they engaged too.
pub struct EngagementSource<T> {
    kind: Engagement,
    api: Arc<dyn RelatedUsersApi>,
    entities: Arc<dyn EntityRepository<T>>,
}

impl<T: Engageable> EngagementSource<T> {
    pub fn new(kind: Engagement, api: Arc<dyn RelatedUsersApi>, entities: Arc<dyn EntityRepository<T>>) -> Self {
        Self { kind, api, entities }
    }

    pub fn kind(&self) -> Engagement {
        self.kind
    }
}

#[async_trait]
impl<T: Engageable + 'static> UserListSource for EngagementSource<T> {
    type Entity = T;
    type Extra = ();

    fn name(&self) -> &'static str {
        match (T::TARGET, self.kind) {
            (EngagementTarget::Track, Engagement::Reposts) => "track_reposts",
            (EngagementTarget::Track, Engagement::Favorites) => "track_favorites",
            (EngagementTarget::Playlist, Engagement::Reposts) => "playlist_reposts",
            (EngagementTarget::Playlist, Engagement::Favorites) => "playlist_favorites",
        }
    }

    fn get_existing_entity(&self, id: Id) -> Option<T> {
        self.entities.get(id)
    }

    fn extract_user_id_subset(&self, entity: &T) -> Vec<Id> {
        let refs = match self.kind {
            Engagement::Reposts => entity.followee_reposts(),
            Engagement::Favorites => entity.followee_saves(),
        };
        refs.iter().map(|r| r.user_id).collect()
    }

    async fn fetch_all_users_for_entity(&self, params: FetchParams) -> Result<FetchedUsers<()>> {
        let users = match (T::TARGET, self.kind) {
            (EngagementTarget::Track, Engagement::Reposts) => self.api.track_reposts(params).await?,
            (EngagementTarget::Track, Engagement::Favorites) => self.api.track_favorites(params).await?,
            (EngagementTarget::Playlist, Engagement::Reposts) => self.api.playlist_reposts(params).await?,
            (EngagementTarget::Playlist, Engagement::Favorites) => {
                self.api.playlist_favorites(params).await?
            }
        };
        Ok(FetchedUsers::new(users))
    }

    fn include_current_user(&self, entity: &T) -> bool {
        match self.kind {
            Engagement::Reposts => entity.has_current_user_reposted(),
            Engagement::Favorites => entity.has_current_user_saved(),
        }
    }

    fn can_fetch_more_users(&self, entity: &T, combined_ids: &[Id]) -> bool {
        let total = match self.kind {
            Engagement::Reposts => entity.repost_count(),
            Engagement::Favorites => entity.save_count(),
        };
        below_total(combined_ids, total)
    }
}
