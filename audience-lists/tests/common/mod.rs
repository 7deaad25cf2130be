//! Shared fixtures for audience-lists integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use audience_common::models::{Id, Track, UserRef, UserSummary};
use audience_lists::api::{FetchParams, RelatedUsersApi, SupporterResponse, SupportingResponse};
use audience_lists::{ListError, Result};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

pub fn user(id: Id) -> UserSummary {
    UserSummary::new(id, format!("User {}", id), format!("user{}", id))
}

pub fn users(ids: &[Id]) -> Vec<UserSummary> {
    ids.iter().map(|id| user(*id)).collect()
}

pub fn track(id: Id, repost_count: u64, followee_reposts: &[Id]) -> Track {
    Track {
        track_id: id,
        owner_id: 1000,
        title: format!("Track {}", id),
        repost_count,
        save_count: 0,
        followee_reposts: followee_reposts.iter().map(|id| UserRef { user_id: *id }).collect(),
        followee_saves: Vec::new(),
        has_current_user_reposted: false,
        has_current_user_saved: false,
    }
}

/// Blocks the next API call until released
pub struct Gate {
    pub entered: Arc<Notify>,
    pub release: Arc<Notify>,
}

/// Scripted RelatedUsersApi
///
/// Every endpoint pops the next scripted page of its shape; an empty script
/// yields an empty page.
#[derive(Default)]
pub struct FakeApi {
    user_pages: Mutex<VecDeque<Vec<UserSummary>>>,
    supporter_pages: Mutex<VecDeque<Vec<SupporterResponse>>>,
    supporting_pages: Mutex<VecDeque<Vec<SupportingResponse>>>,
    failure: Mutex<Option<(u16, String)>>,
    calls: Mutex<Vec<(&'static str, FetchParams)>>,
    gate: Mutex<Option<Gate>>,
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_users(&self, ids: &[Id]) {
        self.push_page(users(ids));
    }

    pub fn push_page(&self, page: Vec<UserSummary>) {
        self.user_pages.lock().unwrap().push_back(page);
    }

    pub fn push_supporters(&self, rows: Vec<SupporterResponse>) {
        self.supporter_pages.lock().unwrap().push_back(rows);
    }

    pub fn push_supporting(&self, rows: Vec<SupportingResponse>) {
        self.supporting_pages.lock().unwrap().push_back(rows);
    }

    /// Next call fails with an API error
    pub fn fail_next(&self, status: u16, body: &str) {
        *self.failure.lock().unwrap() = Some((status, body.to_string()));
    }

    /// Next call waits on the returned gate
    pub fn hold_next(&self) -> (Arc<Notify>, Arc<Notify>) {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(Gate {
            entered: entered.clone(),
            release: release.clone(),
        });
        (entered, release)
    }

    pub fn calls(&self) -> Vec<(&'static str, FetchParams)> {
        self.calls.lock().unwrap().clone()
    }

    async fn enter(&self, method: &'static str, params: FetchParams) -> Result<()> {
        self.calls.lock().unwrap().push((method, params));

        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }

        let failure = self.failure.lock().unwrap().take();
        match failure {
            Some((status, body)) => Err(ListError::Api(status, body)),
            None => Ok(()),
        }
    }

    async fn user_page(&self, method: &'static str, params: FetchParams) -> Result<Vec<UserSummary>> {
        self.enter(method, params).await?;
        Ok(self.user_pages.lock().unwrap().pop_front().unwrap_or_default())
    }
}

#[async_trait]
impl RelatedUsersApi for FakeApi {
    async fn followers(&self, params: FetchParams) -> Result<Vec<UserSummary>> {
        self.user_page("followers", params).await
    }

    async fn following(&self, params: FetchParams) -> Result<Vec<UserSummary>> {
        self.user_page("following", params).await
    }

    async fn mutuals(&self, params: FetchParams) -> Result<Vec<UserSummary>> {
        self.user_page("mutuals", params).await
    }

    async fn track_reposts(&self, params: FetchParams) -> Result<Vec<UserSummary>> {
        self.user_page("track_reposts", params).await
    }

    async fn track_favorites(&self, params: FetchParams) -> Result<Vec<UserSummary>> {
        self.user_page("track_favorites", params).await
    }

    async fn playlist_reposts(&self, params: FetchParams) -> Result<Vec<UserSummary>> {
        self.user_page("playlist_reposts", params).await
    }

    async fn playlist_favorites(&self, params: FetchParams) -> Result<Vec<UserSummary>> {
        self.user_page("playlist_favorites", params).await
    }

    async fn supporters(&self, params: FetchParams) -> Result<Vec<SupporterResponse>> {
        self.enter("supporters", params).await?;
        Ok(self.supporter_pages.lock().unwrap().pop_front().unwrap_or_default())
    }

    async fn supporting(&self, params: FetchParams) -> Result<Vec<SupportingResponse>> {
        self.enter("supporting", params).await?;
        Ok(self.supporting_pages.lock().unwrap().pop_front().unwrap_or_default())
    }
}
