//! Discovery node HTTP client
//!
//! Talks to the `/v1/full` endpoints. Every response is wrapped in a
//! `{"data": ...}` envelope.

use super::{FetchParams, RelatedUsersApi, SupporterResponse, SupportingResponse};
use crate::error::{ListError, Result};
use async_trait::async_trait;
use audience_common::config::ApiConfig;
use audience_common::models::{Collection, Id, Track, UserSummary};
use serde::de::DeserializeOwned;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

/// Discovery API client
pub struct DiscoveryClient {
    http_client: reqwest::Client,
    base_url: String,
    app_name: String,
}

impl DiscoveryClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(format!("{}/{}", config.app_name, env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ListError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            app_name: config.app_name.clone(),
        })
    }

    /// Absolute URL for a `/v1/full` path
    pub fn endpoint_url(&self, path: &str) -> String {
        format!("{}/v1/full/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = self.endpoint_url(path);
        tracing::debug!(url = %url, "Querying discovery API");

        let response = self
            .http_client
            .get(&url)
            .query(&[("app_name", self.app_name.as_str())])
            .query(query)
            .send()
            .await
            .map_err(|e| ListError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ListError::Api(status.as_u16(), error_text));
        }

        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| ListError::Parse(e.to_string()))?;
        Ok(envelope.data)
    }

    async fn get_page<T: DeserializeOwned>(&self, path: String, params: FetchParams) -> Result<Vec<T>> {
        let mut query = vec![
            ("limit", params.limit.to_string()),
            ("offset", params.offset.to_string()),
        ];
        if let Some(user_id) = params.current_user_id {
            query.push(("user_id", user_id.to_string()));
        }
        self.get(&path, &query).await
    }

    fn viewer_query(current_user_id: Option<Id>) -> Vec<(&'static str, String)> {
        current_user_id
            .map(|id| vec![("user_id", id.to_string())])
            .unwrap_or_default()
    }

    /// Fetch a single user; `None` when the API returns no rows
    pub async fn get_user(&self, id: Id, current_user_id: Option<Id>) -> Result<Option<UserSummary>> {
        let users: Vec<UserSummary> = self
            .get(&format!("users/{}", id), &Self::viewer_query(current_user_id))
            .await?;
        Ok(users.into_iter().next())
    }

    /// Fetch a single track; `None` when the API answers 404
    ///
    /// Unlike users and playlists, the track endpoint wraps one object in
    /// `data` rather than an array.
    pub async fn get_track(&self, id: Id, current_user_id: Option<Id>) -> Result<Option<Track>> {
        match self
            .get(&format!("tracks/{}", id), &Self::viewer_query(current_user_id))
            .await
        {
            Ok(track) => Ok(Some(track)),
            Err(ListError::Api(404, _)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Fetch a playlist or album; `None` when the API returns no rows
    pub async fn get_playlist(&self, id: Id, current_user_id: Option<Id>) -> Result<Option<Collection>> {
        let playlists: Vec<Collection> = self
            .get(&format!("playlists/{}", id), &Self::viewer_query(current_user_id))
            .await?;
        Ok(playlists.into_iter().next())
    }
}

#[async_trait]
impl RelatedUsersApi for DiscoveryClient {
    async fn followers(&self, params: FetchParams) -> Result<Vec<UserSummary>> {
        self.get_page(format!("users/{}/followers", params.entity_id), params).await
    }

    async fn following(&self, params: FetchParams) -> Result<Vec<UserSummary>> {
        self.get_page(format!("users/{}/following", params.entity_id), params).await
    }

    async fn mutuals(&self, params: FetchParams) -> Result<Vec<UserSummary>> {
        self.get_page(format!("users/{}/mutuals", params.entity_id), params).await
    }

    async fn track_reposts(&self, params: FetchParams) -> Result<Vec<UserSummary>> {
        self.get_page(format!("tracks/{}/reposts", params.entity_id), params).await
    }

    async fn track_favorites(&self, params: FetchParams) -> Result<Vec<UserSummary>> {
        self.get_page(format!("tracks/{}/favorites", params.entity_id), params).await
    }

    async fn playlist_reposts(&self, params: FetchParams) -> Result<Vec<UserSummary>> {
        self.get_page(format!("playlists/{}/reposts", params.entity_id), params).await
    }

    async fn playlist_favorites(&self, params: FetchParams) -> Result<Vec<UserSummary>> {
        self.get_page(format!("playlists/{}/favorites", params.entity_id), params).await
    }

    async fn supporters(&self, params: FetchParams) -> Result<Vec<SupporterResponse>> {
        self.get_page(format!("users/{}/supporters", params.entity_id), params).await
    }

    async fn supporting(&self, params: FetchParams) -> Result<Vec<SupportingResponse>> {
        self.get_page(format!("users/{}/supporting", params.entity_id), params).await
    }
}
