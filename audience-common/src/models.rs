//! Domain models shared between the list providers and the API client
//!
//! These mirror the discovery API's "full" user, track and playlist
//! payloads, reduced to the fields the user-list screens need.

use serde::{Deserialize, Serialize};

/// Numeric identifier for users, tracks and playlists
pub type Id = u64;

/// Anything that lives in an id-keyed cache
pub trait Keyed {
    fn id(&self) -> Id;
}

/// Minimal user representation returned by the related-users endpoints
///
/// Counts default to 0 when the API omits them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub user_id: Id,
    pub name: String,
    pub handle: String,
    #[serde(default)]
    pub follower_count: u64,
    #[serde(default)]
    pub followee_count: u64,
    #[serde(default)]
    pub supporter_count: u64,
    #[serde(default)]
    pub supporting_count: u64,
    /// Number of users the logged-in user follows who also follow this user
    #[serde(default)]
    pub current_user_followee_follow_count: u64,
    #[serde(default)]
    pub does_current_user_follow: bool,
    #[serde(default)]
    pub is_verified: bool,
}

impl UserSummary {
    /// Create a user with zeroed counts
    pub fn new(user_id: Id, name: impl Into<String>, handle: impl Into<String>) -> Self {
        Self {
            user_id,
            name: name.into(),
            handle: handle.into(),
            follower_count: 0,
            followee_count: 0,
            supporter_count: 0,
            supporting_count: 0,
            current_user_followee_follow_count: 0,
            does_current_user_follow: false,
            is_verified: false,
        }
    }
}

impl Keyed for UserSummary {
    fn id(&self) -> Id {
        self.user_id
    }
}

/// Reference to a user embedded in a track or playlist (e.g. a followee repost)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub user_id: Id,
}

/// Cached track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub track_id: Id,
    pub owner_id: Id,
    pub title: String,
    #[serde(default)]
    pub repost_count: u64,
    #[serde(default)]
    pub save_count: u64,
    /// Users the logged-in user follows who reposted this track
    #[serde(default)]
    pub followee_reposts: Vec<UserRef>,
    /// Users the logged-in user follows who favorited this track
    #[serde(default)]
    pub followee_saves: Vec<UserRef>,
    #[serde(default)]
    pub has_current_user_reposted: bool,
    #[serde(default)]
    pub has_current_user_saved: bool,
}

impl Keyed for Track {
    fn id(&self) -> Id {
        self.track_id
    }
}

/// Cached playlist or album
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub playlist_id: Id,
    pub playlist_owner_id: Id,
    pub playlist_name: String,
    #[serde(default)]
    pub repost_count: u64,
    #[serde(default)]
    pub save_count: u64,
    #[serde(default)]
    pub followee_reposts: Vec<UserRef>,
    #[serde(default)]
    pub followee_saves: Vec<UserRef>,
    #[serde(default)]
    pub has_current_user_reposted: bool,
    #[serde(default)]
    pub has_current_user_saved: bool,
}

impl Keyed for Collection {
    fn id(&self) -> Id {
        self.playlist_id
    }
}

/// One tipping relationship between two users
///
/// `amount` is the cumulative tip total as the API reports it: an integer
/// string in the token's smallest unit, which can exceed u64.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportRecord {
    pub sender_id: Id,
    pub receiver_id: Id,
    pub rank: u32,
    pub amount: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_summary_defaults_missing_counts() {
        let json = r#"{"user_id": 7, "name": "Seven", "handle": "seven", "album_count": 3}"#;
        let user: UserSummary = serde_json::from_str(json).unwrap();

        assert_eq!(user.user_id, 7);
        assert_eq!(user.follower_count, 0);
        assert!(!user.does_current_user_follow);
    }

    #[test]
    fn test_track_followee_reposts_parse() {
        let json = r#"{
            "track_id": 1,
            "owner_id": 2,
            "title": "Intro",
            "repost_count": 4,
            "followee_reposts": [{"user_id": 5}, {"user_id": 9}]
        }"#;
        let track: Track = serde_json::from_str(json).unwrap();

        assert_eq!(track.id(), 1);
        assert_eq!(
            track.followee_reposts,
            vec![UserRef { user_id: 5 }, UserRef { user_id: 9 }]
        );
        assert!(track.followee_saves.is_empty());
    }
}
