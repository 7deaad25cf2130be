//! Client-side caches the list providers read from and write into
//!
//! Each cache is an injected trait object so providers can be exercised
//! against in-memory fakes. Writes are upserts keyed by id; concurrent
//! writers from unrelated fetches are last-write-wins per record.

use audience_common::models::{Collection, Id, Keyed, SupportRecord, Track, UserSummary};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Read/upsert access to an id-keyed entity cache
pub trait EntityRepository<T>: Send + Sync {
    fn get(&self, id: Id) -> Option<T>;

    fn upsert(&self, entities: Vec<T>);
}

/// Shared user cache
pub trait UserCache: Send + Sync {
    /// Insert or replace users by `user_id`
    fn upsert_users(&self, users: &[UserSummary]);

    fn get_user(&self, id: Id) -> Option<UserSummary>;

    /// Users for `ids` in the same order, skipping ids not cached
    fn get_users(&self, ids: &[Id]) -> Vec<UserSummary> {
        ids.iter().filter_map(|id| self.get_user(*id)).collect()
    }
}

/// Logged-in account lookup
pub trait AccountRepository: Send + Sync {
    fn current_user(&self) -> Option<UserSummary>;

    fn current_user_id(&self) -> Option<Id> {
        self.current_user().map(|u| u.user_id)
    }
}

/// Tipping relationships keyed by the user whose list was fetched
///
/// `supporters[user]` maps sender id to record, `supporting[user]` maps
/// receiver id to record. Writes merge into the existing map for that user.
pub trait SupportersStore: Send + Sync {
    fn set_supporters_for_user(&self, user_id: Id, records: Vec<SupportRecord>);

    fn set_supporting_for_user(&self, user_id: Id, records: Vec<SupportRecord>);

    /// Supporters of `user_id` ordered by rank
    fn supporters_for_user(&self, user_id: Id) -> Vec<SupportRecord>;

    /// Users `user_id` supports ordered by rank
    fn supporting_for_user(&self, user_id: Id) -> Vec<SupportRecord>;
}

/// In-memory cache for any [`Keyed`] entity
pub struct InMemoryEntityRepository<T> {
    entries: RwLock<HashMap<Id, T>>,
}

impl<T> InMemoryEntityRepository<T> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop a cached entity, e.g. after it was deleted upstream
    pub fn remove(&self, id: Id) -> Option<T> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
    }
}

impl<T> Default for InMemoryEntityRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> EntityRepository<T> for InMemoryEntityRepository<T>
where
    T: Keyed + Clone + Send + Sync,
{
    fn get(&self, id: Id) -> Option<T> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    fn upsert(&self, entities: Vec<T>) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        for entity in entities {
            entries.insert(entity.id(), entity);
        }
    }
}

impl UserCache for InMemoryEntityRepository<UserSummary> {
    fn upsert_users(&self, users: &[UserSummary]) {
        self.upsert(users.to_vec());
    }

    fn get_user(&self, id: Id) -> Option<UserSummary> {
        self.get(id)
    }
}

pub type InMemoryUserCache = InMemoryEntityRepository<UserSummary>;
pub type InMemoryTrackRepository = InMemoryEntityRepository<Track>;
pub type InMemoryCollectionRepository = InMemoryEntityRepository<Collection>;

/// Account holder for the logged-in user
#[derive(Default)]
pub struct InMemoryAccount {
    user: RwLock<Option<UserSummary>>,
}

impl InMemoryAccount {
    /// Anonymous session
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signed_in(user: UserSummary) -> Self {
        Self {
            user: RwLock::new(Some(user)),
        }
    }

    pub fn sign_in(&self, user: UserSummary) {
        *self.user.write().unwrap_or_else(PoisonError::into_inner) = Some(user);
    }

    pub fn sign_out(&self) {
        *self.user.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl AccountRepository for InMemoryAccount {
    fn current_user(&self) -> Option<UserSummary> {
        self.user.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

type SupportMap = HashMap<Id, HashMap<Id, SupportRecord>>;

/// In-memory tipping relationship store
#[derive(Default)]
pub struct InMemorySupportersStore {
    supporters: RwLock<SupportMap>,
    supporting: RwLock<SupportMap>,
}

impl InMemorySupportersStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn merge_records(
    map: &RwLock<SupportMap>,
    user_id: Id,
    records: Vec<SupportRecord>,
    key: fn(&SupportRecord) -> Id,
) {
    let mut map = map.write().unwrap_or_else(PoisonError::into_inner);
    let for_user = map.entry(user_id).or_default();
    for record in records {
        for_user.insert(key(&record), record);
    }
}

fn ranked_records(map: &RwLock<SupportMap>, user_id: Id) -> Vec<SupportRecord> {
    let map = map.read().unwrap_or_else(PoisonError::into_inner);
    let mut records: Vec<SupportRecord> = map
        .get(&user_id)
        .map(|m| m.values().cloned().collect())
        .unwrap_or_default();
    records.sort_by_key(|r| r.rank);
    records
}

impl SupportersStore for InMemorySupportersStore {
    fn set_supporters_for_user(&self, user_id: Id, records: Vec<SupportRecord>) {
        merge_records(&self.supporters, user_id, records, |r| r.sender_id);
    }

    fn set_supporting_for_user(&self, user_id: Id, records: Vec<SupportRecord>) {
        merge_records(&self.supporting, user_id, records, |r| r.receiver_id);
    }

    fn supporters_for_user(&self, user_id: Id) -> Vec<SupportRecord> {
        ranked_records(&self.supporters, user_id)
    }

    fn supporting_for_user(&self, user_id: Id) -> Vec<SupportRecord> {
        ranked_records(&self.supporting, user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(sender_id: Id, receiver_id: Id, rank: u32, amount: &str) -> SupportRecord {
        SupportRecord {
            sender_id,
            receiver_id,
            rank,
            amount: amount.to_string(),
        }
    }

    #[test]
    fn test_user_cache_upsert_replaces_by_id() {
        let cache = InMemoryUserCache::new();
        cache.upsert_users(&[UserSummary::new(1, "Old", "old")]);
        cache.upsert_users(&[UserSummary::new(1, "New", "new"), UserSummary::new(2, "Two", "two")]);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get_user(1).unwrap().name, "New");
    }

    #[test]
    fn test_get_users_preserves_order_and_skips_missing() {
        let cache = InMemoryUserCache::new();
        cache.upsert_users(&[UserSummary::new(1, "A", "a"), UserSummary::new(3, "C", "c")]);

        let ids: Vec<Id> = cache.get_users(&[3, 2, 1]).iter().map(|u| u.user_id).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn test_removed_entity_is_gone() {
        let tracks = InMemoryTrackRepository::new();
        tracks.upsert(vec![Track {
            track_id: 10,
            owner_id: 1,
            title: "t".to_string(),
            repost_count: 0,
            save_count: 0,
            followee_reposts: vec![],
            followee_saves: vec![],
            has_current_user_reposted: false,
            has_current_user_saved: false,
        }]);

        assert!(tracks.remove(10).is_some());
        assert!(tracks.get(10).is_none());
        assert!(tracks.is_empty());
    }

    #[test]
    fn test_account_sign_in_out() {
        let account = InMemoryAccount::new();
        assert!(account.current_user_id().is_none());

        account.sign_in(UserSummary::new(42, "Me", "me"));
        assert_eq!(account.current_user_id(), Some(42));

        account.sign_out();
        assert!(account.current_user().is_none());
    }

    #[test]
    fn test_supporters_merge_and_rank_order() {
        let store = InMemorySupportersStore::new();
        store.set_supporters_for_user(1, vec![record(5, 1, 2, "10"), record(6, 1, 1, "20")]);
        store.set_supporters_for_user(1, vec![record(5, 1, 3, "11")]);

        let records = store.supporters_for_user(1);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].sender_id, 6);
        assert_eq!(records[1].amount, "11");
        assert!(store.supporting_for_user(1).is_empty());
    }
}
