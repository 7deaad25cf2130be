//! Integration tests for UserListStore

mod common;

use audience_common::events::{EventBus, ListEvent};
use audience_lists::repository::{InMemoryAccount, InMemoryUserCache, UserCache};
use audience_lists::sources::{SocialKind, SocialSource};
use audience_lists::{ListError, UserListProvider, UserListStore};
use common::{user, FakeApi};
use std::sync::Arc;

struct Fixture {
    api: Arc<FakeApi>,
    events: Arc<EventBus>,
    store: Arc<UserListStore<SocialSource>>,
}

/// Followers list for user 10, who has `follower_count` followers
fn followers_store(follower_count: u64, page_size: u32) -> Fixture {
    let api = FakeApi::new();
    let users = Arc::new(InMemoryUserCache::new());
    let mut artist = user(10);
    artist.follower_count = follower_count;
    users.upsert_users(&[artist]);

    let source = SocialSource::new(SocialKind::Followers, api.clone(), users.clone());
    let provider = Arc::new(UserListProvider::new(source, users, Arc::new(InMemoryAccount::new())));
    let events = Arc::new(EventBus::new(16));
    let store = Arc::new(UserListStore::new(provider, events.clone(), page_size));
    Fixture { api, events, store }
}

#[tokio::test]
async fn test_load_more_without_open_list_is_noop() {
    let f = followers_store(5, 2);

    assert!(f.store.load_more().await.unwrap().is_none());
    assert!(f.api.calls().is_empty());
}

#[tokio::test]
async fn test_pages_accumulate_and_cursor_advances() {
    let f = followers_store(5, 2);
    f.store.open(10);

    f.api.push_users(&[1, 2]);
    f.store.load_more().await.unwrap().unwrap();
    f.api.push_users(&[3, 4]);
    f.store.load_more().await.unwrap().unwrap();

    let state = f.store.snapshot();
    assert_eq!(state.user_ids, vec![1, 2, 3, 4]);
    assert_eq!(state.cursor.current_page, 2);
    assert!(state.has_more);
    assert!(!state.loading);

    let offsets: Vec<u64> = f.api.calls().iter().map(|(_, p)| p.offset).collect();
    assert_eq!(offsets, vec![0, 2]);
}

#[tokio::test]
async fn test_exhausted_list_stops_fetching() {
    let f = followers_store(2, 2);
    f.store.open(10);

    f.api.push_users(&[1, 2]);
    let page = f.store.load_more().await.unwrap().unwrap();
    assert!(!page.has_more);

    assert!(f.store.load_more().await.unwrap().is_none());
    assert_eq!(f.api.calls().len(), 1);
}

#[tokio::test]
async fn test_load_more_while_loading_is_skipped() {
    let f = followers_store(10, 2);
    f.store.open(10);
    f.api.push_users(&[1, 2]);
    let (entered, release) = f.api.hold_next();

    let store = f.store.clone();
    let first = tokio::spawn(async move { store.load_more().await });
    entered.notified().await;

    assert!(f.store.snapshot().loading);
    assert!(f.store.load_more().await.unwrap().is_none());

    release.notify_one();
    let page = first.await.unwrap().unwrap().unwrap();
    assert_eq!(page.user_ids, vec![1, 2]);
    assert_eq!(f.api.calls().len(), 1);
}

#[tokio::test]
async fn test_failed_load_keeps_ids_and_records_error() {
    let f = followers_store(10, 2);
    f.store.open(10);
    f.api.push_users(&[1, 2]);
    f.store.load_more().await.unwrap();

    f.api.fail_next(500, "boom");
    let err = f.store.load_more().await.unwrap_err();
    assert!(matches!(err, ListError::Api(500, _)));

    let state = f.store.snapshot();
    assert_eq!(state.user_ids, vec![1, 2]);
    assert_eq!(state.cursor.current_page, 1, "cursor not advanced on failure");
    assert!(!state.loading);
    assert!(state.last_error.unwrap().contains("boom"));

    f.api.push_users(&[3]);
    f.store.load_more().await.unwrap().unwrap();
    let state = f.store.snapshot();
    assert_eq!(state.user_ids, vec![1, 2, 3]);
    assert!(state.last_error.is_none());
}

#[tokio::test]
async fn test_reset_discards_in_flight_load() {
    let f = followers_store(10, 2);
    f.store.open(10);
    f.api.push_users(&[1, 2]);
    let (entered, _release) = f.api.hold_next();

    let store = f.store.clone();
    let pending = tokio::spawn(async move { store.load_more().await });
    entered.notified().await;

    f.store.reset();
    assert!(pending.await.unwrap().unwrap().is_none());

    let state = f.store.snapshot();
    assert!(state.entity_id.is_none());
    assert!(state.user_ids.is_empty());
    assert!(!state.loading);
}

#[tokio::test]
async fn test_open_starts_fresh_list() {
    let f = followers_store(10, 2);
    f.store.open(10);
    f.api.push_users(&[1, 2]);
    f.store.load_more().await.unwrap();

    f.store.open(10);
    let state = f.store.snapshot();
    assert_eq!(state.entity_id, Some(10));
    assert!(state.user_ids.is_empty());
    assert_eq!(state.cursor.current_page, 0);
    assert!(state.has_more);
}

#[tokio::test]
async fn test_events_emitted_for_load_failure_and_reset() {
    let f = followers_store(10, 2);
    let mut rx = f.events.subscribe();
    f.store.open(10);

    f.api.push_users(&[1, 2]);
    f.store.load_more().await.unwrap();
    f.api.fail_next(502, "bad gateway");
    let _ = f.store.load_more().await;
    f.store.reset();

    match rx.recv().await.unwrap() {
        ListEvent::PageLoaded {
            list,
            entity_id,
            page,
            total,
            has_more,
            ..
        } => {
            assert_eq!(list, "followers");
            assert_eq!((entity_id, page, total, has_more), (10, 0, 2, true));
        }
        other => panic!("unexpected event {:?}", other),
    }
    match rx.recv().await.unwrap() {
        ListEvent::LoadFailed { page, message, .. } => {
            assert_eq!(page, 1);
            assert!(message.contains("bad gateway"));
        }
        other => panic!("unexpected event {:?}", other),
    }
    assert!(matches!(rx.recv().await.unwrap(), ListEvent::Reset { .. }));
}

#[tokio::test]
async fn test_reopen_same_entity_while_loading_starts_new_load() {
    let f = followers_store(10, 2);
    f.store.open(10);
    let (entered, _release) = f.api.hold_next();

    let store = f.store.clone();
    let abandoned = tokio::spawn(async move { store.load_more().await });
    entered.notified().await;

    f.store.open(10);
    f.api.push_users(&[3, 4]);
    let page = f.store.load_more().await.unwrap().unwrap();
    assert_eq!(page.user_ids, vec![3, 4]);

    assert!(abandoned.await.unwrap().unwrap().is_none());

    let state = f.store.snapshot();
    assert_eq!(state.user_ids, vec![3, 4]);
    assert_eq!(state.cursor.current_page, 1);
    assert!(state.last_error.is_none());
    assert!(!state.loading);
    assert!(!f.store.provider().is_loading(10));
}
