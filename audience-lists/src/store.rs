//! Caller-side state for one on-screen user list
//!
//! Threads the displayed ids and the pagination cursor back into the
//! provider on every `load_more`, gates overlapping loads on the `loading`
//! flag and broadcasts a [`ListEvent`] for every state change.

use crate::error::{ListError, Result};
use crate::pagination::PaginationCursor;
use crate::provider::{UserListPage, UserListProvider, UserListRequest, UserListSource};
use audience_common::events::{EventBus, ListEvent};
use audience_common::models::Id;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Snapshot of a list's state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserListState {
    /// Entity the list is about; `None` until a list is opened
    pub entity_id: Option<Id>,
    /// Next page to request
    pub cursor: PaginationCursor,
    pub user_ids: Vec<Id>,
    pub has_more: bool,
    pub loading: bool,
    pub last_error: Option<String>,
}

impl UserListState {
    fn closed(page_size: u32) -> Self {
        Self {
            entity_id: None,
            cursor: PaginationCursor::first(page_size),
            user_ids: Vec::new(),
            has_more: false,
            loading: false,
            last_error: None,
        }
    }
}

struct Inner {
    state: UserListState,
    /// Bumped on open/reset so results of abandoned loads are discarded
    generation: u64,
    cancel: CancellationToken,
}

/// Paginated state for one list kind, driven by a [`UserListProvider`]
///
/// Holds at most one open list at a time. `open` and `reset` cancel the
/// load in flight; the provider lets the next load for the same entity start
/// right away instead of waiting for the cancelled one to unwind.
pub struct UserListStore<S> {
    provider: Arc<UserListProvider<S>>,
    events: Arc<EventBus>,
    page_size: u32,
    inner: Mutex<Inner>,
}

impl<S: UserListSource> UserListStore<S> {
    pub fn new(provider: Arc<UserListProvider<S>>, events: Arc<EventBus>, page_size: u32) -> Self {
        Self {
            provider,
            events,
            page_size,
            inner: Mutex::new(Inner {
                state: UserListState::closed(page_size),
                generation: 0,
                cancel: CancellationToken::new(),
            }),
        }
    }

    pub fn provider(&self) -> &Arc<UserListProvider<S>> {
        &self.provider
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> UserListState {
        self.lock().state.clone()
    }

    /// Start a fresh list for `entity_id`, abandoning any load in flight
    pub fn open(&self, entity_id: Id) {
        let mut inner = self.lock();
        inner.cancel.cancel();
        inner.cancel = CancellationToken::new();
        inner.generation += 1;
        inner.state = UserListState::closed(self.page_size);
        inner.state.entity_id = Some(entity_id);
        inner.state.has_more = true;
        debug!(list = self.provider.name(), entity_id, "Opened user list");
    }

    /// Clear the list, abandoning any load in flight
    pub fn reset(&self) {
        {
            let mut inner = self.lock();
            inner.cancel.cancel();
            inner.cancel = CancellationToken::new();
            inner.generation += 1;
            inner.state = UserListState::closed(self.page_size);
        }
        self.events.emit_lossy(ListEvent::Reset {
            list: self.provider.name().to_string(),
            timestamp: chrono::Utc::now(),
        });
    }

    /// Load the next page
    ///
    /// Returns `Ok(None)` without fetching when no list is open, a load is
    /// already running, or the list is exhausted. Results of a load that was
    /// overtaken by `open`/`reset` are discarded and also yield `Ok(None)`.
    pub async fn load_more(&self) -> Result<Option<UserListPage>> {
        let list = self.provider.name();
        let (request, generation) = {
            let mut inner = self.lock();
            let Some(entity_id) = inner.state.entity_id else {
                return Ok(None);
            };
            if inner.state.loading || !inner.state.has_more {
                debug!(list, entity_id, loading = inner.state.loading, "Skipping load_more");
                return Ok(None);
            }
            inner.state.loading = true;
            inner.state.last_error = None;

            let cursor = inner.state.cursor;
            let request = UserListRequest::new(entity_id, cursor.current_page, cursor.page_size)
                .with_existing_user_ids(inner.state.user_ids.clone())
                .with_cancel(inner.cancel.child_token());
            (request, inner.generation)
        };

        let entity_id = request.id;
        let page = request.current_page;
        let result = self.provider.fetch(request).await;

        let mut inner = self.lock();
        if inner.generation != generation {
            debug!(list, entity_id, page, "Discarding result of abandoned load");
            return Ok(None);
        }
        inner.state.loading = false;

        match result {
            Ok(loaded) => {
                inner.state.user_ids = loaded.user_ids.clone();
                inner.state.has_more = loaded.has_more;
                inner.state.cursor = inner.state.cursor.next();
                drop(inner);

                self.events.emit_lossy(ListEvent::PageLoaded {
                    list: list.to_string(),
                    entity_id,
                    page,
                    total: loaded.user_ids.len(),
                    has_more: loaded.has_more,
                    timestamp: chrono::Utc::now(),
                });
                Ok(Some(loaded))
            }
            Err(ListError::Cancelled) => Ok(None),
            Err(e) => {
                warn!(list, entity_id, page, error = %e, "Failed to load user list page");
                inner.state.last_error = Some(e.to_string());
                drop(inner);

                self.events.emit_lossy(ListEvent::LoadFailed {
                    list: list.to_string(),
                    entity_id,
                    page,
                    message: e.to_string(),
                    timestamp: chrono::Utc::now(),
                });
                Err(e)
            }
        }
    }
}
