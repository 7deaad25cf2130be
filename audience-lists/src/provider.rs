//! User list reconciliation provider
//!
//! Produces the on-screen id list for "users related to an entity" screens
//! (followers, reposters, supporters, ...). One call loads one page:
//!
//! 1. Look up the cached entity; absent entities yield an empty page
//! 2. Extract the prioritized subset (e.g. followees who reposted)
//! 3. Fetch the page at `current_page * page_size`
//! 4. Optionally append the logged-in user
//! 5. Hand any extra payload to the source (e.g. supporter ranks)
//! 6. Merge subset, existing ids and the new page without duplicates
//! 7. Upsert fetched users into the shared user cache
//! 8. Ask the source whether more pages exist
//!
//! Fetch failures propagate unchanged. Overlapping calls for the same entity
//! are rejected with [`ListError::AlreadyLoading`] unless the earlier call's
//! cancellation token has fired, in which case the new call takes over.

use crate::api::FetchParams;
use crate::error::{ListError, Result};
use crate::pagination::PaginationCursor;
use crate::repository::{AccountRepository, UserCache};
use async_trait::async_trait;
use audience_common::models::{Id, UserSummary};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// One page as returned by a source's remote fetcher
#[derive(Debug, Clone)]
pub struct FetchedUsers<E> {
    pub users: Vec<UserSummary>,
    /// Auxiliary data riding along with the page (e.g. supporter ranks)
    pub extra: Option<E>,
}

impl<E> FetchedUsers<E> {
    pub fn new(users: Vec<UserSummary>) -> Self {
        Self { users, extra: None }
    }

    pub fn with_extra(users: Vec<UserSummary>, extra: E) -> Self {
        Self {
            users,
            extra: Some(extra),
        }
    }
}

/// Provider output: the merged id list and whether to offer "load more"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserListPage {
    pub user_ids: Vec<Id>,
    pub has_more: bool,
}

impl UserListPage {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// A single page request
#[derive(Debug, Clone)]
pub struct UserListRequest {
    /// Entity the list is about
    pub id: Id,
    pub current_page: u32,
    pub page_size: u32,
    /// Ids the caller already displays for this list
    pub existing_user_ids: Vec<Id>,
    /// Aborts the remote fetch; nothing is cached when it fires
    pub cancel: Option<CancellationToken>,
}

impl UserListRequest {
    pub fn new(id: Id, current_page: u32, page_size: u32) -> Self {
        Self {
            id,
            current_page,
            page_size,
            existing_user_ids: Vec::new(),
            cancel: None,
        }
    }

    pub fn with_existing_user_ids(mut self, ids: Vec<Id>) -> Self {
        self.existing_user_ids = ids;
        self
    }

    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn cursor(&self) -> PaginationCursor {
        PaginationCursor::new(self.current_page, self.page_size)
    }
}

/// Per-list behavior plugged into [`UserListProvider`]
#[async_trait]
pub trait UserListSource: Send + Sync {
    /// Cached entity the list is about (track, collection or user)
    type Entity: Send + Sync;
    /// Auxiliary payload returned alongside a page
    type Extra: Send;

    /// Stable list tag used in logs and events
    fn name(&self) -> &'static str;

    fn get_existing_entity(&self, id: Id) -> Option<Self::Entity>;

    /// Prioritized ids shown first on page 0. Must be deterministic.
    fn extract_user_id_subset(&self, entity: &Self::Entity) -> Vec<Id>;

    /// The only I/O step: at most `params.limit` users in ranked order
    async fn fetch_all_users_for_entity(&self, params: FetchParams) -> Result<FetchedUsers<Self::Extra>>;

    /// Whether the logged-in user belongs in this list
    fn include_current_user(&self, _entity: &Self::Entity) -> bool {
        false
    }

    fn can_fetch_more_users(&self, entity: &Self::Entity, combined_ids: &[Id]) -> bool;

    /// Store the page's extra payload; errors abort the page
    async fn process_extra(&self, _entity_id: Id, _extra: Self::Extra) -> Result<()> {
        Ok(())
    }
}

/// Merge ids for display, keeping the first occurrence of each id
///
/// Page 0: `subset ++ existing ++ fetched`; later pages: `existing ++ fetched`.
/// Fetched ids that belong to the subset are dropped so they keep their
/// subset position.
pub fn merge_user_ids(current_page: u32, subset: &[Id], existing: &[Id], fetched: &[Id]) -> Vec<Id> {
    let subset_set: HashSet<Id> = subset.iter().copied().collect();
    let leading: &[Id] = if current_page == 0 { subset } else { &[] };
    let filtered = fetched.iter().copied().filter(|id| !subset_set.contains(id));

    let mut seen = HashSet::with_capacity(leading.len() + existing.len() + fetched.len());
    leading
        .iter()
        .copied()
        .chain(existing.iter().copied())
        .chain(filtered)
        .filter(|id| seen.insert(*id))
        .collect()
}

/// Running fetch for one entity
struct InFlight {
    ticket: u64,
    cancel: Option<CancellationToken>,
}

impl InFlight {
    /// A cancelled fetch only holds its slot until it is next polled
    fn is_abandoned(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled)
    }
}

/// Marks an entity's list as loading until dropped
///
/// Only clears the slot if it still belongs to this fetch; a newer fetch may
/// have taken over after this one was cancelled.
struct InFlightGuard<'a> {
    in_flight: &'a Mutex<HashMap<Id, InFlight>>,
    id: Id,
    ticket: u64,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if in_flight.get(&self.id).is_some_and(|f| f.ticket == self.ticket) {
            in_flight.remove(&self.id);
        }
    }
}

/// Loads and reconciles pages for one list kind
pub struct UserListProvider<S> {
    source: S,
    user_cache: Arc<dyn UserCache>,
    account: Arc<dyn AccountRepository>,
    in_flight: Mutex<HashMap<Id, InFlight>>,
    next_ticket: AtomicU64,
}

impl<S: UserListSource> UserListProvider<S> {
    pub fn new(source: S, user_cache: Arc<dyn UserCache>, account: Arc<dyn AccountRepository>) -> Self {
        Self {
            source,
            user_cache,
            account,
            in_flight: Mutex::new(HashMap::new()),
            next_ticket: AtomicU64::new(0),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn name(&self) -> &'static str {
        self.source.name()
    }

    /// Whether a page for `id` is currently being fetched
    ///
    /// Cancelled fetches that have not unwound yet do not count.
    pub fn is_loading(&self, id: Id) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .is_some_and(|f| !f.is_abandoned())
    }

    fn begin(&self, id: Id, cancel: Option<&CancellationToken>) -> Result<InFlightGuard<'_>> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(running) = in_flight.get(&id) {
            if !running.is_abandoned() {
                return Err(ListError::AlreadyLoading {
                    list: self.source.name(),
                    id,
                });
            }
            trace!(list = self.source.name(), entity_id = id, "Taking over from cancelled fetch");
        }

        let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);
        in_flight.insert(
            id,
            InFlight {
                ticket,
                cancel: cancel.cloned(),
            },
        );
        Ok(InFlightGuard {
            in_flight: &self.in_flight,
            id,
            ticket,
        })
    }

    /// Load one page and merge it with the caller's existing ids
    pub async fn fetch(&self, request: UserListRequest) -> Result<UserListPage> {
        let list = self.source.name();
        let _guard = self.begin(request.id, request.cancel.as_ref())?;

        let Some(entity) = self.source.get_existing_entity(request.id) else {
            debug!(list, entity_id = request.id, "Entity not cached, returning empty list");
            return Ok(UserListPage::empty());
        };

        let subset_ids = self.source.extract_user_id_subset(&entity);
        let cursor = request.cursor();
        let current_user = self.account.current_user();
        let params = FetchParams {
            limit: cursor.page_size,
            offset: cursor.offset(),
            entity_id: request.id,
            current_user_id: current_user.as_ref().map(|u| u.user_id),
        };

        debug!(
            list,
            entity_id = request.id,
            page = cursor.current_page,
            offset = params.offset,
            limit = params.limit,
            "Fetching user list page"
        );

        let fetch = self.source.fetch_all_users_for_entity(params);
        let FetchedUsers { mut users, extra } = match &request.cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => {
                    debug!(list, entity_id = request.id, "User list fetch cancelled");
                    return Err(ListError::Cancelled);
                }
                result = fetch => result?,
            },
            None => fetch.await?,
        };

        if self.source.include_current_user(&entity) {
            if let Some(user) = current_user {
                users.push(user);
            }
        }

        if let Some(extra) = extra {
            self.source.process_extra(request.id, extra).await?;
        }

        let fetched_ids: Vec<Id> = users.iter().map(|u| u.user_id).collect();
        let user_ids = merge_user_ids(
            cursor.current_page,
            &subset_ids,
            &request.existing_user_ids,
            &fetched_ids,
        );

        self.user_cache.upsert_users(&users);

        let has_more = self.source.can_fetch_more_users(&entity, &user_ids);
        trace!(list, entity_id = request.id, total = user_ids.len(), has_more, "Merged user list page");

        Ok(UserListPage { user_ids, has_more })
    }
}
