//! # Audience user lists
//!
//! Paginated "users related to an entity" lists for a music social client:
//! followers, following, mutuals, reposts, favorites, supporters and
//! supporting. A [`UserListProvider`] reconciles each fetched page with the
//! ids already on screen; a [`UserListStore`] holds that on-screen state.

pub mod api;
pub mod error;
pub mod pagination;
pub mod provider;
pub mod repository;
pub mod sources;
pub mod store;

pub use error::{ListError, Result};
pub use pagination::PaginationCursor;
pub use provider::{merge_user_ids, FetchedUsers, UserListPage, UserListProvider, UserListRequest, UserListSource};
pub use store::{UserListState, UserListStore};
