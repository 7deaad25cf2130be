//! Tipping lists: a user's top supporters and the users they support
//!
//! Each page carries rank and amount per row. Those are written to the
//! [`SupportersStore`] before the page is merged.

use super::below_total;
use crate::api::{FetchParams, RelatedUsersApi};
use crate::error::Result;
use crate::provider::{FetchedUsers, UserListSource};
use crate::repository::{SupportersStore, UserCache};
use async_trait::async_trait;
use audience_common::models::{Id, SupportRecord, UserSummary};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TippingKind {
    /// Users who tipped the entity user, by rank
    Supporters,
    /// Users the entity user has tipped, by rank
    Supporting,
}

pub struct TippingSource {
    kind: TippingKind,
    api: Arc<dyn RelatedUsersApi>,
    users: Arc<dyn UserCache>,
    supporters: Arc<dyn SupportersStore>,
}

impl TippingSource {
    pub fn new(
        kind: TippingKind,
        api: Arc<dyn RelatedUsersApi>,
        users: Arc<dyn UserCache>,
        supporters: Arc<dyn SupportersStore>,
    ) -> Self {
        Self {
            kind,
            api,
            users,
            supporters,
        }
    }

    pub fn kind(&self) -> TippingKind {
        self.kind
    }
}

#[async_trait]
impl UserListSource for TippingSource {
    type Entity = UserSummary;
    type Extra = Vec<SupportRecord>;

    fn name(&self) -> &'static str {
        match self.kind {
            TippingKind::Supporters => "supporters",
            TippingKind::Supporting => "supporting",
        }
    }

    fn get_existing_entity(&self, id: Id) -> Option<UserSummary> {
        self.users.get_user(id)
    }

    fn extract_user_id_subset(&self, _entity: &UserSummary) -> Vec<Id> {
        Vec::new()
    }

    async fn fetch_all_users_for_entity(&self, params: FetchParams) -> Result<FetchedUsers<Vec<SupportRecord>>> {
        let entity_id = params.entity_id;
        let (users, records): (Vec<UserSummary>, Vec<SupportRecord>) = match self.kind {
            TippingKind::Supporters => self
                .api
                .supporters(params)
                .await?
                .into_iter()
                .map(|row| {
                    let record = SupportRecord {
                        sender_id: row.sender.user_id,
                        receiver_id: entity_id,
                        rank: row.rank,
                        amount: row.amount,
                    };
                    (row.sender, record)
                })
                .unzip(),
            TippingKind::Supporting => self
                .api
                .supporting(params)
                .await?
                .into_iter()
                .map(|row| {
                    let record = SupportRecord {
                        sender_id: entity_id,
                        receiver_id: row.receiver.user_id,
                        rank: row.rank,
                        amount: row.amount,
                    };
                    (row.receiver, record)
                })
                .unzip(),
        };
        Ok(FetchedUsers::with_extra(users, records))
    }

    fn can_fetch_more_users(&self, user: &UserSummary, combined_ids: &[Id]) -> bool {
        let total = match self.kind {
            TippingKind::Supporters => user.supporter_count,
            TippingKind::Supporting => user.supporting_count,
        };
        below_total(combined_ids, total)
    }

    async fn process_extra(&self, entity_id: Id, records: Vec<SupportRecord>) -> Result<()> {
        match self.kind {
            TippingKind::Supporters => self.supporters.set_supporters_for_user(entity_id, records),
            TippingKind::Supporting => self.supporters.set_supporting_for_user(entity_id, records),
        }
        Ok(())
    }
}
