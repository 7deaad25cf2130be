//! Concrete user-list sources
//!
//! - [`SocialSource`]: followers, following and mutuals of a user
//! - [`EngagementSource`]: reposters and favoriters of a track or playlist
//! - [`TippingSource`]: a user's top supporters and the users they support

mod engagement;
mod social;
mod tipping;

pub use engagement::{Engageable, Engagement, EngagementSource, EngagementTarget};
pub use social::{SocialKind, SocialSource};
pub use tipping::{TippingKind, TippingSource};

use audience_common::models::Id;

/// `has_more` policy shared by every list kind: fewer ids shown than the
/// entity's total count
pub(crate) fn below_total(combined_ids: &[Id], total: u64) -> bool {
    (combined_ids.len() as u64) < total
}
