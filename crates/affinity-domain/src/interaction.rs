//! Interaction module - one observed message between two parties

use crate::PartyId;
use chrono::{DateTime, Utc};

/// Default number of most recent interactions read per relationship
pub const INTERACTION_WINDOW_LIMIT: usize = 1000;

/// A single message event in a channel
///
/// Interactions are immutable once created and owned by the message store.
/// The scoring layer only reads a bounded, most-recent-first window of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionRecord {
    /// Party that produced the interaction
    pub sender_id: PartyId,

    /// When the interaction happened
    pub occurred_at: DateTime<Utc>,
}

impl InteractionRecord {
    /// Create a new interaction record
    pub fn new(sender_id: impl Into<PartyId>, occurred_at: DateTime<Utc>) -> Self {
        Self {
            sender_id: sender_id.into(),
            occurred_at,
        }
    }
}

/// Latest `occurred_at` in a window, independent of the window's ordering
pub fn latest_interaction(interactions: &[InteractionRecord]) -> Option<DateTime<Utc>> {
    interactions.iter().map(|i| i.occurred_at).max()
}

/// Copy of the window ordered most recent first
///
/// The sort is stable, so interactions with equal timestamps keep their
/// arrival order.
pub fn most_recent_first(interactions: &[InteractionRecord]) -> Vec<&InteractionRecord> {
    let mut ordered: Vec<&InteractionRecord> = interactions.iter().collect();
    ordered.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
    ordered
}
