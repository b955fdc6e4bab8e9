//! Relationship module - the connection edge between two parties

use crate::{ChannelKey, PartyId, RelationshipId};
use chrono::{DateTime, Utc};

/// Affinity score given to a relationship before it has ever been scored
pub const INITIAL_AFFINITY_SCORE: u8 = 50;

/// A connection between a subject and a counterpart
///
/// The pair is order-independent for lookup: both orderings share one
/// [`ChannelKey`]. `affinity_score` is the last persisted aggregate and is
/// only ever written by the scoring engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipRecord {
    /// Record identifier
    pub id: RelationshipId,

    /// Party that created the connection
    pub subject_id: PartyId,

    /// The other party
    pub counterpart_id: PartyId,

    /// When the relationship was established
    pub established_at: DateTime<Utc>,

    /// Last computed aggregate score [0, 100]
    pub affinity_score: u8,
}

impl RelationshipRecord {
    /// Create a new relationship record with the initial affinity score
    ///
    /// # Panics
    /// Panics if both parties are the same
    pub fn new(
        id: RelationshipId,
        subject_id: PartyId,
        counterpart_id: PartyId,
        established_at: DateTime<Utc>,
    ) -> Self {
        assert!(subject_id != counterpart_id, "A relationship needs two distinct parties");

        Self {
            id,
            subject_id,
            counterpart_id,
            established_at,
            affinity_score: INITIAL_AFFINITY_SCORE,
        }
    }

    /// Channel key shared by both parties
    pub fn channel_key(&self) -> ChannelKey {
        ChannelKey::for_pair(&self.subject_id, &self.counterpart_id)
    }

    /// Whether `party` is one of the two ends of this relationship
    pub fn involves(&self, party: &PartyId) -> bool {
        &self.subject_id == party || &self.counterpart_id == party
    }

    /// The party on the other end from `party`, if `party` is involved
    pub fn other_party(&self, party: &PartyId) -> Option<&PartyId> {
        if &self.subject_id == party {
            Some(&self.counterpart_id)
        } else if &self.counterpart_id == party {
            Some(&self.subject_id)
        } else {
            None
        }
    }
}
