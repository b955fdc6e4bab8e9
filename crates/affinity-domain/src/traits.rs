//! Trait definitions for external interactions
//!
//! These traits define the boundary between the scoring logic and whatever
//! persistence the host application uses. Implementations live in other
//! crates (`affinity-store` ships a SQLite one).

use crate::{ChannelKey, InteractionRecord, PartyId, RelationshipId, RelationshipRecord};
use std::future::Future;

/// Data access contract required by the affinity engine
///
/// Every method is asynchronous; the futures are `Send` so the engine can
/// be driven from a multi-threaded runtime.
pub trait AffinityRepository {
    /// Error type for repository operations
    type Error: std::fmt::Display;

    /// Look up a relationship record
    ///
    /// Returns `Ok(None)` when the record does not exist.
    fn get_relationship(
        &self,
        id: RelationshipId,
    ) -> impl Future<Output = Result<Option<RelationshipRecord>, Self::Error>> + Send;

    /// Most recent interactions of a channel, newest first, at most `limit`
    fn get_interactions(
        &self,
        channel: &ChannelKey,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<InteractionRecord>, Self::Error>> + Send;

    /// Persist the aggregate score [0, 100] of a relationship
    fn set_affinity_score(
        &self,
        id: RelationshipId,
        score: u8,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Every relationship the party takes part in, on either side
    fn list_relationships(
        &self,
        party: &PartyId,
    ) -> impl Future<Output = Result<Vec<RelationshipRecord>, Self::Error>> + Send;
}
