//! Friends command implementation.

use super::parse_party;
use crate::cli::FriendsArgs;
use crate::error::Result;
use crate::output::{FriendEntry, Formatter};
use affinity_domain::{AffinityTier, PartyId, RelationshipRecord};
use affinity_store::SqliteStore;

/// Execute the friends command.
///
/// Lists stored scores without recomputing them; see `rescore`.
pub async fn execute_friends(
    args: FriendsArgs,
    store: &SqliteStore,
    formatter: &Formatter,
) -> Result<()> {
    let subject = parse_party(&args.subject)?;
    let records = store.relationships_for(&subject)?;
    let min_tier = args.min_tier.map(AffinityTier::from);

    let entries = rank_friends(&records, &subject, min_tier, args.limit);
    println!("{}", formatter.format_friends(&subject, &entries)?);
    Ok(())
}

/// Stored scores highest first, ties by relationship id.
fn rank_friends(
    records: &[RelationshipRecord],
    subject: &PartyId,
    min_tier: Option<AffinityTier>,
    limit: Option<usize>,
) -> Vec<FriendEntry> {
    let mut entries: Vec<FriendEntry> = records
        .iter()
        .filter_map(|record| FriendEntry::from_record(record, subject))
        .filter(|entry| min_tier.is_none_or(|tier| AffinityTier::from_score(entry.score) >= tier))
        .collect();

    entries.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.relationship_id.cmp(&b.relationship_id))
    });
    if let Some(limit) = limit {
        entries.truncate(limit);
    }
    entries
}
