//! Unfriend command implementation.

use super::parse_party;
use crate::cli::PairArgs;
use crate::error::Result;
use crate::output::Formatter;
use affinity_store::SqliteStore;

/// Execute the unfriend command.
pub async fn execute_unfriend(
    args: PairArgs,
    store: &SqliteStore,
    formatter: &Formatter,
) -> Result<()> {
    let subject = parse_party(&args.subject)?;
    let counterpart = parse_party(&args.counterpart)?;

    match store.find_relationship(&subject, &counterpart)? {
        Some(record) => {
            store.remove_relationship(record.id)?;
            tracing::info!(relationship_id = %record.id, "Relationship removed");
            println!(
                "{}",
                formatter.success(&format!(
                    "Relationship {} removed: {} ↔ {}",
                    record.id, subject, counterpart
                ))
            );
        }
        None => {
            println!(
                "{}",
                formatter.warning(&format!(
                    "No relationship between {} and {}",
                    subject, counterpart
                ))
            );
        }
    }

    Ok(())
}
