//! Rescore command implementation.

use super::parse_party;
use crate::cli::RescoreArgs;
use crate::config::OutputFormat;
use crate::error::Result;
use crate::output::{FriendEntry, Formatter};
use affinity_engine::AffinityEngine;
use affinity_store::SqliteStore;

/// Execute the rescore command.
pub async fn execute_rescore(
    args: RescoreArgs,
    engine: &AffinityEngine<SqliteStore>,
    formatter: &Formatter,
) -> Result<()> {
    let subject = parse_party(&args.subject)?;
    let rescored = engine.rescore_subject(&subject).await?;

    let mut entries: Vec<FriendEntry> = rescored.iter().map(FriendEntry::from).collect();
    if let Some(limit) = args.limit {
        entries.truncate(limit);
    }

    println!("{}", formatter.format_friends(&subject, &entries)?);
    if formatter.format() == OutputFormat::Table && !rescored.is_empty() {
        let metrics = engine.metrics();
        println!(
            "{}",
            formatter.info(&format!(
                "Rescored {} relationship(s), {} persisted",
                rescored.len(),
                metrics.persisted
            ))
        );
    }
    tracing::debug!("{}", engine.metrics().summary());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use affinity_domain::PartyId;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_rescore_updates_every_relationship() {
        let store = SqliteStore::in_memory().unwrap();
        let mina = PartyId::new("mina");
        let old = store
            .add_relationship(&mina, &PartyId::new("joon"), Utc::now() - Duration::days(400))
            .unwrap();
        let other = store
            .add_relationship(&PartyId::new("hana"), &mina, Utc::now() - Duration::days(400))
            .unwrap();
        let engine = AffinityEngine::with_defaults(store);
        let formatter = Formatter::new(OutputFormat::Quiet, false);

        execute_rescore(
            RescoreArgs {
                subject: "mina".to_string(),
                limit: None,
            },
            &engine,
            &formatter,
        )
        .await
        .unwrap();

        for id in [old.id, other.id] {
            let stored = engine.repository().relationship(id).unwrap().unwrap();
            assert_eq!(stored.affinity_score, 10);
        }
        assert_eq!(engine.metrics().rescore_runs, 1);
    }
}
