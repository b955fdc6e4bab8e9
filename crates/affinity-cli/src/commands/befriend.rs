//! Befriend command implementation.

use super::{parse_instant, parse_party};
use crate::cli::BefriendArgs;
use crate::error::Result;
use crate::output::Formatter;
use affinity_store::SqliteStore;

/// Execute the befriend command.
pub async fn execute_befriend(
    args: BefriendArgs,
    store: &SqliteStore,
    formatter: &Formatter,
) -> Result<()> {
    let subject = parse_party(&args.pair.subject)?;
    let counterpart = parse_party(&args.pair.counterpart)?;
    let since = parse_instant(args.since.as_deref())?;

    let record = store.add_relationship(&subject, &counterpart, since)?;
    tracing::info!(relationship_id = %record.id, "Relationship created");

    println!("{}", formatter.format_relationship(&record)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::PairArgs;
    use crate::config::OutputFormat;
    use crate::error::CliError;
    use affinity_domain::PartyId;
    use affinity_store::StoreError;

    fn args(subject: &str, counterpart: &str) -> BefriendArgs {
        BefriendArgs {
            pair: PairArgs {
                subject: subject.to_string(),
                counterpart: counterpart.to_string(),
            },
            since: Some("2025-01-01".to_string()),
        }
    }

    #[tokio::test]
    async fn test_befriend_creates_relationship() {
        let store = SqliteStore::in_memory().unwrap();
        let formatter = Formatter::new(OutputFormat::Quiet, false);

        execute_befriend(args("mina", "joon"), &store, &formatter)
            .await
            .unwrap();

        let found = store
            .find_relationship(&PartyId::new("joon"), &PartyId::new("mina"))
            .unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn test_befriend_twice_is_duplicate() {
        let store = SqliteStore::in_memory().unwrap();
        let formatter = Formatter::new(OutputFormat::Quiet, false);

        execute_befriend(args("mina", "joon"), &store, &formatter)
            .await
            .unwrap();
        let again = execute_befriend(args("joon", "mina"), &store, &formatter).await;
        assert!(matches!(again, Err(CliError::Store(StoreError::Duplicate(_)))));
    }
}
