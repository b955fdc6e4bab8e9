//! Score command implementation.

use super::parse_party;
use crate::cli::PairArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use affinity_engine::AffinityEngine;
use affinity_store::SqliteStore;

/// Execute the score command.
pub async fn execute_score(
    args: PairArgs,
    engine: &AffinityEngine<SqliteStore>,
    formatter: &Formatter,
) -> Result<()> {
    let subject = parse_party(&args.subject)?;
    let counterpart = parse_party(&args.counterpart)?;

    let record = engine
        .repository()
        .find_relationship(&subject, &counterpart)?
        .ok_or_else(|| {
            CliError::InvalidInput(format!(
                "No relationship between {} and {}. Use 'befriend' first.",
                subject, counterpart
            ))
        })?;

    let outcome = engine.evaluate(&subject, &counterpart, record.id).await;
    println!("{}", formatter.format_outcome(&subject, &counterpart, &outcome)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use affinity_domain::PartyId;
    use affinity_engine::EngineConfig;
    use chrono::{Duration, Utc};

    fn pair() -> PairArgs {
        PairArgs {
            subject: "mina".to_string(),
            counterpart: "joon".to_string(),
        }
    }

    #[tokio::test]
    async fn test_score_persists_total() {
        let store = SqliteStore::in_memory().unwrap();
        let record = store
            .add_relationship(
                &PartyId::new("mina"),
                &PartyId::new("joon"),
                Utc::now() - Duration::days(400),
            )
            .unwrap();
        let engine = AffinityEngine::new(store, EngineConfig::default());
        let formatter = Formatter::new(OutputFormat::Quiet, false);

        execute_score(pair(), &engine, &formatter).await.unwrap();

        let stored = engine.repository().relationship(record.id).unwrap().unwrap();
        assert_eq!(stored.affinity_score, 10);
    }

    #[tokio::test]
    async fn test_score_requires_relationship() {
        let engine = AffinityEngine::with_defaults(SqliteStore::in_memory().unwrap());
        let formatter = Formatter::new(OutputFormat::Quiet, false);

        let result = execute_score(pair(), &engine, &formatter).await;
        assert!(matches!(result, Err(CliError::InvalidInput(_))));
    }
}
