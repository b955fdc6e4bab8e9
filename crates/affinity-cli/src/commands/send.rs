//! Send command implementation.

use super::{parse_instant, parse_party};
use crate::cli::SendArgs;
use crate::config::OutputFormat;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use affinity_store::SqliteStore;

/// Execute the send command.
pub async fn execute_send(args: SendArgs, store: &SqliteStore, formatter: &Formatter) -> Result<()> {
    if args.count == 0 {
        return Err(CliError::InvalidInput(
            "Count must be at least 1".to_string(),
        ));
    }

    let from = parse_party(&args.from)?;
    let to = parse_party(&args.to)?;
    let at = parse_instant(args.at.as_deref())?;

    let mut channel = None;
    for _ in 0..args.count {
        channel = Some(store.record_interaction(&from, &to, at)?);
    }

    if let Some(channel) = channel {
        let total = store.interaction_count(&channel)?;
        tracing::debug!(channel = %channel, recorded = args.count, total, "Recorded interactions");

        match formatter.format() {
            OutputFormat::Quiet => println!("{}", total),
            OutputFormat::Json => println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "channel": channel.as_str(),
                    "recorded": args.count,
                    "total": total,
                }))?
            ),
            OutputFormat::Table => println!(
                "{}",
                formatter.success(&format!(
                    "Recorded {} message(s) from {} to {} ({} in total)",
                    args.count, from, to, total
                ))
            ),
        }
    }

    Ok(())
}
