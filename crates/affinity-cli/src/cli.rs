//! CLI command definitions and argument parsing.

use affinity_domain::AffinityTier;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Affinity CLI - Score how close two parties are from their message history.
#[derive(Debug, Parser)]
#[command(name = "affinity")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "AFFINITY_CONFIG")]
    pub config: Option<PathBuf>,

    /// SQLite database path
    #[arg(long, global = true, env = "AFFINITY_DB")]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (scores and ids only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a relationship between two parties
    Befriend(BefriendArgs),

    /// Delete the relationship between two parties
    Unfriend(PairArgs),

    /// Record messages sent from one party to another
    Send(SendArgs),

    /// Compute the affinity score of a relationship
    Score(PairArgs),

    /// List a party's relationships by stored score
    Friends(FriendsArgs),

    /// Recompute every relationship of a party
    Rescore(RescoreArgs),

    /// Show how the score is made up
    Explain,
}

/// Two parties of a relationship.
#[derive(Debug, Parser)]
pub struct PairArgs {
    /// Subject party id
    pub subject: String,

    /// Counterpart party id
    pub counterpart: String,
}

/// Arguments for the befriend command.
#[derive(Debug, Parser)]
pub struct BefriendArgs {
    #[command(flatten)]
    pub pair: PairArgs,

    /// When the relationship started (RFC 3339 or YYYY-MM-DD, default now)
    #[arg(short, long)]
    pub since: Option<String>,
}

/// Arguments for the send command.
#[derive(Debug, Parser)]
pub struct SendArgs {
    /// Sending party id
    pub from: String,

    /// Receiving party id
    pub to: String,

    /// Number of messages to record
    #[arg(short = 'n', long, default_value = "1")]
    pub count: u32,

    /// When the messages were sent (RFC 3339 or YYYY-MM-DD, default now)
    #[arg(long)]
    pub at: Option<String>,
}

/// Arguments for the friends command.
#[derive(Debug, Parser)]
pub struct FriendsArgs {
    /// Party whose relationships to list
    pub subject: String,

    /// Only show relationships at or above this tier
    #[arg(short = 't', long, value_enum)]
    pub min_tier: Option<TierArg>,

    /// Maximum number of results
    #[arg(short, long)]
    pub limit: Option<usize>,
}

/// Arguments for the rescore command.
#[derive(Debug, Parser)]
pub struct RescoreArgs {
    /// Party whose relationships to rescore
    pub subject: String,

    /// Maximum number of results to print
    #[arg(short, long)]
    pub limit: Option<usize>,
}

/// Tier argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum TierArg {
    /// 85 and above
    BestFriend,
    /// 70 to 84
    CloseFriend,
    /// 50 to 69
    Friend,
    /// 30 to 49
    GettingToKnow,
    /// Below 30
    Stranger,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

impl From<TierArg> for AffinityTier {
    fn from(tier: TierArg) -> Self {
        match tier {
            TierArg::BestFriend => AffinityTier::BestFriend,
            TierArg::CloseFriend => AffinityTier::CloseFriend,
            TierArg::Friend => AffinityTier::Friend,
            TierArg::GettingToKnow => AffinityTier::GettingToKnow,
            TierArg::Stranger => AffinityTier::Stranger,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_command() {
        let cli = Cli::parse_from(["affinity", "score", "mina", "joon"]);
        match cli.command {
            Command::Score(args) => {
                assert_eq!(args.subject, "mina");
                assert_eq!(args.counterpart, "joon");
            }
            _ => panic!("Expected Score command"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "affinity", "friends", "mina", "--format", "json", "--no-color", "--db", "/tmp/a.db",
        ]);
        assert!(matches!(cli.format, Some(CliFormat::Json)));
        assert!(cli.no_color);
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/a.db")));
    }

    #[test]
    fn test_send_defaults_to_one_message() {
        let cli = Cli::parse_from(["affinity", "send", "mina", "joon"]);
        match cli.command {
            Command::Send(args) => {
                assert_eq!(args.count, 1);
                assert!(args.at.is_none());
            }
            _ => panic!("Expected Send command"),
        }
    }

    #[test]
    fn test_befriend_with_since() {
        let cli = Cli::parse_from(["affinity", "befriend", "mina", "joon", "--since", "2025-01-02"]);
        match cli.command {
            Command::Befriend(args) => {
                assert_eq!(args.pair.subject, "mina");
                assert_eq!(args.since.as_deref(), Some("2025-01-02"));
            }
            _ => panic!("Expected Befriend command"),
        }
    }

    #[test]
    fn test_tier_conversion() {
        let cli = Cli::parse_from(["affinity", "friends", "mina", "--min-tier", "close-friend"]);
        match cli.command {
            Command::Friends(args) => {
                let tier: AffinityTier = args.min_tier.unwrap().into();
                assert_eq!(tier, AffinityTier::CloseFriend);
            }
            _ => panic!("Expected Friends command"),
        }
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["affinity"]).is_err());
    }
}
