//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use affinity_domain::{AffinityTier, PartyId, RelationshipId, RelationshipRecord, ScoreComponent};
use affinity_engine::{AffinityOutcome, RescoredRelationship, ScoreSource};
use colored::*;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// One row of a friends listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FriendEntry {
    /// Relationship record id
    pub relationship_id: RelationshipId,
    /// The other party
    pub counterpart: PartyId,
    /// Affinity score [0, 100]
    pub score: u8,
    /// Score is the degenerate placeholder
    pub fallback: bool,
}

impl FriendEntry {
    /// Entry for a stored relationship, seen from `subject`.
    pub fn from_record(record: &RelationshipRecord, subject: &PartyId) -> Option<Self> {
        record.other_party(subject).map(|counterpart| Self {
            relationship_id: record.id,
            counterpart: counterpart.clone(),
            score: record.affinity_score,
            fallback: false,
        })
    }
}

impl From<&RescoredRelationship> for FriendEntry {
    fn from(rescored: &RescoredRelationship) -> Self {
        Self {
            relationship_id: rescored.relationship.id,
            counterpart: rescored.counterpart_id.clone(),
            score: rescored.outcome.breakdown.total,
            fallback: rescored.outcome.is_fallback(),
        }
    }
}

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Active output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format a computed score and its breakdown.
    pub fn format_outcome(
        &self,
        subject: &PartyId,
        counterpart: &PartyId,
        outcome: &AffinityOutcome,
    ) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.format_outcome_json(subject, counterpart, outcome),
            OutputFormat::Table => Ok(self.format_outcome_table(subject, counterpart, outcome)),
            OutputFormat::Quiet => Ok(outcome.breakdown.total.to_string()),
        }
    }

    fn format_outcome_json(
        &self,
        subject: &PartyId,
        counterpart: &PartyId,
        outcome: &AffinityOutcome,
    ) -> Result<String> {
        let components: serde_json::Map<String, serde_json::Value> = outcome
            .breakdown
            .components()
            .map(|(component, score)| (component.as_str().to_string(), score.into()))
            .collect();
        let tier = outcome.tier();
        let fallback_reason = match &outcome.source {
            ScoreSource::Computed => None,
            ScoreSource::Fallback { reason } => Some(reason.as_str()),
        };

        let value = serde_json::json!({
            "subject": subject.as_str(),
            "counterpart": counterpart.as_str(),
            "total": outcome.breakdown.total,
            "components": components,
            "tier": tier.as_str(),
            "label": tier.label(),
            "color": tier.color(),
            "fallback": outcome.is_fallback(),
            "fallback_reason": fallback_reason,
        });
        Ok(serde_json::to_string_pretty(&value)?)
    }

    fn format_outcome_table(
        &self,
        subject: &PartyId,
        counterpart: &PartyId,
        outcome: &AffinityOutcome,
    ) -> String {
        let mut builder = Builder::default();
        builder.push_record(["Component", "Weight", "Score", "Points"]);

        for (component, score) in outcome.breakdown.components() {
            builder.push_record([
                component.label().to_string(),
                format!("{:.0}%", component.weight() * 100.0),
                score.to_string(),
                format!("{:.1}", component.weight() * f64::from(score)),
            ]);
        }
        builder.push_record([
            "Total".to_string(),
            String::new(),
            outcome.breakdown.total.to_string(),
            String::new(),
        ]);

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        let mut lines = vec![
            format!("{} ↔ {}", subject, counterpart),
            table.to_string(),
            self.tier_badge(outcome.breakdown.total),
        ];
        let tier = outcome.tier();
        if let (Some(next), Some(points)) =
            (tier.next(), AffinityTier::points_to_next(outcome.breakdown.total))
        {
            lines.push(format!("{} point(s) to {}", points, next.label()));
        }
        if let ScoreSource::Fallback { reason } = &outcome.source {
            lines.push(self.warning(&format!("Interaction data unavailable: {}", reason)));
        }
        lines.join("\n")
    }

    /// Format a friends listing.
    pub fn format_friends(&self, subject: &PartyId, entries: &[FriendEntry]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let rows: Vec<serde_json::Value> = entries
                    .iter()
                    .map(|e| {
                        let tier = AffinityTier::from_score(e.score);
                        serde_json::json!({
                            "relationship_id": e.relationship_id.value(),
                            "counterpart": e.counterpart.as_str(),
                            "score": e.score,
                            "tier": tier.as_str(),
                            "label": tier.label(),
                            "fallback": e.fallback,
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&rows)?)
            }
            OutputFormat::Table => Ok(self.format_friends_table(subject, entries)),
            OutputFormat::Quiet => Ok(entries
                .iter()
                .map(|e| format!("{}\t{}", e.counterpart, e.score))
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }

    fn format_friends_table(&self, subject: &PartyId, entries: &[FriendEntry]) -> String {
        if entries.is_empty() {
            return self.colorize(&format!("No relationships found for {}.", subject), "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["#", "Friend", "Score", "Tier", "ID"]);

        for (rank, entry) in entries.iter().enumerate() {
            let score = if entry.fallback {
                format!("{}*", entry.score)
            } else {
                entry.score.to_string()
            };
            builder.push_record([
                (rank + 1).to_string(),
                entry.counterpart.to_string(),
                score,
                self.tier_badge(entry.score),
                entry.relationship_id.to_string(),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        let mut output = table.to_string();
        if entries.iter().any(|e| e.fallback) {
            output.push('\n');
            output.push_str(&self.warning("* interaction data unavailable, placeholder score"));
        }
        output
    }

    /// Format a relationship record.
    pub fn format_relationship(&self, record: &RelationshipRecord) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let value = serde_json::json!({
                    "id": record.id.value(),
                    "subject": record.subject_id.as_str(),
                    "counterpart": record.counterpart_id.as_str(),
                    "channel": record.channel_key().as_str(),
                    "established_at": record.established_at.to_rfc3339(),
                    "affinity_score": record.affinity_score,
                });
                Ok(serde_json::to_string_pretty(&value)?)
            }
            OutputFormat::Table => Ok(self.success(&format!(
                "Relationship {} created: {} ↔ {} (since {})",
                record.id,
                record.subject_id,
                record.counterpart_id,
                record.established_at.format("%Y-%m-%d %H:%M UTC")
            ))),
            OutputFormat::Quiet => Ok(record.id.to_string()),
        }
    }

    /// Format the scoring explanation: components and tiers.
    pub fn format_explanation(&self) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let components: Vec<serde_json::Value> = ScoreComponent::ALL
                    .iter()
                    .map(|c| {
                        serde_json::json!({
                            "component": c.as_str(),
                            "label": c.label(),
                            "weight": c.weight(),
                            "description": c.description(),
                        })
                    })
                    .collect();
                let tiers: Vec<serde_json::Value> = AffinityTier::ALL
                    .iter()
                    .map(|t| {
                        serde_json::json!({
                            "tier": t.as_str(),
                            "label": t.label(),
                            "min_score": t.min_score(),
                            "color": t.color(),
                            "emoji": t.emoji(),
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(
                    &serde_json::json!({ "components": components, "tiers": tiers }),
                )?)
            }
            OutputFormat::Table => Ok(self.format_explanation_table()),
            OutputFormat::Quiet => Ok(ScoreComponent::ALL
                .iter()
                .map(|c| format!("{}\t{}", c.as_str(), c.weight()))
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }

    fn format_explanation_table(&self) -> String {
        let mut components = Builder::default();
        components.push_record(["Component", "Weight", "What it measures"]);
        for component in ScoreComponent::ALL {
            components.push_record([
                component.label().to_string(),
                format!("{:.0}%", component.weight() * 100.0),
                component.description().to_string(),
            ]);
        }

        let mut tiers = Builder::default();
        tiers.push_record(["Tier", "From", "Color"]);
        for tier in AffinityTier::ALL {
            tiers.push_record([
                self.paint_tier(tier, &format!("{} {}", tier.emoji(), tier.label())),
                tier.min_score().to_string(),
                tier.color().to_string(),
            ]);
        }

        let mut components = components.build();
        components
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        let mut tiers = tiers.build();
        tiers
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        format!("{}\n\n{}", components, tiers)
    }

    /// Emoji and label of the tier a score falls into.
    pub fn tier_badge(&self, score: u8) -> String {
        let tier = AffinityTier::from_score(score);
        self.paint_tier(tier, &format!("{} {}", tier.emoji(), tier.label()))
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Paint text in a tier's color if color is enabled.
    fn paint_tier(&self, tier: AffinityTier, text: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }
        match hex_to_rgb(tier.color()) {
            Some((r, g, b)) => text.truecolor(r, g, b).to_string(),
            None => text.to_string(),
        }
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

/// Parse a `#RRGGBB` color.
fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}
