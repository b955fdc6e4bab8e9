//! Score breakdown and the catalogue of its components

/// One of the six weighted inputs to the affinity score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreComponent {
    /// Log-scaled interaction volume
    MessageCount,
    /// Time since the latest interaction
    Recency,
    /// Active days in the trailing window
    Frequency,
    /// Two-way balance of who sends
    Balance,
    /// Age of the relationship
    Duration,
    /// Regularity of the recent cadence
    Consistency,
}

impl ScoreComponent {
    /// All components, heaviest weight first
    pub const ALL: [ScoreComponent; 6] = [
        ScoreComponent::MessageCount,
        ScoreComponent::Recency,
        ScoreComponent::Frequency,
        ScoreComponent::Balance,
        ScoreComponent::Duration,
        ScoreComponent::Consistency,
    ];

    /// Default weight in the aggregate; the six weights sum to 1.0
    pub fn weight(&self) -> f64 {
        match self {
            ScoreComponent::MessageCount => 0.25,
            ScoreComponent::Recency => 0.20,
            ScoreComponent::Frequency => 0.20,
            ScoreComponent::Balance => 0.15,
            ScoreComponent::Duration => 0.10,
            ScoreComponent::Consistency => 0.10,
        }
    }

    /// Machine name, as used in JSON output
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreComponent::MessageCount => "message_count",
            ScoreComponent::Recency => "recency",
            ScoreComponent::Frequency => "frequency",
            ScoreComponent::Balance => "balance",
            ScoreComponent::Duration => "duration",
            ScoreComponent::Consistency => "consistency",
        }
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            ScoreComponent::MessageCount => "Total conversation",
            ScoreComponent::Recency => "Recency",
            ScoreComponent::Frequency => "Frequency",
            ScoreComponent::Balance => "Two-way balance",
            ScoreComponent::Duration => "Friends since",
            ScoreComponent::Consistency => "Consistency",
        }
    }

    /// One-line explanation shown next to the score
    pub fn description(&self) -> &'static str {
        match self {
            ScoreComponent::MessageCount => "How much you have talked (log scale, full marks near 5,000 messages)",
            ScoreComponent::Recency => "When you last talked",
            ScoreComponent::Frequency => "On how many of the last 30 days you talked",
            ScoreComponent::Balance => "Whether both of you write, not just one",
            ScoreComponent::Duration => "How long you have been connected (a year or more scores highest)",
            ScoreComponent::Consistency => "Whether the conversation keeps going without long gaps",
        }
    }
}

/// Auditable result of one affinity computation
///
/// Only `total` is persisted; the components are recomputed on every call
/// and kept for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreBreakdown {
    /// Weighted aggregate [0, 100]
    pub total: u8,
    /// Message-count component [0, 100]
    pub message_count: u8,
    /// Recency component [0, 100]
    pub recency: u8,
    /// Frequency component [0, 100]
    pub frequency: u8,
    /// Balance component [0, 100]
    pub balance: u8,
    /// Duration component [0, 100]
    pub duration: u8,
    /// Consistency component [0, 100]
    pub consistency: u8,
}

impl ScoreBreakdown {
    /// Total reported when the interaction data could not be read
    pub const DEGENERATE_TOTAL: u8 = 30;

    /// Duration default-fill used in the degenerate result
    pub const DEGENERATE_DURATION: u8 = 30;

    /// Fixed fallback breakdown for unavailable data
    ///
    /// ```
    /// use affinity_domain::ScoreBreakdown;
    ///
    /// let fallback = ScoreBreakdown::degenerate();
    /// assert_eq!(fallback.total, 30);
    /// assert_eq!(fallback.duration, 30);
    /// assert_eq!(fallback.recency, 0);
    /// ```
    pub fn degenerate() -> Self {
        Self {
            total: Self::DEGENERATE_TOTAL,
            duration: Self::DEGENERATE_DURATION,
            ..Self::default()
        }
    }

    /// Score of a single component
    pub fn component(&self, component: ScoreComponent) -> u8 {
        match component {
            ScoreComponent::MessageCount => self.message_count,
            ScoreComponent::Recency => self.recency,
            ScoreComponent::Frequency => self.frequency,
            ScoreComponent::Balance => self.balance,
            ScoreComponent::Duration => self.duration,
            ScoreComponent::Consistency => self.consistency,
        }
    }

    /// `(component, score)` pairs in catalogue order
    pub fn components(&self) -> impl Iterator<Item = (ScoreComponent, u8)> + '_ {
        ScoreComponent::ALL.iter().map(move |c| (*c, self.component(*c)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_sum_to_one() {
        let sum: f64 = ScoreComponent::ALL.iter().map(|c| c.weight()).sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_components_follow_catalogue_order() {
        let breakdown = ScoreBreakdown {
            total: 60,
            message_count: 1,
            recency: 2,
            frequency: 3,
            balance: 4,
            duration: 5,
            consistency: 6,
        };
        let scores: Vec<u8> = breakdown.components().map(|(_, s)| s).collect();
        assert_eq!(scores, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_degenerate_shape() {
        let d = ScoreBreakdown::degenerate();
        assert_eq!(
            d,
            ScoreBreakdown {
                total: 30,
                message_count: 0,
                recency: 0,
                frequency: 0,
                balance: 0,
                duration: 30,
                consistency: 0,
            }
        );
    }
}
