//! Tier module - qualitative bands over the affinity score

/// Qualitative band an affinity score falls into
///
/// Bands are bounded below by 85 / 70 / 50 / 30 / 0. Both the label and the
/// display color are derived from the band, so they always agree on the
/// boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AffinityTier {
    /// Below 30
    Stranger,

    /// 30 to 49
    GettingToKnow,

    /// 50 to 69
    Friend,

    /// 70 to 84
    CloseFriend,

    /// 85 and above
    BestFriend,
}

impl AffinityTier {
    /// All tiers, highest first
    pub const ALL: [AffinityTier; 5] = [
        AffinityTier::BestFriend,
        AffinityTier::CloseFriend,
        AffinityTier::Friend,
        AffinityTier::GettingToKnow,
        AffinityTier::Stranger,
    ];

    /// Band for a score
    pub fn from_score(score: u8) -> Self {
        Self::ALL
            .into_iter()
            .find(|tier| score >= tier.min_score())
            .unwrap_or(AffinityTier::Stranger)
    }

    /// Inclusive lower bound of the band
    pub fn min_score(&self) -> u8 {
        match self {
            AffinityTier::BestFriend => 85,
            AffinityTier::CloseFriend => 70,
            AffinityTier::Friend => 50,
            AffinityTier::GettingToKnow => 30,
            AffinityTier::Stranger => 0,
        }
    }

    /// Get the tier name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            AffinityTier::BestFriend => "best_friend",
            AffinityTier::CloseFriend => "close_friend",
            AffinityTier::Friend => "friend",
            AffinityTier::GettingToKnow => "getting_to_know",
            AffinityTier::Stranger => "stranger",
        }
    }

    /// Parse a tier from its name
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace(['-', ' '], "_").as_str() {
            "best_friend" => Some(AffinityTier::BestFriend),
            "close_friend" => Some(AffinityTier::CloseFriend),
            "friend" => Some(AffinityTier::Friend),
            "getting_to_know" => Some(AffinityTier::GettingToKnow),
            "stranger" => Some(AffinityTier::Stranger),
            _ => None,
        }
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            AffinityTier::BestFriend => "best friend",
            AffinityTier::CloseFriend => "close friend",
            AffinityTier::Friend => "friend",
            AffinityTier::GettingToKnow => "getting to know",
            AffinityTier::Stranger => "stranger",
        }
    }

    /// Display color as a hex string
    pub fn color(&self) -> &'static str {
        match self {
            AffinityTier::BestFriend => "#FF203A",
            AffinityTier::CloseFriend => "#FF6B35",
            AffinityTier::Friend => "#FBBF24",
            AffinityTier::GettingToKnow => "#60A5FA",
            AffinityTier::Stranger => "#9CA3AF",
        }
    }

    /// Heart emoji shown next to the label
    pub fn emoji(&self) -> &'static str {
        match self {
            AffinityTier::BestFriend => "❤️",
            AffinityTier::CloseFriend => "🧡",
            AffinityTier::Friend => "💛",
            AffinityTier::GettingToKnow => "💙",
            AffinityTier::Stranger => "🤍",
        }
    }

    /// The band above this one
    pub fn next(&self) -> Option<Self> {
        match self {
            AffinityTier::Stranger => Some(AffinityTier::GettingToKnow),
            AffinityTier::GettingToKnow => Some(AffinityTier::Friend),
            AffinityTier::Friend => Some(AffinityTier::CloseFriend),
            AffinityTier::CloseFriend => Some(AffinityTier::BestFriend),
            AffinityTier::BestFriend => None, // Already at top
        }
    }

    /// Points a score still needs to reach the next band
    pub fn points_to_next(score: u8) -> Option<u8> {
        Self::from_score(score)
            .next()
            .map(|next| next.min_score().saturating_sub(score))
    }
}

impl std::str::FromStr for AffinityTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid tier: {}", s))
    }
}

/// Display color for a score
pub fn score_to_color(score: u8) -> &'static str {
    AffinityTier::from_score(score).color()
}

/// Qualitative label for a score
pub fn score_to_label(score: u8) -> &'static str {
    AffinityTier::from_score(score).label()
}
