//! Affinity score computation
//!
//! Implements the deterministic six-component formula that turns an
//! interaction window and a relationship start time into a 0-100 score.
//! Everything here is a pure function of its inputs, including "now" and
//! the calendar offset used for day grouping.

use crate::interaction::{latest_interaction, most_recent_first};
use crate::steps::{CONSISTENCY_GAP_DAYS, DURATION_MONTHS, RECENCY_HOURS};
use crate::{InteractionRecord, PartyId, ScoreBreakdown, ScoreComponent};
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};
use std::collections::HashSet;

/// Message count at which the message-count component saturates
pub const MESSAGE_COUNT_CEILING: u32 = 5000;

/// Length of the trailing window used by the frequency component (days)
pub const FREQUENCY_WINDOW_DAYS: u32 = 30;

/// Scale applied to the active-day fraction (about 9 of 30 days saturates)
pub const FREQUENCY_MULTIPLIER: f64 = 3.3;

/// Minimum interactions in the window before frequency is measured
pub const FREQUENCY_MIN_INTERACTIONS: usize = 2;

/// Number of most recent interactions the consistency component inspects
pub const CONSISTENCY_SAMPLE_SIZE: usize = 100;

/// Below this many interactions consistency scales linearly with count
pub const SPARSE_HISTORY_THRESHOLD: usize = 10;

/// Points per interaction while the history is sparse
pub const SPARSE_HISTORY_POINTS: f64 = 5.0;

const MS_PER_HOUR: f64 = 3_600_000.0;
const MS_PER_DAY: f64 = 86_400_000.0;
const DAYS_PER_MONTH: f64 = 30.0;

/// Weights of the six components in the aggregate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    /// Message-count weight
    pub message_count: f64,
    /// Recency weight
    pub recency: f64,
    /// Frequency weight
    pub frequency: f64,
    /// Balance weight
    pub balance: f64,
    /// Duration weight
    pub duration: f64,
    /// Consistency weight
    pub consistency: f64,
}

impl ScoreWeights {
    /// Weight of one component
    pub fn weight(&self, component: ScoreComponent) -> f64 {
        match component {
            ScoreComponent::MessageCount => self.message_count,
            ScoreComponent::Recency => self.recency,
            ScoreComponent::Frequency => self.frequency,
            ScoreComponent::Balance => self.balance,
            ScoreComponent::Duration => self.duration,
            ScoreComponent::Consistency => self.consistency,
        }
    }

    /// Sum of all weights
    pub fn sum(&self) -> f64 {
        ScoreComponent::ALL.iter().map(|c| self.weight(*c)).sum()
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            message_count: ScoreComponent::MessageCount.weight(),
            recency: ScoreComponent::Recency.weight(),
            frequency: ScoreComponent::Frequency.weight(),
            balance: ScoreComponent::Balance.weight(),
            duration: ScoreComponent::Duration.weight(),
            consistency: ScoreComponent::Consistency.weight(),
        }
    }
}

/// Tunable parameters of the computation
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringConfig {
    /// Component weights
    pub weights: ScoreWeights,
    /// Message count that maps to a full message-count score
    pub message_count_ceiling: u32,
    /// Trailing window of the frequency component, in days
    pub frequency_window_days: u32,
    /// Scale applied to the active-day fraction
    pub frequency_multiplier: f64,
    /// Recent interactions sampled by the consistency component
    pub consistency_sample_size: usize,
    /// Interaction count under which consistency scales linearly
    pub sparse_history_threshold: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            message_count_ceiling: MESSAGE_COUNT_CEILING,
            frequency_window_days: FREQUENCY_WINDOW_DAYS,
            frequency_multiplier: FREQUENCY_MULTIPLIER,
            consistency_sample_size: CONSISTENCY_SAMPLE_SIZE,
            sparse_history_threshold: SPARSE_HISTORY_THRESHOLD,
        }
    }
}

/// Everything besides the interaction window that the score depends on
#[derive(Debug, Clone)]
pub struct ScoringContext<'a> {
    /// Party the score is computed for
    pub subject_id: &'a PartyId,
    /// The other party
    pub counterpart_id: &'a PartyId,
    /// When the relationship was established
    pub established_at: DateTime<Utc>,
    /// Reference instant for every "time since" measurement
    pub now: DateTime<Utc>,
    /// Offset defining local calendar days for the frequency component
    pub utc_offset: FixedOffset,
}

/// Unrounded component values, each in [0, 100]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComponentScores {
    /// Message-count component
    pub message_count: f64,
    /// Recency component
    pub recency: f64,
    /// Frequency component
    pub frequency: f64,
    /// Balance component
    pub balance: f64,
    /// Duration component
    pub duration: f64,
    /// Consistency component
    pub consistency: f64,
}

impl ComponentScores {
    /// Weighted sum of the unrounded components
    pub fn weighted_sum(&self, weights: &ScoreWeights) -> f64 {
        self.message_count * weights.message_count
            + self.recency * weights.recency
            + self.frequency * weights.frequency
            + self.balance * weights.balance
            + self.duration * weights.duration
            + self.consistency * weights.consistency
    }

    /// Round every component and the weighted total into a breakdown
    pub fn finalize(&self, weights: &ScoreWeights) -> ScoreBreakdown {
        ScoreBreakdown {
            total: to_score(self.weighted_sum(weights)),
            message_count: to_score(self.message_count),
            recency: to_score(self.recency),
            frequency: to_score(self.frequency),
            balance: to_score(self.balance),
            duration: to_score(self.duration),
            consistency: to_score(self.consistency),
        }
    }
}

/// Compute the affinity breakdown for one relationship
///
/// This implements the formula in three steps:
/// 1. Six independent component scores, each clamped to [0, 100]
/// 2. Weighted aggregation over the unrounded components
/// 3. Rounding and clamping of the total and of each component
///
/// # Arguments
/// * `interactions` - The interaction window, in any order
/// * `context` - Parties, relationship start, reference instant and offset
/// * `config` - Weights and thresholds
pub fn compute_breakdown(
    interactions: &[InteractionRecord],
    context: &ScoringContext<'_>,
    config: &ScoringConfig,
) -> ScoreBreakdown {
    compute_components(interactions, context, config).finalize(&config.weights)
}

/// Step 1 on its own: the unrounded component values
pub fn compute_components(
    interactions: &[InteractionRecord],
    context: &ScoringContext<'_>,
    config: &ScoringConfig,
) -> ComponentScores {
    ComponentScores {
        message_count: message_count_score(interactions.len(), config.message_count_ceiling),
        recency: recency_score(latest_interaction(interactions), context.now),
        frequency: frequency_score(
            interactions,
            context.now,
            context.utc_offset,
            config.frequency_window_days,
            config.frequency_multiplier,
        ),
        balance: balance_score(interactions, context.subject_id, context.counterpart_id),
        duration: duration_score(context.established_at, context.now),
        consistency: consistency_score(
            interactions,
            config.consistency_sample_size,
            config.sparse_history_threshold,
        ),
    }
}

/// Log-scale mapping of the interaction count
///
/// `min(100, ln(count + 1) / ln(ceiling + 1) * 100)`
pub fn message_count_score(count: usize, ceiling: u32) -> f64 {
    if count == 0 {
        return 0.0;
    }
    if ceiling == 0 {
        return 100.0;
    }

    let scaled = (count as f64 + 1.0).ln() / (ceiling as f64 + 1.0).ln() * 100.0;
    scaled.min(100.0)
}

/// Bucketed hours since the latest interaction; 0 without any interaction
pub fn recency_score(latest: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
    let Some(latest) = latest else {
        return 0.0;
    };

    let hours_since = (now - latest).num_milliseconds() as f64 / MS_PER_HOUR;
    f64::from(RECENCY_HOURS.lookup(hours_since))
}

/// Fraction of active local calendar days in the trailing window, scaled
pub fn frequency_score(
    interactions: &[InteractionRecord],
    now: DateTime<Utc>,
    utc_offset: FixedOffset,
    window_days: u32,
    multiplier: f64,
) -> f64 {
    if interactions.len() < FREQUENCY_MIN_INTERACTIONS || window_days == 0 {
        return 0.0;
    }

    // A window reaching past the representable range has no cutoff
    let cutoff = now.checked_sub_signed(Duration::days(i64::from(window_days)));
    let active_days: HashSet<NaiveDate> = interactions
        .iter()
        .filter(|i| cutoff.is_none_or(|cutoff| i.occurred_at > cutoff))
        .map(|i| i.occurred_at.with_timezone(&utc_offset).date_naive())
        .collect();

    let fraction = active_days.len() as f64 / f64::from(window_days);
    (fraction * 100.0 * multiplier).clamp(0.0, 100.0)
}

/// Ratio of the quieter party's count to the busier party's count
///
/// Interactions sent by anyone other than the two parties are ignored.
/// Symmetric in its two party arguments.
pub fn balance_score(
    interactions: &[InteractionRecord],
    subject_id: &PartyId,
    counterpart_id: &PartyId,
) -> f64 {
    let (from_subject, from_counterpart) = interactions.iter().fold((0usize, 0usize), |(s, c), i| {
        if &i.sender_id == subject_id {
            (s + 1, c)
        } else if &i.sender_id == counterpart_id {
            (s, c + 1)
        } else {
            (s, c)
        }
    });

    if from_subject == 0 || from_counterpart == 0 {
        return 0.0;
    }

    let low = from_subject.min(from_counterpart) as f64;
    let high = from_subject.max(from_counterpart) as f64;
    low / high * 100.0
}

/// Bucketed relationship age in 30-day months
pub fn duration_score(established_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let months = (now - established_at).num_milliseconds() as f64 / MS_PER_DAY / DAYS_PER_MONTH;
    f64::from(DURATION_MONTHS.lookup(months))
}

/// Regularity of the recent cadence
///
/// Sparse histories score `count * 5`. Otherwise the mean gap (in days)
/// between consecutive interactions among the most recent `sample_size`,
/// in chronological order, is bucketed.
pub fn consistency_score(
    interactions: &[InteractionRecord],
    sample_size: usize,
    sparse_threshold: usize,
) -> f64 {
    let count = interactions.len();
    if count < sparse_threshold {
        return (count as f64 * SPARSE_HISTORY_POINTS).min(100.0);
    }

    let mut sample: Vec<&InteractionRecord> = most_recent_first(interactions)
        .into_iter()
        .take(sample_size)
        .collect();
    sample.reverse();

    if sample.len() < 2 {
        return 0.0;
    }

    let total_gap_ms: i64 = sample
        .windows(2)
        .map(|pair| (pair[1].occurred_at - pair[0].occurred_at).num_milliseconds())
        .sum();
    let mean_gap_days = total_gap_ms as f64 / (sample.len() - 1) as f64 / MS_PER_DAY;

    f64::from(CONSISTENCY_GAP_DAYS.lookup(mean_gap_days))
}

/// Round to the nearest integer and clamp into [0, 100]
fn to_score(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 20, 12, 0, 0).unwrap()
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn context<'a>(
        subject: &'a PartyId,
        counterpart: &'a PartyId,
        established_at: DateTime<Utc>,
    ) -> ScoringContext<'a> {
        ScoringContext {
            subject_id: subject,
            counterpart_id: counterpart,
            established_at,
            now: now(),
            utc_offset: utc(),
        }
    }

    #[test]
    fn test_message_count_log_scale() {
        assert_eq!(message_count_score(0, 5000), 0.0);
        assert!((message_count_score(5000, 5000) - 100.0).abs() < 1e-9);
        assert_eq!(message_count_score(50_000, 5000), 100.0);

        // 10 -> 100 messages gains more than 4000 -> 5000
        let early = message_count_score(100, 5000) - message_count_score(10, 5000);
        let late = message_count_score(5000, 5000) - message_count_score(4000, 5000);
        assert!(early > late);
    }

    #[test]
    fn test_recency_without_interactions() {
        assert_eq!(recency_score(None, now()), 0.0);
        assert_eq!(recency_score(Some(now() - Duration::minutes(30)), now()), 100.0);
        assert_eq!(recency_score(Some(now() - Duration::days(10)), now()), 15.0);
        assert_eq!(recency_score(Some(now() - Duration::days(60)), now()), 5.0);
    }

    #[test]
    fn test_frequency_needs_two_interactions() {
        let single = vec![InteractionRecord::new("a", now())];
        assert_eq!(frequency_score(&single, now(), utc(), 30, 3.3), 0.0);
    }

    #[test]
    fn test_frequency_counts_distinct_days() {
        // Three interactions on the same day plus two on another day
        let window = vec![
            InteractionRecord::new("a", now() - Duration::hours(1)),
            InteractionRecord::new("b", now() - Duration::hours(2)),
            InteractionRecord::new("a", now() - Duration::hours(3)),
            InteractionRecord::new("a", now() - Duration::days(3)),
            InteractionRecord::new("b", now() - Duration::days(3)),
            // Outside the trailing window
            InteractionRecord::new("b", now() - Duration::days(45)),
        ];
        let score = frequency_score(&window, now(), utc(), 30, 3.3);
        assert!((score - 2.0 / 30.0 * 330.0).abs() < 1e-9);
    }

    #[test]
    fn test_frequency_saturates_around_ten_days() {
        let window: Vec<_> = (0..10)
            .map(|d| InteractionRecord::new("a", now() - Duration::days(d)))
            .collect();
        assert_eq!(frequency_score(&window, now(), utc(), 30, 3.3), 100.0);
    }

    #[test]
    fn test_frequency_uses_local_calendar_day() {
        // 23:30 and 00:30 UTC fall on one local day at UTC-05:00
        let late = Utc.with_ymd_and_hms(2026, 5, 19, 23, 30, 0).unwrap();
        let early = Utc.with_ymd_and_hms(2026, 5, 20, 0, 30, 0).unwrap();
        let window = vec![InteractionRecord::new("a", late), InteractionRecord::new("b", early)];

        let in_utc = frequency_score(&window, now(), utc(), 30, 3.3);
        let west = FixedOffset::west_opt(5 * 3600).unwrap();
        let in_west = frequency_score(&window, now(), west, 30, 3.3);
        assert!(in_utc > in_west);
    }

    #[test]
    fn test_frequency_window_beyond_calendar_range() {
        let window = vec![
            InteractionRecord::new("a", now() - Duration::days(1)),
            InteractionRecord::new("b", now() - Duration::days(4000)),
        ];
        let score = frequency_score(&window, now(), utc(), u32::MAX, 3.3);
        assert!((0.0..=100.0).contains(&score));
        assert!(score > 0.0);
    }

    #[test]
    fn test_balance_one_sided_is_zero() {
        let a = PartyId::new("a");
        let b = PartyId::new("b");
        let window = vec![InteractionRecord::new("a", now()), InteractionRecord::new("a", now())];
        assert_eq!(balance_score(&window, &a, &b), 0.0);
        assert_eq!(balance_score(&[], &a, &b), 0.0);
    }

    #[test]
    fn test_balance_ignores_third_parties() {
        let a = PartyId::new("a");
        let b = PartyId::new("b");
        let window = vec![
            InteractionRecord::new("a", now()),
            InteractionRecord::new("b", now()),
            InteractionRecord::new("c", now()),
            InteractionRecord::new("c", now()),
        ];
        assert_eq!(balance_score(&window, &a, &b), 100.0);
    }

    #[test]
    fn test_duration_buckets() {
        assert_eq!(duration_score(now(), now()), 5.0);
        assert_eq!(duration_score(now() - Duration::days(5), now()), 20.0);
        assert_eq!(duration_score(now() - Duration::days(100), now()), 60.0);
        assert_eq!(duration_score(now() - Duration::days(730), now()), 100.0);
    }

    #[test]
    fn test_consistency_sparse_history() {
        let window: Vec<_> = (0..4)
            .map(|i| InteractionRecord::new("a", now() - Duration::days(i * 20)))
            .collect();
        assert_eq!(consistency_score(&window, 100, 10), 20.0);
        assert_eq!(consistency_score(&[], 100, 10), 0.0);
    }

    #[test]
    fn test_consistency_uses_most_recent_sample() {
        // 100 recent interactions an hour apart, preceded by old ones a month apart
        let mut window: Vec<_> = (0..100)
            .map(|i| InteractionRecord::new("a", now() - Duration::hours(i)))
            .collect();
        window.extend(
            (1..50).map(|i| InteractionRecord::new("b", now() - Duration::days(30 * i + 10))),
        );
        assert_eq!(consistency_score(&window, 100, 10), 100.0);
    }

    #[test]
    fn test_consistency_weekly_cadence() {
        let window: Vec<_> = (0..12)
            .map(|i| InteractionRecord::new("a", now() - Duration::days(i * 10)))
            .collect();
        assert_eq!(consistency_score(&window, 100, 10), 25.0);
    }

    #[test]
    fn test_empty_history_floor() {
        let a = PartyId::new("a");
        let b = PartyId::new("b");
        let ctx = context(&a, &b, now() - Duration::days(400));
        let breakdown = compute_breakdown(&[], &ctx, &ScoringConfig::default());

        assert_eq!(breakdown.message_count, 0);
        assert_eq!(breakdown.recency, 0);
        assert_eq!(breakdown.frequency, 0);
        assert_eq!(breakdown.balance, 0);
        assert_eq!(breakdown.consistency, 0);
        assert_eq!(breakdown.duration, 100);
        assert_eq!(breakdown.total, 10);
    }

    #[test]
    fn test_hot_new_contact() {
        let me = PartyId::new("me");
        let them = PartyId::new("them");
        let window: Vec<_> = (0..50)
            .map(|i| {
                let sender = if i % 2 == 0 { "me" } else { "them" };
                InteractionRecord::new(sender, now() - Duration::minutes(2 * i))
            })
            .collect();
        let ctx = context(&me, &them, now() - Duration::days(5));
        let breakdown = compute_breakdown(&window, &ctx, &ScoringConfig::default());

        assert_eq!(breakdown.recency, 100);
        assert_eq!(breakdown.balance, 100);
        assert_eq!(breakdown.duration, 20);
        assert_eq!(breakdown.message_count, 46);
        assert_eq!(breakdown.frequency, 11);
        assert_eq!(breakdown.consistency, 100);
        assert_eq!(breakdown.total, 61);
        assert!((55..=70).contains(&breakdown.total));
    }

    #[test]
    fn test_stale_old_contact() {
        let me = PartyId::new("me");
        let them = PartyId::new("them");
        let last = now() - Duration::days(60);
        // 3000 interactions four hours apart; every 30th one is ours
        let window: Vec<_> = (0..3000)
            .map(|i| {
                let sender = if i % 30 == 0 { "me" } else { "them" };
                InteractionRecord::new(sender, last - Duration::hours(4 * i))
            })
            .collect();
        let ctx = context(&me, &them, now() - Duration::days(730));
        let breakdown = compute_breakdown(&window, &ctx, &ScoringConfig::default());

        assert_eq!(breakdown.recency, 5);
        assert_eq!(breakdown.duration, 100);
        assert_eq!(breakdown.balance, 3);
        assert_eq!(breakdown.frequency, 0);
        assert!(breakdown.message_count >= 90);
        assert_eq!(breakdown.total, 45);
    }

    #[test]
    fn test_total_rounds_unrounded_components() {
        let scores = ComponentScores {
            message_count: 10.4,
            recency: 10.4,
            frequency: 10.4,
            balance: 10.4,
            duration: 10.4,
            consistency: 10.6,
        };
        let breakdown = scores.finalize(&ScoreWeights::default());
        assert_eq!(breakdown.total, 10);
        assert_eq!(breakdown.consistency, 11);
    }

    #[test]
    fn test_to_score_clamps() {
        assert_eq!(to_score(-3.0), 0);
        assert_eq!(to_score(140.0), 100);
        assert_eq!(to_score(f64::NAN), 0);
        assert_eq!(to_score(49.5), 50);
    }
}
