//! Affinity engine: repository reads, scoring and score persistence

use crate::{EngineConfig, EngineError, EngineMetrics};
use affinity_domain::traits::AffinityRepository;
use affinity_domain::{
    compute_breakdown, AffinityTier, ChannelKey, PartyId, RelationshipId, RelationshipRecord,
    ScoreBreakdown, ScoringConfig, ScoringContext,
};
use chrono::{DateTime, Utc};
use std::fmt::Display;
use std::future::Future;
use std::sync::Mutex;

/// Where a breakdown came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoreSource {
    /// Computed from the relationship's interaction history
    Computed,
    /// Degenerate placeholder returned because the data was unavailable
    Fallback {
        /// Why the repository read failed
        reason: String,
    },
}

/// Result of a single evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AffinityOutcome {
    /// Aggregate score and its six components
    pub breakdown: ScoreBreakdown,
    /// Whether the breakdown was computed or is the fallback
    pub source: ScoreSource,
}

impl AffinityOutcome {
    fn computed(breakdown: ScoreBreakdown) -> Self {
        Self {
            breakdown,
            source: ScoreSource::Computed,
        }
    }

    fn fallback(reason: &EngineError) -> Self {
        Self {
            breakdown: ScoreBreakdown::degenerate(),
            source: ScoreSource::Fallback {
                reason: reason.to_string(),
            },
        }
    }

    /// True when the breakdown is the degenerate placeholder
    pub fn is_fallback(&self) -> bool {
        matches!(self.source, ScoreSource::Fallback { .. })
    }

    /// Tier of the aggregate score
    pub fn tier(&self) -> AffinityTier {
        AffinityTier::from_score(self.breakdown.total)
    }
}

/// One entry of a batch rescore
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RescoredRelationship {
    /// The relationship as listed before rescoring
    pub relationship: RelationshipRecord,
    /// The party on the other side from the subject
    pub counterpart_id: PartyId,
    /// Fresh evaluation of the relationship
    pub outcome: AffinityOutcome,
}

/// Orchestrates affinity scoring over an [`AffinityRepository`]
///
/// Each evaluation performs two bounded reads (the relationship record and
/// the interaction window), the pure computation, and one best-effort
/// write of the total.
///
/// # Examples
///
/// ```no_run
/// use affinity_domain::{PartyId, RelationshipId};
/// use affinity_engine::{AffinityEngine, EngineConfig};
/// use affinity_store::SqliteStore;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let store = SqliteStore::new("affinity.db")?;
/// let engine = AffinityEngine::new(store, EngineConfig::default());
///
/// let breakdown = engine
///     .compute_affinity(&PartyId::new("mina"), &PartyId::new("joon"), RelationshipId::from_value(1))
///     .await;
/// println!("total: {}", breakdown.total);
/// # Ok(())
/// # }
/// ```
pub struct AffinityEngine<R> {
    repository: R,
    config: EngineConfig,
    scoring: ScoringConfig,
    metrics: Mutex<EngineMetrics>,
}

impl<R> AffinityEngine<R>
where
    R: AffinityRepository + Sync,
{
    /// Create an engine over the given repository
    pub fn new(repository: R, config: EngineConfig) -> Self {
        let scoring = config.scoring_config();
        Self {
            repository,
            config,
            scoring,
            metrics: Mutex::new(EngineMetrics::new()),
        }
    }

    /// Create an engine with default configuration
    pub fn with_defaults(repository: R) -> Self {
        Self::new(repository, EngineConfig::default())
    }

    /// The underlying repository
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// The active configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Snapshot of the current metrics
    pub fn metrics(&self) -> EngineMetrics {
        match self.metrics.lock() {
            Ok(metrics) => metrics.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Reset metrics counters
    pub fn reset_metrics(&self) {
        self.record(EngineMetrics::reset);
    }

    /// Score the relationship between two parties
    ///
    /// Never fails: unavailable data yields the degenerate breakdown. The
    /// total is written back to the relationship when it exists.
    pub async fn compute_affinity(
        &self,
        subject_id: &PartyId,
        counterpart_id: &PartyId,
        relationship_id: RelationshipId,
    ) -> ScoreBreakdown {
        self.compute_affinity_at(subject_id, counterpart_id, relationship_id, Utc::now())
            .await
    }

    /// [`compute_affinity`](Self::compute_affinity) against a fixed instant
    pub async fn compute_affinity_at(
        &self,
        subject_id: &PartyId,
        counterpart_id: &PartyId,
        relationship_id: RelationshipId,
        now: DateTime<Utc>,
    ) -> ScoreBreakdown {
        self.evaluate_at(subject_id, counterpart_id, relationship_id, now)
            .await
            .breakdown
    }

    /// Score a relationship and report whether the result is a fallback
    pub async fn evaluate(
        &self,
        subject_id: &PartyId,
        counterpart_id: &PartyId,
        relationship_id: RelationshipId,
    ) -> AffinityOutcome {
        self.evaluate_at(subject_id, counterpart_id, relationship_id, Utc::now())
            .await
    }

    /// [`evaluate`](Self::evaluate) against a fixed instant
    pub async fn evaluate_at(
        &self,
        subject_id: &PartyId,
        counterpart_id: &PartyId,
        relationship_id: RelationshipId,
        now: DateTime<Utc>,
    ) -> AffinityOutcome {
        let relationship = match self
            .bounded(self.repository.get_relationship(relationship_id))
            .await
        {
            Ok(relationship) => relationship,
            Err(e) => return self.fall_back(relationship_id, e),
        };

        let channel = ChannelKey::for_pair(subject_id, counterpart_id);
        let interactions = match self
            .bounded(self.repository.get_interactions(&channel, self.config.window_limit))
            .await
        {
            Ok(interactions) => interactions,
            Err(e) => return self.fall_back(relationship_id, e),
        };

        let established_at = match &relationship {
            Some(record) => record.established_at,
            None => {
                tracing::debug!(
                    relationship_id = %relationship_id,
                    "Relationship record missing, treating it as established now"
                );
                self.record(EngineMetrics::record_missing_relationship);
                now
            }
        };

        let context = ScoringContext {
            subject_id,
            counterpart_id,
            established_at,
            now,
            utc_offset: self.config.utc_offset(),
        };
        let breakdown = compute_breakdown(&interactions, &context, &self.scoring);
        self.record(EngineMetrics::record_computed);

        tracing::debug!(
            relationship_id = %relationship_id,
            channel = %channel,
            interactions = interactions.len(),
            total = breakdown.total,
            "Computed affinity"
        );

        if relationship.is_some() && self.config.persist_scores {
            self.persist(relationship_id, breakdown.total).await;
        }

        AffinityOutcome::computed(breakdown)
    }

    /// Rescore every relationship the party takes part in
    ///
    /// Results are sorted by total, highest first, ties by relationship id.
    pub async fn rescore_subject(
        &self,
        subject_id: &PartyId,
    ) -> Result<Vec<RescoredRelationship>, EngineError> {
        self.rescore_subject_at(subject_id, Utc::now()).await
    }

    /// [`rescore_subject`](Self::rescore_subject) against a fixed instant
    pub async fn rescore_subject_at(
        &self,
        subject_id: &PartyId,
        now: DateTime<Utc>,
    ) -> Result<Vec<RescoredRelationship>, EngineError> {
        let relationships = self
            .bounded(self.repository.list_relationships(subject_id))
            .await?;

        let mut rescored = Vec::with_capacity(relationships.len());
        for relationship in relationships {
            let Some(counterpart_id) = relationship.other_party(subject_id).cloned() else {
                tracing::warn!(
                    relationship_id = %relationship.id,
                    subject = %subject_id,
                    "Listed relationship does not involve the subject, skipping"
                );
                continue;
            };

            let outcome = self
                .evaluate_at(subject_id, &counterpart_id, relationship.id, now)
                .await;
            rescored.push(RescoredRelationship {
                relationship,
                counterpart_id,
                outcome,
            });
        }

        rescored.sort_by(|a, b| {
            b.outcome
                .breakdown
                .total
                .cmp(&a.outcome.breakdown.total)
                .then_with(|| a.relationship.id.cmp(&b.relationship.id))
        });

        self.record(EngineMetrics::record_rescore_run);
        tracing::info!(
            subject = %subject_id,
            relationships = rescored.len(),
            "Rescored relationships"
        );

        Ok(rescored)
    }

    /// Run a repository call under the fetch timeout
    async fn bounded<T, E, F>(&self, call: F) -> Result<T, EngineError>
    where
        F: Future<Output = Result<T, E>>,
        E: Display,
    {
        let limit = self.config.fetch_timeout();
        match tokio::time::timeout(limit, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(EngineError::Repository(e.to_string())),
            Err(_) => Err(EngineError::Timeout(limit)),
        }
    }

    fn fall_back(&self, relationship_id: RelationshipId, error: EngineError) -> AffinityOutcome {
        tracing::warn!(
            relationship_id = %relationship_id,
            error = %error,
            "Interaction data unavailable, returning fallback score"
        );
        self.record(EngineMetrics::record_fallback);
        AffinityOutcome::fallback(&error)
    }

    async fn persist(&self, relationship_id: RelationshipId, total: u8) {
        match self
            .bounded(self.repository.set_affinity_score(relationship_id, total))
            .await
        {
            Ok(()) => self.record(EngineMetrics::record_persisted),
            Err(e) => {
                tracing::warn!(
                    relationship_id = %relationship_id,
                    total,
                    error = %e,
                    "Failed to persist affinity score"
                );
                self.record(EngineMetrics::record_persist_failure);
            }
        }
    }

    fn record(&self, update: impl FnOnce(&mut EngineMetrics)) {
        match self.metrics.lock() {
            Ok(mut metrics) => update(&mut metrics),
            Err(poisoned) => update(&mut poisoned.into_inner()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use affinity_domain::InteractionRecord;
    use chrono::{Duration, TimeZone};
    use std::collections::HashMap;

    #[derive(Default)]
    struct MockRepository {
        relationships: Mutex<HashMap<RelationshipId, RelationshipRecord>>,
        interactions: HashMap<ChannelKey, Vec<InteractionRecord>>,
        fail_writes: bool,
    }

    impl MockRepository {
        fn with_relationship(record: RelationshipRecord) -> Self {
            let repo = Self::default();
            repo.relationships.lock().unwrap().insert(record.id, record);
            repo
        }

        fn score_of(&self, id: RelationshipId) -> u8 {
            self.relationships.lock().unwrap()[&id].affinity_score
        }
    }

    impl AffinityRepository for MockRepository {
        type Error = String;

        async fn get_relationship(
            &self,
            id: RelationshipId,
        ) -> Result<Option<RelationshipRecord>, String> {
            Ok(self.relationships.lock().unwrap().get(&id).cloned())
        }

        async fn get_interactions(
            &self,
            channel: &ChannelKey,
            limit: usize,
        ) -> Result<Vec<InteractionRecord>, String> {
            let mut records = self.interactions.get(channel).cloned().unwrap_or_default();
            records.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
            records.truncate(limit);
            Ok(records)
        }

        async fn set_affinity_score(&self, id: RelationshipId, score: u8) -> Result<(), String> {
            if self.fail_writes {
                return Err("write rejected".to_string());
            }
            match self.relationships.lock().unwrap().get_mut(&id) {
                Some(record) => {
                    record.affinity_score = score;
                    Ok(())
                }
                None => Err(format!("no relationship {}", id)),
            }
        }

        async fn list_relationships(
            &self,
            party: &PartyId,
        ) -> Result<Vec<RelationshipRecord>, String> {
            Ok(self
                .relationships
                .lock()
                .unwrap()
                .values()
                .filter(|r| r.involves(party))
                .cloned()
                .collect())
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap()
    }

    fn test_config() -> EngineConfig {
        EngineConfig {
            utc_offset_minutes: Some(0),
            ..Default::default()
        }
    }

    fn relationship(id: i64, a: &str, b: &str, days_ago: i64) -> RelationshipRecord {
        RelationshipRecord::new(
            RelationshipId::from_value(id),
            PartyId::new(a),
            PartyId::new(b),
            now() - Duration::days(days_ago),
        )
    }

    #[tokio::test]
    async fn test_computes_and_persists_total() {
        let record = relationship(1, "mina", "joon", 10);
        let mut repo = MockRepository::with_relationship(record.clone());
        repo.interactions.insert(
            record.channel_key(),
            (0..12)
                .map(|i| {
                    let sender = if i % 2 == 0 { "mina" } else { "joon" };
                    InteractionRecord::new(sender, now() - Duration::hours(i * 6))
                })
                .collect(),
        );

        let engine = AffinityEngine::new(repo, test_config());
        let outcome = engine
            .evaluate_at(&record.subject_id, &record.counterpart_id, record.id, now())
            .await;

        assert_eq!(outcome.source, ScoreSource::Computed);
        assert_eq!(outcome.breakdown.recency, 100);
        assert_eq!(outcome.breakdown.balance, 100);
        assert_eq!(engine.repository().score_of(record.id), outcome.breakdown.total);

        let metrics = engine.metrics();
        assert_eq!(metrics.computed, 1);
        assert_eq!(metrics.persisted, 1);
    }

    #[tokio::test]
    async fn test_missing_relationship_scores_as_new_and_skips_write() {
        let engine = AffinityEngine::new(MockRepository::default(), test_config());
        let outcome = engine
            .evaluate_at(
                &PartyId::new("mina"),
                &PartyId::new("joon"),
                RelationshipId::from_value(7),
                now(),
            )
            .await;

        assert!(!outcome.is_fallback());
        assert_eq!(outcome.breakdown.duration, 5);
        assert_eq!(outcome.breakdown.recency, 0);

        let metrics = engine.metrics();
        assert_eq!(metrics.missing_relationships, 1);
        assert_eq!(metrics.persisted, 0);
        assert_eq!(metrics.persist_failures, 0);
    }

    #[tokio::test]
    async fn test_persist_failure_is_swallowed() {
        let record = relationship(1, "mina", "joon", 400);
        let mut repo = MockRepository::with_relationship(record.clone());
        repo.fail_writes = true;

        let engine = AffinityEngine::new(repo, test_config());
        let breakdown = engine
            .compute_affinity_at(&record.subject_id, &record.counterpart_id, record.id, now())
            .await;

        assert_eq!(breakdown.total, 10);
        assert_eq!(engine.repository().score_of(record.id), 50);
        assert_eq!(engine.metrics().persist_failures, 1);
    }

    #[tokio::test]
    async fn test_persistence_can_be_disabled() {
        let record = relationship(1, "mina", "joon", 400);
        let repo = MockRepository::with_relationship(record.clone());
        let config = EngineConfig {
            persist_scores: false,
            ..test_config()
        };

        let engine = AffinityEngine::new(repo, config);
        engine
            .compute_affinity_at(&record.subject_id, &record.counterpart_id, record.id, now())
            .await;

        assert_eq!(engine.repository().score_of(record.id), 50);
        assert_eq!(engine.metrics().persisted, 0);
    }

    #[tokio::test]
    async fn test_rescore_sorts_by_total_then_id() {
        let close = relationship(3, "mina", "joon", 400);
        let distant = relationship(1, "hana", "mina", 1);
        let tied = relationship(2, "mina", "suho", 400);
        let mut repo = MockRepository::with_relationship(close.clone());
        repo.relationships.lock().unwrap().insert(distant.id, distant.clone());
        repo.relationships.lock().unwrap().insert(tied.id, tied.clone());
        repo.interactions.insert(
            close.channel_key(),
            vec![
                InteractionRecord::new("mina", now() - Duration::minutes(5)),
                InteractionRecord::new("joon", now() - Duration::minutes(10)),
            ],
        );

        let engine = AffinityEngine::new(repo, test_config());
        let rescored = engine
            .rescore_subject_at(&PartyId::new("mina"), now())
            .await
            .unwrap();

        let ids: Vec<i64> = rescored.iter().map(|r| r.relationship.id.value()).collect();
        assert_eq!(ids, vec![3, 2, 1]);
        assert_eq!(rescored[2].counterpart_id, PartyId::new("hana"));
        assert!(rescored
            .windows(2)
            .all(|w| w[0].outcome.breakdown.total >= w[1].outcome.breakdown.total));
        assert_eq!(engine.metrics().rescore_runs, 1);
    }

    #[tokio::test]
    async fn test_reset_metrics() {
        let engine = AffinityEngine::with_defaults(MockRepository::default());
        engine
            .compute_affinity(
                &PartyId::new("mina"),
                &PartyId::new("joon"),
                RelationshipId::from_value(1),
            )
            .await;
        assert_eq!(engine.metrics().total_evaluations(), 1);

        engine.reset_metrics();
        assert_eq!(engine.metrics(), EngineMetrics::default());
    }
}
