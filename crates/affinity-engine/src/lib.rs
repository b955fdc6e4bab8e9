//! Affinity Engine
//!
//! Async orchestration of relationship-affinity scoring over an
//! [`AffinityRepository`](affinity_domain::traits::AffinityRepository).
//!
//! # Overview
//!
//! The engine is responsible for:
//! - **Bounded reads**: the relationship record and the most recent
//!   interactions of its channel, each under a fetch timeout
//! - **Scoring**: the pure [`compute_breakdown`](affinity_domain::compute_breakdown)
//!   computation
//! - **Persistence**: a best-effort write of the total back to the record
//! - **Fallback**: the degenerate breakdown when data cannot be read
//! - **Metrics**: counters for computed, fallback and persisted results
//!
//! Scoring runs on demand only. There is no background worker.
//!
//! # Usage
//!
//! ## Single relationship
//!
//! ```no_run
//! use affinity_domain::{PartyId, RelationshipId};
//! use affinity_engine::AffinityEngine;
//! use affinity_store::SqliteStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = SqliteStore::new("affinity.db")?;
//!     let engine = AffinityEngine::with_defaults(store);
//!
//!     let outcome = engine
//!         .evaluate(&PartyId::new("mina"), &PartyId::new("joon"), RelationshipId::from_value(1))
//!         .await;
//!     if outcome.is_fallback() {
//!         eprintln!("interaction data unavailable");
//!     }
//!     println!("{} ({})", outcome.breakdown.total, outcome.tier().label());
//!     Ok(())
//! }
//! ```
//!
//! ## Batch rescore
//!
//! ```no_run
//! # use affinity_domain::PartyId;
//! # use affinity_engine::AffinityEngine;
//! # use affinity_store::SqliteStore;
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! # let engine = AffinityEngine::with_defaults(SqliteStore::new("affinity.db")?);
//! for entry in engine.rescore_subject(&PartyId::new("mina")).await? {
//!     println!("{} {}", entry.counterpart_id, entry.outcome.breakdown.total);
//! }
//! println!("{}", engine.metrics().summary());
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! The engine can be configured via TOML:
//!
//! ```toml
//! window_limit = 1000
//! fetch_timeout_ms = 2000
//! message_count_ceiling = 5000
//! frequency_window_days = 30
//! frequency_multiplier = 3.3
//! consistency_sample_size = 100
//! sparse_history_threshold = 10
//! utc_offset_minutes = 540
//! persist_scores = true
//! ```

#![warn(missing_docs)]

mod config;
mod engine;
mod error;
mod metrics;

pub use config::{EngineConfig, MAX_FREQUENCY_WINDOW_DAYS};
pub use engine::{AffinityEngine, AffinityOutcome, RescoredRelationship, ScoreSource};
pub use error::EngineError;
pub use metrics::EngineMetrics;
