//! Affinity Domain Layer
//!
//! This crate contains the scoring model for relationship affinity: the value
//! types, the six-component formula, the tier bands, and the trait boundary
//! to persistence. Apart from `chrono` for timestamps it has no external
//! dependencies.
//!
//! ## Key Concepts
//!
//! - **Interaction**: one message sent by one party of a pair
//! - **Relationship**: the connection between two parties, with its start time
//! - **Channel key**: order-independent id of a pair's shared history
//! - **Score breakdown**: 0-100 total plus six 0-100 components
//! - **Tier**: qualitative band (stranger → best friend) over a score
//!
//! ## Architecture
//!
//! - Pure computation only; "now" is always passed in
//! - Thresholds live in named step tables (`steps`)
//! - Persistence is reached only through `traits::AffinityRepository`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod breakdown;
pub mod interaction;
pub mod party;
pub mod relationship;
pub mod scoring;
pub mod steps;
pub mod tier;
pub mod traits;

// Re-exports for convenience
pub use breakdown::{ScoreBreakdown, ScoreComponent};
pub use interaction::{InteractionRecord, INTERACTION_WINDOW_LIMIT};
pub use party::{ChannelKey, PartyId, RelationshipId};
pub use relationship::{RelationshipRecord, INITIAL_AFFINITY_SCORE};
pub use scoring::{compute_breakdown, ScoringConfig, ScoringContext, ScoreWeights};
pub use tier::{score_to_color, score_to_label, AffinityTier};
