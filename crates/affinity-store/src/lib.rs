//! Affinity Storage Layer
//!
//! Implements the `AffinityRepository` trait on top of SQLite.
//!
//! # Architecture
//!
//! - `relationships`: one row per pair, unique on the pair's channel key
//! - `interactions`: append-only message events, indexed by channel and time
//! - Timestamps are stored as epoch milliseconds; rows are normalized into
//!   domain types on read (scores clamped to 0..=100)
//!
//! # Examples
//!
//! ```no_run
//! use affinity_store::SqliteStore;
//!
//! let store = SqliteStore::new(":memory:").unwrap();
//! // Store is now ready for relationship and interaction operations
//! ```

#![warn(missing_docs)]

use affinity_domain::traits::AffinityRepository;
use affinity_domain::{
    ChannelKey, InteractionRecord, PartyId, RelationshipId, RelationshipRecord,
};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A relationship already exists for this pair
    #[error("Relationship already exists for channel {0}")]
    Duplicate(String),

    /// The connection lock was poisoned by a panicking thread
    #[error("Store connection lock poisoned")]
    Poisoned,
}

const RELATIONSHIP_COLUMNS: &str =
    "id, subject_id, counterpart_id, established_at, affinity_score";

/// SQLite-based implementation of `AffinityRepository`
///
/// # Thread Safety
///
/// The connection sits behind a mutex, so one store can be shared by
/// reference across tasks. Statements are short and never held across an
/// await point.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Create a new SqliteStore with the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use affinity_store::SqliteStore;
    ///
    /// let store = SqliteStore::new("affinity.db").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Create a store backed by a private in-memory database
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::new(":memory:")
    }

    /// Initialize the database schema
    fn initialize_schema(&self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.connection()?.execute_batch(schema)?;
        Ok(())
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Create a relationship between two distinct parties
    ///
    /// The new record starts at the initial affinity score. A second
    /// relationship for the same pair, in either order, is rejected.
    pub fn add_relationship(
        &self,
        subject_id: &PartyId,
        counterpart_id: &PartyId,
        established_at: DateTime<Utc>,
    ) -> Result<RelationshipRecord, StoreError> {
        if subject_id == counterpart_id {
            return Err(StoreError::InvalidData(format!(
                "A relationship needs two distinct parties, got '{}' twice",
                subject_id
            )));
        }

        let channel = ChannelKey::for_pair(subject_id, counterpart_id);
        let conn = self.connection()?;

        let exists: bool = conn
            .query_row(
                "SELECT 1 FROM relationships WHERE channel_key = ?1",
                params![channel.as_str()],
                |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);

        if exists {
            return Err(StoreError::Duplicate(channel.to_string()));
        }

        let record = RelationshipRecord::new(
            RelationshipId::from_value(0),
            subject_id.clone(),
            counterpart_id.clone(),
            established_at,
        );

        conn.execute(
            "INSERT INTO relationships (subject_id, counterpart_id, channel_key, established_at, affinity_score)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.subject_id.as_str(),
                record.counterpart_id.as_str(),
                channel.as_str(),
                record.established_at.timestamp_millis(),
                i64::from(record.affinity_score),
            ],
        )?;

        Ok(RelationshipRecord {
            id: RelationshipId::from_value(conn.last_insert_rowid()),
            ..record
        })
    }

    /// Get a relationship by ID
    pub fn relationship(&self, id: RelationshipId) -> Result<Option<RelationshipRecord>, StoreError> {
        let conn = self.connection()?;
        let record = conn
            .query_row(
                &format!("SELECT {} FROM relationships WHERE id = ?1", RELATIONSHIP_COLUMNS),
                params![id.value()],
                Self::row_to_relationship,
            )
            .optional()?;
        Ok(record)
    }

    /// Find the relationship between two parties, in either order
    pub fn find_relationship(
        &self,
        a: &PartyId,
        b: &PartyId,
    ) -> Result<Option<RelationshipRecord>, StoreError> {
        let channel = ChannelKey::for_pair(a, b);
        let conn = self.connection()?;
        let record = conn
            .query_row(
                &format!(
                    "SELECT {} FROM relationships WHERE channel_key = ?1",
                    RELATIONSHIP_COLUMNS
                ),
                params![channel.as_str()],
                Self::row_to_relationship,
            )
            .optional()?;
        Ok(record)
    }

    /// Every relationship the party takes part in, on either side
    pub fn relationships_for(&self, party: &PartyId) -> Result<Vec<RelationshipRecord>, StoreError> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM relationships
             WHERE subject_id = ?1 OR counterpart_id = ?1
             ORDER BY id",
            RELATIONSHIP_COLUMNS
        ))?;

        let records = stmt
            .query_map(params![party.as_str()], Self::row_to_relationship)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Delete a relationship record
    ///
    /// The pair's interaction history is left untouched.
    pub fn remove_relationship(&self, id: RelationshipId) -> Result<(), StoreError> {
        let deleted = self
            .connection()?
            .execute("DELETE FROM relationships WHERE id = ?1", params![id.value()])?;

        if deleted == 0 {
            return Err(StoreError::NotFound(format!("relationship {}", id)));
        }
        Ok(())
    }

    /// Store the affinity score of a relationship
    pub fn update_affinity_score(&self, id: RelationshipId, score: u8) -> Result<(), StoreError> {
        if score > 100 {
            return Err(StoreError::InvalidData(format!(
                "Affinity score must be in [0, 100], got {}",
                score
            )));
        }

        let updated = self.connection()?.execute(
            "UPDATE relationships SET affinity_score = ?1 WHERE id = ?2",
            params![i64::from(score), id.value()],
        )?;

        if updated == 0 {
            return Err(StoreError::NotFound(format!("relationship {}", id)));
        }
        Ok(())
    }

    /// Append one interaction to the channel shared by sender and recipient
    pub fn record_interaction(
        &self,
        sender_id: &PartyId,
        recipient_id: &PartyId,
        occurred_at: DateTime<Utc>,
    ) -> Result<ChannelKey, StoreError> {
        if sender_id == recipient_id {
            return Err(StoreError::InvalidData(format!(
                "Sender and recipient must differ, got '{}' twice",
                sender_id
            )));
        }

        let channel = ChannelKey::for_pair(sender_id, recipient_id);
        self.connection()?.execute(
            "INSERT INTO interactions (channel_key, sender_id, occurred_at) VALUES (?1, ?2, ?3)",
            params![channel.as_str(), sender_id.as_str(), occurred_at.timestamp_millis()],
        )?;

        Ok(channel)
    }

    /// Most recent interactions of a channel, newest first
    pub fn interactions(
        &self,
        channel: &ChannelKey,
        limit: usize,
    ) -> Result<Vec<InteractionRecord>, StoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let conn = self.connection()?;
        let mut stmt = conn.prepare(
            "SELECT sender_id, occurred_at FROM interactions
             WHERE channel_key = ?1
             ORDER BY occurred_at DESC, seq DESC
             LIMIT ?2",
        )?;

        let records = stmt
            .query_map(params![channel.as_str(), limit], |row| {
                let sender: String = row.get(0)?;
                let occurred_at = Self::millis_to_datetime(row.get(1)?)
                    .map_err(|e| rusqlite::Error::FromSqlConversionFailure(
                        1, rusqlite::types::Type::Integer, Box::new(e)
                    ))?;
                Ok(InteractionRecord::new(sender, occurred_at))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Number of interactions stored for a channel
    pub fn interaction_count(&self, channel: &ChannelKey) -> Result<usize, StoreError> {
        let count: i64 = self.connection()?.query_row(
            "SELECT COUNT(*) FROM interactions WHERE channel_key = ?1",
            params![channel.as_str()],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Convert epoch milliseconds to a UTC timestamp
    fn millis_to_datetime(ms: i64) -> Result<DateTime<Utc>, StoreError> {
        DateTime::<Utc>::from_timestamp_millis(ms)
            .ok_or_else(|| StoreError::InvalidData(format!("Timestamp out of range: {}", ms)))
    }

    fn row_to_relationship(row: &Row<'_>) -> rusqlite::Result<RelationshipRecord> {
        let established_at = Self::millis_to_datetime(row.get(3)?)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(
                3, rusqlite::types::Type::Integer, Box::new(e)
            ))?;

        let score: i64 = row.get(4)?;

        Ok(RelationshipRecord {
            id: RelationshipId::from_value(row.get(0)?),
            subject_id: PartyId::new(row.get::<_, String>(1)?),
            counterpart_id: PartyId::new(row.get::<_, String>(2)?),
            established_at,
            affinity_score: score.clamp(0, 100) as u8,
        })
    }
}

impl AffinityRepository for SqliteStore {
    type Error = StoreError;

    async fn get_relationship(
        &self,
        id: RelationshipId,
    ) -> Result<Option<RelationshipRecord>, Self::Error> {
        self.relationship(id)
    }

    async fn get_interactions(
        &self,
        channel: &ChannelKey,
        limit: usize,
    ) -> Result<Vec<InteractionRecord>, Self::Error> {
        self.interactions(channel, limit)
    }

    async fn set_affinity_score(&self, id: RelationshipId, score: u8) -> Result<(), Self::Error> {
        self.update_affinity_score(id, score)
    }

    async fn list_relationships(
        &self,
        party: &PartyId,
    ) -> Result<Vec<RelationshipRecord>, Self::Error> {
        self.relationships_for(party)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_millis_round_trip_bounds() {
        assert!(SqliteStore::millis_to_datetime(0).is_ok());
        assert!(SqliteStore::millis_to_datetime(i64::MAX).is_err());
    }

    #[test]
    fn test_self_interaction_rejected() {
        let store = SqliteStore::in_memory().unwrap();
        let me = PartyId::new("me");
        let result = store.record_interaction(&me, &me, Utc::now());
        assert!(matches!(result, Err(StoreError::InvalidData(_))));
    }

    #[test]
    fn test_out_of_range_score_clamped_on_read() {
        let store = SqliteStore::in_memory().unwrap();
        let rel = store
            .add_relationship(&PartyId::new("a"), &PartyId::new("b"), Utc::now())
            .unwrap();

        store
            .connection()
            .unwrap()
            .execute(
                "UPDATE relationships SET affinity_score = 250 WHERE id = ?1",
                params![rel.id.value()],
            )
            .unwrap();

        let read = store.relationship(rel.id).unwrap().unwrap();
        assert_eq!(read.affinity_score, 100);
    }
}
