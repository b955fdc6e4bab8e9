//! Identifier types for parties, relationships, and their shared channel

use std::fmt;

/// Opaque identifier of one party (a user) in a relationship
///
/// The scoring layer never inspects the contents; it only compares ids
/// and orders them to derive a [`ChannelKey`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PartyId(String);

impl PartyId {
    /// Create a party id from any string-like value
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PartyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PartyId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PartyId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Identifier of a relationship record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RelationshipId(i64);

impl RelationshipId {
    /// Create a relationship id from a raw value
    ///
    /// This is primarily for storage layer deserialization.
    pub fn from_value(value: i64) -> Self {
        Self(value)
    }

    /// Get the raw value
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for RelationshipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RelationshipId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|e| format!("Invalid relationship id '{}': {}", s, e))
    }
}

/// Canonical, order-independent key for the interaction channel of a pair
///
/// Both party ids are sorted and joined with `_`, so `for_pair(a, b)` and
/// `for_pair(b, a)` produce the same key. A `_` or `\` inside an id is
/// escaped with `\`, so distinct pairs never share a key.
///
/// # Examples
///
/// ```
/// use affinity_domain::{ChannelKey, PartyId};
///
/// let alice = PartyId::new("alice");
/// let bob = PartyId::new("bob");
/// assert_eq!(ChannelKey::for_pair(&alice, &bob), ChannelKey::for_pair(&bob, &alice));
/// assert_eq!(ChannelKey::for_pair(&bob, &alice).as_str(), "alice_bob");
///
/// let a_b = PartyId::new("a_b");
/// assert_eq!(ChannelKey::for_pair(&a_b, &PartyId::new("c")).as_str(), r"a\_b_c");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelKey(String);

impl ChannelKey {
    /// Separator placed between the two sorted ids
    pub const SEPARATOR: char = '_';

    /// Prefix marking a literal separator or escape inside an id
    pub const ESCAPE: char = '\\';

    /// Derive the channel key for two parties
    pub fn for_pair(a: &PartyId, b: &PartyId) -> Self {
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        let mut key = String::with_capacity(first.as_str().len() + second.as_str().len() + 1);
        Self::push_escaped(&mut key, first.as_str());
        key.push(Self::SEPARATOR);
        Self::push_escaped(&mut key, second.as_str());
        Self(key)
    }

    fn push_escaped(key: &mut String, id: &str) {
        for ch in id.chars() {
            if ch == Self::SEPARATOR || ch == Self::ESCAPE {
                key.push(Self::ESCAPE);
            }
            key.push(ch);
        }
    }

    /// Wrap an already-canonical key (e.g. read back from storage)
    pub fn from_raw(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Borrow the key as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
