//! Player identity module.
//!
//! Provides the `PlayerName` type, the join key for every per-player
//! table. Names are compared as exact strings: no case folding and no
//! whitespace trimming.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::sync::Arc;

/// Interned player name.
///
/// Uses `Arc<str>` so the same name can appear in the roster, every
/// aggregate and the final report without repeated allocation.
///
/// # Examples
///
/// ```rust
/// use nadestat::PlayerName;
///
/// let p1 = PlayerName::new("s1mple");
/// let p2: PlayerName = "s1mple".into();
/// let p3: PlayerName = String::from("s1mple").into();
///
/// assert_eq!(p1, p2);
/// assert_eq!(p1, p3);
///
/// // Matching is exact.
/// assert_ne!(p1, PlayerName::new("S1MPLE"));
/// assert_ne!(p1, PlayerName::new("s1mple "));
/// ```
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct PlayerName(Arc<str>);

impl Serialize for PlayerName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.as_ref().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PlayerName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(PlayerName::from(s))
    }
}

impl PlayerName {
    /// Create a new `PlayerName` from a string slice.
    pub fn new(name: &str) -> Self {
        Self(Arc::from(name))
    }

    /// Get the string representation of this name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PlayerName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for PlayerName {
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl AsRef<str> for PlayerName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for PlayerName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PlayerName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&self.0)
    }
}
