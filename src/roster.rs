//! Player roster resolution.
//!
//! The roster is the fixed index domain of every per-player table for a
//! replay. Different event streams can disagree on who played, so the
//! stream used is an explicit [`RosterPolicy`] rather than a hard-coded
//! choice.

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::player::PlayerName;
use crate::source::ReplayHandle;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashSet;

/// Which event stream defines the roster.
///
/// The default, `PlayerInfo`, uses the replay's dedicated player-info
/// records and therefore includes players who never dealt damage.
/// `DamageAttackers` uses the names seen as attackers in damage events,
/// which omits anyone who never hurt another player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RosterPolicy {
    /// Player-info records (`ReplayHandle::list_players`).
    #[default]
    PlayerInfo,
    /// Unique non-null attacker names in the damage event table.
    DamageAttackers,
}

/// Ordered, duplicate-free set of players for one replay.
///
/// Order is first appearance in the source stream.
///
/// # Examples
///
/// ```rust
/// use nadestat::Roster;
///
/// let roster = Roster::from_names(["ropz", "frozen", "ropz", "broky"]);
/// assert_eq!(roster.len(), 3);
/// assert!(roster.contains("frozen"));
///
/// let names: Vec<_> = roster.iter().map(|p| p.as_str()).collect();
/// assert_eq!(names, vec!["ropz", "frozen", "broky"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    players: Vec<PlayerName>,
    members: HashSet<PlayerName>,
}

impl Roster {
    /// Build a roster, keeping the first occurrence of each name.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<PlayerName>,
    {
        names.into_iter().map(Into::into).collect()
    }

    /// Number of players.
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Whether the roster has no players.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Exact-match membership test.
    pub fn contains(&self, name: &str) -> bool {
        self.members.contains(name)
    }

    /// Players in roster order.
    pub fn iter(&self) -> std::slice::Iter<'_, PlayerName> {
        self.players.iter()
    }

    /// Players in roster order, as a slice.
    pub fn players(&self) -> &[PlayerName] {
        &self.players
    }
}

impl FromIterator<PlayerName> for Roster {
    fn from_iter<T: IntoIterator<Item = PlayerName>>(iter: T) -> Self {
        let mut roster = Roster::default();
        for name in iter {
            if roster.members.insert(name.clone()) {
                roster.players.push(name);
            }
        }
        roster
    }
}

impl<'a> IntoIterator for &'a Roster {
    type Item = &'a PlayerName;
    type IntoIter = std::slice::Iter<'a, PlayerName>;

    fn into_iter(self) -> Self::IntoIter {
        self.players.iter()
    }
}

impl Serialize for Roster {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.players.serialize(serializer)
    }
}

/// Resolve the roster of an opened replay according to `config.roster`.
///
/// An empty roster is a valid result.
///
/// # Errors
///
/// Propagates source failures, and `MissingColumn` when the
/// `DamageAttackers` policy reads damage records without an attacker column.
pub fn resolve_roster(handle: &dyn ReplayHandle, config: &PipelineConfig) -> Result<Roster> {
    let roster = match config.roster {
        RosterPolicy::PlayerInfo => Roster::from_names(handle.list_players()?),
        RosterPolicy::DamageAttackers => {
            let event = config.damage_event.as_str();
            let records = handle.fetch_events(event)?;
            let mut names = Vec::with_capacity(records.len());
            for record in &records {
                if let Some(name) = record.text(event, &config.columns.attacker)? {
                    names.push(PlayerName::new(name));
                }
            }
            names.into_iter().collect()
        }
    };

    tracing::debug!(policy = ?config.roster, players = roster.len(), "resolved roster");
    Ok(roster)
}
