//! Event sources module.
//!
//! The event source is the collaborator that decodes a replay into typed
//! event tables. The pipeline only consumes it through the two traits
//! here, so any replay decoder can be plugged in. Two implementations
//! ship with the crate: an in-memory source (tests, embedding) and a
//! JSON source reading event tables exported to disk.

use crate::error::{NadeError, Result};
use crate::event::EventRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// An opened replay.
///
/// Implementations must be deterministic: the same handle queried twice
/// returns the same tables.
pub trait ReplayHandle: Send + Sync {
    /// Player names listed by the replay's player-info records.
    ///
    /// May contain duplicates; the roster resolver deduplicates.
    fn list_players(&self) -> Result<Vec<String>>;

    /// All records of one event type, in replay order.
    ///
    /// Returns an empty vector (never an error) when the event never
    /// occurred in the replay.
    fn fetch_events(&self, event_name: &str) -> Result<Vec<EventRecord>>;
}

/// Trait for sources that open replays by identifier.
///
/// # Examples
///
/// ```rust
/// use nadestat::source::{EventSource, MemoryReplay, MemorySource};
///
/// let mut source = MemorySource::new();
/// source.insert("match-1", MemoryReplay::new().with_players(["ropz", "frozen"]));
///
/// let handle = source.open_replay("match-1").unwrap();
/// assert_eq!(handle.list_players().unwrap(), vec!["ropz", "frozen"]);
/// assert!(handle.fetch_events("hegrenade_detonate").unwrap().is_empty());
///
/// assert!(source.open_replay("missing").is_err());
/// ```
pub trait EventSource: Send + Sync {
    /// Open a replay.
    ///
    /// # Errors
    ///
    /// `ReplayOpen` when the identifier does not name a valid replay.
    fn open_replay(&self, replay: &str) -> Result<Box<dyn ReplayHandle>>;
}

/// A replay held entirely in memory.
///
/// Its serde form is also the on-disk format read by [`JsonSource`]:
///
/// ```json
/// {
///   "players": ["ropz", "frozen"],
///   "events": {
///     "hegrenade_detonate": [{ "user_name": "ropz" }],
///     "player_hurt": [{ "attacker_name": "ropz", "weapon": "hegrenade", "dmg_health": 40 }]
///   }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryReplay {
    #[serde(default)]
    players: Vec<String>,
    #[serde(default)]
    events: BTreeMap<String, Vec<EventRecord>>,
}

impl MemoryReplay {
    /// Create an empty replay.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the player-info list.
    pub fn with_players<I, S>(mut self, players: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.players = players.into_iter().map(Into::into).collect();
        self
    }

    /// Builder form of [`MemoryReplay::push_event`].
    pub fn with_event(mut self, event_name: &str, record: EventRecord) -> Self {
        self.push_event(event_name, record);
        self
    }

    /// Append a record to an event table.
    pub fn push_event(&mut self, event_name: &str, record: EventRecord) {
        self.events
            .entry(event_name.to_owned())
            .or_default()
            .push(record);
    }
}

impl ReplayHandle for MemoryReplay {
    fn list_players(&self) -> Result<Vec<String>> {
        Ok(self.players.clone())
    }

    fn fetch_events(&self, event_name: &str) -> Result<Vec<EventRecord>> {
        Ok(self.events.get(event_name).cloned().unwrap_or_default())
    }
}

/// A map-based source of in-memory replays.
///
/// Identifiers not in the map fail to open, as do identifiers registered
/// with [`MemorySource::insert_corrupt`].
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    replays: BTreeMap<String, MemoryReplay>,
    corrupt: BTreeMap<String, String>,
}

impl MemorySource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a replay under an identifier.
    pub fn insert(&mut self, replay: impl Into<String>, data: MemoryReplay) {
        self.replays.insert(replay.into(), data);
    }

    /// Register an identifier that always fails to open with `reason`.
    pub fn insert_corrupt(&mut self, replay: impl Into<String>, reason: impl Into<String>) {
        self.corrupt.insert(replay.into(), reason.into());
    }
}

impl EventSource for MemorySource {
    fn open_replay(&self, replay: &str) -> Result<Box<dyn ReplayHandle>> {
        if let Some(reason) = self.corrupt.get(replay) {
            return Err(NadeError::ReplayOpen {
                replay: replay.to_owned(),
                reason: reason.clone(),
            });
        }
        self.replays
            .get(replay)
            .map(|data| Box::new(data.clone()) as Box<dyn ReplayHandle>)
            .ok_or_else(|| NadeError::ReplayOpen {
                replay: replay.to_owned(),
                reason: "unknown replay".to_owned(),
            })
    }
}

/// Source reading replays exported as JSON event tables.
///
/// The replay identifier is a file path, resolved against an optional
/// root directory. Each file holds one [`MemoryReplay`] document.
#[derive(Debug, Clone, Default)]
pub struct JsonSource {
    root: Option<PathBuf>,
}

impl JsonSource {
    /// Source treating identifiers as paths relative to the working directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Source treating identifiers as paths relative to `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn resolve(&self, replay: &str) -> PathBuf {
        match &self.root {
            Some(root) => root.join(replay),
            None => Path::new(replay).to_path_buf(),
        }
    }
}

impl EventSource for JsonSource {
    fn open_replay(&self, replay: &str) -> Result<Box<dyn ReplayHandle>> {
        let path = self.resolve(replay);
        let open_error = |reason: String| NadeError::ReplayOpen {
            replay: replay.to_owned(),
            reason,
        };

        let raw = std::fs::read_to_string(&path)
            .map_err(|e| open_error(format!("{}: {}", path.display(), e)))?;
        let data: MemoryReplay =
            serde_json::from_str(&raw).map_err(|e| open_error(e.to_string()))?;

        tracing::debug!(
            replay,
            players = data.players.len(),
            tables = data.events.len(),
            "opened replay export"
        );
        Ok(Box::new(data))
    }
}
