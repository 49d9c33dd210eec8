//! Pipeline diagnostics.
//!
//! Aggregation stages report advisory conditions (empty tables, activity
//! outside the roster, joins that lost or gained rows) as [`Diagnostic`]
//! values handed to a [`PipelineObserver`]. Observers only watch: a
//! diagnostic never changes a computed value.

use crate::player::PlayerName;
use serde::Serialize;
use std::fmt;
use std::sync::Mutex;

/// An advisory condition found while aggregating one replay.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// The roster resolved to no players.
    EmptyRoster,

    /// An event table the pipeline read had no records.
    EmptyEventTable { event: String },

    /// No damage record matched a weapon tag.
    NoMatchingDamage { weapon_tag: String },

    /// Records by players outside the roster were left out of a count table.
    UnrosteredActivity {
        event: String,
        players: Vec<PlayerName>,
        records: u64,
    },

    /// Damage records for a weapon had no attacker.
    UnattributedDamage { weapon_tag: String, damage: f64 },

    /// Damage by players outside the count table was left out of the join.
    UnmatchedDamage {
        label: String,
        players: Vec<PlayerName>,
        damage: f64,
    },

    /// A join produced a different number of rows than its left side.
    RowCountMismatch {
        stage: String,
        expected: usize,
        actual: usize,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::EmptyRoster => write!(f, "roster is empty"),
            Diagnostic::EmptyEventTable { event } => write!(f, "no '{}' events found", event),
            Diagnostic::NoMatchingDamage { weapon_tag } => {
                write!(f, "no damage records with weapon '{}'", weapon_tag)
            }
            Diagnostic::UnrosteredActivity {
                event,
                players,
                records,
            } => write!(
                f,
                "{} '{}' records by {} players outside the roster were excluded",
                records,
                event,
                players.len()
            ),
            Diagnostic::UnattributedDamage { weapon_tag, damage } => write!(
                f,
                "{} '{}' damage had no attacker",
                damage, weapon_tag
            ),
            Diagnostic::UnmatchedDamage {
                label,
                players,
                damage,
            } => write!(
                f,
                "{} '{}' damage by {} players without a count row was dropped",
                damage,
                label,
                players.len()
            ),
            Diagnostic::RowCountMismatch {
                stage,
                expected,
                actual,
            } => write!(
                f,
                "{} produced {} rows, expected {}",
                stage, actual, expected
            ),
        }
    }
}

/// Receiver for pipeline diagnostics.
///
/// # Examples
///
/// ```rust
/// use nadestat::observer::{Diagnostic, PipelineObserver, RecordingObserver};
///
/// let observer = RecordingObserver::new();
/// observer.observe(&Diagnostic::EmptyRoster);
/// assert_eq!(observer.diagnostics(), vec![Diagnostic::EmptyRoster]);
/// ```
pub trait PipelineObserver: Send + Sync {
    /// Called once per diagnostic, in the order stages raise them.
    fn observe(&self, diagnostic: &Diagnostic);
}

/// Observer that logs every diagnostic as a `tracing` warning.
///
/// This is the pipeline's default observer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn observe(&self, diagnostic: &Diagnostic) {
        tracing::warn!(diagnostic = ?diagnostic, "{}", diagnostic);
    }
}

/// Observer that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {
    fn observe(&self, _diagnostic: &Diagnostic) {}
}

/// Observer that keeps every diagnostic in memory.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    seen: Mutex<Vec<Diagnostic>>,
}

impl RecordingObserver {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything observed so far.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.seen
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl PipelineObserver for RecordingObserver {
    fn observe(&self, diagnostic: &Diagnostic) {
        self.seen
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(diagnostic.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_observer_keeps_order() {
        let observer = RecordingObserver::new();
        observer.observe(&Diagnostic::EmptyEventTable {
            event: "hegrenade_detonate".into(),
        });
        observer.observe(&Diagnostic::EmptyRoster);

        let seen = observer.diagnostics();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1], Diagnostic::EmptyRoster);
    }

    #[test]
    fn test_diagnostic_display() {
        let d = Diagnostic::RowCountMismatch {
            stage: "merge".into(),
            expected: 10,
            actual: 11,
        };
        assert_eq!(d.to_string(), "merge produced 11 rows, expected 10");
    }

    #[test]
    fn test_diagnostic_serializes_with_kind_tag() {
        let d = Diagnostic::NoMatchingDamage {
            weapon_tag: "inferno".into(),
        };
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["kind"], "no_matching_damage");
        assert_eq!(json["weapon_tag"], "inferno");
    }
}
