//! Per-weapon aggregation.
//!
//! Two aggregates are computed for every tracked weapon class:
//!
//! ```text
//! detonation events ──count by actor──► reindex on roster ──► CountAggregate
//! damage events ──filter weapon──► sum by attacker ─────────► DamageAggregate
//! ```
//!
//! Count tables are roster-complete from the start (zero-filled). Damage
//! tables only hold players who dealt damage; zero-filling them is the
//! combiner's job.

use crate::config::PipelineConfig;
use crate::error::{NadeError, Result};
use crate::event::EventRecord;
use crate::observer::{Diagnostic, PipelineObserver};
use crate::player::PlayerName;
use crate::roster::Roster;
use crate::source::ReplayHandle;
use serde::Serialize;
use std::cell::OnceCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Per-player event counts for one event type, one row per roster entry.
///
/// Invariant: `total() + unrostered() == ` number of raw records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountAggregate {
    event: String,
    counts: Vec<(PlayerName, u64)>,
    unrostered: u64,
}

impl CountAggregate {
    /// Event type these counts were taken from.
    pub fn event(&self) -> &str {
        &self.event
    }

    /// Count for one player, `None` if the player is not in the table.
    pub fn get(&self, player: &str) -> Option<u64> {
        self.counts
            .iter()
            .find(|(name, _)| name.as_str() == player)
            .map(|(_, count)| *count)
    }

    /// Rows in roster order.
    pub fn iter(&self) -> impl Iterator<Item = (&PlayerName, u64)> {
        self.counts.iter().map(|(name, count)| (name, *count))
    }

    /// Number of rows (equals the roster size).
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum over all rows.
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|(_, count)| count).sum()
    }

    /// Records whose actor was missing or not in the roster.
    pub fn unrostered(&self) -> u64 {
        self.unrostered
    }
}

/// Per-player damage for one weapon tag.
///
/// Only players with at least one matching damage record appear.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DamageAggregate {
    weapon_tag: String,
    damage: BTreeMap<PlayerName, f64>,
    unattributed: f64,
}

impl DamageAggregate {
    /// Weapon tag the damage records were filtered on.
    pub fn weapon_tag(&self) -> &str {
        &self.weapon_tag
    }

    /// Damage dealt by one player, `None` if absent.
    pub fn get(&self, player: &str) -> Option<f64> {
        self.damage.get(player).copied()
    }

    /// Rows ordered by player name.
    pub fn iter(&self) -> impl Iterator<Item = (&PlayerName, f64)> {
        self.damage.iter().map(|(name, damage)| (name, *damage))
    }

    /// Number of players with attributed damage.
    pub fn len(&self) -> usize {
        self.damage.len()
    }

    /// Whether no damage was attributed to anyone.
    pub fn is_empty(&self) -> bool {
        self.damage.is_empty()
    }

    /// Sum over all players.
    pub fn total(&self) -> f64 {
        self.damage.values().sum()
    }

    /// Matching damage whose attacker was null.
    pub fn unattributed(&self) -> f64 {
        self.unattributed
    }
}

/// Count records of `event` per actor and reindex onto `roster`.
///
/// Every roster entry gets a row, in roster order, with zero when the
/// player has no records. Records by actors outside the roster (or with a
/// null actor) are not counted in any row; they are tallied in
/// [`CountAggregate::unrostered`] and reported to the observer.
///
/// # Errors
///
/// `MissingColumn`/`InvalidColumn` when a record has no usable actor column.
///
/// # Examples
///
/// ```rust
/// use nadestat::{count_events, EventRecord, Roster};
/// use nadestat::observer::NoopObserver;
///
/// let roster = Roster::from_names(["ropz", "frozen"]);
/// let records = vec![
///     EventRecord::new().with("user_name", "ropz"),
///     EventRecord::new().with("user_name", "ropz"),
/// ];
///
/// let counts = count_events("hegrenade_detonate", &records, "user_name", &roster, &NoopObserver).unwrap();
/// assert_eq!(counts.get("ropz"), Some(2));
/// assert_eq!(counts.get("frozen"), Some(0));
/// assert_eq!(counts.len(), 2);
/// ```
pub fn count_events(
    event: &str,
    records: &[EventRecord],
    actor_column: &str,
    roster: &Roster,
    observer: &dyn PipelineObserver,
) -> Result<CountAggregate> {
    if records.is_empty() {
        observer.observe(&Diagnostic::EmptyEventTable {
            event: event.to_owned(),
        });
    }

    let mut tally: HashMap<&str, u64> = HashMap::new();
    let mut outsiders = BTreeSet::new();
    let mut unrostered = 0;
    for record in records {
        match record.text(event, actor_column)? {
            Some(actor) if roster.contains(actor) => *tally.entry(actor).or_insert(0) += 1,
            Some(actor) => {
                outsiders.insert(PlayerName::new(actor));
                unrostered += 1;
            }
            None => unrostered += 1,
        }
    }

    if unrostered > 0 {
        observer.observe(&Diagnostic::UnrosteredActivity {
            event: event.to_owned(),
            players: outsiders.into_iter().collect(),
            records: unrostered,
        });
    }

    let counts = roster
        .iter()
        .map(|player| {
            let count = tally.get(player.as_str()).copied().unwrap_or(0);
            (player.clone(), count)
        })
        .collect();

    Ok(CountAggregate {
        event: event.to_owned(),
        counts,
        unrostered,
    })
}

/// Sum damage per attacker over the records whose weapon column equals
/// `weapon_tag`.
///
/// Matching records with a null attacker are summed into
/// [`DamageAggregate::unattributed`]; a null damage value contributes 0.
/// A negative damage value is a schema error.
///
/// # Errors
///
/// `MissingColumn`/`InvalidColumn` when a record lacks the weapon column,
/// or a matching record lacks the attacker or damage column.
pub fn sum_damage(
    event: &str,
    records: &[EventRecord],
    config: &PipelineConfig,
    weapon_tag: &str,
    observer: &dyn PipelineObserver,
) -> Result<DamageAggregate> {
    let columns = &config.columns;
    let mut damage: BTreeMap<PlayerName, f64> = BTreeMap::new();
    let mut unattributed = 0.0;
    let mut matched = 0usize;

    for record in records {
        if record.text(event, &columns.weapon)? != Some(weapon_tag) {
            continue;
        }
        matched += 1;

        let amount = record.number(event, &columns.damage)?.unwrap_or(0.0);
        if amount < 0.0 {
            return Err(NadeError::InvalidColumn {
                event: event.to_owned(),
                column: columns.damage.clone(),
                expected: "a non-negative number",
            });
        }
        match record.text(event, &columns.attacker)? {
            Some(attacker) => *damage.entry(PlayerName::new(attacker)).or_insert(0.0) += amount,
            None => unattributed += amount,
        }
    }

    if matched == 0 {
        observer.observe(&Diagnostic::NoMatchingDamage {
            weapon_tag: weapon_tag.to_owned(),
        });
    }
    if unattributed != 0.0 {
        observer.observe(&Diagnostic::UnattributedDamage {
            weapon_tag: weapon_tag.to_owned(),
            damage: unattributed,
        });
    }

    Ok(DamageAggregate {
        weapon_tag: weapon_tag.to_owned(),
        damage,
        unattributed,
    })
}

/// Per-replay aggregator reading event tables from an opened replay.
///
/// The damage table is fetched once and shared by every weapon class.
pub struct Aggregator<'a> {
    handle: &'a dyn ReplayHandle,
    config: &'a PipelineConfig,
    observer: &'a dyn PipelineObserver,
    damage_records: OnceCell<Vec<EventRecord>>,
}

impl<'a> Aggregator<'a> {
    /// Create an aggregator over one replay.
    pub fn new(
        handle: &'a dyn ReplayHandle,
        config: &'a PipelineConfig,
        observer: &'a dyn PipelineObserver,
    ) -> Self {
        Self {
            handle,
            config,
            observer,
            damage_records: OnceCell::new(),
        }
    }

    /// Count detonation events per roster player.
    pub fn count_for_weapon(
        &self,
        detonation_event: &str,
        roster: &Roster,
    ) -> Result<CountAggregate> {
        let records = self.handle.fetch_events(detonation_event)?;
        tracing::debug!(
            event = detonation_event,
            records = records.len(),
            "counting detonations"
        );
        count_events(
            detonation_event,
            &records,
            &self.config.columns.actor,
            roster,
            self.observer,
        )
    }

    /// Sum damage per attacker for one weapon tag.
    ///
    /// Takes no roster: rows are keyed by attacker here and zero-filled
    /// onto the roster in [`combine`](crate::combine::combine).
    pub fn damage_for_weapon(&self, weapon_tag: &str) -> Result<DamageAggregate> {
        let records = self.damage_records()?;
        sum_damage(
            &self.config.damage_event,
            records,
            self.config,
            weapon_tag,
            self.observer,
        )
    }

    fn damage_records(&self) -> Result<&[EventRecord]> {
        if let Some(records) = self.damage_records.get() {
            return Ok(records.as_slice());
        }

        let event = &self.config.damage_event;
        let records = self.handle.fetch_events(event)?;
        tracing::debug!(event = %event, records = records.len(), "fetched damage events");
        if records.is_empty() {
            self.observer.observe(&Diagnostic::EmptyEventTable {
                event: event.clone(),
            });
        }
        Ok(self.damage_records.get_or_init(|| records).as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NadeError;
    use crate::observer::{NoopObserver, RecordingObserver};
    use crate::source::MemoryReplay;
    use serde_json::Value;

    fn detonation(thrower: &str) -> EventRecord {
        EventRecord::new().with("user_name", thrower)
    }

    fn hurt(attacker: Value, weapon: &str, dmg: i64) -> EventRecord {
        EventRecord::new()
            .with("attacker_name", attacker)
            .with("weapon", weapon)
            .with("dmg_health", dmg)
    }

    #[test]
    fn test_count_reindexes_onto_roster() {
        let roster = Roster::from_names(["p1", "p2", "p3"]);
        let records = vec![detonation("p3"), detonation("p1"), detonation("p3")];

        let counts = count_events("he", &records, "user_name", &roster, &NoopObserver).unwrap();

        let rows: Vec<_> = counts.iter().map(|(p, c)| (p.as_str(), c)).collect();
        assert_eq!(rows, vec![("p1", 1), ("p2", 0), ("p3", 2)]);
        assert_eq!(counts.total(), 3);
        assert_eq!(counts.unrostered(), 0);
    }

    #[test]
    fn test_count_with_no_events_is_all_zero() {
        let roster = Roster::from_names(["p1"]);
        let observer = RecordingObserver::new();

        let counts = count_events("hegrenade_detonate", &[], "user_name", &roster, &observer).unwrap();

        assert_eq!(counts.len(), 1);
        assert_eq!(counts.get("p1"), Some(0));
        assert_eq!(
            observer.diagnostics(),
            vec![Diagnostic::EmptyEventTable {
                event: "hegrenade_detonate".into()
            }]
        );
    }

    #[test]
    fn test_count_excludes_unrostered_actors() {
        let roster = Roster::from_names(["p1"]);
        let records = vec![
            detonation("p1"),
            detonation("ghost"),
            EventRecord::new().with("user_name", Value::Null),
        ];
        let observer = RecordingObserver::new();

        let counts = count_events("he", &records, "user_name", &roster, &observer).unwrap();

        assert_eq!(counts.len(), 1);
        assert_eq!(counts.total() + counts.unrostered(), 3);
        assert_eq!(
            observer.diagnostics(),
            vec![Diagnostic::UnrosteredActivity {
                event: "he".into(),
                players: vec![PlayerName::new("ghost")],
                records: 2,
            }]
        );
    }

    #[test]
    fn test_count_missing_actor_column() {
        let roster = Roster::from_names(["p1"]);
        let records = vec![EventRecord::new().with("entityid", 4)];
        assert!(matches!(
            count_events("he", &records, "user_name", &roster, &NoopObserver),
            Err(NadeError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_damage_filters_and_sums() {
        let records = vec![
            hurt("p1".into(), "hegrenade", 40),
            hurt("p1".into(), "ak47", 100),
            hurt("p2".into(), "inferno", 8),
            hurt("p1".into(), "hegrenade", 20),
            hurt(Value::Null, "hegrenade", 5),
        ];
        let config = PipelineConfig::default();

        let he = sum_damage("player_hurt", &records, &config, "hegrenade", &NoopObserver).unwrap();

        assert_eq!(he.get("p1"), Some(60.0));
        assert_eq!(he.get("p2"), None);
        assert_eq!(he.unattributed(), 5.0);
        assert_eq!(he.total() + he.unattributed(), 65.0);
    }

    #[test]
    fn test_damage_no_match_is_empty() {
        let records = vec![hurt("p1".into(), "awp", 100)];
        let observer = RecordingObserver::new();

        let dmg = sum_damage(
            "player_hurt",
            &records,
            &PipelineConfig::default(),
            "inferno",
            &observer,
        )
        .unwrap();

        assert!(dmg.is_empty());
        assert_eq!(
            observer.diagnostics(),
            vec![Diagnostic::NoMatchingDamage {
                weapon_tag: "inferno".into()
            }]
        );
    }

    #[test]
    fn test_negative_damage_aborts() {
        let records = vec![hurt("p1".into(), "hegrenade", -30)];
        let err = sum_damage(
            "player_hurt",
            &records,
            &PipelineConfig::default(),
            "hegrenade",
            &NoopObserver,
        )
        .unwrap_err();
        assert_eq!(
            err,
            NadeError::InvalidColumn {
                event: "player_hurt".into(),
                column: "dmg_health".into(),
                expected: "a non-negative number",
            }
        );
    }

    #[test]
    fn test_damage_missing_weapon_column_aborts() {
        let records = vec![EventRecord::new()
            .with("attacker_name", "p1")
            .with("dmg_health", 10)];
        let err = sum_damage(
            "player_hurt",
            &records,
            &PipelineConfig::default(),
            "hegrenade",
            &NoopObserver,
        )
        .unwrap_err();
        assert_eq!(
            err,
            NadeError::MissingColumn {
                event: "player_hurt".into(),
                column: "weapon".into()
            }
        );
    }

    #[test]
    fn test_aggregator_reads_handle() {
        let replay = MemoryReplay::new()
            .with_event("hegrenade_detonate", detonation("p1"))
            .with_event("player_hurt", hurt("p1".into(), "hegrenade", 33))
            .with_event("player_hurt", hurt("p1".into(), "inferno", 7));
        let config = PipelineConfig::default();
        let observer = RecordingObserver::new();
        let aggregator = Aggregator::new(&replay, &config, &observer);
        let roster = Roster::from_names(["p1"]);

        let counts = aggregator
            .count_for_weapon("hegrenade_detonate", &roster)
            .unwrap();
        assert_eq!(counts.get("p1"), Some(1));

        assert_eq!(aggregator.damage_for_weapon("hegrenade").unwrap().get("p1"), Some(33.0));
        assert_eq!(aggregator.damage_for_weapon("inferno").unwrap().get("p1"), Some(7.0));
        assert!(observer.diagnostics().is_empty());
    }
}
