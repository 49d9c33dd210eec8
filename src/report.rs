//! Report module.
//!
//! Merges the per-class [`WeaponStats`] tables of one replay into a single
//! per-player report.

use crate::combine::{CombinedStat, WeaponStats};
use crate::observer::{Diagnostic, PipelineObserver};
use crate::player::PlayerName;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// One player's stats across every tracked weapon class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerReport {
    pub player: PlayerName,
    /// Weapon class label to stat. Every tracked label is present.
    pub utility: BTreeMap<String, CombinedStat>,
}

impl PlayerReport {
    /// Stat for one weapon class.
    pub fn get(&self, label: &str) -> Option<&CombinedStat> {
        self.utility.get(label)
    }

    /// Throws across all classes.
    pub fn total_count(&self) -> u64 {
        self.utility.values().map(|stat| stat.count).sum()
    }

    /// Damage across all classes.
    pub fn total_damage(&self) -> f64 {
        self.utility.values().map(|stat| stat.damage).sum()
    }
}

/// Per-player utility report for one replay.
///
/// Read-only once built. Serializes to a stable JSON shape, so two runs
/// over the same replay produce identical output.
///
/// # Examples
///
/// ```rust
/// use nadestat::{merge, CombinedStat, PlayerName, StatRow, WeaponStats};
/// use nadestat::observer::NoopObserver;
///
/// let he = WeaponStats {
///     label: "he".into(),
///     rows: vec![StatRow { player: PlayerName::new("p1"), stat: CombinedStat::new(2, 50.0) }],
/// };
/// let molly = WeaponStats {
///     label: "incendiary".into(),
///     rows: vec![StatRow { player: PlayerName::new("p1"), stat: CombinedStat::new(1, 30.0) }],
/// };
///
/// let report = merge(&[he, molly], &NoopObserver);
/// assert_eq!(report.stat("p1", "he").unwrap().average, 25.0);
/// assert_eq!(report.get("p1").unwrap().total_damage(), 80.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Weapon class labels, in configuration order.
    pub weapons: Vec<String>,
    /// Player rows, in roster order.
    pub players: Vec<PlayerReport>,
}

impl Report {
    /// Row for one player.
    pub fn get(&self, player: &str) -> Option<&PlayerReport> {
        self.players.iter().find(|row| row.player.as_str() == player)
    }

    /// Stat for one player and weapon class.
    pub fn stat(&self, player: &str, label: &str) -> Option<&CombinedStat> {
        self.get(player).and_then(|row| row.get(label))
    }

    /// Number of player rows.
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Whether the report has no player rows.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Whole-replay totals for one weapon class.
    pub fn class_total(&self, label: &str) -> CombinedStat {
        let (count, damage) = self
            .players
            .iter()
            .filter_map(|row| row.get(label))
            .fold((0, 0.0), |(count, damage), stat| {
                (count + stat.count, damage + stat.damage)
            });
        CombinedStat::new(count, damage)
    }
}

/// Outer-join weapon tables on player name.
///
/// Rows follow first appearance across `tables` (roster order, since every
/// table is roster-complete). A player missing from some table gets a
/// zero stat for that class. Names are matched exactly.
pub fn merge(tables: &[WeaponStats], observer: &dyn PipelineObserver) -> Report {
    let weapons: Vec<String> = tables.iter().map(|table| table.label.clone()).collect();
    let blank: BTreeMap<String, CombinedStat> = weapons
        .iter()
        .map(|label| (label.clone(), CombinedStat::default()))
        .collect();

    let mut index: HashMap<PlayerName, usize> = HashMap::new();
    let mut players: Vec<PlayerReport> = Vec::new();
    for table in tables {
        for row in &table.rows {
            let slot = *index.entry(row.player.clone()).or_insert_with(|| {
                players.push(PlayerReport {
                    player: row.player.clone(),
                    utility: blank.clone(),
                });
                players.len() - 1
            });
            players[slot].utility.insert(table.label.clone(), row.stat);
        }
    }

    for table in tables {
        if table.len() != players.len() {
            observer.observe(&Diagnostic::RowCountMismatch {
                stage: format!("merge of '{}'", table.label),
                expected: table.len(),
                actual: players.len(),
            });
        }
    }

    Report { weapons, players }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combine::StatRow;
    use crate::observer::{NoopObserver, RecordingObserver};

    fn table(label: &str, rows: &[(&str, u64, f64)]) -> WeaponStats {
        WeaponStats {
            label: label.to_owned(),
            rows: rows
                .iter()
                .map(|(name, count, damage)| StatRow {
                    player: PlayerName::new(name),
                    stat: CombinedStat::new(*count, *damage),
                })
                .collect(),
        }
    }

    #[test]
    fn test_merge_aligned_tables() {
        let he = table("he", &[("p1", 3, 60.0), ("p2", 0, 0.0)]);
        let inc = table("incendiary", &[("p1", 1, 12.0), ("p2", 2, 50.0)]);

        let report = merge(&[he, inc], &NoopObserver);

        assert_eq!(report.weapons, vec!["he", "incendiary"]);
        assert_eq!(report.len(), 2);
        assert_eq!(report.stat("p2", "incendiary").unwrap().average, 25.0);
        assert_eq!(report.get("p1").unwrap().total_count(), 4);
    }

    #[test]
    fn test_merge_zero_fills_absent_side() {
        let he = table("he", &[("p1", 1, 10.0)]);
        let inc = table("incendiary", &[("p1", 0, 0.0), ("p2", 2, 40.0)]);
        let observer = RecordingObserver::new();

        let report = merge(&[he, inc], &observer);

        assert_eq!(report.len(), 2);
        assert_eq!(report.stat("p2", "he"), Some(&CombinedStat::default()));
        assert_eq!(report.stat("p2", "incendiary").unwrap().count, 2);
        assert_eq!(
            observer.diagnostics(),
            vec![Diagnostic::RowCountMismatch {
                stage: "merge of 'he'".into(),
                expected: 1,
                actual: 2,
            }]
        );
    }

    #[test]
    fn test_merge_keeps_first_appearance_order() {
        let he = table("he", &[("b", 0, 0.0), ("a", 0, 0.0)]);
        let report = merge(&[he], &NoopObserver);
        let names: Vec<_> = report.players.iter().map(|r| r.player.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_merge_is_case_sensitive() {
        let he = table("he", &[("Ropz", 1, 0.0)]);
        let inc = table("incendiary", &[("ropz", 1, 0.0)]);
        let report = merge(&[he, inc], &NoopObserver);
        assert_eq!(report.len(), 2);
    }

    #[test]
    fn test_class_total() {
        let he = table("he", &[("p1", 3, 60.0), ("p2", 1, 30.0)]);
        let report = merge(&[he], &NoopObserver);
        assert_eq!(report.class_total("he"), CombinedStat::new(4, 90.0));
        assert_eq!(report.class_total("smoke"), CombinedStat::default());
    }

    #[test]
    fn test_merge_nothing() {
        let report = merge(&[], &NoopObserver);
        assert!(report.is_empty());
        assert!(report.weapons.is_empty());
    }
}
