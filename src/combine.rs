//! Stat combination.
//!
//! Joins a weapon class's count table with its damage table and derives
//! the average damage per use.

use crate::aggregate::{CountAggregate, DamageAggregate};
use crate::observer::{Diagnostic, PipelineObserver};
use crate::player::PlayerName;
use serde::{Deserialize, Serialize};

/// Average damage per use, rounded to one decimal (ties to even).
///
/// A zero count always yields `0.0`, never NaN.
///
/// # Examples
///
/// ```rust
/// use nadestat::average_per_use;
///
/// assert_eq!(average_per_use(60.0, 3), 20.0);
/// assert_eq!(average_per_use(50.0, 3), 16.7);
/// assert_eq!(average_per_use(45.0, 20), 2.2);
/// assert_eq!(average_per_use(0.0, 0), 0.0);
/// assert_eq!(average_per_use(12.0, 0), 0.0);
/// ```
pub fn average_per_use(damage: f64, count: u64) -> f64 {
    if count == 0 {
        return 0.0;
    }
    (damage / count as f64 * 10.0).round_ties_even() / 10.0
}

/// One player's numbers for one weapon class.
///
/// The `Default` value (all zero) is the zero-fill used for players with
/// no activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CombinedStat {
    /// Throws (detonations) by the player.
    pub count: u64,
    /// Damage dealt with this class.
    pub damage: f64,
    /// `damage / count` rounded to one decimal; `0.0` when `count` is 0.
    pub average: f64,
}

impl CombinedStat {
    /// Build a stat, deriving the average.
    pub fn new(count: u64, damage: f64) -> Self {
        Self {
            count,
            damage,
            average: average_per_use(damage, count),
        }
    }
}

/// A player's row in a [`WeaponStats`] table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatRow {
    pub player: PlayerName,
    #[serde(flatten)]
    pub stat: CombinedStat,
}

/// Combined stats of one weapon class, one row per count-table row.
///
/// # Examples
///
/// ```rust
/// use nadestat::{combine, count_events, sum_damage, EventRecord, PipelineConfig, Roster};
/// use nadestat::observer::NoopObserver;
///
/// let roster = Roster::from_names(["p1", "p2"]);
/// let throws = vec![EventRecord::new().with("user_name", "p1")];
/// let hurts = vec![EventRecord::new()
///     .with("attacker_name", "p1")
///     .with("weapon", "hegrenade")
///     .with("dmg_health", 45)];
///
/// let counts = count_events("hegrenade_detonate", &throws, "user_name", &roster, &NoopObserver).unwrap();
/// let damage = sum_damage("player_hurt", &hurts, &PipelineConfig::default(), "hegrenade", &NoopObserver).unwrap();
/// let stats = combine("he", &counts, &damage, &NoopObserver);
///
/// assert_eq!(stats.get("p1").unwrap().average, 45.0);
/// assert_eq!(stats.get("p2").unwrap().damage, 0.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponStats {
    /// Weapon class label.
    pub label: String,
    /// Rows in count-table (roster) order.
    pub rows: Vec<StatRow>,
}

impl WeaponStats {
    /// Stat for one player.
    pub fn get(&self, player: &str) -> Option<&CombinedStat> {
        self.rows
            .iter()
            .find(|row| row.player.as_str() == player)
            .map(|row| &row.stat)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Total throws across all rows.
    pub fn total_count(&self) -> u64 {
        self.rows.iter().map(|row| row.stat.count).sum()
    }

    /// Total damage across all rows.
    pub fn total_damage(&self) -> f64 {
        self.rows.iter().map(|row| row.stat.damage).sum()
    }
}

/// Left-join `counts` with `damage` on player name.
///
/// Every count row is kept; players without damage get `0.0` damage
/// before the average is computed. Damage by players with no count row
/// cannot be placed and is reported as [`Diagnostic::UnmatchedDamage`].
pub fn combine(
    label: &str,
    counts: &CountAggregate,
    damage: &DamageAggregate,
    observer: &dyn PipelineObserver,
) -> WeaponStats {
    let rows: Vec<StatRow> = counts
        .iter()
        .map(|(player, count)| StatRow {
            player: player.clone(),
            stat: CombinedStat::new(count, damage.get(player.as_str()).unwrap_or(0.0)),
        })
        .collect();

    let unmatched: Vec<(&PlayerName, f64)> = damage
        .iter()
        .filter(|(player, _)| counts.get(player.as_str()).is_none())
        .collect();
    if !unmatched.is_empty() {
        observer.observe(&Diagnostic::UnmatchedDamage {
            label: label.to_owned(),
            players: unmatched.iter().map(|(player, _)| (*player).clone()).collect(),
            damage: unmatched.iter().map(|(_, dmg)| dmg).sum(),
        });
    }

    WeaponStats {
        label: label.to_owned(),
        rows,
    }
}
