//! Pipeline configuration.
//!
//! Which weapon classes are tracked, which event tables feed them, and
//! which columns hold actor, weapon and damage are all declared here
//! instead of being baked into the aggregation code. The defaults match
//! the event schema of CS2 demo parsers.

use crate::error::{NadeError, Result};
use crate::roster::RosterPolicy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// One tracked utility class.
///
/// # Examples
///
/// ```rust
/// use nadestat::WeaponClass;
///
/// let he = WeaponClass::high_explosive();
/// assert_eq!(he.label, "he");
/// assert_eq!(he.detonation_event, "hegrenade_detonate");
/// assert_eq!(he.weapon_tag, "hegrenade");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponClass {
    /// Name of this class in the report.
    pub label: String,
    /// Event table with one record per throw/detonation.
    pub detonation_event: String,
    /// Value of the weapon column on damage records caused by this class.
    pub weapon_tag: String,
}

impl WeaponClass {
    /// Create a weapon class.
    pub fn new(
        label: impl Into<String>,
        detonation_event: impl Into<String>,
        weapon_tag: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            detonation_event: detonation_event.into(),
            weapon_tag: weapon_tag.into(),
        }
    }

    /// High-explosive grenades.
    pub fn high_explosive() -> Self {
        Self::new("he", "hegrenade_detonate", "hegrenade")
    }

    /// Molotovs and incendiaries, counted by fire start.
    pub fn incendiary() -> Self {
        Self::new("incendiary", "inferno_startburn", "inferno")
    }
}

/// Column names read from event records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    /// Thrower on detonation records.
    pub actor: String,
    /// Damage dealer on damage records.
    pub attacker: String,
    /// Weapon classification on damage records.
    pub weapon: String,
    /// Health damage on damage records.
    pub damage: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            actor: "user_name".to_owned(),
            attacker: "attacker_name".to_owned(),
            weapon: "weapon".to_owned(),
            damage: "dmg_health".to_owned(),
        }
    }
}

/// Full pipeline configuration.
///
/// Every field has a default, so a config file only needs the keys it
/// changes.
///
/// # Examples
///
/// ```rust
/// use nadestat::{PipelineConfig, RosterPolicy};
///
/// let config = PipelineConfig::from_json_str(
///     r#"{ "roster": "damage_attackers", "weapons": [
///         { "label": "he", "detonation_event": "hegrenade_detonate", "weapon_tag": "hegrenade" }
///     ] }"#,
/// ).unwrap();
///
/// assert_eq!(config.roster, RosterPolicy::DamageAttackers);
/// assert_eq!(config.weapons.len(), 1);
/// assert_eq!(config.damage_event, "player_hurt");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Where the roster comes from.
    pub roster: RosterPolicy,
    /// Event table holding damage records.
    pub damage_event: String,
    /// Column names on event records.
    pub columns: ColumnNames,
    /// Tracked weapon classes, in report order.
    pub weapons: Vec<WeaponClass>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            roster: RosterPolicy::default(),
            damage_event: "player_hurt".to_owned(),
            columns: ColumnNames::default(),
            weapons: vec![WeaponClass::high_explosive(), WeaponClass::incendiary()],
        }
    }
}

impl PipelineConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| NadeError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| NadeError::InvalidConfig(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&raw)
    }

    /// Replace the roster policy.
    pub fn with_roster(mut self, roster: RosterPolicy) -> Self {
        self.roster = roster;
        self
    }

    /// Replace the tracked weapon classes.
    pub fn with_weapons(mut self, weapons: Vec<WeaponClass>) -> Self {
        self.weapons = weapons;
        self
    }

    /// Check that at least one class is tracked and labels are unique.
    pub fn validate(&self) -> Result<()> {
        if self.weapons.is_empty() {
            return Err(NadeError::InvalidConfig(
                "no weapon classes configured".to_owned(),
            ));
        }

        let mut seen = HashSet::new();
        for class in &self.weapons {
            if !seen.insert(class.label.as_str()) {
                return Err(NadeError::InvalidConfig(format!(
                    "duplicate weapon label '{}'",
                    class.label
                )));
            }
        }
        Ok(())
    }
}
