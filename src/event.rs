//! Event records.
//!
//! An `EventRecord` is one row of an event table produced by the event
//! source: a loose column name to JSON value mapping, because different
//! event types carry different columns. The pipeline never mutates
//! records; it only reads columns through the typed accessors below,
//! which turn schema mismatches into [`NadeError`]s.

use crate::error::{NadeError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One row of a parsed event table.
///
/// # Examples
///
/// ```rust
/// use nadestat::EventRecord;
///
/// let hurt = EventRecord::new()
///     .with("attacker_name", "ropz")
///     .with("weapon", "hegrenade")
///     .with("dmg_health", 40);
///
/// assert_eq!(hurt.text("player_hurt", "attacker_name").unwrap(), Some("ropz"));
/// assert_eq!(hurt.number("player_hurt", "dmg_health").unwrap(), Some(40.0));
/// assert!(hurt.text("player_hurt", "user_name").is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventRecord {
    columns: BTreeMap<String, Value>,
}

impl EventRecord {
    /// Create a record with no columns.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`EventRecord::set`].
    pub fn with(mut self, column: impl Into<String>, value: impl Serialize) -> Self {
        self.set(column, value);
        self
    }

    /// Set a column value.
    ///
    /// The value must be serializable. If serialization fails, the column
    /// is silently not added.
    pub fn set(&mut self, column: impl Into<String>, value: impl Serialize) {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.columns.insert(column.into(), json_value);
        }
    }

    /// Raw access to a column.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns.get(column)
    }

    /// Check whether the record carries a column at all (null counts as present).
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.contains_key(column)
    }

    /// Read a string column.
    ///
    /// Returns `Ok(None)` when the column is present but null (for example
    /// world damage with no attacker).
    ///
    /// # Errors
    ///
    /// * `MissingColumn` if the record has no such column.
    /// * `InvalidColumn` if the value is neither a string nor null.
    pub fn text(&self, event: &str, column: &str) -> Result<Option<&str>> {
        match self.require(event, column)? {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s.as_str())),
            _ => Err(NadeError::InvalidColumn {
                event: event.to_owned(),
                column: column.to_owned(),
                expected: "a string",
            }),
        }
    }

    /// Read a numeric column.
    ///
    /// Returns `Ok(None)` when the column is present but null.
    ///
    /// # Errors
    ///
    /// * `MissingColumn` if the record has no such column.
    /// * `InvalidColumn` if the value is neither a number nor null.
    pub fn number(&self, event: &str, column: &str) -> Result<Option<f64>> {
        match self.require(event, column)? {
            Value::Null => Ok(None),
            Value::Number(n) => n.as_f64().map(Some).ok_or_else(|| NadeError::InvalidColumn {
                event: event.to_owned(),
                column: column.to_owned(),
                expected: "a number",
            }),
            _ => Err(NadeError::InvalidColumn {
                event: event.to_owned(),
                column: column.to_owned(),
                expected: "a number",
            }),
        }
    }

    fn require(&self, event: &str, column: &str) -> Result<&Value> {
        self.columns
            .get(column)
            .ok_or_else(|| NadeError::MissingColumn {
                event: event.to_owned(),
                column: column.to_owned(),
            })
    }
}
