//! Error types for the efficacy pipeline.
//!
//! Structural failures (a replay that cannot be opened, a record that does
//! not match the expected schema) are represented by the `NadeError` enum.
//! Empty or all-zero intermediate tables are not errors; they are reported
//! through [`crate::observer::Diagnostic`] instead.

use thiserror::Error;

/// Errors that can abort the pipeline for one replay.
///
/// # Examples
///
/// ```rust
/// use nadestat::NadeError;
///
/// let err = NadeError::MissingColumn {
///     event: "player_hurt".into(),
///     column: "weapon".into(),
/// };
/// assert_eq!(err.to_string(), "Event 'player_hurt' has no column 'weapon'");
/// assert_eq!(err.kind(), "missing_column");
/// ```
#[derive(Debug, Error, Clone, PartialEq)]
pub enum NadeError {
    /// The event source could not open the replay (invalid or corrupt input).
    #[error("Failed to open replay {replay}: {reason}")]
    ReplayOpen { replay: String, reason: String },

    /// A record lacks a column the pipeline needs.
    ///
    /// This is a schema mismatch with the event source and must abort
    /// the replay rather than produce zeros.
    #[error("Event '{event}' has no column '{column}'")]
    MissingColumn { event: String, column: String },

    /// A column is present but holds a value of the wrong type.
    #[error("Column '{column}' of event '{event}' is not {expected}")]
    InvalidColumn {
        event: String,
        column: String,
        expected: &'static str,
    },

    /// The event source failed while decoding an event table.
    #[error("Failed to fetch event '{event}': {reason}")]
    EventFetch { event: String, reason: String },

    /// The pipeline configuration is malformed or inconsistent.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl NadeError {
    /// Stable snake_case tag for this error, used in serialized failure markers.
    pub fn kind(&self) -> &'static str {
        match self {
            NadeError::ReplayOpen { .. } => "replay_open",
            NadeError::MissingColumn { .. } => "missing_column",
            NadeError::InvalidColumn { .. } => "invalid_column",
            NadeError::EventFetch { .. } => "event_fetch",
            NadeError::InvalidConfig(_) => "invalid_config",
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, NadeError>;
