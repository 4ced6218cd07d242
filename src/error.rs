/// Errors raised while aggregating contributions.
use thiserror::Error;

/// A contribution whose timestamp cannot be placed on the calendar.
///
/// Raised by the aggregator instead of silently dropping the record, since a
/// dropped record would skew every distribution in the snapshot.
#[derive(Debug, Error)]
#[error("invalid timestamp {timestamp:?} on revision {revision_id}")]
pub struct InvalidRecordError {
    pub revision_id: u64,
    pub timestamp: String,
    #[source]
    pub source: chrono::ParseError,
}
