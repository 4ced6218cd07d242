// Library exports for the binary and integration tests
pub mod contrib;
pub mod dataset;
pub mod error;
pub mod logging;
pub mod namespace;
pub mod period;
pub mod snapshot;
pub mod snapshot_builder;
pub mod top_periods;
pub mod window;

pub use contrib::{ContributionRecord, UserProfile};
pub use error::InvalidRecordError;
pub use snapshot::Snapshot;
pub use snapshot_builder::compute_snapshot;
