//! Message ingestion and ordering.
//!
//! All mutable transcript state (seen-set, last printed room) lives in one
//! [`IngestEngine`], driven first by [`IngestEngine::replay`] and then by
//! [`run_live`]. Everything runs on the caller's thread.

pub mod dedup;
pub mod format;
pub mod identity;
pub mod ingest;
pub mod live;

pub use dedup::{DedupKey, SeenSet};
pub use format::{TranscriptFormatter, EMPHASIS_END, EMPHASIS_START};
pub use identity::IdentityResolver;
pub use ingest::{IngestEngine, Offer, ReplaySummary};
pub use live::{handle_notification, run_live, Disposition, LiveExit};
