//! Pose ingestion: tracker mapping and per-message state

mod ingest;
mod mapper;
mod systems;

pub use ingest::{IngestOutcome, PoseIngest};
pub use mapper::TrackerMapping;
pub use systems::ingest_poses;
