//! Per-guild queues and the logic deciding what plays next

pub mod coordinator;
pub mod notice;
pub mod state;

pub use coordinator::{PlayOutcome, PlaybackCoordinator};
pub use notice::{Announcer, Notice};
pub use state::{QueueStatus, RepeatMode};
