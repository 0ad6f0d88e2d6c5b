//! Application use cases

pub mod generate;
pub mod refine;
pub mod video;

pub use generate::GenerationClient;
pub use refine::RefinementSession;
pub use video::{NoProgress, PollConfig, ProgressReporter, VideoJobPoller, VideoProgress};
