//! Upload progress primitives.

pub mod event;
pub mod reporter;

pub use event::UploadProgress;
pub use reporter::{ProgressReporter, ProgressSink};
