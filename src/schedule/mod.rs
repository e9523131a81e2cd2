//! Timestamped schedules for finalized routes.

mod synthesizer;

pub use synthesizer::{Schedule, ScheduleSummary, ScheduleSynthesizer, StopTiming};
