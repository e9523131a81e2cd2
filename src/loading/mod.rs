//! Loading plans for assigned vehicles.
//!
//! - [`LoadSequencer`] — five-key delivery sequence and zone placement
//! - [`package_notes`], [`order_handling_summary`] — loader annotations

mod handling;
mod sequencer;

pub use handling::{
    order_handling_summary, package_notes, HandlingNote, HEAVY_PACKAGE_KG,
    OVERSIZED_DIMENSION_CM,
};
pub use sequencer::{LoadSequencer, LoadingEntry, LoadingPlan, LoadingZone, PackageInstruction};
