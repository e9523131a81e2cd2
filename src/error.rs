//! Error and infeasibility report types.
//!
//! Fatal conditions surface as [`DispatchError`]. Orders that cannot be
//! served are not errors: they are reported as [`InfeasibleOrder`] records
//! alongside the best achievable plan.

use serde::Serialize;

/// Error type for dispatch operations.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchError {
    /// An operation ran against state built for different inputs, or before
    /// its prerequisite build step.
    StaleState {
        /// What was stale or missing.
        what: &'static str,
    },
    /// Zero orders or zero vehicles were supplied.
    EmptyInput {
        /// Number of orders supplied.
        orders: usize,
        /// Number of vehicles supplied.
        vehicles: usize,
    },
    /// A configuration value was out of range.
    InvalidConfig(String),
    /// A priority name did not match any known tier.
    UnknownPriority(String),
    /// A handling flag or equipment name was not recognized.
    UnknownHandling(String),
}

impl std::fmt::Display for DispatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DispatchError::StaleState { what } => write!(f, "Stale state: {}", what),
            DispatchError::EmptyInput { orders, vehicles } => write!(
                f,
                "Empty input: {} orders, {} vehicles",
                orders, vehicles
            ),
            DispatchError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            DispatchError::UnknownPriority(s) => write!(f, "Unknown priority: {:?}", s),
            DispatchError::UnknownHandling(s) => write!(f, "Unknown handling flag: {:?}", s),
        }
    }
}

impl std::error::Error for DispatchError {}

/// Why an order could not be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum InfeasibleReason {
    /// Order load fits no vehicle in the fleet.
    ExceedsCapacity,
    /// No vehicle in the fleet carries the required handling equipment.
    NoCapableVehicle,
    /// Even a direct trip from the depot arrives after the window closes.
    TimeWindowUnreachable,
    /// No remaining vehicle could take the order during assignment.
    NoVehicleAvailable,
}

impl InfeasibleReason {
    /// Returns `true` if the order can never be served by the given fleet,
    /// regardless of how other orders are assigned.
    pub fn is_structural(&self) -> bool {
        match self {
            InfeasibleReason::ExceedsCapacity
            | InfeasibleReason::NoCapableVehicle
            | InfeasibleReason::TimeWindowUnreachable => true,
            InfeasibleReason::NoVehicleAvailable => false,
        }
    }
}

/// An order that was excluded from a plan, with the reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InfeasibleOrder {
    /// Index of the order in the caller's order slice.
    pub order: usize,
    /// Why it was excluded.
    pub reason: InfeasibleReason,
}

impl InfeasibleOrder {
    /// Creates a new report record.
    pub fn new(order: usize, reason: InfeasibleReason) -> Self {
        Self { order, reason }
    }
}
