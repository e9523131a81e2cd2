//! Domain model types for delivery dispatch.
//!
//! Orders with time windows, loads and handling requirements; vehicles with
//! two-dimensional capacity and equipment; routes as depot-bookended stop
//! sequences.

mod load;
mod location;
mod order;
mod route;
mod vehicle;

pub use load::Load;
pub use location::Location;
pub use order::{Handling, HandlingSet, Order, Package, PackageSize, Priority, TimeWindow};
pub use route::{order_index, stop_index, Route, DEPOT};
pub use vehicle::Vehicle;
