//! Vehicle type with two-dimensional capacity and handling equipment.

use serde::{Deserialize, Serialize};

use super::{Handling, HandlingSet, Load, Location, Order};

/// A delivery vehicle.
///
/// Planning reads only the capacity and the capabilities. Every route
/// starts at the shared depot at the plan start, so `location`,
/// `available_from` and `driver_id` are carried through unchanged for the
/// dispatch system that turns plans into assignments.
///
/// # Examples
///
/// ```
/// use u_dispatch::models::{Handling, Load, Location, Order, Vehicle};
///
/// let v = Vehicle::new("VEH_001", Load::new(1000.0, 1.0e7))
///     .with_capability(Handling::Fragile);
/// let fragile = Order::new("o", Location::new(0.0, 0.0), Load::weight(5.0))
///     .with_handling(Handling::Fragile);
/// let hazmat = Order::new("h", Location::new(0.0, 0.0), Load::weight(5.0))
///     .with_handling(Handling::Hazardous);
/// assert!(v.can_handle(&fragile));
/// assert!(!v.can_handle(&hazmat));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    id: String,
    capacity: Load,
    #[serde(default)]
    capabilities: HandlingSet,
    #[serde(default)]
    location: Location,
    #[serde(default)]
    available_from: f64,
    #[serde(default)]
    driver_id: Option<String>,
}

impl Vehicle {
    /// Creates a vehicle with the given ID and capacity.
    ///
    /// Default: no special equipment, located at (0, 0), available from the
    /// plan start, no driver.
    pub fn new(id: impl Into<String>, capacity: Load) -> Self {
        Self {
            id: id.into(),
            capacity,
            capabilities: HandlingSet::new(),
            location: Location::default(),
            available_from: 0.0,
            driver_id: None,
        }
    }

    /// Adds a handling capability.
    pub fn with_capability(mut self, flag: Handling) -> Self {
        self.capabilities.insert(flag);
        self
    }

    /// Sets the current location.
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    /// Sets availability in minutes after the plan start.
    pub fn with_available_from(mut self, minutes: f64) -> Self {
        self.available_from = minutes;
        self
    }

    /// Sets the assigned driver.
    pub fn with_driver(mut self, driver_id: impl Into<String>) -> Self {
        self.driver_id = Some(driver_id.into());
        self
    }

    /// Vehicle ID.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Weight/volume capacity.
    pub fn capacity(&self) -> Load {
        self.capacity
    }

    /// Supported handling capabilities.
    pub fn capabilities(&self) -> &HandlingSet {
        &self.capabilities
    }

    /// Current location. Not read by planning.
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Availability in minutes after the plan start. Not read by planning.
    pub fn available_from(&self) -> f64 {
        self.available_from
    }

    /// Assigned driver, if any.
    pub fn driver_id(&self) -> Option<&str> {
        self.driver_id.as_deref()
    }

    /// Returns `true` if the vehicle carries every capability in `required`.
    pub fn supports(&self, required: &HandlingSet) -> bool {
        self.capabilities.is_superset(required)
    }

    /// Returns `true` if the order alone fits and its handling is supported.
    pub fn can_handle(&self, order: &Order) -> bool {
        order.load().fits_within(&self.capacity) && self.supports(order.handling())
    }
}
