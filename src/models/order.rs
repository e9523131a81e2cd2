//! Delivery order, package, and time window types.

use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{Load, Location};
use crate::error::DispatchError;

/// A delivery time window in minutes relative to the plan start.
///
/// The vehicle should arrive no later than `latest` and may arrive as early
/// as it likes, waiting until `earliest` before service begins.
///
/// # Examples
///
/// ```
/// use u_dispatch::models::TimeWindow;
///
/// let tw = TimeWindow::new(60.0, 180.0).unwrap();
/// assert!(tw.contains(90.0));
/// assert_eq!(tw.waiting_time(30.0), 30.0);
/// assert_eq!(tw.lateness(200.0), 20.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    earliest: f64,
    latest: f64,
}

impl TimeWindow {
    /// Creates a new time window.
    ///
    /// Returns `None` if `earliest > latest` or either value is non-finite.
    pub fn new(earliest: f64, latest: f64) -> Option<Self> {
        if !earliest.is_finite() || !latest.is_finite() || earliest > latest {
            return None;
        }
        Some(Self { earliest, latest })
    }

    /// A window that never closes.
    pub const fn unbounded() -> Self {
        Self {
            earliest: 0.0,
            latest: f64::MAX,
        }
    }

    /// Earliest service start.
    pub fn earliest(&self) -> f64 {
        self.earliest
    }

    /// Latest allowable arrival.
    pub fn latest(&self) -> f64 {
        self.latest
    }

    /// Returns `true` if the given time falls within this window.
    pub fn contains(&self, time: f64) -> bool {
        time >= self.earliest && time <= self.latest
    }

    /// Waiting time when arriving at `arrival`; zero unless early.
    pub fn waiting_time(&self, arrival: f64) -> f64 {
        if arrival < self.earliest {
            self.earliest - arrival
        } else {
            0.0
        }
    }

    /// Minutes past `latest`; zero unless late.
    pub fn lateness(&self, arrival: f64) -> f64 {
        if arrival > self.latest {
            arrival - self.latest
        } else {
            0.0
        }
    }

    /// Returns `true` if arriving at the given time violates this window.
    pub fn is_violated(&self, arrival: f64) -> bool {
        arrival > self.latest
    }
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self::unbounded()
    }
}

/// Delivery priority tier. Lower tiers are more urgent.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum Priority {
    /// Same-day delivery.
    Urgent = 1,
    /// Next-day delivery.
    High = 2,
    /// Standard delivery.
    #[default]
    Normal = 3,
    /// Economy delivery.
    Low = 4,
}

impl Priority {
    /// Numeric tier (1 = most urgent).
    pub fn tier(&self) -> u8 {
        *self as u8
    }

    /// Upper-case display name.
    pub fn name(&self) -> &'static str {
        match self {
            Priority::Urgent => "URGENT",
            Priority::High => "HIGH",
            Priority::Normal => "NORMAL",
            Priority::Low => "LOW",
        }
    }
}

impl FromStr for Priority {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "urgent" | "1" => Ok(Priority::Urgent),
            "high" | "2" => Ok(Priority::High),
            "normal" | "3" => Ok(Priority::Normal),
            "low" | "4" => Ok(Priority::Low),
            _ => Err(DispatchError::UnknownPriority(s.to_string())),
        }
    }
}

/// A special-handling requirement (on orders) or capability (on vehicles).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Handling {
    /// Fragile goods; needs fragile-handling equipment.
    Fragile,
    /// Temperature-sensitive goods; needs refrigeration.
    TemperatureSensitive,
    /// Hazardous materials; needs hazardous-handling certification.
    Hazardous,
}

impl FromStr for Handling {
    type Err = DispatchError;

    /// Accepts both flag names and vehicle equipment names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fragile" | "fragile_handling" => Ok(Handling::Fragile),
            "temperature_sensitive" | "refrigeration" => Ok(Handling::TemperatureSensitive),
            "hazardous" | "hazardous_handling" => Ok(Handling::Hazardous),
            _ => Err(DispatchError::UnknownHandling(s.to_string())),
        }
    }
}

/// A set of [`Handling`] flags.
///
/// # Examples
///
/// ```
/// use u_dispatch::models::{Handling, HandlingSet};
///
/// let equipment: HandlingSet = [Handling::Fragile, Handling::TemperatureSensitive]
///     .into_iter()
///     .collect();
/// let needs = HandlingSet::from(Handling::Fragile);
/// assert!(equipment.is_superset(&needs));
/// assert!(!needs.is_superset(&equipment));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandlingSet(BTreeSet<Handling>);

impl HandlingSet {
    /// The empty set.
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Adds a flag.
    pub fn insert(&mut self, flag: Handling) {
        self.0.insert(flag);
    }

    /// Returns `true` if the flag is present.
    pub fn contains(&self, flag: Handling) -> bool {
        self.0.contains(&flag)
    }

    /// Returns `true` if every flag in `other` is also in `self`.
    pub fn is_superset(&self, other: &HandlingSet) -> bool {
        self.0.is_superset(&other.0)
    }

    /// Number of flags.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no flags are set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates flags in a fixed order.
    pub fn iter(&self) -> impl Iterator<Item = Handling> + '_ {
        self.0.iter().copied()
    }

    /// Adds every flag from `other`.
    pub fn extend_from(&mut self, other: &HandlingSet) {
        self.0.extend(other.0.iter().copied());
    }
}

impl From<Handling> for HandlingSet {
    fn from(flag: Handling) -> Self {
        let mut set = HandlingSet::new();
        set.insert(flag);
        set
    }
}

impl FromIterator<Handling> for HandlingSet {
    fn from_iter<I: IntoIterator<Item = Handling>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Package size category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PackageSize {
    /// Under 1 kg and under 30 cm.
    Small,
    /// Under 5 kg and under 60 cm.
    Medium,
    /// Under 20 kg and under 100 cm.
    Large,
    /// Anything bigger.
    ExtraLarge,
}

/// A physical package belonging to an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    id: String,
    weight_kg: f64,
    dimensions_cm: [f64; 3],
    #[serde(default)]
    handling: HandlingSet,
}

impl Package {
    /// Creates a package with no special handling.
    pub fn new(id: impl Into<String>, weight_kg: f64, dimensions_cm: [f64; 3]) -> Self {
        Self {
            id: id.into(),
            weight_kg,
            dimensions_cm,
            handling: HandlingSet::new(),
        }
    }

    /// Adds a handling requirement.
    pub fn with_handling(mut self, flag: Handling) -> Self {
        self.handling.insert(flag);
        self
    }

    /// Package ID.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Weight in kilograms.
    pub fn weight_kg(&self) -> f64 {
        self.weight_kg
    }

    /// Length, width, height in centimetres.
    pub fn dimensions_cm(&self) -> [f64; 3] {
        self.dimensions_cm
    }

    /// Largest of the three dimensions.
    pub fn max_dimension_cm(&self) -> f64 {
        self.dimensions_cm.iter().copied().fold(0.0, f64::max)
    }

    /// Volume in cubic centimetres.
    pub fn volume_cm3(&self) -> f64 {
        self.dimensions_cm.iter().product()
    }

    /// Handling requirements.
    pub fn handling(&self) -> &HandlingSet {
        &self.handling
    }

    /// Load contributed by this package.
    pub fn load(&self) -> Load {
        Load::new(self.weight_kg, self.volume_cm3())
    }

    /// Size category from weight and largest dimension.
    pub fn size_category(&self) -> PackageSize {
        let max_dim = self.max_dimension_cm();
        if self.weight_kg < 1.0 && max_dim < 30.0 {
            PackageSize::Small
        } else if self.weight_kg < 5.0 && max_dim < 60.0 {
            PackageSize::Medium
        } else if self.weight_kg < 20.0 && max_dim < 100.0 {
            PackageSize::Large
        } else {
            PackageSize::ExtraLarge
        }
    }
}

/// A delivery order.
///
/// Orders are read-only inputs to a planning run; routes and plans refer to
/// them by index into the caller's slice.
///
/// # Examples
///
/// ```
/// use u_dispatch::models::{Handling, Load, Location, Order, Package, Priority, TimeWindow};
///
/// let order = Order::new("ORD_001", Location::new(19.09, 72.87), Load::zero())
///     .with_priority(Priority::Urgent)
///     .with_time_window(TimeWindow::new(120.0, 240.0).unwrap())
///     .with_package(Package::new("PKG_001", 5.0, [30.0, 20.0, 15.0]).with_handling(Handling::Fragile))
///     .with_package(Package::new("PKG_002", 2.5, [25.0, 15.0, 10.0]));
///
/// assert_eq!(order.load().weight, 7.5);
/// assert!(order.handling().contains(Handling::Fragile));
/// assert_eq!(order.handling_count(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    id: String,
    location: Location,
    #[serde(default)]
    time_window: TimeWindow,
    #[serde(default)]
    service_minutes: f64,
    load: Load,
    #[serde(default)]
    handling: HandlingSet,
    #[serde(default)]
    priority: Priority,
    #[serde(default)]
    packages: Vec<Package>,
}

impl Order {
    /// Creates an order with an open time window, no service time, normal
    /// priority, and no special handling.
    pub fn new(id: impl Into<String>, location: Location, load: Load) -> Self {
        Self {
            id: id.into(),
            location,
            time_window: TimeWindow::unbounded(),
            service_minutes: 0.0,
            load,
            handling: HandlingSet::new(),
            priority: Priority::Normal,
            packages: Vec::new(),
        }
    }

    /// Sets the delivery time window.
    pub fn with_time_window(mut self, tw: TimeWindow) -> Self {
        self.time_window = tw;
        self
    }

    /// Sets the on-site service duration in minutes.
    pub fn with_service_minutes(mut self, minutes: f64) -> Self {
        self.service_minutes = minutes;
        self
    }

    /// Sets the priority tier.
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Adds an order-level handling requirement.
    pub fn with_handling(mut self, flag: Handling) -> Self {
        self.handling.insert(flag);
        self
    }

    /// Adds a package; its load and handling flags accumulate into the order.
    pub fn with_package(mut self, package: Package) -> Self {
        self.load += package.load();
        self.handling.extend_from(package.handling());
        self.packages.push(package);
        self
    }

    /// Order ID.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Delivery location.
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Delivery time window.
    pub fn time_window(&self) -> &TimeWindow {
        &self.time_window
    }

    /// Service duration in minutes.
    pub fn service_minutes(&self) -> f64 {
        self.service_minutes
    }

    /// Total load of the order.
    pub fn load(&self) -> Load {
        self.load
    }

    /// Required handling capabilities.
    pub fn handling(&self) -> &HandlingSet {
        &self.handling
    }

    /// Number of distinct special-handling flags.
    pub fn handling_count(&self) -> usize {
        self.handling.len()
    }

    /// Priority tier.
    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Packages in this order (may be empty).
    pub fn packages(&self) -> &[Package] {
        &self.packages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_window_valid() {
        let tw = TimeWindow::new(10.0, 20.0).expect("valid");
        assert_eq!(tw.earliest(), 10.0);
        assert_eq!(tw.latest(), 20.0);
    }

    #[test]
    fn test_time_window_invalid() {
        assert!(TimeWindow::new(20.0, 10.0).is_none());
        assert!(TimeWindow::new(f64::NAN, 10.0).is_none());
        assert!(TimeWindow::new(10.0, f64::INFINITY).is_none());
    }

    #[test]
    fn test_time_window_waiting_and_lateness() {
        let tw = TimeWindow::new(10.0, 20.0).expect("valid");
        assert!((tw.waiting_time(5.0) - 5.0).abs() < 1e-10);
        assert_eq!(tw.waiting_time(15.0), 0.0);
        assert_eq!(tw.lateness(20.0), 0.0);
        assert!((tw.lateness(25.0) - 5.0).abs() < 1e-10);
        assert!(!tw.is_violated(20.0));
        assert!(tw.is_violated(20.1));
    }

    #[test]
    fn test_priority_parse() {
        assert_eq!("urgent".parse::<Priority>(), Ok(Priority::Urgent));
        assert_eq!(" LOW ".parse::<Priority>(), Ok(Priority::Low));
        assert_eq!("2".parse::<Priority>(), Ok(Priority::High));
        assert_eq!(
            "asap".parse::<Priority>(),
            Err(DispatchError::UnknownPriority("asap".into()))
        );
        assert!(Priority::Urgent < Priority::Low);
        assert_eq!(Priority::Normal.tier(), 3);
    }

    #[test]
    fn test_handling_parse() {
        assert_eq!("refrigeration".parse::<Handling>(), Ok(Handling::TemperatureSensitive));
        assert_eq!("fragile".parse::<Handling>(), Ok(Handling::Fragile));
        assert!("crane".parse::<Handling>().is_err());
    }

    #[test]
    fn test_package_size_category() {
        assert_eq!(
            Package::new("a", 0.5, [10.0, 10.0, 10.0]).size_category(),
            PackageSize::Small
        );
        assert_eq!(
            Package::new("b", 3.0, [50.0, 10.0, 10.0]).size_category(),
            PackageSize::Medium
        );
        assert_eq!(
            Package::new("c", 15.0, [90.0, 10.0, 10.0]).size_category(),
            PackageSize::Large
        );
        assert_eq!(
            Package::new("d", 25.0, [10.0, 10.0, 10.0]).size_category(),
            PackageSize::ExtraLarge
        );
    }

    #[test]
    fn test_order_accumulates_packages() {
        let order = Order::new("o", Location::new(0.0, 0.0), Load::zero())
            .with_package(
                Package::new("p1", 2.0, [10.0, 10.0, 10.0]).with_handling(Handling::Hazardous),
            )
            .with_package(
                Package::new("p2", 3.0, [10.0, 10.0, 5.0]).with_handling(Handling::Hazardous),
            );
        assert_eq!(order.load(), Load::new(5.0, 1500.0));
        assert_eq!(order.handling_count(), 1);
        assert_eq!(order.packages().len(), 2);
    }

    #[test]
    fn test_order_defaults() {
        let order = Order::new("o", Location::new(0.0, 0.0), Load::weight(1.0));
        assert_eq!(order.priority(), Priority::Normal);
        assert_eq!(order.service_minutes(), 0.0);
        assert!(order.handling().is_empty());
        assert!(order.time_window().contains(1.0e9));
    }
}
