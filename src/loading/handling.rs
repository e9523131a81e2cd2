//! Advisory handling annotations for packages and orders.

use std::fmt;

use serde::Serialize;

use crate::models::{Handling, Order, Package};

/// Packages heavier than this get a [`HandlingNote::Heavy`] note, in kg.
pub const HEAVY_PACKAGE_KG: f64 = 20.0;

/// Packages with a side longer than this get a [`HandlingNote::Oversized`]
/// note, in cm.
pub const OVERSIZED_DIMENSION_CM: f64 = 100.0;

/// A loader-facing handling note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum HandlingNote {
    /// Fragile contents.
    Fragile,
    /// Keep cool.
    TemperatureSensitive,
    /// Hazardous materials.
    Hazardous,
    /// Over [`HEAVY_PACKAGE_KG`].
    Heavy,
    /// A side over [`OVERSIZED_DIMENSION_CM`].
    Oversized,
}

impl fmt::Display for HandlingNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            HandlingNote::Fragile => "FRAGILE - Handle with care",
            HandlingNote::TemperatureSensitive => "TEMPERATURE SENSITIVE - Keep cool",
            HandlingNote::Hazardous => "HAZARDOUS - Follow safety protocols",
            HandlingNote::Heavy => "HEAVY - Use proper lifting technique",
            HandlingNote::Oversized => "OVERSIZED - May require team lift",
        };
        f.write_str(text)
    }
}

impl From<Handling> for HandlingNote {
    fn from(flag: Handling) -> Self {
        match flag {
            Handling::Fragile => HandlingNote::Fragile,
            Handling::TemperatureSensitive => HandlingNote::TemperatureSensitive,
            Handling::Hazardous => HandlingNote::Hazardous,
        }
    }
}

/// Notes for one package, in [`HandlingNote`] order.
///
/// # Examples
///
/// ```
/// use u_dispatch::loading::{package_notes, HandlingNote};
/// use u_dispatch::models::{Handling, Package};
///
/// let pkg = Package::new("P1", 25.0, [120.0, 40.0, 40.0]).with_handling(Handling::Fragile);
/// assert_eq!(
///     package_notes(&pkg),
///     vec![HandlingNote::Fragile, HandlingNote::Heavy, HandlingNote::Oversized]
/// );
/// ```
pub fn package_notes(package: &Package) -> Vec<HandlingNote> {
    let mut notes: Vec<HandlingNote> = package.handling().iter().map(HandlingNote::from).collect();
    if package.weight_kg() > HEAVY_PACKAGE_KG {
        notes.push(HandlingNote::Heavy);
    }
    if package.max_dimension_cm() > OVERSIZED_DIMENSION_CM {
        notes.push(HandlingNote::Oversized);
    }
    notes
}

/// One-line special-handling summary for an order, or `None` if it needs
/// none. Each requirement is mentioned once.
pub fn order_handling_summary(order: &Order) -> Option<String> {
    if order.handling().is_empty() {
        return None;
    }
    let parts: Vec<&str> = order
        .handling()
        .iter()
        .map(|flag| match flag {
            Handling::Fragile => "Contains fragile items",
            Handling::TemperatureSensitive => "Requires temperature control",
            Handling::Hazardous => "Contains hazardous materials",
        })
        .collect();
    Some(parts.join("; "))
}
