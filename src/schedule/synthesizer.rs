//! Arrival and departure timestamps for finalized routes.
//!
//! The clock starts at an explicit `day_start`; every order's window is in
//! minutes after that instant. At each stop:
//!
//! ```text
//! arrival       = previous departure + distance × minutes_per_km
//! service_start = max(arrival, earliest)
//! departure     = service_start + service_minutes
//! ```
//!
//! Lateness is reported per stop but not penalized here.

use chrono::{NaiveDateTime, TimeDelta};
use serde::Serialize;

use crate::config::CostModel;
use crate::distance::DistanceMatrix;
use crate::error::DispatchError;
use crate::models::{order_index, Order, Route, DEPOT};

/// Timing of one stop.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopTiming {
    /// Order index.
    pub order: usize,
    /// Arrival at the customer.
    pub arrival: NaiveDateTime,
    /// Start of service, after any wait for the window to open.
    pub service_start: NaiveDateTime,
    /// Departure after service.
    pub departure: NaiveDateTime,
    /// Leg distance from the previous stop, km.
    pub leg_km: f64,
    /// Minutes spent waiting for the window to open.
    pub wait_minutes: f64,
    /// Minutes past the window's latest bound at arrival.
    pub late_minutes: f64,
}

/// Timed walk of one route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schedule {
    /// Departure from the depot.
    pub start: NaiveDateTime,
    /// Per-stop timings in visiting order.
    pub stops: Vec<StopTiming>,
    /// Return to the depot.
    pub end: NaiveDateTime,
    /// Depot-to-depot distance, km.
    pub distance_km: f64,
    /// Depot-to-depot duration, minutes.
    pub duration_minutes: f64,
}

impl Schedule {
    /// Returns `true` if any stop is reached after its window closes.
    pub fn has_late_stops(&self) -> bool {
        self.stops.iter().any(|s| s.late_minutes > 0.0)
    }
}

/// Totals across a set of schedules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScheduleSummary {
    /// Number of routes.
    pub routes: usize,
    /// Combined distance, km.
    pub total_distance_km: f64,
    /// Longest route duration, hours.
    pub latest_completion_hours: f64,
}

impl ScheduleSummary {
    /// Summarizes `schedules`.
    pub fn from_schedules(schedules: &[Schedule]) -> Self {
        Self {
            routes: schedules.len(),
            total_distance_km: schedules.iter().map(|s| s.distance_km).sum(),
            latest_completion_hours: schedules
                .iter()
                .map(|s| s.duration_minutes / 60.0)
                .fold(0.0, f64::max),
        }
    }
}

/// Turns routes into timestamped schedules.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use u_dispatch::config::CostModel;
/// use u_dispatch::distance::DistanceMatrix;
/// use u_dispatch::models::{Load, Location, Order, Route, TimeWindow};
/// use u_dispatch::schedule::ScheduleSynthesizer;
///
/// let depot = Location::new(0.0, 0.0);
/// let orders = vec![Order::new("A", Location::new(0.0, 0.01), Load::weight(1.0))
///     .with_time_window(TimeWindow::new(30.0, 90.0).unwrap())
///     .with_service_minutes(10.0)];
/// let dm = DistanceMatrix::build(&depot, &orders);
/// let day_start = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap().and_hms_opt(8, 0, 0).unwrap();
///
/// let synth = ScheduleSynthesizer::new(&orders, &dm, CostModel::new(2.0, 10.0).unwrap(), day_start).unwrap();
/// let schedule = synth.synthesize(&Route::new(vec![1]));
///
/// // Arrives after ~2 minutes, waits until 08:30, leaves at 08:40.
/// let service = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap().and_hms_opt(8, 30, 0).unwrap();
/// assert_eq!(schedule.stops[0].service_start, service);
/// assert_eq!(schedule.stops[0].departure, service + chrono::TimeDelta::minutes(10));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ScheduleSynthesizer<'a> {
    orders: &'a [Order],
    distances: &'a DistanceMatrix,
    model: CostModel,
    day_start: NaiveDateTime,
}

impl<'a> ScheduleSynthesizer<'a> {
    /// Creates a synthesizer.
    ///
    /// Fails with [`DispatchError::StaleState`] if `distances` was not built
    /// for `orders`.
    pub fn new(
        orders: &'a [Order],
        distances: &'a DistanceMatrix,
        model: CostModel,
        day_start: NaiveDateTime,
    ) -> Result<Self, DispatchError> {
        distances.ensure_covers(orders)?;
        Ok(Self {
            orders,
            distances,
            model,
            day_start,
        })
    }

    /// The plan's time origin.
    pub fn day_start(&self) -> NaiveDateTime {
        self.day_start
    }

    /// Schedules one route.
    ///
    /// Minute and distance fields are exact. Timestamps too far out for
    /// [`NaiveDateTime`] saturate at [`NaiveDateTime::MAX`].
    pub fn synthesize(&self, route: &Route) -> Schedule {
        let mut clock = 0.0;
        let mut distance = 0.0;
        let mut current = DEPOT;
        let mut stops = Vec::with_capacity(route.len());

        for &s in route.customers() {
            let order = &self.orders[order_index(s)];
            let window = order.time_window();
            let leg = self.distances.get(current, s);
            let arrival = clock + self.model.travel_minutes(leg);
            let wait = window.waiting_time(arrival);
            let start = arrival + wait;
            let departure = start + order.service_minutes();

            stops.push(StopTiming {
                order: order_index(s),
                arrival: self.stamp(arrival),
                service_start: self.stamp(start),
                departure: self.stamp(departure),
                leg_km: leg,
                wait_minutes: wait,
                late_minutes: window.lateness(arrival),
            });
            distance += leg;
            clock = departure;
            current = s;
        }

        let back = self.distances.get(current, DEPOT);
        distance += back;
        clock += self.model.travel_minutes(back);

        Schedule {
            start: self.day_start,
            stops,
            end: self.stamp(clock),
            distance_km: distance,
            duration_minutes: clock,
        }
    }

    /// Schedules every route.
    pub fn synthesize_all(&self, routes: &[Route]) -> Vec<Schedule> {
        routes.iter().map(|r| self.synthesize(r)).collect()
    }

    /// Clamps at [`NaiveDateTime::MAX`] once the offset leaves chrono's range.
    fn stamp(&self, minutes: f64) -> NaiveDateTime {
        TimeDelta::try_seconds((minutes * 60.0).round() as i64)
            .and_then(|offset| self.day_start.checked_add_signed(offset))
            .unwrap_or(NaiveDateTime::MAX)
    }
}
