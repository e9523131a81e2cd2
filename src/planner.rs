//! End-to-end dispatch planning over one immutable snapshot.
//!
//! Two independent paths share the same orders and fleet:
//!
//! - **Routing**: fleet pre-filter → capacity classes → per class: distance
//!   matrix → constrained construction → population search → per-route cost
//!   and schedule.
//! - **Loading**: priority/deadline ordering → geographic clustering →
//!   vehicle matching → loading plan and route suggestion per vehicle.
//!
//! Orders no vehicle in the fleet could ever carry are removed from both
//! paths up front and reported once. Each remaining order is routed in the
//! capacity class of the first vehicle, largest weight capacity first, that
//! can carry it, so no servable order is ever flagged for capacity. Every
//! other order ends up either on a route (or vehicle) or in that path's
//! unassignable list, never both.

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::assignment::{
    AssignmentMetrics, AssignmentOutcome, AssignmentSummary, RouteSuggestion, VehicleMatcher,
};
use crate::cluster::{Cluster, GeographicClusterer};
use crate::config::PlannerConfig;
use crate::constructive::RouteBuilder;
use crate::distance::DistanceMatrix;
use crate::error::{DispatchError, InfeasibleOrder, InfeasibleReason};
use crate::evaluation::{RouteCost, RouteCostEvaluator};
use crate::ga::PopulationEngine;
use crate::loading::{LoadSequencer, LoadingPlan};
use crate::models::{order_index, stop_index, Location, Order, Route, Vehicle};
use crate::schedule::{Schedule, ScheduleSummary, ScheduleSynthesizer};

/// Output of the routing path.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RoutingPlan {
    /// Routes; stops index the caller's order slice (stop `i` is order `i - 1`).
    pub routes: Vec<Route>,
    /// Vehicle whose capacity and equipment bound each route, same order as
    /// `routes`. Vehicles with equal specs share one class.
    pub route_vehicles: Vec<usize>,
    /// Cost breakdown per route.
    pub costs: Vec<RouteCost>,
    /// Sum of route costs.
    pub total_cost: f64,
    /// Timed schedule per route.
    pub schedules: Vec<Schedule>,
    /// Totals across schedules.
    pub schedule_summary: Option<ScheduleSummary>,
    /// Best-so-far cost summed over capacity classes, for the seeded
    /// populations and then after each generation.
    pub history: Vec<f64>,
    /// Orders not on any route, including fleet-infeasible ones.
    pub unassignable: Vec<InfeasibleOrder>,
}

/// Output of the loading path.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadingOutcome {
    /// Clusters in creation order.
    pub clusters: Vec<Cluster>,
    /// Vehicle assignments and unassigned orders, including fleet-infeasible ones.
    pub assignment: AssignmentOutcome,
    /// Loading plan per assignment, same order.
    pub plans: Vec<LoadingPlan>,
    /// Reordering advice per assignment, same order.
    pub suggestions: Vec<RouteSuggestion>,
    /// Counts.
    pub summary: Option<AssignmentSummary>,
    /// Utilization metrics, if anything was assigned.
    pub metrics: Option<AssignmentMetrics>,
}

/// Both paths' results for one planning run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DispatchPlan {
    /// Optimized routes and schedules.
    pub routing: RoutingPlan,
    /// Vehicle loading.
    pub loading: LoadingOutcome,
    /// Orders no vehicle in the fleet can carry.
    pub fleet_infeasible: Vec<InfeasibleOrder>,
}

impl DispatchPlan {
    /// Returns `true` if no order was routed or loaded.
    pub fn is_empty(&self) -> bool {
        self.routing.routes.is_empty() && self.loading.assignment.assignments.is_empty()
    }
}

/// Runs the full planning pipeline.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use u_dispatch::config::{CostModel, EngineConfig, PlannerConfig};
/// use u_dispatch::models::{Load, Location, Order, Vehicle};
/// use u_dispatch::planner::Dispatcher;
///
/// let depot = Location::new(0.0, 0.0);
/// let orders: Vec<Order> = (1..=6)
///     .map(|i| Order::new(format!("o{i}"), Location::new(0.0, 0.01 * i as f64), Load::weight(10.0)))
///     .collect();
/// let fleet = vec![Vehicle::new("v1", Load::weight(40.0)), Vehicle::new("v2", Load::weight(40.0))];
///
/// let config = PlannerConfig::new(CostModel::new(2.0, 10.0).unwrap())
///     .with_engine(EngineConfig::default().with_population_size(10).with_max_generations(10));
/// let day_start = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap().and_hms_opt(8, 0, 0).unwrap();
///
/// let plan = Dispatcher::new(config).unwrap().plan(&depot, &orders, &fleet, day_start).unwrap();
/// let routed: usize = plan.routing.routes.iter().map(|r| r.len()).sum();
/// assert_eq!(routed + plan.routing.unassignable.len(), 6);
/// ```
#[derive(Debug, Clone)]
pub struct Dispatcher {
    config: PlannerConfig,
}

impl Dispatcher {
    /// Creates a dispatcher; fails on an invalid configuration.
    pub fn new(config: PlannerConfig) -> Result<Self, DispatchError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration in use.
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Fails with [`DispatchError::EmptyInput`] if there are no orders or no
    /// vehicles.
    pub fn validate_input(orders: &[Order], vehicles: &[Vehicle]) -> Result<(), DispatchError> {
        if orders.is_empty() || vehicles.is_empty() {
            return Err(DispatchError::EmptyInput {
                orders: orders.len(),
                vehicles: vehicles.len(),
            });
        }
        Ok(())
    }

    /// Classifies orders no vehicle in the fleet can carry.
    ///
    /// An order whose load fits some vehicle but whose handling no such
    /// vehicle supports is [`InfeasibleReason::NoCapableVehicle`]; one that
    /// fits no vehicle at all is [`InfeasibleReason::ExceedsCapacity`].
    pub fn fleet_infeasible(orders: &[Order], vehicles: &[Vehicle]) -> Vec<InfeasibleOrder> {
        orders
            .iter()
            .enumerate()
            .filter(|(_, o)| !vehicles.iter().any(|v| v.can_handle(o)))
            .map(|(i, o)| {
                let fits_somewhere = vehicles
                    .iter()
                    .any(|v| o.load().fits_within(&v.capacity()));
                let reason = if fits_somewhere {
                    InfeasibleReason::NoCapableVehicle
                } else {
                    InfeasibleReason::ExceedsCapacity
                };
                InfeasibleOrder::new(i, reason)
            })
            .collect()
    }

    /// Groups servable orders by the vehicle whose capacity class routes
    /// them: the first vehicle, largest weight capacity first, that can
    /// carry the order. Classes come out in that vehicle order.
    pub fn routing_classes(
        orders: &[Order],
        vehicles: &[Vehicle],
        servable: &[usize],
    ) -> Vec<(usize, Vec<usize>)> {
        let matcher = VehicleMatcher::new(orders, vehicles);
        let mut classes: Vec<(usize, Vec<usize>)> = Vec::new();
        for &o in servable {
            let Some(&v) = matcher
                .ranking()
                .iter()
                .find(|&&v| vehicles[v].can_handle(&orders[o]))
            else {
                continue;
            };
            match classes.iter_mut().find(|(cv, _)| *cv == v) {
                Some((_, members)) => members.push(o),
                None => classes.push((v, vec![o])),
            }
        }
        let rank = |v: usize| matcher.ranking().iter().position(|&r| r == v);
        classes.sort_by_key(|&(v, _)| rank(v));
        classes
    }

    /// Plans a day.
    ///
    /// Empty input yields an empty plan rather than an error. Errors only
    /// arise from internal state mismatches.
    pub fn plan(
        &self,
        depot: &Location,
        orders: &[Order],
        vehicles: &[Vehicle],
        day_start: NaiveDateTime,
    ) -> Result<DispatchPlan, DispatchError> {
        if let Err(e) = Self::validate_input(orders, vehicles) {
            warn!(error = %e, "nothing to plan");
            return Ok(DispatchPlan::default());
        }
        info!(
            orders = orders.len(),
            vehicles = vehicles.len(),
            "planning started"
        );

        let fleet_infeasible = Self::fleet_infeasible(orders, vehicles);
        if !fleet_infeasible.is_empty() {
            warn!(
                count = fleet_infeasible.len(),
                "orders are structurally infeasible for this fleet"
            );
        }
        let servable: Vec<usize> = (0..orders.len())
            .filter(|i| !fleet_infeasible.iter().any(|f| f.order == *i))
            .collect();

        let routing = self.plan_routes(depot, orders, vehicles, &servable, &fleet_infeasible, day_start)?;
        let loading = self.plan_loading(depot, orders, vehicles, &servable, &fleet_infeasible)?;

        let not_assigned = loading.assignment.unassigned.len() - fleet_infeasible.len();
        if not_assigned > 0 {
            warn!(count = not_assigned, "orders could not be assigned to a vehicle");
        }
        info!(
            routes = routing.routes.len(),
            total_cost = routing.total_cost,
            vehicles_used = loading.assignment.assignments.len(),
            "planning finished"
        );

        Ok(DispatchPlan {
            routing,
            loading,
            fleet_infeasible,
        })
    }

    fn plan_routes(
        &self,
        depot: &Location,
        orders: &[Order],
        vehicles: &[Vehicle],
        servable: &[usize],
        fleet_infeasible: &[InfeasibleOrder],
        day_start: NaiveDateTime,
    ) -> Result<RoutingPlan, DispatchError> {
        let mut plan = RoutingPlan {
            unassignable: fleet_infeasible.to_vec(),
            ..RoutingPlan::default()
        };
        if servable.is_empty() {
            return Ok(plan);
        }

        for (vehicle, members) in Self::routing_classes(orders, vehicles, servable) {
            debug!(
                vehicle = vehicles[vehicle].id(),
                orders = members.len(),
                "routing capacity class"
            );
            self.route_class(
                depot,
                orders,
                vehicle,
                &vehicles[vehicle],
                &members,
                day_start,
                &mut plan,
            )?;
        }

        plan.unassignable.sort_by_key(|u| u.order);
        plan.total_cost = plan.costs.iter().map(RouteCost::total).sum();
        plan.schedule_summary = Some(ScheduleSummary::from_schedules(&plan.schedules));
        Ok(plan)
    }

    /// Routes `members` under `vehicle`'s capacity and appends the result
    /// to `plan`, translated to caller indices.
    #[allow(clippy::too_many_arguments)]
    fn route_class(
        &self,
        depot: &Location,
        orders: &[Order],
        vehicle_index: usize,
        vehicle: &Vehicle,
        members: &[usize],
        day_start: NaiveDateTime,
        plan: &mut RoutingPlan,
    ) -> Result<(), DispatchError> {
        let routable: Vec<Order> = members.iter().map(|&i| orders[i].clone()).collect();
        let distances = DistanceMatrix::build(depot, &routable);
        let model = self.config.cost_model;

        let builder = RouteBuilder::new(&routable, &distances, model, vehicle.capacity())?;
        let evaluator = RouteCostEvaluator::new(&routable, &distances, model)?;
        let mut engine = PopulationEngine::new(builder, evaluator, self.config.engine.clone())?;
        let result = engine.run()?;

        let routes = result.best.into_routes();
        plan.costs.extend(routes.iter().map(|r| evaluator.breakdown(r)));
        let synthesizer = ScheduleSynthesizer::new(&routable, &distances, model, day_start)?;
        let mut schedules = synthesizer.synthesize_all(&routes);
        for schedule in &mut schedules {
            for stop in &mut schedule.stops {
                stop.order = members[stop.order];
            }
        }
        plan.schedules.extend(schedules);

        let to_caller = |s: usize| stop_index(members[order_index(s)]);
        plan.route_vehicles.extend(std::iter::repeat(vehicle_index).take(routes.len()));
        plan.routes.extend(
            routes
                .iter()
                .map(|r| Route::new(r.customers().iter().map(|&s| to_caller(s)).collect())),
        );
        plan.unassignable.extend(
            result
                .unassignable
                .iter()
                .map(|u| InfeasibleOrder::new(members[u.order], u.reason)),
        );

        if plan.history.is_empty() {
            plan.history = result.history;
        } else {
            for (total, part) in plan.history.iter_mut().zip(&result.history) {
                *total += part;
            }
        }
        Ok(())
    }

    fn plan_loading(
        &self,
        depot: &Location,
        orders: &[Order],
        vehicles: &[Vehicle],
        servable: &[usize],
        fleet_infeasible: &[InfeasibleOrder],
    ) -> Result<LoadingOutcome, DispatchError> {
        let mut ordered = servable.to_vec();
        ordered.sort_by(|&a, &b| {
            orders[a].priority().cmp(&orders[b].priority()).then_with(|| {
                orders[a]
                    .time_window()
                    .latest()
                    .total_cmp(&orders[b].time_window().latest())
            })
        });

        let clusterer = GeographicClusterer::new(self.config.cluster)?;
        let clusters = clusterer.cluster_subset(depot, orders, &ordered);
        let mut assignment = VehicleMatcher::new(orders, vehicles).assign(&clusters);
        assignment.unassigned.extend_from_slice(fleet_infeasible);
        assignment.unassigned.sort_by_key(|u| u.order);

        let sequencer = LoadSequencer::new(*depot);
        let distances = DistanceMatrix::build(depot, orders);
        let mut plans = Vec::with_capacity(assignment.assignments.len());
        let mut suggestions = Vec::with_capacity(assignment.assignments.len());
        for a in &assignment.assignments {
            plans.push(sequencer.plan(a.vehicle(), &vehicles[a.vehicle()], orders, a.orders()));
            if let Some(s) = RouteSuggestion::compute(&distances, a.orders(), &self.config.cost_model) {
                suggestions.push(s);
            }
        }

        Ok(LoadingOutcome {
            summary: Some(assignment.summary(orders.len(), vehicles.len())),
            metrics: assignment.metrics(orders, vehicles, depot),
            clusters,
            assignment,
            plans,
            suggestions,
        })
    }
}
