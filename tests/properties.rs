use chrono::{NaiveDate, NaiveDateTime};
use proptest::prelude::*;
use u_dispatch::assignment::VehicleMatcher;
use u_dispatch::cluster::GeographicClusterer;
use u_dispatch::config::{ClusterConfig, CostModel, EngineConfig, PlannerConfig};
use u_dispatch::constructive::RouteBuilder;
use u_dispatch::distance::DistanceMatrix;
use u_dispatch::evaluation::{validate_routes, RouteCostEvaluator};
use u_dispatch::ga::PopulationEngine;
use u_dispatch::loading::LoadSequencer;
use u_dispatch::models::{Handling, Load, Location, Order, Priority, TimeWindow, Vehicle, DEPOT};
use u_dispatch::planner::Dispatcher;
use u_dispatch::{InfeasibleOrder, InfeasibleReason};

const DEPOT_LOCATION: Location = Location::new(37.50, 127.00);

fn model() -> CostModel {
    CostModel::new(2.0, 10.0).expect("valid")
}

fn day_start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 1)
        .and_then(|d| d.and_hms_opt(8, 0, 0))
        .expect("valid date")
}

fn priority() -> impl Strategy<Value = Priority> {
    prop_oneof![
        Just(Priority::Urgent),
        Just(Priority::High),
        Just(Priority::Normal),
        Just(Priority::Low),
    ]
}

fn handling() -> impl Strategy<Value = Option<Handling>> {
    prop_oneof![
        4 => Just(None),
        1 => Just(Some(Handling::Fragile)),
        1 => Just(Some(Handling::TemperatureSensitive)),
        1 => Just(Some(Handling::Hazardous)),
    ]
}

prop_compose! {
    fn order()
    (
        dlat in -0.15..0.15f64,
        dlng in -0.15..0.15f64,
        weight in 1.0..60.0f64,
        volume in 0.0..50_000.0f64,
        earliest in 0.0..240.0f64,
        span in 30.0..480.0f64,
        service in 0.0..15.0f64,
        priority in priority(),
        flag in handling(),
    ) -> Order {
        let tw = TimeWindow::new(earliest, earliest + span).expect("valid");
        let order = Order::new(
            "o",
            Location::new(DEPOT_LOCATION.lat() + dlat, DEPOT_LOCATION.lng() + dlng),
            Load::new(weight, volume),
        )
        .with_time_window(tw)
        .with_service_minutes(service)
        .with_priority(priority);
        match flag {
            Some(f) => order.with_handling(f),
            None => order,
        }
    }
}

prop_compose! {
    fn vehicle()
    (
        weight in 50.0..300.0f64,
        volume in 100_000.0..400_000.0f64,
        fragile in any::<bool>(),
        cold in any::<bool>(),
    ) -> Vehicle {
        let mut v = Vehicle::new("v", Load::new(weight, volume));
        if fragile {
            v = v.with_capability(Handling::Fragile);
        }
        if cold {
            v = v.with_capability(Handling::TemperatureSensitive);
        }
        v
    }
}

fn location() -> impl Strategy<Value = Location> {
    (-60.0..60.0f64, -170.0..170.0f64).prop_map(|(lat, lng)| Location::new(lat, lng))
}

proptest! {
    #[test]
    fn distance_symmetric_and_zero_on_diagonal(a in location(), b in location()) {
        prop_assert!((a.distance_to(&b) - b.distance_to(&a)).abs() < 1e-9);
        prop_assert_eq!(a.distance_to(&a), 0.0);
    }

    #[test]
    fn built_routes_respect_capacity_and_visit_once(
        orders in prop::collection::vec(order(), 1..40),
        cap in 60.0..200.0f64,
    ) {
        let capacity = Load::new(cap, 300_000.0);
        let dm = DistanceMatrix::build(&DEPOT_LOCATION, &orders);
        let builder = RouteBuilder::new(&orders, &dm, model(), capacity).expect("fresh");
        let result = builder.build();

        let mut seen = vec![false; orders.len() + 1];
        for route in &result.routes {
            prop_assert_eq!(route.stops().first(), Some(&DEPOT));
            prop_assert_eq!(route.stops().last(), Some(&DEPOT));
            let mut load = Load::zero();
            for &s in route.customers() {
                prop_assert!(s != DEPOT);
                prop_assert!(!seen[s]);
                seen[s] = true;
                load += orders[s - 1].load();
                prop_assert!(load.fits_within(&capacity));
            }
        }
        for u in &result.unassignable {
            prop_assert!(!seen[u.order + 1]);
            seen[u.order + 1] = true;
        }
        prop_assert!(seen[1..].iter().all(|&s| s));
    }

    #[test]
    fn clusters_partition_orders_within_bounds(
        orders in prop::collection::vec(order(), 0..60),
        size in 1usize..10,
        radius in 0.5..20.0f64,
    ) {
        let config = ClusterConfig::default()
            .with_max_cluster_size(size)
            .with_max_radius_km(radius);
        let clusters = GeographicClusterer::new(config)
            .expect("valid")
            .cluster(&DEPOT_LOCATION, &orders);

        let mut count = vec![0usize; orders.len()];
        for c in &clusters {
            prop_assert!(!c.is_empty() && c.len() <= size);
            for (k, &m) in c.members().iter().enumerate() {
                count[m] += 1;
                if k > 0 {
                    let centroid = Location::centroid(
                        c.members()[..k].iter().map(|&p| orders[p].location()),
                    )
                    .expect("non-empty");
                    prop_assert!(centroid.distance_to(orders[m].location()) <= radius + 1e-9);
                }
            }
        }
        prop_assert!(count.iter().all(|&n| n == 1));
    }

    #[test]
    fn assignments_fit_and_score_in_range(
        orders in prop::collection::vec(order(), 1..50),
        fleet in prop::collection::vec(vehicle(), 1..6),
    ) {
        let clusters = GeographicClusterer::new(ClusterConfig::default())
            .expect("valid")
            .cluster(&DEPOT_LOCATION, &orders);
        let outcome = VehicleMatcher::new(&orders, &fleet).assign(&clusters);

        let mut used = vec![false; fleet.len()];
        for a in &outcome.assignments {
            prop_assert!(!used[a.vehicle()]);
            used[a.vehicle()] = true;
            prop_assert!(a.load().fits_within(&fleet[a.vehicle()].capacity()));
            prop_assert!((0.0..=100.0).contains(&a.score()));
            for &o in a.orders() {
                prop_assert!(fleet[a.vehicle()].can_handle(&orders[o]));
            }
        }
        prop_assert_eq!(outcome.assigned_count() + outcome.unassigned.len(), orders.len());
    }

    #[test]
    fn zones_concatenate_back_to_front(orders in prop::collection::vec(order(), 1..30)) {
        let members: Vec<usize> = (0..orders.len()).collect();
        let vehicle = Vehicle::new("v", Load::new(10_000.0, 10_000_000.0));
        let plan = LoadSequencer::new(DEPOT_LOCATION).plan(0, &vehicle, &orders, &members);
        let joined: Vec<usize> = plan.zones().into_iter().flat_map(|(_, m)| m).collect();
        prop_assert_eq!(joined, plan.sequence());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn engine_best_cost_never_increases(
        orders in prop::collection::vec(order(), 1..25),
        seed in any::<u64>(),
    ) {
        let capacity = Load::new(150.0, 300_000.0);
        let dm = DistanceMatrix::build(&DEPOT_LOCATION, &orders);
        let builder = RouteBuilder::new(&orders, &dm, model(), capacity).expect("fresh");
        let eval = RouteCostEvaluator::new(&orders, &dm, model()).expect("fresh");
        let config = EngineConfig::default()
            .with_population_size(8)
            .with_max_generations(8)
            .with_seed(seed);
        let mut engine = PopulationEngine::new(builder, eval, config).expect("valid");
        let result = engine.run().expect("seeded");

        for w in result.history.windows(2) {
            prop_assert!(w[1] <= w[0]);
        }
        prop_assert!(validate_routes(
            result.best.routes(),
            &orders,
            &capacity,
            engine.expected_stops()
        )
        .is_empty());
    }

    #[test]
    fn every_order_routed_or_unassignable(
        orders in prop::collection::vec(order(), 1..25),
        fleet in prop::collection::vec(vehicle(), 1..4),
    ) {
        let config = PlannerConfig::new(model()).with_engine(
            EngineConfig::default()
                .with_population_size(6)
                .with_max_generations(5),
        );
        let plan = Dispatcher::new(config)
            .expect("valid")
            .plan(&DEPOT_LOCATION, &orders, &fleet, day_start())
            .expect("plan");

        let mut routed = vec![0usize; orders.len()];
        for r in &plan.routing.routes {
            for o in r.order_indices() {
                routed[o] += 1;
            }
        }
        for u in &plan.routing.unassignable {
            routed[u.order] += 1;
        }
        prop_assert!(routed.iter().all(|&n| n == 1));
        prop_assert!(plan
            .routing
            .unassignable
            .iter()
            .filter(|u| u.reason == InfeasibleReason::ExceedsCapacity)
            .all(|u| plan.fleet_infeasible.contains(u)));

        prop_assert_eq!(plan.routing.route_vehicles.len(), plan.routing.routes.len());
        for (r, &v) in plan.routing.routes.iter().zip(&plan.routing.route_vehicles) {
            let load: Load = r.order_indices().map(|o| orders[o].load()).sum();
            prop_assert!(load.fits_within(&fleet[v].capacity()));
        }

        let mut loaded = vec![0usize; orders.len()];
        for a in &plan.loading.assignment.assignments {
            for &o in a.orders() {
                loaded[o] += 1;
            }
        }
        for u in &plan.loading.assignment.unassigned {
            loaded[u.order] += 1;
        }
        prop_assert!(loaded.iter().all(|&n| n == 1));
    }
}

#[test]
fn two_orders_share_one_route() {
    let depot = Location::new(0.0, 0.0);
    let tw = TimeWindow::new(0.0, 100.0).expect("valid");
    let orders = vec![
        Order::new("A", Location::new(0.0, 0.01), Load::weight(10.0)).with_time_window(tw),
        Order::new("B", Location::new(0.0, 0.02), Load::weight(45.0)).with_time_window(tw),
    ];
    let dm = DistanceMatrix::build(&depot, &orders);
    let builder = RouteBuilder::new(&orders, &dm, model(), Load::weight(55.0)).expect("fresh");
    let result = builder.build();
    assert_eq!(result.routes.len(), 1);
    assert_eq!(result.routes[0].stops(), &[0, 1, 2, 0]);
}

#[test]
fn overweight_order_is_unassignable() {
    let depot = Location::new(0.0, 0.0);
    let orders = vec![Order::new("A", Location::new(0.0, 0.01), Load::weight(15.0))];
    let dm = DistanceMatrix::build(&depot, &orders);
    let builder = RouteBuilder::new(&orders, &dm, model(), Load::weight(10.0)).expect("fresh");
    let result = builder.build();
    assert!(result.routes.is_empty());
    assert_eq!(
        result.unassignable,
        vec![InfeasibleOrder::new(0, InfeasibleReason::ExceedsCapacity)]
    );

    let fleet = vec![Vehicle::new("v", Load::weight(10.0))];
    let plan = Dispatcher::new(PlannerConfig::new(model()))
        .expect("valid")
        .plan(&depot, &orders, &fleet, day_start())
        .expect("plan");
    assert!(plan.routing.routes.is_empty());
    assert_eq!(
        plan.fleet_infeasible,
        vec![InfeasibleOrder::new(0, InfeasibleReason::ExceedsCapacity)]
    );
}

#[test]
fn three_nearby_orders_form_one_cluster() {
    let depot = Location::new(0.0, 0.0);
    let orders = vec![
        Order::new("A", Location::new(0.001, 0.002), Load::weight(1.0)),
        Order::new("B", Location::new(-0.002, 0.001), Load::weight(1.0)),
        Order::new("C", Location::new(0.002, -0.003), Load::weight(1.0)),
    ];
    let clusters = GeographicClusterer::new(ClusterConfig::default().with_max_cluster_size(8))
        .expect("valid")
        .cluster(&depot, &orders);
    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].len(), 3);
}

#[test]
fn plan_serializes_to_json() {
    let depot = Location::new(0.0, 0.0);
    let orders = vec![
        Order::new("A", Location::new(0.0, 0.01), Load::weight(10.0)).with_priority(Priority::High),
        Order::new("B", Location::new(0.0, 0.02), Load::weight(10.0)),
    ];
    let fleet = vec![Vehicle::new("v", Load::weight(50.0))];
    let config = PlannerConfig::new(model()).with_engine(
        EngineConfig::default()
            .with_population_size(4)
            .with_max_generations(3),
    );
    let plan = Dispatcher::new(config)
        .expect("valid")
        .plan(&depot, &orders, &fleet, day_start())
        .expect("plan");
    let json = serde_json::to_value(&plan).expect("serializable");
    assert_eq!(json["routing"]["routes"].as_array().map(Vec::len), Some(1));
    assert!(json["loading"]["plans"][0]["entries"].is_array());
}
