//! Recombination and mutation over [`RouteSet`] candidates.
//!
//! Parent selection is left to the GA runner's
//! [`Selection`](u_metaheur::ga::Selection).
//!
//! - **Recombination**: route-level uniform crossover (whole routes from
//!   either parent); the child usually needs [`repair`](super::repair)
//! - **Mutation**: swap two stops inside one route

use rand::Rng;

use crate::models::Route;

use super::candidate::RouteSet;

/// Builds a child from whole routes of both parents.
///
/// Each route of `first` is inherited with probability 1/2 (at least one is
/// always kept), followed by each route of `second` with probability 1/2.
/// Routes of `first` come first, so they win when repair deduplicates.
pub fn recombine<R: Rng>(first: &RouteSet, second: &RouteSet, rng: &mut R) -> RouteSet {
    let mut routes: Vec<Route> = Vec::with_capacity(first.num_routes() + second.num_routes());

    let forced = (first.num_routes() > 0).then(|| rng.random_range(0..first.num_routes()));
    for (i, route) in first.routes().iter().enumerate() {
        if Some(i) == forced || rng.random_bool(0.5) {
            routes.push(route.clone());
        }
    }
    for route in second.routes() {
        if rng.random_bool(0.5) {
            routes.push(route.clone());
        }
    }

    RouteSet::new(routes)
}

/// Swaps two distinct stops inside one randomly chosen route.
///
/// Only routes with at least two stops are eligible. Returns `false` if no
/// route qualifies.
pub fn swap_mutate<R: Rng>(candidate: &mut RouteSet, rng: &mut R) -> bool {
    let eligible: Vec<usize> = candidate
        .routes()
        .iter()
        .enumerate()
        .filter(|(_, r)| r.len() >= 2)
        .map(|(i, _)| i)
        .collect();
    if eligible.is_empty() {
        return false;
    }

    let route = &mut candidate.routes_mut()[eligible[rng.random_range(0..eligible.len())]];
    let stops = route.customers_mut();
    let i = rng.random_range(0..stops.len());
    let mut j = rng.random_range(0..stops.len() - 1);
    if j >= i {
        j += 1;
    }
    stops.swap(i, j);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use u_numflow::random::create_rng;

    #[test]
    fn test_recombine_keeps_a_first_parent_route() {
        let a = RouteSet::new(vec![Route::new(vec![1, 2]), Route::new(vec![3])]);
        let b = RouteSet::new(vec![Route::new(vec![3, 1]), Route::new(vec![2])]);
        let mut rng = create_rng(42);
        for _ in 0..50 {
            let child = recombine(&a, &b, &mut rng);
            assert!(child
                .routes()
                .iter()
                .any(|r| a.routes().contains(r)));
            for r in child.routes() {
                assert!(a.routes().contains(r) || b.routes().contains(r));
            }
        }
    }

    #[test]
    fn test_swap_mutate_preserves_stops() {
        let mut set = RouteSet::new(vec![Route::new(vec![1]), Route::new(vec![2, 3, 4])]);
        let mut rng = create_rng(3);
        assert!(swap_mutate(&mut set, &mut rng));
        assert_eq!(set.routes()[0].customers(), &[1]);
        let mut second = set.routes()[1].customers().to_vec();
        assert_ne!(second, vec![2, 3, 4]);
        second.sort();
        assert_eq!(second, vec![2, 3, 4]);
    }

    #[test]
    fn test_swap_mutate_no_eligible_route() {
        let mut set = RouteSet::new(vec![Route::new(vec![1]), Route::new(vec![2])]);
        let mut rng = create_rng(3);
        assert!(!swap_mutate(&mut set, &mut rng));
    }
}
