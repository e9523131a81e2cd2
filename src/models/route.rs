//! Route type: a depot-bookended sequence of stop indices.

use serde::Serialize;

/// Stop index of the depot in every distance matrix and route.
pub const DEPOT: usize = 0;

/// Converts a stop index (matrix row) into an index into the order slice.
///
/// # Panics
///
/// Panics in debug builds if `stop` is the depot.
pub fn order_index(stop: usize) -> usize {
    debug_assert!(stop != DEPOT, "the depot is not an order");
    stop - 1
}

/// Converts an index into the order slice into its stop index.
pub fn stop_index(order: usize) -> usize {
    order + 1
}

/// An ordered sequence of stops that starts and ends at the depot.
///
/// Stop `i > 0` refers to order `i - 1` of the planning run; see
/// [`order_index`] and [`stop_index`].
///
/// # Examples
///
/// ```
/// use u_dispatch::models::Route;
///
/// let mut route = Route::new(vec![3, 1]);
/// route.push(2);
/// assert_eq!(route.stops(), &[0, 3, 1, 2, 0]);
/// assert_eq!(route.customers(), &[3, 1, 2]);
/// assert_eq!(route.len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    stops: Vec<usize>,
}

impl Route {
    /// Creates a route visiting the given stops in order.
    pub fn new(customers: Vec<usize>) -> Self {
        let mut stops = Vec::with_capacity(customers.len() + 2);
        stops.push(DEPOT);
        stops.extend(customers);
        stops.push(DEPOT);
        Self { stops }
    }

    /// Creates a depot-to-depot route with no customers.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// All stops including both depot bookends.
    pub fn stops(&self) -> &[usize] {
        &self.stops
    }

    /// Customer stops in visit order (bookends excluded).
    pub fn customers(&self) -> &[usize] {
        &self.stops[1..self.stops.len() - 1]
    }

    /// Mutable view of the customer stops.
    pub fn customers_mut(&mut self) -> &mut [usize] {
        let end = self.stops.len() - 1;
        &mut self.stops[1..end]
    }

    /// Number of customer stops.
    pub fn len(&self) -> usize {
        self.stops.len() - 2
    }

    /// Returns `true` if the route visits no customers.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends a customer stop before the closing depot.
    pub fn push(&mut self, stop: usize) {
        let end = self.stops.len() - 1;
        self.stops.insert(end, stop);
    }

    /// Last customer visited, if any.
    pub fn last_customer(&self) -> Option<usize> {
        self.customers().last().copied()
    }

    /// Returns `true` if the route visits `stop`.
    pub fn contains(&self, stop: usize) -> bool {
        self.customers().contains(&stop)
    }

    /// Keeps only the customer stops for which `keep` returns `true`.
    pub fn retain_customers<F: FnMut(usize) -> bool>(&mut self, mut keep: F) {
        let mut customers: Vec<usize> = self.customers().to_vec();
        customers.retain(|&s| keep(s));
        *self = Route::new(customers);
    }

    /// Indices into the order slice, in visit order.
    pub fn order_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.customers().iter().map(|&s| order_index(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_empty() {
        let r = Route::empty();
        assert!(r.is_empty());
        assert_eq!(r.len(), 0);
        assert_eq!(r.stops(), &[DEPOT, DEPOT]);
        assert!(r.last_customer().is_none());
    }

    #[test]
    fn test_route_push() {
        let mut r = Route::empty();
        r.push(5);
        r.push(3);
        assert_eq!(r.stops(), &[0, 5, 3, 0]);
        assert_eq!(r.last_customer(), Some(3));
        assert!(r.contains(5));
        assert!(!r.contains(4));
    }

    #[test]
    fn test_route_customers_mut() {
        let mut r = Route::new(vec![1, 2, 3]);
        r.customers_mut().swap(0, 2);
        assert_eq!(r.stops(), &[0, 3, 2, 1, 0]);
    }

    #[test]
    fn test_route_retain() {
        let mut r = Route::new(vec![1, 2, 3, 4]);
        r.retain_customers(|s| s % 2 == 0);
        assert_eq!(r.stops(), &[0, 2, 4, 0]);
    }

    #[test]
    fn test_index_conversions() {
        assert_eq!(order_index(1), 0);
        assert_eq!(stop_index(0), 1);
        let r = Route::new(vec![2, 1]);
        assert_eq!(r.order_indices().collect::<Vec<_>>(), vec![1, 0]);
    }
}
