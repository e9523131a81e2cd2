//! Pool of stops not yet placed on a route.

/// The unvisited stops during construction, kept in ascending stop order.
///
/// Construction steps take the pool by value and hand back the reduced
/// pool, so the set of remaining stops is never shared or mutated behind a
/// caller's back.
///
/// # Examples
///
/// ```
/// use u_dispatch::constructive::OrderPool;
///
/// let pool = OrderPool::new([3, 1, 2]);
/// let pool = pool.without(2);
/// assert_eq!(pool.as_slice(), &[1, 3]);
/// assert!(!pool.contains(2));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderPool {
    remaining: Vec<usize>,
}

impl OrderPool {
    /// Creates a pool from stop indices (duplicates collapse).
    pub fn new<I: IntoIterator<Item = usize>>(stops: I) -> Self {
        let mut remaining: Vec<usize> = stops.into_iter().collect();
        remaining.sort_unstable();
        remaining.dedup();
        Self { remaining }
    }

    /// Pool holding stops `1..=n_orders`.
    pub fn all(n_orders: usize) -> Self {
        Self {
            remaining: (1..=n_orders).collect(),
        }
    }

    /// Returns the pool with `stop` removed.
    pub fn without(mut self, stop: usize) -> Self {
        if let Ok(pos) = self.remaining.binary_search(&stop) {
            self.remaining.remove(pos);
        }
        self
    }

    /// Returns `true` if `stop` is still unplaced.
    pub fn contains(&self, stop: usize) -> bool {
        self.remaining.binary_search(&stop).is_ok()
    }

    /// Remaining stops in ascending order.
    pub fn as_slice(&self) -> &[usize] {
        &self.remaining
    }

    /// Number of remaining stops.
    pub fn len(&self) -> usize {
        self.remaining.len()
    }

    /// Returns `true` if every stop has been placed.
    pub fn is_empty(&self) -> bool {
        self.remaining.is_empty()
    }

    /// Consumes the pool, returning the remaining stops.
    pub fn into_stops(self) -> Vec<usize> {
        self.remaining
    }
}
