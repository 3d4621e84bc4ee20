//! Pheromone trail storage.

/// Directed trail strength for every ordered pair of stations, stored row-major
#[derive(Debug, Clone, PartialEq)]
pub struct PheromoneMatrix {
    dimension: usize,
    trails: Vec<f64>,
}

impl PheromoneMatrix {
    /// Every ordered pair, self pairs included, starts at `initial`
    pub fn new(dimension: usize, initial: f64) -> Self {
        PheromoneMatrix {
            dimension,
            trails: vec![initial; dimension * dimension],
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    #[inline]
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.trails[from * self.dimension + to]
    }

    /// Scale every trail by `1 - rate`
    pub fn evaporate(&mut self, rate: f64) {
        debug_assert!((0.0..1.0).contains(&rate));
        let keep = 1.0 - rate;
        for tau in self.trails.iter_mut() {
            *tau *= keep;
        }
    }

    /// Add `amount` to the `from -> to` trail. Negative or non-finite amounts
    /// are ignored so trails stay finite and non-negative.
    #[inline]
    pub fn deposit(&mut self, from: usize, to: usize, amount: f64) {
        if amount.is_finite() && amount >= 0.0 {
            self.trails[from * self.dimension + to] += amount;
        }
    }

    /// Deposit `amount` on every consecutive edge of an open tour
    pub fn deposit_tour(&mut self, tour: &[usize], amount: f64) {
        for edge in tour.windows(2) {
            self.deposit(edge[0], edge[1], amount);
        }
    }

    /// All trail values in row-major order
    pub fn values(&self) -> &[f64] {
        &self.trails
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_initialization() {
        let matrix = PheromoneMatrix::new(3, 1.0);
        assert_eq!(matrix.dimension(), 3);
        assert_eq!(matrix.values().len(), 9);
        assert!(matrix.values().iter().all(|&v| v == 1.0));
        assert_eq!(matrix.get(2, 2), 1.0);
    }

    #[test]
    fn test_evaporate_then_deposit() {
        let mut matrix = PheromoneMatrix::new(3, 1.0);
        matrix.evaporate(0.5);
        matrix.deposit(0, 1, 0.25);

        assert!((matrix.get(0, 1) - 0.75).abs() < 1e-12);
        assert!((matrix.get(1, 0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_deposit_is_directed() {
        let mut matrix = PheromoneMatrix::new(3, 0.0);
        matrix.deposit_tour(&[2, 0, 1], 1.0);

        assert_eq!(matrix.get(2, 0), 1.0);
        assert_eq!(matrix.get(0, 1), 1.0);
        assert_eq!(matrix.get(0, 2), 0.0);
        assert_eq!(matrix.get(1, 0), 0.0);
        assert_eq!(matrix.get(1, 2), 0.0);
    }

    #[test]
    fn test_bad_deposits_are_ignored() {
        let mut matrix = PheromoneMatrix::new(2, 1.0);
        matrix.deposit(0, 1, f64::INFINITY);
        matrix.deposit(0, 1, f64::NAN);
        matrix.deposit(0, 1, -3.0);

        assert_eq!(matrix.get(0, 1), 1.0);
    }

    #[test]
    fn test_trails_stay_non_negative_and_finite() {
        let mut matrix = PheromoneMatrix::new(4, 1.0);
        for round in 0..500 {
            matrix.evaporate(0.9);
            matrix.deposit_tour(&[0, 1, 2, 3], 1.0 / (round as f64 + 1.0));
            matrix.deposit_tour(&[3, 1, 0, 2], 1e-300);
        }

        assert!(matrix.values().iter().all(|v| v.is_finite() && *v >= 0.0));
        assert!(matrix.get(0, 1) > 0.0);
    }
}
