//! Solution representation for station tours.
//!
//! A tour is an open path: it visits every station exactly once and does
//! not return to its first station.

use crate::error::AcoResult;
use crate::provider::{checked_cost, EdgeProvider};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Sum of consecutive edge costs along an open tour
pub fn tour_cost(provider: &dyn EdgeProvider, tour: &[usize]) -> AcoResult<f64> {
    tour.windows(2)
        .map(|edge| checked_cost(provider, edge[0], edge[1]))
        .sum()
}

/// Whether every consecutive edge of the tour is feasible
pub fn tour_is_feasible(provider: &dyn EdgeProvider, tour: &[usize]) -> bool {
    tour.windows(2).all(|edge| provider.feasible(edge[0], edge[1]))
}

/// Check that `tour` is a permutation of `0..num_stations`
pub fn is_permutation(tour: &[usize], num_stations: usize) -> bool {
    if tour.len() != num_stations {
        return false;
    }
    let unique: HashSet<usize> = tour.iter().copied().collect();
    unique.len() == num_stations && tour.iter().all(|&s| s < num_stations)
}

/// A scored tour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution {
    /// Station ids in visiting order
    pub tour: Vec<usize>,
    /// Station names in visiting order
    pub station_names: Vec<String>,
    /// Total path cost
    pub cost: f64,
    /// Whether every traversed edge satisfies the provider's feasibility rule
    pub feasible: bool,
    /// Algorithm that generated this solution
    pub algorithm: String,
    /// Computation time in seconds
    pub computation_time: f64,
    /// Number of generations (if applicable)
    pub iterations: Option<usize>,
}

impl Solution {
    /// Create a new empty solution
    pub fn new() -> Self {
        Solution {
            tour: Vec::new(),
            station_names: Vec::new(),
            cost: f64::INFINITY,
            feasible: false,
            algorithm: String::new(),
            computation_time: 0.0,
            iterations: None,
        }
    }

    /// Create a solution from a tour, scoring it with the provider
    pub fn from_tour(provider: &dyn EdgeProvider, tour: Vec<usize>, algorithm: &str) -> AcoResult<Self> {
        let cost = tour_cost(provider, &tour)?;
        Ok(Self::with_cost(provider, tour, cost, algorithm))
    }

    /// Create a solution from a tour whose cost is already known
    pub fn with_cost(provider: &dyn EdgeProvider, tour: Vec<usize>, cost: f64, algorithm: &str) -> Self {
        let station_names = tour.iter().map(|&s| provider.station_name(s)).collect();
        let feasible = tour_is_feasible(provider, &tour);

        Solution {
            tour,
            station_names,
            cost,
            feasible,
            algorithm: algorithm.to_string(),
            computation_time: 0.0,
            iterations: None,
        }
    }

    /// Check if all stations are visited exactly once
    pub fn is_complete(&self, num_stations: usize) -> bool {
        is_permutation(&self.tour, num_stations)
    }

    /// Whether a tour was actually scored; a fresh `Solution::new()` is not
    pub fn is_evaluated(&self) -> bool {
        self.cost.is_finite()
    }

    /// Path rendered as `A -> B -> C`
    pub fn path_string(&self) -> String {
        self.station_names.join(" -> ")
    }
}

impl Default for Solution {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Solution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Solution ({})", self.algorithm)?;
        writeln!(f, "  Cost: {:.2}", self.cost)?;
        writeln!(f, "  Feasible: {}", self.feasible)?;
        writeln!(f, "  Time: {:.4}s", self.computation_time)?;
        if let Some(iter) = self.iterations {
            writeln!(f, "  Iterations: {}", iter)?;
        }
        writeln!(f, "  Path: {}", self.path_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AcoError;
    use crate::provider::MatrixProvider;

    fn provider() -> MatrixProvider {
        MatrixProvider::from_costs(vec![
            vec![0.0, 1.0, 4.0],
            vec![1.0, 0.0, 2.0],
            vec![4.0, 2.0, 0.0],
        ]).unwrap()
    }

    #[test]
    fn test_solution_creation() {
        let sol = Solution::new();
        assert!(sol.tour.is_empty());
        assert!(!sol.feasible);
        assert_eq!(sol.cost, f64::INFINITY);
    }

    #[test]
    fn test_open_path_cost() {
        let provider = provider();
        // 0 -> 1 -> 2, no return edge
        assert_eq!(tour_cost(&provider, &[0, 1, 2]).unwrap(), 3.0);
        assert_eq!(tour_cost(&provider, &[2, 0, 1]).unwrap(), 5.0);
        assert_eq!(tour_cost(&provider, &[1]).unwrap(), 0.0);
        assert_eq!(tour_cost(&provider, &[]).unwrap(), 0.0);
    }

    #[test]
    fn test_cost_propagates_provider_errors() {
        let provider = MatrixProvider::from_costs(vec![vec![0.0, f64::NAN], vec![1.0, 0.0]]).unwrap();
        assert!(matches!(
            tour_cost(&provider, &[0, 1]),
            Err(AcoError::InvalidProviderResponse { .. })
        ));
    }

    #[test]
    fn test_from_tour() {
        let provider = provider();
        let sol = Solution::from_tour(&provider, vec![2, 1, 0], "test").unwrap();

        assert_eq!(sol.cost, 3.0);
        assert!(sol.feasible);
        assert!(sol.is_complete(3));
        assert_eq!(sol.path_string(), "2 -> 1 -> 0");
    }

    #[test]
    fn test_permutation_check() {
        assert!(is_permutation(&[2, 0, 1], 3));
        assert!(!is_permutation(&[0, 0, 1], 3));
        assert!(!is_permutation(&[0, 1], 3));
        assert!(!is_permutation(&[0, 1, 3], 3));
        assert!(is_permutation(&[], 0));
    }

    #[test]
    fn test_empty_solution_is_not_evaluated() {
        let provider = MatrixProvider::from_costs(vec![vec![0.0, 4.0], vec![4.0, 0.0]]).unwrap();

        assert!(!Solution::new().is_evaluated());
        assert!(Solution::from_tour(&provider, vec![1, 0], "test").unwrap().is_evaluated());
    }
}
