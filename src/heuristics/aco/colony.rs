//! One generation of the colony: build tours, score them, update trails.

use crate::error::AcoResult;
use crate::heuristics::aco::ant::PathConstructor;
use crate::heuristics::aco::pheromone::PheromoneMatrix;
use crate::heuristics::aco::AcoConfig;
use crate::provider::EdgeProvider;
use crate::solution::tour_cost;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// A tour together with its cost
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredTour {
    pub tour: Vec<usize>,
    pub cost: f64,
}

/// Mutable run state: the trails and the best tour seen so far
#[derive(Debug, Clone)]
pub struct ColonyState {
    pub pheromone: PheromoneMatrix,
    pub best: Option<ScoredTour>,
    /// Number of completed generations
    pub generation: usize,
}

impl ColonyState {
    pub fn new(num_stations: usize, initial_pheromone: f64) -> Self {
        ColonyState {
            pheromone: PheromoneMatrix::new(num_stations, initial_pheromone),
            best: None,
            generation: 0,
        }
    }

    pub fn best_cost(&self) -> f64 {
        self.best.as_ref().map_or(f64::INFINITY, |b| b.cost)
    }
}

/// Progress of one generation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationReport {
    /// 1-based generation index
    pub generation: usize,
    pub iteration_best_cost: f64,
    pub best_cost: f64,
    /// Whether this generation produced a new overall best
    pub improved: bool,
}

/// Runs generations against a provider with a fixed configuration
pub struct Colony<'a> {
    provider: &'a dyn EdgeProvider,
    config: &'a AcoConfig,
}

impl<'a> Colony<'a> {
    pub fn new(provider: &'a dyn EdgeProvider, config: &'a AcoConfig) -> Self {
        Colony { provider, config }
    }

    /// Build one tour per ant. Each ant draws from its own generator, seeded
    /// from `rng` in ant order, so the result does not depend on `parallel`.
    pub fn construct_tours(&self, pheromone: &PheromoneMatrix, rng: &mut ChaCha8Rng) -> AcoResult<Vec<Vec<usize>>> {
        let seeds: Vec<u64> = (0..self.config.num_ants).map(|_| rng.gen()).collect();
        let constructor = PathConstructor::new(self.provider, pheromone, self.config);

        let build = |&seed: &u64| {
            let mut ant_rng = ChaCha8Rng::seed_from_u64(seed);
            constructor.construct(&mut ant_rng)
        };

        if self.config.parallel {
            seeds.par_iter().map(build).collect()
        } else {
            seeds.iter().map(build).collect()
        }
    }

    /// Evaporate once, then let every tour deposit `deposit_factor / cost`
    /// on each of its edges. Zero-cost tours deposit nothing.
    pub fn update_pheromone(&self, pheromone: &mut PheromoneMatrix, tours: &[ScoredTour]) {
        pheromone.evaporate(self.config.evaporation_rate);

        for scored in tours {
            if scored.cost > 0.0 {
                pheromone.deposit_tour(&scored.tour, self.config.deposit_factor / scored.cost);
            }
        }
    }

    /// Run a single generation against `state`
    pub fn step(&self, state: &mut ColonyState, rng: &mut ChaCha8Rng) -> AcoResult<GenerationReport> {
        let tours = self.construct_tours(&state.pheromone, rng)?;

        let scored = tours
            .into_iter()
            .map(|tour| {
                let cost = tour_cost(self.provider, &tour)?;
                Ok(ScoredTour { tour, cost })
            })
            .collect::<AcoResult<Vec<_>>>()?;

        // First ant wins ties
        let mut iteration_best: Option<&ScoredTour> = None;
        for candidate in &scored {
            if iteration_best.map_or(true, |b| candidate.cost < b.cost) {
                iteration_best = Some(candidate);
            }
        }

        let iteration_best_cost = iteration_best.map_or(f64::INFINITY, |b| b.cost);
        let improved = iteration_best_cost < state.best_cost();
        if improved {
            state.best = iteration_best.cloned();
        }

        self.update_pheromone(&mut state.pheromone, &scored);
        state.generation += 1;

        Ok(GenerationReport {
            generation: state.generation,
            iteration_best_cost,
            best_cost: state.best_cost(),
            improved,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MatrixProvider;
    use crate::solution::is_permutation;

    fn line_provider(n: usize) -> MatrixProvider {
        let costs = (0..n)
            .map(|i| (0..n).map(|j| (i as f64 - j as f64).abs()).collect())
            .collect();
        MatrixProvider::from_costs(costs).unwrap()
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let provider = line_provider(9);
        let pheromone = PheromoneMatrix::new(9, 1.0);
        let sequential = AcoConfig { num_ants: 16, ..Default::default() };
        let parallel = AcoConfig { parallel: true, ..sequential.clone() };

        let mut rng_a = ChaCha8Rng::seed_from_u64(99);
        let mut rng_b = ChaCha8Rng::seed_from_u64(99);
        let a = Colony::new(&provider, &sequential).construct_tours(&pheromone, &mut rng_a).unwrap();
        let b = Colony::new(&provider, &parallel).construct_tours(&pheromone, &mut rng_b).unwrap();

        assert_eq!(a.len(), 16);
        assert_eq!(a, b);
        assert!(a.iter().all(|t| is_permutation(t, 9)));
    }

    #[test]
    fn test_update_evaporates_then_deposits() {
        let provider = line_provider(3);
        let config = AcoConfig { evaporation_rate: 0.5, ..Default::default() };
        let colony = Colony::new(&provider, &config);
        let mut pheromone = PheromoneMatrix::new(3, 1.0);

        let tours = vec![
            ScoredTour { tour: vec![0, 1, 2], cost: 2.0 },
            ScoredTour { tour: vec![1, 2, 0], cost: 4.0 },
        ];
        colony.update_pheromone(&mut pheromone, &tours);

        assert!((pheromone.get(0, 1) - 1.0).abs() < 1e-12);
        assert!((pheromone.get(1, 2) - 1.25).abs() < 1e-12);
        assert!((pheromone.get(2, 0) - 0.75).abs() < 1e-12);
        assert!((pheromone.get(2, 1) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_zero_cost_tour_deposits_nothing() {
        let provider = line_provider(2);
        let config = AcoConfig { evaporation_rate: 0.5, ..Default::default() };
        let colony = Colony::new(&provider, &config);
        let mut pheromone = PheromoneMatrix::new(2, 1.0);

        colony.update_pheromone(&mut pheromone, &[ScoredTour { tour: vec![0, 1], cost: 0.0 }]);

        assert!(pheromone.values().iter().all(|&v| (v - 0.5).abs() < 1e-12));
    }

    #[test]
    fn test_step_tracks_best() {
        let provider = line_provider(6);
        let config = AcoConfig { num_ants: 5, ..Default::default() };
        let colony = Colony::new(&provider, &config);
        let mut state = ColonyState::new(6, config.initial_pheromone);
        let mut rng = ChaCha8Rng::seed_from_u64(4);

        let first = colony.step(&mut state, &mut rng).unwrap();
        assert_eq!(first.generation, 1);
        assert!(first.improved);
        assert_eq!(first.best_cost, first.iteration_best_cost);

        let mut previous = first.best_cost;
        for _ in 0..20 {
            let report = colony.step(&mut state, &mut rng).unwrap();
            assert!(report.best_cost <= previous);
            assert_eq!(report.improved, report.best_cost < previous);
            previous = report.best_cost;
        }

        let best = state.best.as_ref().unwrap();
        assert!(is_permutation(&best.tour, 6));
        assert!((tour_cost(&provider, &best.tour).unwrap() - best.cost).abs() < 1e-9);
        assert_eq!(state.generation, 21);
    }
}
