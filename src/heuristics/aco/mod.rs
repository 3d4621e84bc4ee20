//! Ant Colony Optimization for station tours.
//!
//! This module implements the classic Ant System over open tours: every ant
//! builds a Hamiltonian path with the pheromone/heuristic roulette rule, all
//! trails evaporate once per generation and every ant deposits `q / cost`
//! along its own path.

pub mod ant;
pub mod colony;
pub mod pheromone;

pub use ant::PathConstructor;
pub use colony::{Colony, ColonyState, GenerationReport, ScoredTour};
pub use pheromone::PheromoneMatrix;

use crate::error::{AcoError, AcoResult};
use crate::provider::EdgeProvider;
use crate::solution::Solution;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// ACO configuration parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcoConfig {
    /// Number of ants per generation
    pub num_ants: usize,
    /// Number of generations
    pub max_iterations: usize,
    /// Pheromone importance (alpha)
    pub alpha: f64,
    /// Heuristic importance (beta)
    pub beta: f64,
    /// Evaporation rate (rho), in [0, 1)
    pub evaporation_rate: f64,
    /// Floor added to edge costs before inversion
    pub epsilon: f64,
    /// Initial pheromone level
    pub initial_pheromone: f64,
    /// Pheromone deposit factor (q)
    pub deposit_factor: f64,
    /// Random seed
    pub seed: u64,
    /// Build the ants' tours on the rayon pool
    pub parallel: bool,
    /// Stop after this many generations without improvement
    pub max_no_improve: Option<usize>,
    /// Time limit in seconds
    pub time_limit: Option<f64>,
}

impl Default for AcoConfig {
    fn default() -> Self {
        AcoConfig {
            num_ants: 10,
            max_iterations: 100,
            alpha: 1.0,
            beta: 2.0,
            evaporation_rate: 0.5,
            epsilon: 1e-10,
            initial_pheromone: 1.0,
            deposit_factor: 1.0,
            seed: 42,
            parallel: false,
            max_no_improve: None,
            time_limit: None,
        }
    }
}

impl AcoConfig {
    /// Load a JSON configuration; missing keys keep their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> AcoResult<Self> {
        let json = fs::read_to_string(path)?;
        let config: AcoConfig = serde_json::from_str(&json)?;
        Ok(config)
    }

    /// Reject configurations the colony cannot run with
    pub fn validate(&self) -> AcoResult<()> {
        fn invalid(msg: String) -> AcoResult<()> {
            Err(AcoError::InvalidConfig(msg))
        }

        if self.num_ants == 0 {
            return invalid("num_ants must be at least 1".to_string());
        }
        if self.max_iterations == 0 {
            return invalid("max_iterations must be at least 1".to_string());
        }
        if !(self.alpha.is_finite() && self.alpha >= 0.0) {
            return invalid(format!("alpha must be a finite value >= 0, got {}", self.alpha));
        }
        if !(self.beta.is_finite() && self.beta >= 0.0) {
            return invalid(format!("beta must be a finite value >= 0, got {}", self.beta));
        }
        if !(0.0..1.0).contains(&self.evaporation_rate) {
            return invalid(format!("evaporation_rate must be in [0, 1), got {}", self.evaporation_rate));
        }
        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            return invalid(format!("epsilon must be a finite value > 0, got {}", self.epsilon));
        }
        if !(self.initial_pheromone.is_finite() && self.initial_pheromone > 0.0) {
            return invalid(format!("initial_pheromone must be a finite value > 0, got {}", self.initial_pheromone));
        }
        if !(self.deposit_factor.is_finite() && self.deposit_factor > 0.0) {
            return invalid(format!("deposit_factor must be a finite value > 0, got {}", self.deposit_factor));
        }
        if let Some(limit) = self.time_limit {
            if !(limit > 0.0) {
                return invalid(format!("time_limit must be > 0 seconds, got {}", limit));
            }
        }
        Ok(())
    }
}

/// Ant Colony Optimization solver
pub struct AntColonyOptimization<'a> {
    config: AcoConfig,
    provider: &'a dyn EdgeProvider,
    state: ColonyState,
    history: Vec<GenerationReport>,
    rng: ChaCha8Rng,
    cancel: Option<Arc<AtomicBool>>,
}

impl<'a> AntColonyOptimization<'a> {
    /// Validate the configuration and set up a fresh colony
    pub fn new(provider: &'a dyn EdgeProvider, config: AcoConfig) -> AcoResult<Self> {
        config.validate()?;

        let state = ColonyState::new(provider.num_stations(), config.initial_pheromone);
        let rng = ChaCha8Rng::seed_from_u64(config.seed);

        Ok(AntColonyOptimization {
            config,
            provider,
            state,
            history: Vec::new(),
            rng,
            cancel: None,
        })
    }

    /// Stop cleanly between generations once `flag` is set
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn config(&self) -> &AcoConfig {
        &self.config
    }

    pub fn state(&self) -> &ColonyState {
        &self.state
    }

    /// Reports of every generation run so far
    pub fn history(&self) -> &[GenerationReport] {
        &self.history
    }

    fn cancelled(&self) -> bool {
        self.cancel.as_ref().map_or(false, |flag| flag.load(Ordering::Relaxed))
    }

    /// Run ACO algorithm
    pub fn run(&mut self) -> AcoResult<Solution> {
        self.run_with_observer(|_| {})
    }

    /// Run ACO algorithm, handing every generation's report to `observer`
    pub fn run_with_observer<F>(&mut self, mut observer: F) -> AcoResult<Solution>
    where
        F: FnMut(&GenerationReport),
    {
        let start = Instant::now();
        let n = self.provider.num_stations();

        if n <= 1 {
            let mut solution = Solution::from_tour(self.provider, (0..n).collect(), "ACO")?;
            solution.computation_time = start.elapsed().as_secs_f64();
            solution.iterations = Some(0);
            return Ok(solution);
        }

        let colony = Colony::new(self.provider, &self.config);
        let mut no_improve = 0;

        log::info!(
            "ACO on {} stations: {} ants, {} generations (alpha={}, beta={}, rho={})",
            n,
            self.config.num_ants,
            self.config.max_iterations,
            self.config.alpha,
            self.config.beta,
            self.config.evaporation_rate
        );

        for _ in 0..self.config.max_iterations {
            if self.cancelled() {
                log::warn!("ACO cancelled after {} generations", self.state.generation);
                break;
            }
            if let Some(limit) = self.config.time_limit {
                if start.elapsed().as_secs_f64() >= limit {
                    log::info!("ACO time limit reached after {} generations", self.state.generation);
                    break;
                }
            }

            let report = colony.step(&mut self.state, &mut self.rng)?;

            if report.improved {
                no_improve = 0;
                log::info!(
                    "Generation {}: new overall best {:.2}",
                    report.generation,
                    report.best_cost
                );
            } else {
                no_improve += 1;
            }
            log::debug!(
                "Generation {}: iteration best {:.2}, overall best {:.2}",
                report.generation,
                report.iteration_best_cost,
                report.best_cost
            );

            observer(&report);
            self.history.push(report);

            if let Some(limit) = self.config.max_no_improve {
                if no_improve >= limit {
                    log::info!("ACO stopped after {} generations without improvement", no_improve);
                    break;
                }
            }
        }

        if self.state.best.is_none() {
            log::warn!("ACO finished without completing a generation; no tour found");
        }

        let mut solution = self.best_solution();
        solution.computation_time = start.elapsed().as_secs_f64();
        solution.iterations = Some(self.state.generation);

        Ok(solution)
    }

    /// Get best solution found
    pub fn best_solution(&self) -> Solution {
        match &self.state.best {
            Some(best) => Solution::with_cost(self.provider, best.tour.clone(), best.cost, "ACO"),
            None => {
                let mut solution = Solution::new();
                solution.algorithm = "ACO".to_string();
                solution
            }
        }
    }
}
