//! Station Tour ACO Solver Library
//!
//! Approximates the cheapest open path visiting every station exactly once
//! using Ant Colony Optimization.
//!
//! # Features
//!
//! - Pluggable edge cost and feasibility providers (Haversine with a slope
//!   limit, or a dense cost matrix)
//! - Ant System core: pheromone matrix, roulette path construction with a
//!   uniform fallback, evaporate-then-deposit updates
//! - Seed-reproducible runs, optionally building tours on the rayon pool
//! - Nearest-neighbor baselines and a small benchmarking harness
//!
//! # Example
//!
//! ```no_run
//! use station_aco_solver::instance::StationSet;
//! use station_aco_solver::provider::{HaversineProvider, DEFAULT_MAX_SLOPE};
//! use station_aco_solver::heuristics::aco::{AcoConfig, AntColonyOptimization};
//!
//! let stations = StationSet::from_file("new.json").unwrap();
//! let provider = HaversineProvider::new(stations, DEFAULT_MAX_SLOPE).unwrap();
//!
//! let mut aco = AntColonyOptimization::new(&provider, AcoConfig::default()).unwrap();
//! let solution = aco.run().unwrap();
//!
//! println!("Best path: {}", solution.path_string());
//! println!("Best distance: {:.2} km", solution.cost);
//! ```

pub mod error;
pub mod instance;
pub mod provider;
pub mod solution;
pub mod heuristics;
pub mod benchmark;

pub use error::{AcoError, AcoResult};
pub use instance::{DistanceMatrix, Station, StationSet};
pub use provider::{EdgeProvider, HaversineProvider, MatrixProvider};
pub use solution::Solution;
