//! Benchmarking and experimentation module.
//!
//! Runs the nearest-neighbor baselines and the ant colony over several seeds,
//! collects statistics and exports them.

use crate::error::AcoResult;
use crate::heuristics::aco::{AcoConfig, AntColonyOptimization, GenerationReport};
use crate::heuristics::construction::{ConstructionHeuristic, MultiStartNearestNeighbor, NearestNeighborHeuristic};
use crate::provider::EdgeProvider;
use crate::solution::Solution;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

/// Result of running a single algorithm on an instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmResult {
    /// Algorithm name
    pub algorithm: String,
    /// Instance name
    pub instance: String,
    /// Number of stations
    pub num_stations: usize,
    /// Seed used (stochastic methods only)
    pub seed: Option<u64>,
    /// Solution cost
    pub cost: f64,
    /// Whether every traversed edge was feasible
    pub feasible: bool,
    /// Computation time in seconds
    pub time: f64,
    /// Number of generations (if applicable)
    pub iterations: Option<usize>,
    /// Gap to the best cost recorded for the instance, in percent
    pub gap_to_best: Option<f64>,
}

/// Aggregated statistics for an algorithm
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmStatistics {
    pub algorithm: String,
    pub num_runs: usize,
    pub num_feasible: usize,
    pub avg_cost: f64,
    pub best_cost: f64,
    pub worst_cost: f64,
    pub std_cost: f64,
    pub avg_time: f64,
    pub total_time: f64,
}

/// Benchmark configuration
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    /// Number of ACO runs (seeds `0..num_runs`)
    pub num_runs: usize,
    /// Colony settings; `seed` is overridden per run
    pub aco: AcoConfig,
    /// Run the seeds on the rayon pool
    pub parallel: bool,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        BenchmarkConfig {
            num_runs: 5,
            aco: AcoConfig::default(),
            parallel: true,
        }
    }
}

/// Benchmarking engine
pub struct Benchmark {
    config: BenchmarkConfig,
    results: Vec<AlgorithmResult>,
    best_known: HashMap<String, f64>,
}

impl Benchmark {
    pub fn new(config: BenchmarkConfig) -> Self {
        Benchmark {
            config,
            results: Vec::new(),
            best_known: HashMap::new(),
        }
    }

    /// Set best known solution for an instance
    pub fn set_best_known(&mut self, instance_name: &str, cost: f64) {
        self.best_known.insert(instance_name.to_string(), cost);
    }

    /// Run the nearest-neighbor baselines
    pub fn run_baselines(&mut self, instance: &str, provider: &dyn EdgeProvider) -> AcoResult<()> {
        let heuristics: Vec<Box<dyn ConstructionHeuristic>> = vec![
            Box::new(NearestNeighborHeuristic::new()),
            Box::new(MultiStartNearestNeighbor::new()),
        ];

        for heuristic in heuristics {
            let solution = heuristic.construct(provider)?;
            self.record_result(instance, provider, &solution, None);
        }
        Ok(())
    }

    /// Run the colony once per seed
    pub fn run_aco(&mut self, instance: &str, provider: &dyn EdgeProvider) -> AcoResult<()> {
        let seeds: Vec<u64> = (0..self.config.num_runs as u64).collect();
        let base = &self.config.aco;

        let run = |&seed: &u64| -> AcoResult<(u64, Solution)> {
            let config = AcoConfig { seed, ..base.clone() };
            let mut aco = AntColonyOptimization::new(provider, config)?;
            Ok((seed, aco.run()?))
        };

        let runs: Vec<(u64, Solution)> = if self.config.parallel {
            seeds.par_iter().map(run).collect::<AcoResult<_>>()?
        } else {
            seeds.iter().map(run).collect::<AcoResult<_>>()?
        };

        for (seed, solution) in runs {
            self.record_result(instance, provider, &solution, Some(seed));
        }
        Ok(())
    }

    /// Run baselines and the colony on an instance
    pub fn run_full_benchmark(&mut self, instance: &str, provider: &dyn EdgeProvider) -> AcoResult<()> {
        log::info!("Running benchmark on instance: {}", instance);

        self.run_baselines(instance, provider)?;
        self.run_aco(instance, provider)?;
        self.refresh_gaps(instance);
        Ok(())
    }

    /// Record a result
    fn record_result(&mut self, instance: &str, provider: &dyn EdgeProvider, solution: &Solution, seed: Option<u64>) {
        let algorithm = match seed {
            Some(seed) => format!("{}-run{}", solution.algorithm, seed),
            None => solution.algorithm.clone(),
        };

        self.results.push(AlgorithmResult {
            algorithm,
            instance: instance.to_string(),
            num_stations: provider.num_stations(),
            seed,
            cost: solution.cost,
            feasible: solution.feasible,
            time: solution.computation_time,
            iterations: solution.iterations,
            gap_to_best: None,
        });
    }

    /// Fill in gaps against the best known cost (or the best cost observed)
    fn refresh_gaps(&mut self, instance: &str) {
        let observed = self.results.iter()
            .filter(|r| r.instance == instance)
            .map(|r| r.cost)
            .fold(f64::INFINITY, f64::min);
        let best = self.best_known.get(instance).copied().unwrap_or(observed);

        if !(best.is_finite() && best > 0.0) {
            return;
        }
        for result in self.results.iter_mut().filter(|r| r.instance == instance) {
            result.gap_to_best = Some((result.cost - best) / best * 100.0);
        }
    }

    /// Group key: run suffixes collapse into their algorithm
    fn family(algorithm: &str) -> &str {
        algorithm.split("-run").next().unwrap_or(algorithm)
    }

    /// Compute statistics for each algorithm family
    pub fn compute_statistics(&self) -> Vec<AlgorithmStatistics> {
        let mut groups: HashMap<&str, Vec<&AlgorithmResult>> = HashMap::new();
        for result in &self.results {
            groups.entry(Self::family(&result.algorithm)).or_default().push(result);
        }

        let mut statistics: Vec<AlgorithmStatistics> = groups
            .into_iter()
            .map(|(algorithm, results)| {
                let costs: Vec<f64> = results.iter().map(|r| r.cost).collect();
                let times: Vec<f64> = results.iter().map(|r| r.time).collect();

                let std_cost = if costs.len() > 1 { (&costs).std_dev() } else { 0.0 };

                AlgorithmStatistics {
                    algorithm: algorithm.to_string(),
                    num_runs: results.len(),
                    num_feasible: results.iter().filter(|r| r.feasible).count(),
                    avg_cost: (&costs).mean(),
                    best_cost: costs.iter().cloned().fold(f64::INFINITY, f64::min),
                    worst_cost: costs.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
                    std_cost,
                    avg_time: (&times).mean(),
                    total_time: times.iter().sum(),
                }
            })
            .collect();

        statistics.sort_by(|a, b| a.avg_cost.total_cmp(&b.avg_cost));
        statistics
    }

    /// Export results to CSV
    pub fn export_to_csv<P: AsRef<Path>>(&self, path: P) -> AcoResult<()> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);

        for result in &self.results {
            writer.serialize(result)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Export statistics to CSV
    pub fn export_statistics_csv<P: AsRef<Path>>(&self, path: P) -> AcoResult<()> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);

        for stat in self.compute_statistics() {
            writer.serialize(stat)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Generate summary report
    pub fn generate_report(&self) -> String {
        let mut report = String::new();

        report.push_str("========================================\n");
        report.push_str("      Station Tour Benchmark Report\n");
        report.push_str("========================================\n");
        report.push_str(&format!("Generated: {}\n\n", chrono::Local::now().format("%Y-%m-%d %H:%M:%S")));

        report.push_str("Algorithm Performance Summary:\n");
        report.push_str("-".repeat(80).as_str());
        report.push('\n');
        report.push_str(&format!("{:<28} {:>8} {:>12} {:>12} {:>10} {:>10}\n",
            "Algorithm", "Runs", "Avg Cost", "Best Cost", "Std Dev", "Avg Time"));
        report.push_str("-".repeat(80).as_str());
        report.push('\n');

        for stat in self.compute_statistics() {
            report.push_str(&format!("{:<28} {:>8} {:>12.2} {:>12.2} {:>10.2} {:>10.4}\n",
                stat.algorithm,
                stat.num_runs,
                stat.avg_cost,
                stat.best_cost,
                stat.std_cost,
                stat.avg_time));
        }

        report.push_str("-".repeat(80).as_str());
        report.push('\n');

        report
    }

    /// Get all results
    pub fn results(&self) -> &[AlgorithmResult] {
        &self.results
    }
}

/// Write a run's per-generation history as CSV
pub fn export_history_csv<P: AsRef<Path>>(history: &[GenerationReport], path: P) -> AcoResult<()> {
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);

    for report in history {
        writer.serialize(report)?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MatrixProvider;

    fn provider() -> MatrixProvider {
        MatrixProvider::from_costs(vec![
            vec![0.0, 10.0, 15.0, 20.0, 25.0],
            vec![10.0, 0.0, 35.0, 25.0, 30.0],
            vec![15.0, 35.0, 0.0, 30.0, 20.0],
            vec![20.0, 25.0, 30.0, 0.0, 40.0],
            vec![25.0, 30.0, 20.0, 40.0, 0.0],
        ]).unwrap()
    }

    fn small_config() -> BenchmarkConfig {
        BenchmarkConfig {
            num_runs: 3,
            aco: AcoConfig { max_iterations: 30, ..Default::default() },
            parallel: true,
        }
    }

    #[test]
    fn test_benchmark_config() {
        let config = BenchmarkConfig::default();
        assert_eq!(config.num_runs, 5);
    }

    #[test]
    fn test_full_benchmark() {
        let provider = provider();
        let mut benchmark = Benchmark::new(small_config());
        benchmark.run_full_benchmark("five", &provider).unwrap();

        // two baselines + three seeds
        assert_eq!(benchmark.results().len(), 5);
        assert!(benchmark.results().iter().all(|r| r.gap_to_best.map_or(false, |g| g >= 0.0)));

        let stats = benchmark.compute_statistics();
        let aco = stats.iter().find(|s| s.algorithm == "ACO").unwrap();
        assert_eq!(aco.num_runs, 3);
        assert!(aco.best_cost <= aco.avg_cost && aco.avg_cost <= aco.worst_cost);

        let nn = stats.iter().find(|s| s.algorithm == "NearestNeighbor").unwrap();
        assert_eq!(nn.std_cost, 0.0);
        assert_eq!(nn.best_cost, 85.0);
    }

    #[test]
    fn test_parallel_benchmark_is_deterministic() {
        let provider = provider();
        let mut parallel = Benchmark::new(small_config());
        let mut sequential = Benchmark::new(BenchmarkConfig { parallel: false, ..small_config() });
        parallel.run_aco("five", &provider).unwrap();
        sequential.run_aco("five", &provider).unwrap();

        let a: Vec<f64> = parallel.results().iter().map(|r| r.cost).collect();
        let b: Vec<f64> = sequential.results().iter().map(|r| r.cost).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_report_lists_algorithms() {
        let provider = provider();
        let mut benchmark = Benchmark::new(small_config());
        benchmark.set_best_known("five", 70.0);
        benchmark.run_full_benchmark("five", &provider).unwrap();

        let report = benchmark.generate_report();
        assert!(report.contains("MultiStartNearestNeighbor"));
        assert!(report.contains("ACO"));

        let multi = benchmark.results().iter().find(|r| r.algorithm == "MultiStartNearestNeighbor").unwrap();
        assert_eq!(multi.gap_to_best, Some(0.0));
    }

    #[test]
    fn test_history_export() {
        let history = vec![
            GenerationReport { generation: 1, iteration_best_cost: 80.0, best_cost: 80.0, improved: true },
            GenerationReport { generation: 2, iteration_best_cost: 85.0, best_cost: 80.0, improved: false },
        ];
        let path = std::env::temp_dir().join(format!("aco-history-{}.csv", std::process::id()));
        export_history_csv(&history, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("generation,iteration_best_cost,best_cost,improved"));
        assert_eq!(lines.count(), 2);
    }
}
