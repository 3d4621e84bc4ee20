//! Station Tour ACO Solver - Command Line Interface
//!
//! Finds a cheap open path through a set of stations with Ant Colony Optimization.

use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use station_aco_solver::benchmark::{export_history_csv, Benchmark, BenchmarkConfig};
use station_aco_solver::error::{AcoError, AcoResult};
use station_aco_solver::heuristics::aco::{AcoConfig, AntColonyOptimization};
use station_aco_solver::heuristics::construction::{ConstructionHeuristic, MultiStartNearestNeighbor};
use station_aco_solver::instance::{DistanceMatrix, InstanceStatistics, StationSet};
use station_aco_solver::provider::{EdgeProvider, HaversineProvider, MatrixProvider, DEFAULT_MAX_SLOPE};

use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "station-aco-solver")]
#[command(author = "M2 AI2D Student")]
#[command(version = "1.0")]
#[command(about = "Ant Colony Optimization for station tours")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Where the stations come from
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct InstanceArgs {
    /// JSON file with station coordinates and slopes
    #[arg(short, long)]
    stations: Option<PathBuf>,

    /// JSON file with a dense cost matrix
    #[arg(short, long)]
    matrix: Option<PathBuf>,
}

/// Colony settings; each flag overrides the configuration file
#[derive(Args, Debug)]
struct AcoArgs {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Ants per generation
    #[arg(long)]
    num_ants: Option<usize>,

    /// Number of generations
    #[arg(long)]
    max_iterations: Option<usize>,

    /// Pheromone importance
    #[arg(long)]
    alpha: Option<f64>,

    /// Heuristic importance
    #[arg(long)]
    beta: Option<f64>,

    /// Evaporation rate in [0, 1)
    #[arg(long)]
    evaporation_rate: Option<f64>,

    /// Floor added to edge costs before inversion
    #[arg(long)]
    epsilon: Option<f64>,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Build tours on all cores
    #[arg(long)]
    parallel: bool,

    /// Stop after this many generations without improvement
    #[arg(long)]
    max_no_improve: Option<usize>,

    /// Time limit in seconds
    #[arg(short, long)]
    time_limit: Option<f64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve an instance with the ant colony
    Solve {
        #[command(flatten)]
        instance: InstanceArgs,

        #[command(flatten)]
        aco: AcoArgs,

        /// Maximum slope for the geographic provider
        #[arg(long, default_value_t = DEFAULT_MAX_SLOPE)]
        max_slope: f64,

        /// Output solution to file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write per-generation progress to a CSV file
        #[arg(long)]
        history: Option<PathBuf>,

        /// Print every generation
        #[arg(short, long)]
        verbose: bool,
    },

    /// Compare the colony against nearest-neighbor baselines
    Compare {
        #[command(flatten)]
        instance: InstanceArgs,

        #[command(flatten)]
        aco: AcoArgs,

        /// Maximum slope for the geographic provider
        #[arg(long, default_value_t = DEFAULT_MAX_SLOPE)]
        max_slope: f64,

        /// Number of colony runs
        #[arg(short, long, default_value = "10")]
        runs: usize,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,
    },

    /// Analyze an instance
    Analyze {
        #[command(flatten)]
        instance: InstanceArgs,

        /// Maximum slope for the geographic provider
        #[arg(long, default_value_t = DEFAULT_MAX_SLOPE)]
        max_slope: f64,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Solve { instance, aco, max_slope, output, history, verbose } => {
            solve_instance(&instance, &aco, max_slope, output, history, verbose)
        }

        Commands::Compare { instance, aco, max_slope, runs, output } => {
            compare_algorithms(&instance, &aco, max_slope, runs, &output)
        }

        Commands::Analyze { instance, max_slope } => analyze_instance(&instance, max_slope),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn load_provider(args: &InstanceArgs, max_slope: f64) -> AcoResult<(String, Box<dyn EdgeProvider>)> {
    if let Some(path) = &args.stations {
        println!("Loading stations from {:?}...", path);
        let stations = StationSet::from_file(path)?;
        let name = stations.name.clone();
        return Ok((name, Box::new(HaversineProvider::new(stations, max_slope)?)));
    }

    if let Some(path) = &args.matrix {
        println!("Loading cost matrix from {:?}...", path);
        let matrix = DistanceMatrix::from_file(path)?;
        let name = matrix.name.clone();
        return Ok((name, Box::new(MatrixProvider::new(matrix))));
    }

    Err(AcoError::InvalidInstance("either --stations or --matrix is required".to_string()))
}

/// Defaults, then the configuration file, then command-line flags
fn build_config(args: &AcoArgs) -> AcoResult<AcoConfig> {
    let mut config = match &args.config {
        Some(path) => AcoConfig::from_file(path)?,
        None => AcoConfig::default(),
    };

    if let Some(v) = args.num_ants { config.num_ants = v; }
    if let Some(v) = args.max_iterations { config.max_iterations = v; }
    if let Some(v) = args.alpha { config.alpha = v; }
    if let Some(v) = args.beta { config.beta = v; }
    if let Some(v) = args.evaporation_rate { config.evaporation_rate = v; }
    if let Some(v) = args.epsilon { config.epsilon = v; }
    if let Some(v) = args.seed { config.seed = v; }
    if args.parallel { config.parallel = true; }
    if args.max_no_improve.is_some() { config.max_no_improve = args.max_no_improve; }
    if args.time_limit.is_some() { config.time_limit = args.time_limit; }

    config.validate()?;
    Ok(config)
}

fn solve_instance(
    instance: &InstanceArgs,
    aco_args: &AcoArgs,
    max_slope: f64,
    output: Option<PathBuf>,
    history: Option<PathBuf>,
    verbose: bool,
) -> AcoResult<()> {
    let config = build_config(aco_args)?;
    let (name, provider) = load_provider(instance, max_slope)?;

    if verbose {
        println!("{}", InstanceStatistics::collect(&name, provider.as_ref())?);
        println!("{:?}", config);
    }

    let progress = ProgressBar::new(config.max_iterations as u64);
    progress.set_style(
        ProgressStyle::with_template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut aco = AntColonyOptimization::new(provider.as_ref(), config)?;
    let solution = aco.run_with_observer(|report| {
        progress.set_message(format!("best {:.2}", report.best_cost));
        progress.inc(1);
        if verbose {
            progress.println(format!(
                "Generation {}: iteration best {:.2}, overall best {:.2}{}",
                report.generation,
                report.iteration_best_cost,
                report.best_cost,
                if report.improved { " (new overall best)" } else { "" }
            ));
        }
    })?;
    progress.finish_and_clear();

    println!("\n========== Results ==========");
    println!("Instance: {}", name);
    if solution.is_evaluated() {
        println!("Best path: {}", solution.path_string());
        println!("Best distance: {:.2}", solution.cost);
        println!("Feasible: {}", solution.feasible);
    } else {
        println!("No generation completed, no tour found");
    }
    println!("Time: {:.4}s", solution.computation_time);
    if let Some(iter) = solution.iterations {
        println!("Generations: {}", iter);
    }

    if let Some(out_path) = output.filter(|_| solution.is_evaluated()) {
        let json = serde_json::to_string_pretty(&solution)?;
        std::fs::write(&out_path, json)?;
        println!("\nSolution saved to {:?}", out_path);
    }

    if let Some(history_path) = history {
        export_history_csv(aco.history(), &history_path)?;
        println!("History saved to {:?}", history_path);
    }

    Ok(())
}

fn compare_algorithms(
    instance: &InstanceArgs,
    aco_args: &AcoArgs,
    max_slope: f64,
    runs: usize,
    output: &PathBuf,
) -> AcoResult<()> {
    let aco = build_config(aco_args)?;
    let (name, provider) = load_provider(instance, max_slope)?;

    std::fs::create_dir_all(output)?;

    let config = BenchmarkConfig {
        num_runs: runs,
        parallel: aco.parallel,
        aco: AcoConfig { parallel: false, ..aco },
    };

    let mut benchmark = Benchmark::new(config);
    benchmark.run_full_benchmark(&name, provider.as_ref())?;

    let results_path = output.join("results.csv");
    benchmark.export_to_csv(&results_path)?;
    println!("Results exported to {:?}", results_path);

    let stats_path = output.join("statistics.csv");
    benchmark.export_statistics_csv(&stats_path)?;
    println!("Statistics exported to {:?}", stats_path);

    let report = benchmark.generate_report();
    println!("\n{}", report);

    let report_path = output.join("report.txt");
    std::fs::write(&report_path, &report)?;
    println!("Report saved to {:?}", report_path);

    Ok(())
}

fn analyze_instance(instance: &InstanceArgs, max_slope: f64) -> AcoResult<()> {
    let (name, provider) = load_provider(instance, max_slope)?;

    println!("{}", InstanceStatistics::collect(&name, provider.as_ref())?);

    let baseline = MultiStartNearestNeighbor::new().construct(provider.as_ref())?;
    println!("Nearest-neighbor baseline: {:.2}", baseline.cost);
    println!("  Path: {}", baseline.path_string());

    Ok(())
}
