//! evonet - CLI entry point
//!
//! Evolves a population of bit-encoded classifiers against an evaluation
//! set and reports the fitness history.

use clap::{Parser, Subcommand};
use evonet::{report, AccuracyEvaluator, Config, Dataset, Population};
use rand::Rng;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "evonet")]
#[command(version)]
#[command(about = "Genetic evolution of bit-encoded feedforward classifiers")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an evolution
    Run {
        /// Configuration file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Number of generations (overrides the config)
        #[arg(short, long)]
        generations: Option<u64>,

        /// IDX image file for the evaluation set (MNIST format)
        #[arg(long, requires = "labels")]
        images: Option<PathBuf>,

        /// IDX label file for the evaluation set
        #[arg(long, requires = "images")]
        labels: Option<PathBuf>,

        /// Examples to generate when no IDX files are given
        #[arg(long, default_value = "512")]
        synthetic_examples: usize,

        /// Write the fitness history to this CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,

        /// Quiet mode (minimal output)
        #[arg(short, long)]
        quiet: bool,
    },

    /// Generate default configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "config.yaml")]
        output: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            generations,
            images,
            labels,
            synthetic_examples,
            output,
            seed,
            quiet,
        } => run_evolution(
            config,
            generations,
            images,
            labels,
            synthetic_examples,
            output,
            seed,
            quiet,
        ),

        Commands::Init { output } => generate_config(output),
    }
}

#[allow(clippy::too_many_arguments)]
fn run_evolution(
    config_path: PathBuf,
    generations_override: Option<u64>,
    images: Option<PathBuf>,
    labels: Option<PathBuf>,
    synthetic_examples: usize,
    output: Option<PathBuf>,
    seed: Option<u64>,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = if config_path.exists() {
        println!("Loading config from: {:?}", config_path);
        Config::from_file(&config_path)?
    } else {
        println!("Using default configuration");
        Config::default()
    };
    if let Some(g) = generations_override {
        config.evolution.generations = g;
    }
    config.validate()?;

    let seed = seed.unwrap_or_else(|| rand::thread_rng().gen());
    println!("Using seed: {}", seed);

    let t_load = Instant::now();
    let dataset = match (images, labels) {
        (Some(images), Some(labels)) => {
            println!("Loading IDX dataset from {:?}", images);
            Dataset::from_idx_files(&images, &labels, config.topology.n_classes)?
        }
        _ => {
            println!("Generating synthetic dataset ({} examples)", synthetic_examples);
            Dataset::synthetic(
                synthetic_examples,
                config.topology.input_dim,
                config.topology.n_classes,
                seed,
            )?
        }
    };
    log::info!(
        "Dataset ready: {} examples, {} features, {} classes ({:.3}s)",
        dataset.len(),
        dataset.feature_dim(),
        dataset.n_classes(),
        t_load.elapsed().as_secs_f64()
    );

    let evaluator = AccuracyEvaluator::new(dataset, config.evolution.sample_fraction)?;

    println!("Starting evolution");
    println!("  Population: {}", config.evolution.population_size);
    println!("  Survivors: {}", config.evolution.n_survivors);
    println!("  Generations: {}", config.evolution.generations);
    println!();

    let t_run = Instant::now();
    let mut population = Population::new(&config, evaluator, seed)?;
    print_generation(&mut population, quiet, t_run.elapsed().as_secs_f64());

    for _ in 1..config.evolution.generations {
        let t_gen = Instant::now();
        population.breed()?;
        print_generation(&mut population, quiet, t_gen.elapsed().as_secs_f64());
    }

    println!();
    println!("=== Evolution complete ===");
    println!("Time: {:.2}s", t_run.elapsed().as_secs_f64());
    println!("Generations: {}", population.generation() + 1);
    println!("Best fitness: {:.4}", population.max_fitness());
    println!();
    println!("{}", report::render(population.history()));

    if let Some(path) = output {
        report::write_csv(&path, population.history())?;
        println!("History written to {:?}", path);
    }

    Ok(())
}

fn print_generation(
    population: &mut Population<AccuracyEvaluator>,
    quiet: bool,
    elapsed: f64,
) {
    if quiet {
        return;
    }
    let generation = population.generation();
    let max = population.max_fitness();
    let avg = population.average_fitness();
    // the full fitness vector is only readable for small populations
    if population.organisms.len() <= 16 {
        let fitness: Vec<String> = population
            .organism_fitness()
            .iter()
            .map(|f| format!("{:.3}", f))
            .collect();
        println!(
            "Gen {:4}: [{}] - max: {:.4}, avg: {:.4} ({:.3}s)",
            generation,
            fitness.join(", "),
            max,
            avg,
            elapsed
        );
    } else {
        println!(
            "Gen {:4}: max: {:.4}, avg: {:.4} ({:.3}s)",
            generation, max, avg, elapsed
        );
    }
}

fn generate_config(output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    config.save(&output)?;
    println!("Default configuration written to {:?}", output);
    Ok(())
}
