//! Integration tests for evonet

use evonet::{AccuracyEvaluator, Config, Dataset, Population};

fn small_config() -> Config {
    let mut config = Config::default();
    config.topology.input_dim = 12;
    config.topology.hidden = vec![8];
    config.topology.n_classes = 3;
    config.evolution.generations = 8;
    config.evolution.population_size = 6;
    config.evolution.n_survivors = 3;
    config.evolution.sample_fraction = 1.0;
    config
}

fn build_population(config: &Config, seed: u64) -> Population<AccuracyEvaluator> {
    let dataset = Dataset::synthetic(
        60,
        config.topology.input_dim,
        config.topology.n_classes,
        seed,
    )
    .expect("synthetic dataset");
    let evaluator = AccuracyEvaluator::new(dataset, config.evolution.sample_fraction)
        .expect("evaluator");
    Population::new(config, evaluator, seed).expect("population")
}

#[test]
fn test_full_evolution_cycle() {
    let config = small_config();
    let mut population = build_population(&config, 12345);

    for _ in 1..config.evolution.generations {
        population.breed().expect("breed");
    }

    // one history entry per generation, generation 0 included
    assert_eq!(
        population.generation(),
        config.evolution.generations - 1
    );
    assert_eq!(
        population.history().len(),
        config.evolution.generations as usize
    );

    // population size restored every generation
    assert_eq!(population.organisms.len(), config.evolution.population_size);

    // fitness values are probabilities, and max dominates avg
    for stats in population.history() {
        assert!((0.0..=1.0).contains(&stats.max_fitness));
        assert!((0.0..=1.0).contains(&stats.avg_fitness));
        assert!(stats.max_fitness >= stats.avg_fitness);
    }

    // every organism still has the configured topology
    let reference = &population.organisms[0];
    for organism in &population.organisms {
        assert!(organism.topology_matches(reference));
        assert_eq!(organism.input_dim(), 12);
        assert_eq!(organism.output_dim(), 3);
    }
}

#[test]
fn test_seeded_runs_match() {
    let config = small_config();
    let mut a = build_population(&config, 777);
    let mut b = build_population(&config, 777);

    for _ in 0..5 {
        a.breed().expect("breed a");
        b.breed().expect("breed b");
    }

    assert_eq!(a.history(), b.history());
    assert_eq!(a.organisms, b.organisms);
}

#[test]
fn test_different_seeds_diverge() {
    let config = small_config();
    let mut a = build_population(&config, 1);
    let mut b = build_population(&config, 2);

    for _ in 0..3 {
        a.breed().expect("breed a");
        b.breed().expect("breed b");
    }

    // same topology, different genomes
    assert_ne!(a.organisms, b.organisms);
}

#[test]
fn test_elite_never_regresses_with_full_sampling() {
    // With sample_fraction = 1 fitness is exact, so carrying the elite
    // forward unchanged keeps the per-generation maximum monotone.
    let config = small_config();
    let mut population = build_population(&config, 9);

    let mut previous = population.max_fitness();
    for _ in 0..6 {
        population.breed().expect("breed");
        let current = population.max_fitness();
        assert!(current >= previous - 1e-6);
        previous = current;
    }
}

#[test]
fn test_dataset_topology_mismatch_errors_at_construction() {
    // A valid dataset and a valid config that disagree on the feature
    // dimension must fail with a configuration error, not blow up inside
    // the generation-0 evaluation.
    let config = small_config(); // 12 inputs, 3 classes
    let dataset = Dataset::synthetic(20, 8, 3, 7).expect("synthetic dataset");
    let evaluator = AccuracyEvaluator::new(dataset, 1.0).expect("evaluator");
    let result = Population::new(&config, evaluator, 7);
    assert!(matches!(
        result,
        Err(evonet::EvolutionError::Configuration(_))
    ));

    // same for a class-count disagreement
    let dataset = Dataset::synthetic(20, 12, 4, 7).expect("synthetic dataset");
    let evaluator = AccuracyEvaluator::new(dataset, 1.0).expect("evaluator");
    assert!(matches!(
        Population::new(&config, evaluator, 7),
        Err(evonet::EvolutionError::Configuration(_))
    ));
}

#[test]
fn test_history_csv_export() {
    let config = small_config();
    let mut population = build_population(&config, 31);
    for _ in 0..3 {
        population.breed().expect("breed");
    }

    let path = std::env::temp_dir().join("evonet_integration_history.csv");
    evonet::report::write_csv(&path, population.history()).expect("csv");

    let contents = std::fs::read_to_string(&path).expect("read csv");
    // header + 4 generations
    assert_eq!(contents.lines().count(), 5);
}
