//! Property-based coverage for the universal invariants that must hold
//! after every sequence of updates, not just a single literal scenario.

use proptest::prelude::*;

use convergence_core::{
    Coordinator, CoordinatorConfig, FitnessRecord, GenerationMetrics, PlateauConfig,
};

fn fitness_metrics(generation: u64, best_fitness: f64) -> GenerationMetrics {
    GenerationMetrics {
        fitness_record: Some(FitnessRecord {
            generation,
            best_fitness,
            mean_fitness: best_fitness,
            median_fitness: best_fitness,
            std_dev: 0.0,
        }),
        generation: Some(generation),
        ..GenerationMetrics::default()
    }
}

proptest! {
    /// The generation counter strictly increases after every update,
    /// regardless of the fitness values fed in.
    #[test]
    fn generation_counter_monotonic(values in prop::collection::vec(0.0f64..2.0, 1..60)) {
        let mut coordinator = Coordinator::new(CoordinatorConfig::default()).unwrap();
        let mut previous = coordinator.current_generation();
        for (i, value) in values.into_iter().enumerate() {
            coordinator.update(fitness_metrics(i as u64 + 1, value)).unwrap();
            prop_assert!(coordinator.current_generation() > previous);
            previous = coordinator.current_generation();
        }
    }

    /// History never exceeds its configured cap, no matter how many
    /// updates are applied.
    #[test]
    fn history_stays_bounded(values in prop::collection::vec(0.0f64..2.0, 1..400), max_history in 1usize..20) {
        let config = CoordinatorConfig {
            plateau: PlateauConfig {
                max_history,
                ..PlateauConfig::default()
            },
            ..CoordinatorConfig::default()
        };
        let mut coordinator = Coordinator::new(config).unwrap();
        for (i, value) in values.into_iter().enumerate() {
            coordinator.update(fitness_metrics(i as u64 + 1, value)).unwrap();
            prop_assert!(coordinator.plateau_history_len() <= max_history);
        }
    }

    /// Once a plateau triggers, it stays triggered until reset, even if
    /// improving records are added afterward.
    #[test]
    fn plateau_trigger_is_sticky(extra_improving in prop::collection::vec(1.0f64..5.0, 0..10)) {
        let config = CoordinatorConfig {
            plateau: PlateauConfig {
                window_size: 2,
                patience: 2,
                ..PlateauConfig::default()
            },
            ..CoordinatorConfig::default()
        };
        let mut coordinator = Coordinator::new(config).unwrap();
        for g in 1..=8u64 {
            coordinator.update(fitness_metrics(g, 0.5)).unwrap();
        }
        prop_assert!(coordinator.get_status().plateau_triggered);

        let mut next_gen = 9u64;
        for bump in extra_improving {
            coordinator.update(fitness_metrics(next_gen, 0.5 + bump)).unwrap();
            next_gen += 1;
            prop_assert!(
                coordinator.get_status().plateau_triggered,
                "plateau must not un-trigger without an explicit reset"
            );
        }
    }

    /// reset is idempotent: resetting twice is the same as resetting once.
    #[test]
    fn reset_is_idempotent(values in prop::collection::vec(0.0f64..2.0, 1..30)) {
        let mut coordinator = Coordinator::new(CoordinatorConfig::default()).unwrap();
        for (i, value) in values.into_iter().enumerate() {
            coordinator.update(fitness_metrics(i as u64 + 1, value)).unwrap();
        }
        coordinator.reset();
        let once = coordinator.get_status();
        coordinator.reset();
        let twice = coordinator.get_status();
        prop_assert_eq!(once, twice);
        prop_assert_eq!(coordinator.current_generation(), 0);
    }
}
