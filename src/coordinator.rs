//! Fans out per-generation metrics to the four sub-detectors, aggregates
//! their verdicts under disjunctive semantics with a fixed reason priority,
//! and synthesizes early warnings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::budget::{BudgetConfig, BudgetManager, Resource};
use crate::diversity::{DiversityConfig, DiversityMetricsInput, DiversityMonitor};
use crate::error::Result;
use crate::hypervolume::{HypervolumeConfig, HypervolumeTracker};
use crate::plateau::{PlateauConfig, PlateauDetector};
use crate::record::FitnessRecord;
use crate::status::{Reason, Status, StatusLevel};

/// A hypervolume reading for one generation, with an optional explicit
/// generation number (see `HypervolumeTracker::update`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HypervolumeInput {
    pub hypervolume: f64,
    pub generation: Option<u64>,
}

/// The per-generation input map the coordinator's `update` accepts. Any
/// subset of the four fields may be present; absent fields leave the
/// matching sub-detector unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationMetrics {
    pub fitness_record: Option<FitnessRecord>,
    pub diversity_metrics: Option<DiversityMetricsInput>,
    pub hypervolume: Option<HypervolumeInput>,
    pub consumption: Option<BTreeMap<Resource, u64>>,
    pub generation: Option<u64>,
}

/// Aggregate configuration for the coordinator and its four sub-detectors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct CoordinatorConfig {
    pub plateau: PlateauConfig,
    pub diversity: DiversityConfig,
    pub hypervolume: HypervolumeConfig,
    pub budget: BudgetConfig,
}

/// Owns one instance of each detector and the monotonic generation counter.
pub struct Coordinator {
    config: CoordinatorConfig,
    plateau: PlateauDetector,
    diversity: DiversityMonitor,
    hypervolume: HypervolumeTracker,
    budget: BudgetManager,
    current_generation: u64,
}

impl Coordinator {
    /// # Errors
    /// Returns an error if any sub-detector's configuration is invalid
    /// (see `PlateauConfig`, `DiversityConfig`, `HypervolumeConfig`).
    pub fn new(config: CoordinatorConfig) -> Result<Self> {
        Ok(Self {
            plateau: PlateauDetector::new(config.plateau)?,
            diversity: DiversityMonitor::new(config.diversity)?,
            hypervolume: HypervolumeTracker::new(config.hypervolume)?,
            budget: BudgetManager::new(config.budget),
            current_generation: 0,
            config,
        })
    }

    #[must_use]
    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    #[must_use]
    pub fn current_generation(&self) -> u64 {
        self.current_generation
    }

    #[must_use]
    pub fn plateau_history_len(&self) -> usize {
        self.plateau.history_len()
    }

    /// Forward each present field to its matching sub-detector, then
    /// advance `current_generation` by at least 1 (more, if `metrics`
    /// carries a larger explicit generation).
    ///
    /// # Errors
    /// Propagates the first domain error raised by a forwarded sub-update.
    /// Sub-detectors reached earlier in the same call remain updated; the
    /// coordinator does not roll back partial application, since detector
    /// state is not transactional.
    pub fn update(&mut self, metrics: GenerationMetrics) -> Result<()> {
        debug!(
            generation = self.current_generation,
            has_fitness = metrics.fitness_record.is_some(),
            has_diversity = metrics.diversity_metrics.is_some(),
            has_hypervolume = metrics.hypervolume.is_some(),
            has_consumption = metrics.consumption.is_some(),
            "coordinator update"
        );

        let was_plateau = self.plateau.plateau_detected();
        let was_diversity = self.diversity.diversity_collapsed();
        let was_hypervolume = self.hypervolume.saturated();
        let was_budget = self.budget.budget_exhausted();

        if let Some(fitness_record) = metrics.fitness_record {
            if let Err(err) = self.plateau.update(fitness_record) {
                warn!(error = %err, "plateau detector rejected input");
                return Err(err);
            }
        }
        if let Some(diversity_metrics) = metrics.diversity_metrics {
            if let Err(err) = self.diversity.update(diversity_metrics) {
                warn!(error = %err, "diversity monitor rejected input");
                return Err(err);
            }
        }
        if let Some(hv) = metrics.hypervolume {
            if let Err(err) = self.hypervolume.update(hv.hypervolume, hv.generation) {
                warn!(error = %err, "hypervolume tracker rejected input");
                return Err(err);
            }
        }
        if let Some(consumption) = &metrics.consumption {
            self.budget.record_consumption(consumption);
        }

        self.current_generation = (self.current_generation + 1)
            .max(metrics.generation.unwrap_or(self.current_generation + 1));

        if !was_plateau && self.plateau.plateau_detected() {
            info!(generation = self.current_generation, "fitness plateau triggered");
        }
        if !was_diversity && self.diversity.diversity_collapsed() {
            info!(generation = self.current_generation, "diversity collapse triggered");
        }
        if !was_hypervolume && self.hypervolume.saturated() {
            info!(generation = self.current_generation, "hypervolume saturation triggered");
        }
        if !was_budget && self.budget.budget_exhausted() {
            info!(generation = self.current_generation, "budget exhausted");
        }

        Ok(())
    }

    /// Snapshot the current convergence verdict and diagnostics.
    #[must_use]
    pub fn get_status(&self) -> Status {
        let plateau_triggered = self.plateau.plateau_detected();
        let diversity_triggered = self.diversity.diversity_collapsed();
        let hypervolume_triggered = self.hypervolume.saturated();
        let budget_triggered = self.budget.budget_exhausted();

        let converged =
            plateau_triggered || diversity_triggered || hypervolume_triggered || budget_triggered;

        let reason = if budget_triggered {
            Reason::BudgetExhausted
        } else if plateau_triggered {
            Reason::FitnessPlateau
        } else if diversity_triggered {
            Reason::DiversityCollapse
        } else if hypervolume_triggered {
            Reason::HypervolumeSaturation
        } else {
            Reason::None
        };

        let mut warnings = Vec::new();
        if self.diversity.in_warning_zone() {
            warnings.push("Diversity below warning threshold".to_string());
        }
        if !plateau_triggered && approaching(self.plateau.patience_count(), self.config.plateau.patience) {
            warnings.push(format!(
                "Approaching fitness plateau ({}/{})",
                self.plateau.patience_count(),
                self.config.plateau.patience
            ));
        }
        if !hypervolume_triggered
            && approaching(self.hypervolume.patience_count(), self.config.hypervolume.patience)
        {
            warnings.push(format!(
                "Approaching hypervolume saturation ({}/{})",
                self.hypervolume.patience_count(),
                self.config.hypervolume.patience
            ));
        }
        if let crate::budget::BudgetRemaining::Limited(remaining) = self.budget.remaining_evaluations() {
            if let Some(max) = self.config.budget.max_evaluations {
                if max > 0 {
                    let consumed_fraction = 1.0 - (remaining as f64 / max as f64);
                    if consumed_fraction >= 0.8 {
                        warnings.push(format!(
                            "Budget 80% consumed ({remaining} evaluations remaining)"
                        ));
                    }
                }
            }
        }
        warnings.reverse();

        let status_level = if converged {
            StatusLevel::Converged
        } else if warnings.is_empty() {
            StatusLevel::Running
        } else {
            StatusLevel::Warning
        };

        let metadata = Status::metadata_entries(
            self.current_generation,
            self.plateau.patience_count(),
            self.diversity.trend(),
        );

        Status {
            converged,
            status_level,
            reason,
            should_stop: converged,
            warnings,
            plateau_triggered,
            diversity_triggered,
            hypervolume_triggered,
            budget_triggered,
            plateau_generations: self.plateau.patience_count(),
            diversity_score: self.diversity.current_diversity(),
            hypervolume_improvement: self.hypervolume.recent_improvement(),
            budget_remaining: self.budget.remaining_evaluations(),
            metadata,
        }
    }

    #[must_use]
    pub fn converged(&self) -> bool {
        self.get_status().converged
    }

    pub fn reset(&mut self) {
        self.plateau.reset();
        self.diversity.reset();
        self.hypervolume.reset();
        self.budget.reset();
        self.current_generation = 0;
    }
}

/// True once a patience counter has crossed halfway to its limit, without
/// yet triggering.
fn approaching(counter: usize, patience: usize) -> bool {
    counter > 0 && (counter as f64 / patience as f64) >= 0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fitness(generation: u64, best_fitness: f64) -> GenerationMetrics {
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

    #[test]
    fn generation_counter_is_monotonic() {
        let mut coordinator = Coordinator::new(CoordinatorConfig::default()).unwrap();
        let mut previous = coordinator.current_generation();
        for g in 1..=5 {
            coordinator.update(fitness(g, 0.5)).unwrap();
            assert!(coordinator.current_generation() > previous);
            previous = coordinator.current_generation();
        }
    }

    #[test]
    fn generation_counter_jumps_forward_on_explicit_generation() {
        let mut coordinator = Coordinator::new(CoordinatorConfig::default()).unwrap();
        coordinator.update(fitness(1, 0.5)).unwrap();
        coordinator.update(fitness(50, 0.5)).unwrap();
        assert_eq!(coordinator.current_generation(), 50);
    }

    #[test]
    fn reset_restores_running_state() {
        let config = CoordinatorConfig {
            plateau: PlateauConfig {
                window_size: 2,
                patience: 2,
                ..PlateauConfig::default()
            },
            ..CoordinatorConfig::default()
        };
        let mut coordinator = Coordinator::new(config).unwrap();
        for g in 1..=8 {
            coordinator.update(fitness(g, 0.5)).unwrap();
        }
        assert!(coordinator.converged());

        coordinator.reset();
        assert_eq!(coordinator.current_generation(), 0);
        let status = coordinator.get_status();
        assert!(!status.converged);
        assert_eq!(status.status_level, StatusLevel::Running);
    }

    #[test]
    fn reason_none_iff_not_converged() {
        let coordinator = Coordinator::new(CoordinatorConfig::default()).unwrap();
        let status = coordinator.get_status();
        assert!(!status.converged);
        assert_eq!(status.reason, Reason::None);
    }

    #[test]
    fn update_propagates_rejected_domain_error() {
        let mut coordinator = Coordinator::new(CoordinatorConfig::default()).unwrap();
        let metrics = fitness(1, f64::NAN);
        assert!(coordinator.update(metrics).is_err());
    }
}
