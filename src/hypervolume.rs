//! Hypervolume (Pareto-frontier volume) saturation tracking: a disjunction
//! over three improvement measures, dampened with patience.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::history::History;
use crate::record::HypervolumeRecord;

/// Tunable thresholds for the hypervolume tracker. See field docs for
/// defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HypervolumeConfig {
    pub absolute_threshold: f64,
    pub relative_threshold: f64,
    pub average_threshold: f64,
    /// Number of recent improvements averaged for the windowed-rate test.
    pub window_size: usize,
    /// Consecutive non-improving generations required before triggering.
    pub patience: usize,
    /// Cap on retained hypervolume history.
    pub max_history: usize,
}

impl Default for HypervolumeConfig {
    fn default() -> Self {
        Self {
            absolute_threshold: 0.001,
            relative_threshold: 0.01,
            average_threshold: 0.005,
            window_size: 5,
            patience: 5,
            max_history: 100,
        }
    }
}

impl HypervolumeConfig {
    fn validate(&self) -> Result<()> {
        if self.window_size == 0 {
            return Err(Error::InvalidConfig(
                "hypervolume window_size must be positive",
            ));
        }
        if self.patience == 0 {
            return Err(Error::InvalidConfig(
                "hypervolume patience must be positive",
            ));
        }
        Ok(())
    }
}

/// Tracks Pareto-frontier hypervolume growth and detects saturation.
#[derive(Debug, Clone)]
pub struct HypervolumeTracker {
    config: HypervolumeConfig,
    history: History<HypervolumeRecord>,
    patience_counter: usize,
    saturated: bool,
}

impl HypervolumeTracker {
    /// # Errors
    /// Returns `Error::InvalidConfig` if `window_size` or `patience` is zero.
    pub fn new(config: HypervolumeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            history: History::new(config.max_history),
            config,
            patience_counter: 0,
            saturated: false,
        })
    }

    /// Insert a new hypervolume reading, auto-incrementing the generation
    /// from the previous record (starting at 1) when `generation` is
    /// `None`.
    ///
    /// # Errors
    /// - `Error::NonFiniteValue` if `hypervolume` is NaN or infinite.
    /// - `Error::NegativeHypervolume` if `hypervolume` is negative.
    /// - `Error::GenerationRegressed` if an explicit `generation` is not
    ///   strictly greater than the previous record's generation.
    pub fn update(&mut self, hypervolume: f64, generation: Option<u64>) -> Result<()> {
        if !hypervolume.is_finite() {
            return Err(Error::NonFiniteValue {
                field: "hypervolume",
                value: hypervolume,
            });
        }
        if hypervolume < 0.0 {
            return Err(Error::NegativeHypervolume(hypervolume));
        }

        let previous_generation = self.history.front().map(|r| r.generation);
        let next_generation = match generation {
            Some(g) => {
                if let Some(previous) = previous_generation {
                    if g <= previous {
                        return Err(Error::GenerationRegressed {
                            previous,
                            received: g,
                        });
                    }
                }
                g
            }
            None => previous_generation.map_or(1, |g| g + 1),
        };

        self.history.push_front(HypervolumeRecord {
            generation: next_generation,
            hypervolume,
            absolute_improvement: None,
            relative_improvement: None,
        });

        if self.history.len() < 2 {
            self.saturated = false;
            return Ok(());
        }

        let previous_hv = self.history.get(1).map(|r| r.hypervolume).unwrap_or(0.0);
        let absolute_improvement = hypervolume - previous_hv;
        let relative_improvement = if previous_hv > 0.0 {
            absolute_improvement / previous_hv
        } else {
            0.0
        };

        if let Some(head) = self.history.front_mut() {
            head.absolute_improvement = Some(absolute_improvement);
            head.relative_improvement = Some(relative_improvement);
        }

        let avg_rate = self.average_improvement_rate();
        let is_improving = absolute_improvement > self.config.absolute_threshold
            || relative_improvement > self.config.relative_threshold
            || avg_rate > self.config.average_threshold;

        if is_improving {
            self.patience_counter = 0;
        } else {
            self.patience_counter += 1;
        }
        self.saturated = self.patience_counter >= self.config.patience;

        Ok(())
    }

    /// Arithmetic mean of `absolute_improvement` over the most recent
    /// `min(window_size, len(history))` records, ignoring any still absent
    /// (the oldest record never has one). `0` if history has fewer than 2
    /// records or no improvements are present in the window.
    #[must_use]
    pub fn average_improvement_rate(&self) -> f64 {
        if self.history.len() < 2 {
            return 0.0;
        }
        let window = self.config.window_size.min(self.history.len());
        let improvements: Vec<f64> = (0..window)
            .filter_map(|i| self.history.get(i).and_then(|r| r.absolute_improvement))
            .collect();
        if improvements.is_empty() {
            0.0
        } else {
            improvements.iter().sum::<f64>() / improvements.len() as f64
        }
    }

    #[must_use]
    pub fn saturated(&self) -> bool {
        self.saturated
    }

    #[must_use]
    pub fn patience_count(&self) -> usize {
        self.patience_counter
    }

    #[must_use]
    pub fn current_hypervolume(&self) -> Option<f64> {
        self.history.front().map(|r| r.hypervolume)
    }

    #[must_use]
    pub fn recent_improvement(&self) -> Option<f64> {
        self.history.front().and_then(|r| r.absolute_improvement)
    }

    #[must_use]
    pub fn config(&self) -> &HypervolumeConfig {
        &self.config
    }

    #[must_use]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn reset(&mut self) {
        self.history.clear();
        self.patience_counter = 0;
        self.saturated = false;
    }
}
