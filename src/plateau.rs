//! Plateau detection over a best-fitness history: compares a recent window
//! against a baseline window and dampens the result with patience.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::history::History;
use crate::record::FitnessRecord;

/// Tunable thresholds for the plateau detector. See field docs for defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlateauConfig {
    /// Size of both the recent and baseline comparison windows.
    pub window_size: usize,
    /// Consecutive non-improving generations required before triggering.
    pub patience: usize,
    /// Relative improvement threshold (fraction of baseline mean).
    pub improvement_threshold: f64,
    /// Absolute improvement threshold, used regardless of baseline scale.
    pub absolute_threshold: f64,
    /// Cap on retained fitness history.
    pub max_history: usize,
}

impl Default for PlateauConfig {
    fn default() -> Self {
        Self {
            window_size: 5,
            patience: 5,
            improvement_threshold: 0.01,
            absolute_threshold: 0.001,
            max_history: 100,
        }
    }
}

impl PlateauConfig {
    fn validate(&self) -> Result<()> {
        if self.window_size == 0 {
            return Err(Error::InvalidConfig("plateau window_size must be positive"));
        }
        if self.patience == 0 {
            return Err(Error::InvalidConfig("plateau patience must be positive"));
        }
        Ok(())
    }
}

/// Detects when best-fitness improvement over a recent window has stalled
/// relative to an earlier baseline window, held for `patience` generations.
#[derive(Debug, Clone)]
pub struct PlateauDetector {
    config: PlateauConfig,
    history: History<FitnessRecord>,
    patience_counter: usize,
    plateau_detected: bool,
}

impl PlateauDetector {
    /// # Errors
    /// Returns `Error::InvalidConfig` if `window_size` or `patience` is zero.
    pub fn new(config: PlateauConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            history: History::new(config.max_history),
            config,
            patience_counter: 0,
            plateau_detected: false,
        })
    }

    /// Insert a new fitness record and re-evaluate plateau status.
    ///
    /// # Errors
    /// Returns `Error::NonFiniteValue` if `best_fitness` is NaN or infinite.
    pub fn update(&mut self, record: FitnessRecord) -> Result<()> {
        if !record.best_fitness.is_finite() {
            return Err(Error::NonFiniteValue {
                field: "best_fitness",
                value: record.best_fitness,
            });
        }
        self.history.push_front(record);
        self.recompute();
        Ok(())
    }

    fn recompute(&mut self) {
        let window = self.config.window_size;
        if self.history.len() < 2 * window {
            // Insufficient evidence: leave the patience counter untouched.
            self.plateau_detected = false;
            return;
        }

        let recent_mean = mean_best_fitness(&self.history, 0, window);
        let baseline_mean = mean_best_fitness(&self.history, window, 2 * window);

        let absolute_improvement = recent_mean - baseline_mean;
        let relative_improvement = if baseline_mean > 0.0 {
            absolute_improvement / baseline_mean
        } else {
            0.0
        };

        let is_improving = absolute_improvement > self.config.absolute_threshold
            || relative_improvement > self.config.improvement_threshold;

        if is_improving {
            self.patience_counter = 0;
        } else {
            self.patience_counter += 1;
        }

        self.plateau_detected = self.patience_counter >= self.config.patience;
    }

    #[must_use]
    pub fn plateau_detected(&self) -> bool {
        self.plateau_detected
    }

    #[must_use]
    pub fn patience_count(&self) -> usize {
        self.patience_counter
    }

    #[must_use]
    pub fn config(&self) -> &PlateauConfig {
        &self.config
    }

    #[must_use]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn reset(&mut self) {
        self.history.clear();
        self.patience_counter = 0;
        self.plateau_detected = false;
    }
}

fn mean_best_fitness(history: &History<FitnessRecord>, start: usize, end: usize) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for i in start..end {
        if let Some(record) = history.get(i) {
            sum += record.best_fitness;
            count += 1;
        }
    }
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}
