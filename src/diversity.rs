//! Population-diversity monitoring: collapse detection with patience, plus
//! a linear-regression trend estimate over a recent window.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::history::History;
use crate::record::{classify_level, DiversityLevel, DiversityRecord};

/// Tunable thresholds for the diversity monitor. See field docs for defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiversityConfig {
    /// Below this, a generation counts toward collapse patience.
    pub critical_threshold: f64,
    /// Below this (and at or above `critical_threshold`), warning zone.
    pub warning_threshold: f64,
    /// Number of most-recent generations used for trend regression.
    pub trend_window: usize,
    /// Consecutive below-critical generations required before triggering.
    pub patience: usize,
    /// Cap on retained diversity history.
    pub max_history: usize,
}

impl Default for DiversityConfig {
    fn default() -> Self {
        Self {
            critical_threshold: 0.15,
            warning_threshold: 0.30,
            trend_window: 5,
            patience: 3,
            max_history: 100,
        }
    }
}

impl DiversityConfig {
    fn validate(&self) -> Result<()> {
        if self.trend_window == 0 {
            return Err(Error::InvalidConfig(
                "diversity trend_window must be positive",
            ));
        }
        if self.patience == 0 {
            return Err(Error::InvalidConfig("diversity patience must be positive"));
        }
        if self.critical_threshold >= self.warning_threshold {
            return Err(Error::InvalidConfig(
                "diversity critical_threshold must be strictly below warning_threshold",
            ));
        }
        Ok(())
    }
}

/// A diversity trend classification over the most recent `trend_window`
/// generations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Increasing,
    Stable,
    Decreasing,
    Unknown,
}

/// Input accepted by `DiversityMonitor::update`: a caller-supplied
/// diversity reading for one generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiversityMetricsInput {
    pub generation: u64,
    pub pairwise_diversity: f64,
    pub convergence_risk: f64,
}

/// Detects population-diversity collapse and tracks its trend.
#[derive(Debug, Clone)]
pub struct DiversityMonitor {
    config: DiversityConfig,
    history: History<DiversityRecord>,
    patience_counter: usize,
    diversity_collapsed: bool,
}

impl DiversityMonitor {
    /// # Errors
    /// Returns `Error::InvalidConfig` if `trend_window`/`patience` is zero,
    /// or if `critical_threshold >= warning_threshold`.
    pub fn new(config: DiversityConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            history: History::new(config.max_history),
            config,
            patience_counter: 0,
            diversity_collapsed: false,
        })
    }

    /// Insert a new diversity reading and re-evaluate collapse/trend state.
    ///
    /// # Errors
    /// Returns `Error::NonFiniteValue` if `pairwise_diversity` is NaN or
    /// infinite.
    pub fn update(&mut self, metrics: DiversityMetricsInput) -> Result<()> {
        if !metrics.pairwise_diversity.is_finite() {
            return Err(Error::NonFiniteValue {
                field: "pairwise_diversity",
                value: metrics.pairwise_diversity,
            });
        }
        let record = DiversityRecord::new(
            metrics.generation,
            metrics.pairwise_diversity,
            metrics.convergence_risk,
        );
        self.history.push_front(record);

        let current = record.pairwise_diversity;
        let below_threshold = current < self.config.critical_threshold;
        if below_threshold {
            self.patience_counter += 1;
        } else {
            self.patience_counter = 0;
        }
        self.diversity_collapsed = self.patience_counter >= self.config.patience;
        Ok(())
    }

    #[must_use]
    pub fn diversity_collapsed(&self) -> bool {
        self.diversity_collapsed
    }

    #[must_use]
    pub fn patience_count(&self) -> usize {
        self.patience_counter
    }

    /// True iff the latest reading sits in `[critical_threshold,
    /// warning_threshold)`. False on empty history.
    #[must_use]
    pub fn in_warning_zone(&self) -> bool {
        match self.history.front() {
            Some(record) => {
                record.pairwise_diversity < self.config.warning_threshold
                    && record.pairwise_diversity >= self.config.critical_threshold
            }
            None => false,
        }
    }

    /// Linear-regression trend over the most recent `trend_window`
    /// generations, oldest-to-newest. `Unknown` if history is shorter than
    /// the window.
    #[must_use]
    pub fn trend(&self) -> Trend {
        let window = self.config.trend_window;
        if self.history.len() < window {
            return Trend::Unknown;
        }
        // History is most-recent-first; reverse the window to oldest-first
        // so x increases with time.
        let ys: Vec<f64> = (0..window)
            .rev()
            .filter_map(|i| self.history.get(i).map(|r| r.pairwise_diversity))
            .collect();
        let slope = ols_slope(&ys);
        if slope > 0.01 {
            Trend::Increasing
        } else if slope < -0.01 {
            Trend::Decreasing
        } else {
            Trend::Stable
        }
    }

    #[must_use]
    pub fn current_diversity(&self) -> Option<f64> {
        self.history.front().map(|r| r.pairwise_diversity)
    }

    #[must_use]
    pub fn current_level(&self) -> Option<DiversityLevel> {
        self.history.front().map(|r| r.diversity_level)
    }

    #[must_use]
    pub fn config(&self) -> &DiversityConfig {
        &self.config
    }

    #[must_use]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn reset(&mut self) {
        self.history.clear();
        self.patience_counter = 0;
        self.diversity_collapsed = false;
    }
}

/// Ordinary least-squares slope over `ys` against implicit x-coordinates
/// `0, 1, ..., ys.len() - 1`. Returns `0` if the denominator degenerates
/// (only possible with fewer than 2 points).
fn ols_slope(ys: &[f64]) -> f64 {
    let n = ys.len() as f64;
    let sum_x: f64 = (0..ys.len()).map(|i| i as f64).sum();
    let sum_y: f64 = ys.iter().sum();
    let sum_xy: f64 = ys.iter().enumerate().map(|(i, &y)| i as f64 * y).sum();
    let sum_x2: f64 = (0..ys.len()).map(|i| (i as f64).powi(2)).sum();

    let denominator = n * sum_x2 - sum_x * sum_x;
    if denominator == 0.0 {
        0.0
    } else {
        (n * sum_xy - sum_x * sum_y) / denominator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dm(generation: u64, pairwise_diversity: f64) -> DiversityMetricsInput {
        DiversityMetricsInput {
            generation,
            pairwise_diversity,
            convergence_risk: 0.0,
        }
    }

    #[test]
    fn rejects_inverted_thresholds() {
        let mut cfg = DiversityConfig::default();
        cfg.critical_threshold = 0.5;
        cfg.warning_threshold = 0.3;
        assert!(DiversityMonitor::new(cfg).is_err());
    }

    #[test]
    fn trend_unknown_before_window_fills() {
        let mut monitor = DiversityMonitor::new(DiversityConfig::default()).unwrap();
        for g in 0..4 {
            monitor.update(dm(g, 0.5)).unwrap();
        }
        assert_eq!(monitor.trend(), Trend::Unknown);
    }

    #[test]
    fn trend_increasing_on_rising_sequence() {
        let mut monitor = DiversityMonitor::new(DiversityConfig::default()).unwrap();
        for g in 0..5 {
            monitor.update(dm(g, 0.1 + g as f64 * 0.1)).unwrap();
        }
        assert_eq!(monitor.trend(), Trend::Increasing);
    }

    #[test]
    fn trend_decreasing_on_falling_sequence() {
        let mut monitor = DiversityMonitor::new(DiversityConfig::default()).unwrap();
        for g in 0..5 {
            monitor.update(dm(g, 0.9 - g as f64 * 0.1)).unwrap();
        }
        assert_eq!(monitor.trend(), Trend::Decreasing);
    }

    #[test]
    fn trend_stable_on_flat_sequence() {
        let mut monitor = DiversityMonitor::new(DiversityConfig::default()).unwrap();
        for g in 0..5 {
            monitor.update(dm(g, 0.5)).unwrap();
        }
        assert_eq!(monitor.trend(), Trend::Stable);
    }

    #[test]
    fn warning_zone_half_open_interval() {
        let mut monitor = DiversityMonitor::new(DiversityConfig::default()).unwrap();
        monitor.update(dm(0, 0.30)).unwrap();
        assert!(!monitor.in_warning_zone(), "0.30 is at warning_threshold, not below it");

        monitor.update(dm(1, 0.20)).unwrap();
        assert!(monitor.in_warning_zone());

        monitor.update(dm(2, 0.15)).unwrap();
        assert!(monitor.in_warning_zone(), "0.15 equals critical_threshold, inclusive");

        monitor.update(dm(3, 0.05)).unwrap();
        assert!(!monitor.in_warning_zone());
    }

    #[test]
    fn collapse_after_patience_generations_below_critical() {
        let config = DiversityConfig {
            patience: 2,
            ..DiversityConfig::default()
        };
        let mut monitor = DiversityMonitor::new(config).unwrap();
        monitor.update(dm(0, 0.05)).unwrap();
        assert!(!monitor.diversity_collapsed());
        monitor.update(dm(1, 0.05)).unwrap();
        assert!(monitor.diversity_collapsed());
    }

    #[test]
    fn recovering_above_critical_resets_patience() {
        let config = DiversityConfig {
            patience: 3,
            ..DiversityConfig::default()
        };
        let mut monitor = DiversityMonitor::new(config).unwrap();
        monitor.update(dm(0, 0.05)).unwrap();
        monitor.update(dm(1, 0.05)).unwrap();
        monitor.update(dm(2, 0.5)).unwrap();
        assert_eq!(monitor.patience_count(), 0);
        assert!(!monitor.diversity_collapsed());
    }
}
