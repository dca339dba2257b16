//! Immutable per-generation record types shared by the detectors.

use serde::{Deserialize, Serialize};

/// One generation's fitness summary, as produced by the evaluation runtime.
///
/// `best_fitness` is the only field the plateau detector reads; the other
/// three are carried through for host-side diagnostics and snapshotting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitnessRecord {
    pub generation: u64,
    pub best_fitness: f64,
    pub mean_fitness: f64,
    pub median_fitness: f64,
    pub std_dev: f64,
}

/// Named bands over `pairwise_diversity`, used for presentation only.
///
/// Thresholding (`diversity_collapsed?`, `in_warning_zone?`) always compares
/// the numeric `pairwise_diversity` directly; this enum never participates
/// in a trigger decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiversityLevel {
    Excellent,
    Healthy,
    Moderate,
    Low,
    Critical,
    Unknown,
}

/// Classify a pairwise diversity score into its presentation band.
///
/// Boundaries are inclusive-lower except `Critical`, which catches
/// everything below `0.15`:
/// `excellent >= 0.70`, `healthy >= 0.50`, `moderate >= 0.30`, `low >= 0.15`,
/// else `critical`.
#[must_use]
pub fn classify_level(pairwise_diversity: f64) -> DiversityLevel {
    if pairwise_diversity >= 0.70 {
        DiversityLevel::Excellent
    } else if pairwise_diversity >= 0.50 {
        DiversityLevel::Healthy
    } else if pairwise_diversity >= 0.30 {
        DiversityLevel::Moderate
    } else if pairwise_diversity >= 0.15 {
        DiversityLevel::Low
    } else {
        DiversityLevel::Critical
    }
}

/// One generation's population-diversity summary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiversityRecord {
    pub generation: u64,
    pub pairwise_diversity: f64,
    pub diversity_level: DiversityLevel,
    pub convergence_risk: f64,
}

impl DiversityRecord {
    #[must_use]
    pub fn new(generation: u64, pairwise_diversity: f64, convergence_risk: f64) -> Self {
        Self {
            generation,
            pairwise_diversity,
            diversity_level: classify_level(pairwise_diversity),
            convergence_risk,
        }
    }
}

/// One generation's Pareto-frontier hypervolume, with improvement fields
/// filled in lazily once a previous record exists (see `HypervolumeTracker`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HypervolumeRecord {
    pub generation: u64,
    pub hypervolume: f64,
    pub absolute_improvement: Option<f64>,
    pub relative_improvement: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_level_boundaries() {
        assert_eq!(classify_level(0.70), DiversityLevel::Excellent);
        assert_eq!(classify_level(0.699), DiversityLevel::Healthy);
        assert_eq!(classify_level(0.50), DiversityLevel::Healthy);
        assert_eq!(classify_level(0.30), DiversityLevel::Moderate);
        assert_eq!(classify_level(0.15), DiversityLevel::Low);
        assert_eq!(classify_level(0.149), DiversityLevel::Critical);
        assert_eq!(classify_level(0.0), DiversityLevel::Critical);
    }

    #[test]
    fn diversity_record_derives_level_from_score() {
        let record = DiversityRecord::new(3, 0.82, 0.1);
        assert_eq!(record.diversity_level, DiversityLevel::Excellent);
    }
}
