//! The coordinator's output type: a point-in-time convergence verdict plus
//! diagnostics.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::budget::BudgetRemaining;
use crate::diversity::Trend;

/// Coarse-grained run state, derived from `reason`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusLevel {
    Running,
    Warning,
    Converged,
}

/// Which detector (if any) is responsible for a converged verdict, in the
/// fixed priority order `budget_exhausted > fitness_plateau >
/// diversity_collapse > hypervolume_saturation > none`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    BudgetExhausted,
    FitnessPlateau,
    DiversityCollapse,
    HypervolumeSaturation,
    None,
}

/// The coordinator's per-generation verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Status {
    pub converged: bool,
    pub status_level: StatusLevel,
    pub reason: Reason,
    pub should_stop: bool,
    pub warnings: Vec<String>,

    pub plateau_triggered: bool,
    pub diversity_triggered: bool,
    pub hypervolume_triggered: bool,
    pub budget_triggered: bool,

    pub plateau_generations: usize,
    pub diversity_score: Option<f64>,
    pub hypervolume_improvement: Option<f64>,
    pub budget_remaining: BudgetRemaining,

    pub metadata: BTreeMap<String, String>,
}

impl Status {
    pub(crate) fn metadata_entries(
        generation: u64,
        plateau_patience: usize,
        diversity_trend: Trend,
    ) -> BTreeMap<String, String> {
        let mut metadata = BTreeMap::new();
        metadata.insert("generation".to_string(), generation.to_string());
        metadata.insert("plateau_patience".to_string(), plateau_patience.to_string());
        metadata.insert(
            "diversity_trend".to_string(),
            format!("{diversity_trend:?}").to_lowercase(),
        );
        metadata
    }
}
