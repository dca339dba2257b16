//! Budget manager: straightforward resource-consumption accounting against
//! optional per-resource limits.
//!
//! This component is specified only at the contract level: the coordinator
//! observes just `evaluations`, but the manager tracks all four resource
//! kinds so a host can query any of them independently.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A resource dimension the budget manager tracks consumption against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Evaluations,
    Tokens,
    Cost,
    WallClockSeconds,
}

/// Optional per-resource limits. `None` means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct BudgetConfig {
    pub max_evaluations: Option<u64>,
    pub max_tokens: Option<u64>,
    pub max_cost: Option<u64>,
    pub max_wall_clock_seconds: Option<u64>,
}

impl BudgetConfig {
    fn limit(&self, resource: Resource) -> Option<u64> {
        match resource {
            Resource::Evaluations => self.max_evaluations,
            Resource::Tokens => self.max_tokens,
            Resource::Cost => self.max_cost,
            Resource::WallClockSeconds => self.max_wall_clock_seconds,
        }
    }
}

/// Tracks consumption against the four resource kinds and reports
/// exhaustion. Exposes exactly the four entry points the coordinator needs:
/// `record_consumption`, `budget_exhausted`, `remaining_evaluations`,
/// `reset`.
#[derive(Debug, Clone)]
pub struct BudgetManager {
    config: BudgetConfig,
    consumed: BTreeMap<Resource, u64>,
}

/// `remaining_evaluations` return value: either a finite count or the
/// sentinel "no configured limit".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetRemaining {
    Limited(u64),
    Unlimited,
}

impl BudgetManager {
    #[must_use]
    pub fn new(config: BudgetConfig) -> Self {
        Self {
            config,
            consumed: BTreeMap::new(),
        }
    }

    /// Add each amount in `consumption` to the matching running total.
    pub fn record_consumption(&mut self, consumption: &BTreeMap<Resource, u64>) {
        for (resource, amount) in consumption {
            *self.consumed.entry(*resource).or_insert(0) += amount;
        }
    }

    /// True iff any resource with a finite limit has met or exceeded it.
    #[must_use]
    pub fn budget_exhausted(&self) -> bool {
        [
            Resource::Evaluations,
            Resource::Tokens,
            Resource::Cost,
            Resource::WallClockSeconds,
        ]
        .into_iter()
        .any(|resource| match self.config.limit(resource) {
            Some(limit) => self.consumed.get(&resource).copied().unwrap_or(0) >= limit,
            None => false,
        })
    }

    #[must_use]
    pub fn remaining_evaluations(&self) -> BudgetRemaining {
        match self.config.max_evaluations {
            Some(limit) => {
                let used = self
                    .consumed
                    .get(&Resource::Evaluations)
                    .copied()
                    .unwrap_or(0);
                BudgetRemaining::Limited(limit.saturating_sub(used))
            }
            None => BudgetRemaining::Unlimited,
        }
    }

    #[must_use]
    pub fn config(&self) -> &BudgetConfig {
        &self.config
    }

    pub fn reset(&mut self) {
        self.consumed.clear();
    }
}
