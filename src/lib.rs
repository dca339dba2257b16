//! Convergence detection core for an evolutionary prompt-optimization
//! engine.
//!
//! Four independent sub-detectors — a fitness plateau detector, a
//! population-diversity monitor, a Pareto-frontier hypervolume tracker, and
//! a resource budget manager — each watch one signal across generations and
//! expose a triggered/not-triggered verdict behind a patience counter. A
//! [`coordinator::Coordinator`] fans per-generation metrics out to whichever
//! sub-detectors apply, aggregates their verdicts under disjunctive
//! ("any triggers") semantics with a fixed reason priority, and synthesizes
//! early warnings for states that are approaching but have not yet crossed
//! a trigger.
//!
//! The core is synchronous, single-threaded, and does no I/O: callers
//! serialize `update` calls themselves, typically once per generation at
//! the boundary between the optimization engine's outer loop iterations.

pub mod budget;
pub mod coordinator;
pub mod diversity;
pub mod error;
pub mod history;
pub mod hypervolume;
pub mod plateau;
pub mod record;
pub mod status;

pub use budget::{BudgetConfig, BudgetManager, BudgetRemaining, Resource};
pub use coordinator::{Coordinator, CoordinatorConfig, GenerationMetrics, HypervolumeInput};
pub use diversity::{DiversityConfig, DiversityMetricsInput, DiversityMonitor, Trend};
pub use error::{Error, Result};
pub use hypervolume::{HypervolumeConfig, HypervolumeTracker};
pub use plateau::{PlateauConfig, PlateauDetector};
pub use record::{classify_level, DiversityLevel, DiversityRecord, FitnessRecord, HypervolumeRecord};
pub use status::{Reason, Status, StatusLevel};
