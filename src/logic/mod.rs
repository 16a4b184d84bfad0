//! Logic modules: turn a confirmed selection into applied components.
//!
//! # Modules
//!
//! - `order`: selection validation and dependency ordering
//! - `orchestrator`: sequential apply loop and result collection

pub mod orchestrator;
pub mod order;

pub use orchestrator::{
    ApplyHooks, HookOutcome, InstallOrchestrator, InstallReport, InstallResult, InstallStatus,
};
pub use order::{resolve_plan, InstallPlan, PlannedStep, SelectionError};
