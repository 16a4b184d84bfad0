//! klipkit library
//!
//! Component catalog, selector state machine, terminal renderer and install
//! orchestration for the printer add-on installer.

pub mod app;
pub mod cleanup;
pub mod cli;
pub mod config_file;
pub mod error;
pub mod hooks;
pub mod keybindings;
pub mod logic;
pub mod process_guard;
pub mod registry;
pub mod sanity;
pub mod script_runner;
pub mod script_traits;
pub mod scripts;
pub mod selection;
pub mod summary;
pub mod theme;
pub mod types;
pub mod ui;

// Re-export main types for convenience
pub use cleanup::{CleanupJob, CleanupScheduler, ServiceSupervisor, SystemdSupervisor};
pub use config_file::InstallerConfig;
pub use error::{KlipkitError, Result};
pub use hooks::HostHooks;
pub use logic::{
    ApplyHooks, HookOutcome, InstallOrchestrator, InstallReport, InstallResult, InstallStatus,
    SelectionError,
};
pub use process_guard::{ChildRegistry, CommandProcessGroup, ProcessGuard};
pub use registry::{Component, ComponentRegistry, RegistryError};
pub use script_runner::{run_script_safe, ScriptOutput};
pub use script_traits::ScriptArgs;
pub use selection::{SelectionState, SelectorInput, SelectorMode};
pub use types::{ApplyKind, Category, CleanupInterval};
