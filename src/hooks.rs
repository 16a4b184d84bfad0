//! Production apply hooks.
//!
//! Dispatches each component on its [`ApplyKind`]: script components run their
//! install script, the cleanup component goes to the [`CleanupScheduler`].

use std::path::PathBuf;
use tracing::debug;

use crate::cleanup::{CleanupJob, CleanupScheduler, ServiceSupervisor, SystemdSupervisor};
use crate::config_file::InstallerConfig;
use crate::logic::{ApplyHooks, HookOutcome};
use crate::registry::Component;
use crate::script_runner::run_script_safe;
use crate::scripts::component::ComponentScriptArgs;
use crate::types::ApplyKind;

pub struct HostHooks<S = SystemdSupervisor> {
    scripts_dir: PathBuf,
    printer_data_dir: PathBuf,
    cleanup: CleanupScheduler<S>,
}

impl HostHooks<SystemdSupervisor> {
    pub fn from_config(config: &InstallerConfig) -> Self {
        Self::with_supervisor(config, SystemdSupervisor::new(&config.cleanup.unit_dir))
    }
}

impl<S: ServiceSupervisor> HostHooks<S> {
    pub fn with_supervisor(config: &InstallerConfig, supervisor: S) -> Self {
        Self {
            scripts_dir: config.scripts_dir.clone(),
            printer_data_dir: config.printer_data_dir.clone(),
            cleanup: CleanupScheduler::new(supervisor, CleanupJob::from_config(config)),
        }
    }

    fn run_script(&self, component: &Component) -> HookOutcome {
        let args = ComponentScriptArgs::new(
            &component.slug,
            &self.scripts_dir,
            &self.printer_data_dir,
        );
        if !args.script_path().is_file() {
            return HookOutcome::failed(format!(
                "install script {} not found",
                args.script_path().display()
            ));
        }

        match run_script_safe(&args) {
            Ok(output) if output.success => HookOutcome::ok("installed"),
            Ok(output) => HookOutcome::failed(output.failure_detail()),
            Err(e) => HookOutcome::failed(format!("{:#}", e)),
        }
    }
}

impl<S: ServiceSupervisor> ApplyHooks for HostHooks<S> {
    fn apply(&mut self, component: &Component) -> HookOutcome {
        debug!(slug = %component.slug, kind = %component.apply_kind, "Dispatching hook");
        match component.apply_kind {
            ApplyKind::Script => self.run_script(component),
            ApplyKind::ScheduledCleanup => self.cleanup.apply(),
        }
    }
}
