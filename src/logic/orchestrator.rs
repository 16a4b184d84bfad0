//! Install orchestration
//!
//! Applies a confirmed selection in plan order and collects one
//! [`InstallResult`] per selected component.
//!
//! # Failure Policy
//!
//! - Selection problems (unknown slug, cycle, missing dependency) abort the run
//!   before any hook is invoked.
//! - A failing hook is recorded as `Failed` and the run continues. Components
//!   are mostly independent file/service installs; one broken third-party
//!   fetch must not cost the operator every other add-on.
//! - A component whose dependency failed or was skipped is recorded `Skipped`
//!   and its hook is never invoked.
//! - A superseded component is `Skipped` only once its superseding bundle was
//!   applied. If the bundle failed, the component is applied on its own.
//! - Hooks run strictly one after another on the calling thread.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::time::{Duration, Instant};

use strum::Display;
use tracing::{debug, info, info_span, warn};

use super::order::{resolve_plan, InstallPlan, SelectionError};
use crate::error::exit_code;
use crate::registry::{Component, ComponentRegistry};

/// Outcome category of one component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum InstallStatus {
    Applied,
    Skipped,
    Failed,
}

/// Outcome record for one component's apply attempt.
///
/// Created once by the orchestrator and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallResult {
    slug: String,
    status: InstallStatus,
    detail: String,
    duration: Duration,
}

impl InstallResult {
    fn new(slug: &str, status: InstallStatus, detail: impl Into<String>, duration: Duration) -> Self {
        Self {
            slug: slug.to_string(),
            status,
            detail: detail.into(),
            duration,
        }
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn status(&self) -> InstallStatus {
        self.status
    }

    /// Human-readable cause. Verbatim hook output for `Failed`.
    pub fn detail(&self) -> &str {
        &self.detail
    }

    /// Wall time spent in the hook (zero when it never ran)
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

/// What an apply hook reports back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookOutcome {
    pub success: bool,
    pub detail: String,
}

impl HookOutcome {
    pub fn ok(detail: impl Into<String>) -> Self {
        Self {
            success: true,
            detail: detail.into(),
        }
    }

    pub fn failed(detail: impl Into<String>) -> Self {
        Self {
            success: false,
            detail: detail.into(),
        }
    }
}

/// The external actions that actually install a component.
///
/// Implementations see only the component being applied, never the
/// orchestrator's bookkeeping.
pub trait ApplyHooks {
    fn apply(&mut self, component: &Component) -> HookOutcome;
}

impl<F> ApplyHooks for F
where
    F: FnMut(&Component) -> HookOutcome,
{
    fn apply(&mut self, component: &Component) -> HookOutcome {
        self(component)
    }
}

/// Ordered results of one orchestrator run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallReport {
    results: Vec<InstallResult>,
}

impl InstallReport {
    pub fn results(&self) -> &[InstallResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn get(&self, slug: &str) -> Option<&InstallResult> {
        self.results.iter().find(|r| r.slug == slug)
    }

    pub fn count(&self, status: InstallStatus) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }

    pub fn has_failures(&self) -> bool {
        self.count(InstallStatus::Failed) > 0
    }

    /// Process exit code: non-zero only when some selected component failed
    pub fn exit_code(&self) -> i32 {
        if self.has_failures() {
            exit_code::COMPONENT_FAILED
        } else {
            exit_code::SUCCESS
        }
    }
}

impl fmt::Display for InstallReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} applied, {} skipped, {} failed",
            self.count(InstallStatus::Applied),
            self.count(InstallStatus::Skipped),
            self.count(InstallStatus::Failed)
        )
    }
}

/// Drives a selection through its apply hooks
pub struct InstallOrchestrator<'r, H> {
    registry: &'r ComponentRegistry,
    hooks: H,
    dry_run: bool,
}

impl<'r, H: ApplyHooks> InstallOrchestrator<'r, H> {
    pub fn new(registry: &'r ComponentRegistry, hooks: H) -> Self {
        Self {
            registry,
            hooks,
            dry_run: false,
        }
    }

    /// Resolve and order as usual, but record every component as skipped
    /// instead of invoking hooks.
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Validate and order `selected` without applying anything.
    pub fn plan(&self, selected: &BTreeSet<String>) -> Result<InstallPlan<'r>, SelectionError> {
        resolve_plan(selected, self.registry)
    }

    /// Apply `selected` and return one result per component, in apply order.
    ///
    /// # Errors
    ///
    /// Only selection errors, and only before any hook has run.
    pub fn run(&mut self, selected: &BTreeSet<String>) -> Result<InstallReport, SelectionError> {
        let plan = self.plan(selected)?;
        info!(
            count = plan.len(),
            dry_run = self.dry_run,
            "Applying components: {}",
            plan.slugs().join(", ")
        );

        // slug -> whether its content ended up installed
        let mut satisfied: HashMap<&str, bool> = HashMap::with_capacity(plan.len());
        let mut results = Vec::with_capacity(plan.len());

        for step in plan.steps() {
            let component = step.component;
            let _span = info_span!("apply", slug = %component.slug).entered();

            let blocker = component
                .depends_on
                .iter()
                .find(|dep| !satisfied.get(dep.as_str()).copied().unwrap_or(false));

            let result = if let Some(dep) = blocker {
                let detail = format!("dependency '{}' was not applied", dep);
                warn!("Skipping: {}", detail);
                InstallResult::new(&component.slug, InstallStatus::Skipped, detail, Duration::ZERO)
            } else if let Some(by) = step
                .superseded_by
                .filter(|by| satisfied.get(by).copied().unwrap_or(false))
            {
                // Only once the bundle itself is installed
                satisfied.insert(component.slug.as_str(), true);
                debug!("Superseded by {}", by);
                InstallResult::new(
                    &component.slug,
                    InstallStatus::Skipped,
                    format!("superseded by {}", by),
                    Duration::ZERO,
                )
            } else if self.dry_run {
                satisfied.insert(component.slug.as_str(), true);
                InstallResult::new(&component.slug, InstallStatus::Skipped, "dry run", Duration::ZERO)
            } else {
                let started = Instant::now();
                let outcome = self.hooks.apply(component);
                let elapsed = started.elapsed();
                satisfied.insert(component.slug.as_str(), outcome.success);
                if outcome.success {
                    info!(elapsed_ms = elapsed.as_millis() as u64, "Applied");
                    InstallResult::new(&component.slug, InstallStatus::Applied, outcome.detail, elapsed)
                } else {
                    warn!("Failed: {}", outcome.detail);
                    InstallResult::new(&component.slug, InstallStatus::Failed, outcome.detail, elapsed)
                }
            };
            results.push(result);
        }

        let report = InstallReport { results };
        info!("Run finished: {}", report);
        Ok(report)
    }
}
