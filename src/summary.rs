//! Plain-text output for the non-interactive paths
//!
//! `--list`, the `--dry-run` plan and the final install summary are printed
//! to stdout after the terminal session (if any) is gone, so they are plain
//! strings rather than ratatui widgets.

use std::fmt::Write as _;

use crate::logic::{InstallPlan, InstallReport, InstallStatus};
use crate::registry::ComponentRegistry;
use crate::theme::UiText;

const RULE_WIDTH: usize = 60;

/// The catalog grouped by category, defaults marked
pub fn format_component_list(registry: &ComponentRegistry) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = String::new();
    let _ = writeln!(out, "Available components:");
    let _ = writeln!(out, "{}", rule);

    let mut current_category = None;
    for component in registry.list() {
        if current_category != Some(component.category) {
            current_category = Some(component.category);
            let _ = writeln!(out, "\n{}:", component.category);
        }
        let marker = if component.default_selected { " [default]" } else { "" };
        let _ = writeln!(
            out,
            "  {:15} - {}{}",
            component.slug, component.display_name, marker
        );
        let _ = writeln!(out, "{:20}{}", "", component.description);
    }

    let _ = writeln!(out, "\n{}", rule);
    let _ = writeln!(out, "Use: klipkit --components <slug1> <slug2> ...");
    let _ = writeln!(out, "Or run: klipkit --gui for interactive selection");
    out
}

/// Numbered apply order for `--dry-run`
pub fn format_plan(plan: &InstallPlan<'_>) -> String {
    if plan.is_empty() {
        return "Nothing selected.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "Install plan ({} components):", plan.len());
    for (n, step) in plan.steps().iter().enumerate() {
        let _ = write!(out, "  {:>2}. {}", n + 1, step.component.slug);
        if let Some(by) = step.superseded_by {
            let _ = write!(out, " (superseded by {})", by);
        } else if !step.component.depends_on.is_empty() {
            let _ = write!(out, " (after {})", step.component.depends_on.join(", "));
        }
        out.push('\n');
    }
    out
}

/// One line per result, then the totals. Failure details are verbatim.
pub fn format_install_summary(report: &InstallReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Installation summary:");
    for result in report.results() {
        let _ = write!(
            out,
            "  {} {:15} {:7}",
            UiText::status_icon(result.status()),
            result.slug(),
            result.status().to_string()
        );
        if !result.detail().is_empty() {
            let _ = write!(out, " {}", result.detail());
        }
        if result.status() == InstallStatus::Applied || result.status() == InstallStatus::Failed {
            let _ = write!(out, " ({:.1}s)", result.duration().as_secs_f64());
        }
        out.push('\n');
    }
    let _ = writeln!(out, "{}", report);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::{HookOutcome, InstallOrchestrator};
    use crate::registry::Component;
    use std::collections::BTreeSet;

    fn set(slugs: &[&str]) -> BTreeSet<String> {
        slugs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_component_list_format() {
        let registry = ComponentRegistry::builtin().unwrap();
        let text = format_component_list(&registry);

        assert!(text.contains("\nDisplay & Interface:\n"));
        assert!(text.contains("  guppyscreen     - Guppy Screen [default]\n"));
        assert!(text.contains("  kamp            - KAMP\n"));
        assert!(text.contains("                    Klipper Adaptive Meshing & Purging\n"));
        assert!(text.contains("klipkit --gui"));
        for component in registry.list() {
            assert!(text.contains(&component.slug));
        }
    }

    #[test]
    fn test_plan_format() {
        let registry = ComponentRegistry::builtin().unwrap();
        let orchestrator = InstallOrchestrator::new(&registry, |_: &Component| HookOutcome::ok(""));
        let plan = orchestrator
            .plan(&set(&["timelapse", "ustreamer", "macros", "overrides"]))
            .unwrap();
        let text = format_plan(&plan);

        assert!(text.starts_with("Install plan (4 components):\n"));
        assert!(text.contains("   1. ustreamer\n"));
        assert!(text.contains("   2. timelapse (after ustreamer)\n"));
        assert!(text.contains("overrides (superseded by macros)"));
    }

    #[test]
    fn test_empty_plan() {
        let registry = ComponentRegistry::builtin().unwrap();
        let orchestrator = InstallOrchestrator::new(&registry, |_: &Component| HookOutcome::ok(""));
        let plan = orchestrator.plan(&BTreeSet::new()).unwrap();
        assert_eq!(format_plan(&plan), "Nothing selected.\n");
    }

    #[test]
    fn test_install_summary_lines() {
        let registry = ComponentRegistry::builtin().unwrap();
        let mut orchestrator = InstallOrchestrator::new(&registry, |c: &Component| {
            if c.slug == "ustreamer" {
                HookOutcome::failed("port 8080 already in use")
            } else {
                HookOutcome::ok("installed")
            }
        });
        let report = orchestrator
            .run(&set(&["ustreamer", "timelapse", "kamp"]))
            .unwrap();
        let text = format_install_summary(&report);

        assert!(text.contains("✗ ustreamer       Failed  port 8080 already in use"));
        assert!(text.contains("- timelapse       Skipped dependency 'ustreamer' was not applied"));
        assert!(text.contains("✓ kamp            Applied installed"));
        assert!(text.ends_with("1 applied, 1 skipped, 1 failed\n"));
    }
}
