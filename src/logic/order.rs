//! Install plan resolution
//!
//! Turns a set of selected slugs into an ordered list of components, or
//! rejects the whole selection before anything is applied.
//!
//! # Rules
//!
//! | Situation                                   | Outcome |
//! |---------------------------------------------|---------|
//! | Slug not in the registry                    | `UnknownComponents` (all unknowns listed) |
//! | Selected component depends on unselected one| `MissingDependency` |
//! | `depends_on` cycle inside the selection     | `DependencyCycle` |
//! | Both a component and one it supersedes      | superseded one planned after it, marked |
//!
//! Ordering is a topological sort over `depends_on` (plus supersession) edges
//! restricted to the selection. Ties go to registry order, so the plan does
//! not depend on the order slugs were typed in.

use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

use crate::registry::{Component, ComponentRegistry};

/// Reasons a selection cannot be installed as a whole
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("unknown component(s): {}", .0.join(", "))]
    UnknownComponents(Vec<String>),

    #[error("'{component}' requires '{dependency}', which is not selected")]
    MissingDependency {
        component: String,
        dependency: String,
    },

    #[error("dependency cycle among: {}", .0.join(", "))]
    DependencyCycle(Vec<String>),
}

/// One entry of a resolved plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedStep<'r> {
    pub component: &'r Component,
    /// Set when another selected component already ships this one's content
    pub superseded_by: Option<&'r str>,
}

/// Selected components in apply order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallPlan<'r> {
    steps: Vec<PlannedStep<'r>>,
}

impl<'r> InstallPlan<'r> {
    pub fn steps(&self) -> &[PlannedStep<'r>] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Slugs in apply order
    pub fn slugs(&self) -> Vec<&'r str> {
        self.steps.iter().map(|s| s.component.slug.as_str()).collect()
    }
}

/// Validate `selected` against `registry` and order it for application.
///
/// The selection is checked atomically: any error means nothing is planned.
pub fn resolve_plan<'r>(
    selected: &BTreeSet<String>,
    registry: &'r ComponentRegistry,
) -> Result<InstallPlan<'r>, SelectionError> {
    let unknown: Vec<String> = selected
        .iter()
        .filter(|slug| !registry.contains(slug))
        .cloned()
        .collect();
    if !unknown.is_empty() {
        return Err(SelectionError::UnknownComponents(unknown));
    }

    // Registry order keeps every later step deterministic
    let chosen: Vec<&'r Component> = registry
        .list()
        .iter()
        .filter(|c| selected.contains(&c.slug))
        .collect();

    for component in &chosen {
        if let Some(dep) = component.depends_on.iter().find(|d| !selected.contains(*d)) {
            return Err(SelectionError::MissingDependency {
                component: component.slug.clone(),
                dependency: dep.clone(),
            });
        }
    }

    let mut superseded_by: BTreeMap<&'r str, &'r str> = BTreeMap::new();
    for component in &chosen {
        for target in &component.supersedes {
            if selected.contains(target) {
                superseded_by
                    .entry(target.as_str())
                    .or_insert(component.slug.as_str());
            }
        }
    }

    // Kahn's algorithm keyed by registry position
    let position = |slug: &str| registry.position(slug).unwrap_or(usize::MAX);
    let mut prerequisites: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for component in &chosen {
        let mut before: Vec<usize> = component
            .depends_on
            .iter()
            .map(|d| position(d.as_str()))
            .collect();
        if let Some(by) = superseded_by.get(component.slug.as_str()) {
            before.push(position(*by));
        }
        prerequisites.insert(position(component.slug.as_str()), before);
    }

    let mut placed: BTreeSet<usize> = BTreeSet::new();
    let mut steps = Vec::with_capacity(chosen.len());
    while placed.len() < chosen.len() {
        let next = prerequisites
            .iter()
            .find(|(pos, before)| {
                !placed.contains(*pos) && before.iter().all(|b| placed.contains(b))
            })
            .map(|(pos, _)| *pos);

        let Some(pos) = next else {
            let stuck = prerequisites
                .keys()
                .filter(|pos| !placed.contains(*pos))
                .map(|&pos| registry.list()[pos].slug.clone())
                .collect();
            return Err(SelectionError::DependencyCycle(stuck));
        };

        placed.insert(pos);
        let component = &registry.list()[pos];
        steps.push(PlannedStep {
            component,
            superseded_by: superseded_by.get(component.slug.as_str()).copied(),
        });
    }

    Ok(InstallPlan { steps })
}
