//! Component Registry
//!
//! The single catalog of installable add-ons. It is built once at startup from
//! a literal table, validated, and then only ever read.
//!
//! # Schema
//!
//! | Field              | Meaning |
//! |--------------------|---------|
//! | `slug`             | Stable machine identifier, unique across the catalog |
//! | `depends_on`       | Slugs that must be applied before this one |
//! | `supersedes`       | Slugs whose content this component already ships |
//! | `default_selected` | Included when no explicit selection is given |
//! | `apply_kind`       | Which hook installs it |
//!
//! # Invariants (checked by [`ComponentRegistry::new`])
//!
//! - Slugs are unique
//! - Every `depends_on` / `supersedes` target exists and is not the entry itself
//! - The `depends_on` graph is acyclic

use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

use crate::types::{ApplyKind, Category};

/// One independently installable unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub slug: String,
    pub display_name: String,
    pub category: Category,
    pub description: String,
    pub default_selected: bool,
    pub depends_on: Vec<String>,
    pub supersedes: Vec<String>,
    pub apply_kind: ApplyKind,
}

impl Component {
    /// Create a script-installed component with no relations
    pub fn new(slug: &str, display_name: &str, category: Category, description: &str) -> Self {
        Self {
            slug: slug.to_string(),
            display_name: display_name.to_string(),
            category,
            description: description.to_string(),
            default_selected: false,
            depends_on: Vec::new(),
            supersedes: Vec::new(),
            apply_kind: ApplyKind::Script,
        }
    }

    pub fn selected_by_default(mut self) -> Self {
        self.default_selected = true;
        self
    }

    pub fn depends_on(mut self, slugs: &[&str]) -> Self {
        self.depends_on = slugs.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn supersedes(mut self, slugs: &[&str]) -> Self {
        self.supersedes = slugs.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn applied_by(mut self, kind: ApplyKind) -> Self {
        self.apply_kind = kind;
        self
    }
}

/// Errors raised while building or querying the registry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("duplicate component slug '{0}'")]
    DuplicateSlug(String),

    #[error("component '{slug}' {relation} unknown component '{target}'")]
    UnknownReference {
        slug: String,
        relation: &'static str,
        target: String,
    },

    #[error("component '{0}' refers to itself")]
    SelfReference(String),

    #[error("dependency cycle in catalog: {}", .0.join(" -> "))]
    DependencyCycle(Vec<String>),

    #[error("unknown component '{0}'")]
    NotFound(String),
}

/// Read-only catalog of components in display order
#[derive(Debug, Clone)]
pub struct ComponentRegistry {
    components: Vec<Component>,
    index: HashMap<String, usize>,
}

impl ComponentRegistry {
    /// Build a registry from an ordered component table, validating it.
    pub fn new(components: Vec<Component>) -> Result<Self, RegistryError> {
        let mut index = HashMap::with_capacity(components.len());
        for (i, component) in components.iter().enumerate() {
            if index.insert(component.slug.clone(), i).is_some() {
                return Err(RegistryError::DuplicateSlug(component.slug.clone()));
            }
        }

        for component in &components {
            let relations = component
                .depends_on
                .iter()
                .map(|t| ("depends on", t))
                .chain(component.supersedes.iter().map(|t| ("supersedes", t)));
            for (relation, target) in relations {
                if *target == component.slug {
                    return Err(RegistryError::SelfReference(component.slug.clone()));
                }
                if !index.contains_key(target) {
                    return Err(RegistryError::UnknownReference {
                        slug: component.slug.clone(),
                        relation,
                        target: target.clone(),
                    });
                }
            }
        }

        let registry = Self { components, index };
        if let Some(cycle) = registry.find_cycle() {
            return Err(RegistryError::DependencyCycle(cycle));
        }
        Ok(registry)
    }

    /// The built-in add-on catalog
    pub fn builtin() -> Result<Self, RegistryError> {
        Self::new(builtin_components())
    }

    /// All components in display order
    pub fn list(&self) -> &[Component] {
        &self.components
    }

    /// Look up a component by slug
    pub fn find(&self, slug: &str) -> Result<&Component, RegistryError> {
        self.index
            .get(slug)
            .map(|&i| &self.components[i])
            .ok_or_else(|| RegistryError::NotFound(slug.to_string()))
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.index.contains_key(slug)
    }

    /// Registry position of a slug, used as the stable tie-breaker when ordering
    pub fn position(&self, slug: &str) -> Option<usize> {
        self.index.get(slug).copied()
    }

    /// Slugs selected when the operator gives no explicit selection
    pub fn defaults(&self) -> BTreeSet<String> {
        self.components
            .iter()
            .filter(|c| c.default_selected)
            .map(|c| c.slug.clone())
            .collect()
    }

    /// Categories in first-appearance order
    pub fn categories(&self) -> Vec<Category> {
        let mut seen = Vec::new();
        for component in &self.components {
            if !seen.contains(&component.category) {
                seen.push(component.category);
            }
        }
        seen
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Depth-first search for a `depends_on` cycle. Returns the cycle path.
    fn find_cycle(&self) -> Option<Vec<String>> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unvisited,
            InProgress,
            Done,
        }

        fn visit(
            registry: &ComponentRegistry,
            i: usize,
            marks: &mut [Mark],
            path: &mut Vec<usize>,
        ) -> Option<Vec<String>> {
            marks[i] = Mark::InProgress;
            path.push(i);
            for dep in &registry.components[i].depends_on {
                let j = registry.index[dep];
                match marks[j] {
                    Mark::InProgress => {
                        let start = path.iter().position(|&p| p == j).unwrap_or(0);
                        let mut cycle: Vec<String> = path[start..]
                            .iter()
                            .map(|&p| registry.components[p].slug.clone())
                            .collect();
                        cycle.push(registry.components[j].slug.clone());
                        return Some(cycle);
                    }
                    Mark::Unvisited => {
                        if let Some(cycle) = visit(registry, j, marks, path) {
                            return Some(cycle);
                        }
                    }
                    Mark::Done => {}
                }
            }
            path.pop();
            marks[i] = Mark::Done;
            None
        }

        let mut marks = vec![Mark::Unvisited; self.components.len()];
        let mut path = Vec::new();
        (0..self.components.len()).find_map(|i| {
            if marks[i] == Mark::Unvisited {
                visit(self, i, &mut marks, &mut path)
            } else {
                None
            }
        })
    }
}

/// Slugs referenced by more than one catalog entry
pub mod slugs {
    pub const USTREAMER: &str = "ustreamer";
    pub const MACROS: &str = "macros";
    pub const CLEANUP: &str = "cleanup";
}

fn builtin_components() -> Vec<Component> {
    use Category::*;

    vec![
        Component::new(
            "guppyscreen",
            "Guppy Screen",
            DisplayInterface,
            "Alternative touchscreen UI for the printer display",
        )
        .selected_by_default(),
        Component::new(
            "mainsail",
            "Mainsail",
            DisplayInterface,
            "Modern web interface for Klipper",
        )
        .selected_by_default(),
        Component::new(
            slugs::USTREAMER,
            "uStreamer",
            CameraStreaming,
            "Lightweight MJPEG streaming server for camera",
        )
        .selected_by_default(),
        Component::new(
            "timelapse",
            "Timelapse (MJPEG)",
            CameraStreaming,
            "Print timelapse recording with MJPEG encoder",
        )
        .selected_by_default()
        .depends_on(&[slugs::USTREAMER]),
        Component::new(
            "timelapseh264",
            "Timelapse (H264)",
            CameraStreaming,
            "Print timelapse recording with H264 encoder",
        )
        .depends_on(&[slugs::USTREAMER]),
        Component::new(
            slugs::MACROS,
            "All Macros & Configs",
            MacrosConfiguration,
            "Complete set of macros, start_print, and overrides",
        )
        .selected_by_default()
        .supersedes(&["macros_only", "start_print", "overrides"]),
        Component::new(
            "macros_only",
            "Macros Only",
            MacrosConfiguration,
            "Install only macros.cfg",
        ),
        Component::new(
            "start_print",
            "Start Print Only",
            MacrosConfiguration,
            "Install only start_print.cfg",
        ),
        Component::new(
            "overrides",
            "Overrides Only",
            MacrosConfiguration,
            "Install only overrides.cfg",
        ),
        Component::new(
            "kamp",
            "KAMP",
            MacrosConfiguration,
            "Klipper Adaptive Meshing & Purging",
        ),
        Component::new(
            "resonance",
            "Resonance Tester",
            CalibrationTuning,
            "Custom resonance testing for input shaping",
        )
        .selected_by_default(),
        Component::new(
            "shaketune",
            "ShakeTune",
            CalibrationTuning,
            "Advanced input shaper analysis and tuning",
        )
        .selected_by_default(),
        Component::new(
            slugs::CLEANUP,
            "Cleanup Service",
            SystemServices,
            "Automatic cleanup of old printer backups",
        )
        .selected_by_default()
        .applied_by(ApplyKind::ScheduledCleanup),
    ]
}
