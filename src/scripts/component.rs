//! Typed arguments for per-component install scripts.
//!
//! Every script-installed component has `<scripts_dir>/<slug>.sh`. The script
//! receives the slug and the printer data directory both as flags and as
//! environment variables, and reports success through its exit code.

use std::path::{Path, PathBuf};

use crate::script_traits::ScriptArgs;

/// Environment variable carrying the component slug
pub const ENV_COMPONENT: &str = "KLIPKIT_COMPONENT";
/// Environment variable carrying the printer data directory
pub const ENV_PRINTER_DATA: &str = "PRINTER_DATA_DIR";

// ============================================================================
// Component Install Script
// ============================================================================

/// Type-safe arguments for `<scripts_dir>/<slug>.sh`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentScriptArgs {
    /// Component being installed.
    pub slug: String,
    /// Directory holding the install scripts.
    pub scripts_dir: PathBuf,
    /// Root of the printer's data (config/, logs/, gcodes/).
    pub printer_data_dir: PathBuf,
}

impl ComponentScriptArgs {
    pub fn new(slug: &str, scripts_dir: &Path, printer_data_dir: &Path) -> Self {
        Self {
            slug: slug.to_string(),
            scripts_dir: scripts_dir.to_path_buf(),
            printer_data_dir: printer_data_dir.to_path_buf(),
        }
    }

    /// Full path of the script for this component
    pub fn script_path(&self) -> PathBuf {
        self.scripts_dir.join(format!("{}.sh", self.slug))
    }
}

impl ScriptArgs for ComponentScriptArgs {
    fn program(&self) -> String {
        "bash".to_string()
    }

    fn to_cli_args(&self) -> Vec<String> {
        vec![
            self.script_path().display().to_string(),
            "--component".to_string(),
            self.slug.clone(),
            "--printer-data".to_string(),
            self.printer_data_dir.display().to_string(),
        ]
    }

    fn get_env_vars(&self) -> Vec<(String, String)> {
        vec![
            (ENV_COMPONENT.to_string(), self.slug.clone()),
            (
                ENV_PRINTER_DATA.to_string(),
                self.printer_data_dir.display().to_string(),
            ),
        ]
    }
}
