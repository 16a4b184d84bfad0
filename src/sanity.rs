//! Pre-flight checks for the mutating code paths
//!
//! Installing components needs:
//! - root privileges (EUID 0)
//! - `bash` and `systemctl` on PATH
//! - an existing component scripts directory
//!
//! Any failure aborts before the selector or a hook runs. `--list` and
//! `--dry-run` never call into this module.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info, warn};

use crate::error::{KlipkitError, Result};
use crate::process_guard::CommandProcessGroup;

/// Set to `1` or `true` to run without root (development only)
pub const SKIP_ROOT_ENV: &str = "KLIPKIT_SKIP_ROOT_CHECK";

/// Required runtime binaries
const REQUIRED_BINARIES: &[&str] = &[
    "bash",      // component install scripts
    "systemctl", // cleanup timer registration
];

/// Result of environment verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanityCheckResult {
    pub missing_binaries: Vec<String>,
    pub is_root: bool,
    /// Set when the scripts directory does not exist
    pub missing_scripts_dir: Option<PathBuf>,
}

impl SanityCheckResult {
    /// Returns true if all checks passed
    pub fn is_ok(&self) -> bool {
        self.missing_binaries.is_empty() && self.is_root && self.missing_scripts_dir.is_none()
    }

    /// Operator-facing explanation of every failed check
    pub fn describe(&self) -> String {
        let mut out = String::new();
        if !self.is_root {
            let _ = writeln!(
                out,
                "root privileges required; run with sudo (or use --list / --dry-run)"
            );
        }
        for binary in &self.missing_binaries {
            let _ = writeln!(out, "required binary not found in PATH: {}", binary);
        }
        if let Some(dir) = &self.missing_scripts_dir {
            let _ = writeln!(
                out,
                "component scripts directory {} does not exist (see --scripts-dir)",
                dir.display()
            );
        }
        out.trim_end().to_string()
    }
}

/// Check if a binary is available in PATH
fn binary_exists(name: &str) -> bool {
    Command::new("which")
        .arg(name)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .in_new_process_group()
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

fn is_running_as_root() -> bool {
    nix::unistd::geteuid().is_root()
}

fn should_skip_root_check() -> bool {
    std::env::var(SKIP_ROOT_ENV)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Perform all checks and return the result
pub fn verify_environment(scripts_dir: &Path) -> SanityCheckResult {
    let missing_binaries = REQUIRED_BINARIES
        .iter()
        .filter(|binary| !binary_exists(binary))
        .map(|binary| binary.to_string())
        .collect();

    SanityCheckResult {
        missing_binaries,
        is_root: is_running_as_root(),
        missing_scripts_dir: (!scripts_dir.is_dir()).then(|| scripts_dir.to_path_buf()),
    }
}

/// Verify the environment, turning any failure into a precondition error.
pub fn run_preflight_checks(scripts_dir: &Path) -> Result<()> {
    debug!("Running pre-flight checks (scripts_dir={})", scripts_dir.display());

    let mut result = verify_environment(scripts_dir);
    if !result.is_root && should_skip_root_check() {
        warn!("Root check skipped ({}=1)", SKIP_ROOT_ENV);
        result.is_root = true;
    }

    if !result.is_ok() {
        return Err(KlipkitError::precondition(result.describe()));
    }

    info!("Pre-flight checks passed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_binary_exists_bash() {
        assert!(binary_exists("bash"), "bash should be available");
    }

    #[test]
    fn test_binary_exists_nonexistent() {
        assert!(!binary_exists("this_binary_definitely_does_not_exist_12345"));
    }

    #[test]
    fn test_verify_environment_finds_bash_and_scripts_dir() {
        let dir = tempdir().unwrap();
        let result = verify_environment(dir.path());
        assert!(!result.missing_binaries.contains(&"bash".to_string()));
        assert_eq!(result.missing_scripts_dir, None);
    }

    #[test]
    fn test_missing_scripts_dir_fails() {
        let result = verify_environment(Path::new("/nonexistent/klipkit/scripts"));
        assert!(!result.is_ok());
        assert!(result.describe().contains("/nonexistent/klipkit/scripts"));
    }

    #[test]
    fn test_describe_lists_every_failure() {
        let result = SanityCheckResult {
            missing_binaries: vec!["systemctl".to_string()],
            is_root: false,
            missing_scripts_dir: None,
        };
        let text = result.describe();
        assert!(text.contains("root privileges required"));
        assert!(text.contains("systemctl"));
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn test_all_passing_is_ok() {
        let result = SanityCheckResult {
            missing_binaries: vec![],
            is_root: true,
            missing_scripts_dir: None,
        };
        assert!(result.is_ok());
        assert!(result.describe().is_empty());
    }
}
