//! Process execution for apply hooks
//!
//! [`run_script_safe`] is the only place that spawns hook processes. It
//! guarantees:
//!
//! - process-group isolation and parent-death signalling
//! - PID registration with [`ChildRegistry`] for the duration of the run
//! - arguments and environment taken from a typed [`ScriptArgs`]
//!
//! A non-zero exit is not an `Err`: it comes back as a [`ScriptOutput`] with
//! `success == false` so callers can turn it into a `Failed` result. `Err` is
//! reserved for "could not run at all".

use anyhow::{Context, Result};
use std::process::{Command, Stdio};
use tracing::{debug, info};

use crate::process_guard::{ChildRegistry, CommandProcessGroup};
use crate::script_traits::ScriptArgs;

/// Run `args` to completion, capturing stdout and stderr.
pub fn run_script_safe<T: ScriptArgs>(args: &T) -> Result<ScriptOutput> {
    let program = args.program();
    let cli_args = args.to_cli_args();
    let env_vars = args.get_env_vars();
    info!("Running: {}", args.display_command());
    debug!(env = ?env_vars, "Child environment");

    let mut cmd = Command::new(&program);
    cmd.args(&cli_args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .in_new_process_group();
    for (key, value) in &env_vars {
        cmd.env(key, value);
    }

    let child = cmd
        .spawn()
        .with_context(|| format!("Failed to spawn {}", program))?;
    let pid = child.id();
    if let Ok(mut registry) = ChildRegistry::global().lock() {
        registry.register(pid);
    }

    let waited = child.wait_with_output();

    if let Ok(mut registry) = ChildRegistry::global().lock() {
        registry.unregister(pid);
    }
    let output = waited.with_context(|| format!("Failed waiting for {}", program))?;

    let result = ScriptOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        exit_code: output.status.code(),
        success: output.status.success(),
    };
    debug!(
        exit_code = ?result.exit_code,
        success = result.success,
        "{} finished",
        program
    );
    Ok(result)
}

/// Captured result of one process run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptOutput {
    pub stdout: String,
    pub stderr: String,
    /// None when the process was killed by a signal
    pub exit_code: Option<i32>,
    pub success: bool,
}

impl ScriptOutput {
    /// One-line explanation of a failed run.
    ///
    /// The last non-empty stderr line is the most useful thing scripts print
    /// before dying; fall back to stdout, then to the exit status.
    pub fn failure_detail(&self) -> String {
        let last_line = |text: &str| {
            text.lines()
                .rev()
                .map(str::trim)
                .find(|l| !l.is_empty())
                .map(str::to_string)
        };
        last_line(&self.stderr)
            .or_else(|| last_line(&self.stdout))
            .unwrap_or_else(|| match self.exit_code {
                Some(code) => format!("exited with code {}", code),
                None => "terminated by signal".to_string(),
            })
    }

    /// Turn a failed run into an error carrying `failure_detail`.
    pub fn ensure_success(&self, context: &str) -> Result<()> {
        if self.success {
            Ok(())
        } else {
            anyhow::bail!("{}: {}", context, self.failure_detail())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Shell(&'static str);

    impl ScriptArgs for Shell {
        fn program(&self) -> String {
            "bash".to_string()
        }

        fn to_cli_args(&self) -> Vec<String> {
            vec!["-c".to_string(), self.0.to_string()]
        }

        fn get_env_vars(&self) -> Vec<(String, String)> {
            vec![("KLIPKIT_TEST".to_string(), "42".to_string())]
        }
    }

    fn output(stdout: &str, stderr: &str, exit_code: Option<i32>) -> ScriptOutput {
        ScriptOutput {
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            exit_code,
            success: exit_code == Some(0),
        }
    }

    #[test]
    fn test_run_success_captures_stdout_and_env() {
        let out = run_script_safe(&Shell("echo value=$KLIPKIT_TEST")).unwrap();
        assert!(out.success);
        assert_eq!(out.stdout.trim(), "value=42");
        assert!(out.ensure_success("echo").is_ok());
    }

    #[test]
    fn test_run_failure_is_not_an_error() {
        let out = run_script_safe(&Shell("echo fetching >&2; echo 'clone failed' >&2; exit 7"))
            .unwrap();
        assert!(!out.success);
        assert_eq!(out.exit_code, Some(7));
        assert_eq!(out.failure_detail(), "clone failed");
    }

    #[test]
    fn test_failure_detail_fallbacks() {
        assert_eq!(output("", "", Some(3)).failure_detail(), "exited with code 3");
        assert_eq!(output("", "", None).failure_detail(), "terminated by signal");
        assert_eq!(output("last words\n\n", "  \n", Some(1)).failure_detail(), "last words");
    }

    #[test]
    fn test_display_command() {
        assert_eq!(Shell("true").display_command(), "bash -c true");
    }

    #[test]
    fn test_ensure_success_message() {
        let err = output("", "no space left\n", Some(1))
            .ensure_success("systemctl enable")
            .unwrap_err();
        assert_eq!(err.to_string(), "systemctl enable: no space left");
    }
}
