//! Typed arguments for `systemctl` invocations made by the cleanup scheduler.

use crate::script_traits::ScriptArgs;

// ============================================================================
// systemctl
// ============================================================================

/// Supported `systemctl` actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemctlAction {
    /// `systemctl daemon-reload`
    DaemonReload,
    /// `systemctl enable --now <unit>`
    EnableNow(String),
}

/// Type-safe arguments for `systemctl`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemctlArgs {
    pub action: SystemctlAction,
}

impl SystemctlArgs {
    pub fn daemon_reload() -> Self {
        Self {
            action: SystemctlAction::DaemonReload,
        }
    }

    pub fn enable_now(unit: &str) -> Self {
        Self {
            action: SystemctlAction::EnableNow(unit.to_string()),
        }
    }
}

impl ScriptArgs for SystemctlArgs {
    fn program(&self) -> String {
        "systemctl".to_string()
    }

    fn to_cli_args(&self) -> Vec<String> {
        match &self.action {
            SystemctlAction::DaemonReload => vec!["daemon-reload".to_string()],
            SystemctlAction::EnableNow(unit) => {
                vec!["enable".to_string(), "--now".to_string(), unit.clone()]
            }
        }
    }
}
