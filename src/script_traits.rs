//! Typed contracts for external commands.
//!
//! Hook scripts and supervisor commands are described by structs that
//! implement [`ScriptArgs`]; the runner never assembles flags from loose
//! strings. A flag rename is then a compile error, not a silent no-op.

/// Typed arguments for one external invocation.
///
/// # Contract
///
/// - `program()`: what to execute, relative names are resolved by the runner
/// - `to_cli_args()`: arguments exactly as the program expects them
/// - `get_env_vars()`: extra environment for the child
pub trait ScriptArgs {
    fn program(&self) -> String;

    fn to_cli_args(&self) -> Vec<String>;

    fn get_env_vars(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    /// `program` plus arguments, for logs and dry-run output
    fn display_command(&self) -> String {
        std::iter::once(self.program())
            .chain(self.to_cli_args())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
