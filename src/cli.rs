use clap::{ArgAction, ArgGroup, Parser};
use std::path::PathBuf;

use crate::config_file::InstallerConfig;

/// klipkit - pick and install add-ons for a Klipper 3D printer
#[derive(Parser, Debug)]
#[command(name = "klipkit")]
#[command(about = "Installs optional add-ons onto a Klipper 3D printer host")]
#[command(version)]
#[command(group(ArgGroup::new("mode").args(["list", "gui", "components"])))]
pub struct Cli {
    /// Print the available components and exit
    #[arg(short, long)]
    pub list: bool,

    /// Choose components in an interactive terminal selector
    #[arg(short, long)]
    pub gui: bool,

    /// Install exactly these components (by slug)
    #[arg(short, long, num_args = 1.., value_name = "SLUG")]
    pub components: Option<Vec<String>>,

    /// Show the resolved install plan without running anything.
    ///
    /// Needs no root privileges.
    #[arg(long)]
    pub dry_run: bool,

    /// JSON settings file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory holding the per-component install scripts
    #[arg(long, value_name = "DIR")]
    pub scripts_dir: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Where the component selection comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionSource {
    /// `--list`: nothing is selected, the catalog is printed
    List,
    /// `--gui`
    Interactive,
    /// `--components`
    Explicit(Vec<String>),
    /// No mode flag: the registry defaults
    Defaults,
}

impl Cli {
    pub fn parse_args() -> Self {
        <Self as clap::Parser>::parse()
    }

    pub fn selection_source(&self) -> SelectionSource {
        if self.list {
            SelectionSource::List
        } else if self.gui {
            SelectionSource::Interactive
        } else if let Some(slugs) = &self.components {
            SelectionSource::Explicit(slugs.clone())
        } else {
            SelectionSource::Defaults
        }
    }

    /// Default log filter directive for `-v` count
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }

    /// Apply command-line overrides on top of the settings file
    pub fn apply_overrides(&self, config: &mut InstallerConfig) {
        if let Some(dir) = &self.scripts_dir {
            config.scripts_dir = dir.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_no_args_uses_defaults() {
        let cli = Cli::try_parse_from(["klipkit"]).unwrap();
        assert_eq!(cli.selection_source(), SelectionSource::Defaults);
        assert!(!cli.dry_run);
        assert_eq!(cli.log_level(), "info");
    }

    #[test]
    fn test_cli_list_short_and_long() {
        for flag in ["-l", "--list"] {
            let cli = Cli::try_parse_from(["klipkit", flag]).unwrap();
            assert_eq!(cli.selection_source(), SelectionSource::List);
        }
    }

    #[test]
    fn test_cli_gui() {
        let cli = Cli::try_parse_from(["klipkit", "-g"]).unwrap();
        assert_eq!(cli.selection_source(), SelectionSource::Interactive);
    }

    #[test]
    fn test_cli_components() {
        let cli = Cli::try_parse_from(["klipkit", "--components", "kamp", "overrides", "cleanup"])
            .unwrap();
        assert_eq!(
            cli.selection_source(),
            SelectionSource::Explicit(vec![
                "kamp".to_string(),
                "overrides".to_string(),
                "cleanup".to_string()
            ])
        );
    }

    #[test]
    fn test_cli_components_requires_a_slug() {
        assert!(Cli::try_parse_from(["klipkit", "-c"]).is_err());
    }

    #[test]
    fn test_cli_modes_are_exclusive() {
        assert!(Cli::try_parse_from(["klipkit", "--list", "--gui"]).is_err());
        assert!(Cli::try_parse_from(["klipkit", "-g", "-c", "kamp"]).is_err());
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::try_parse_from([
            "klipkit",
            "--dry-run",
            "--scripts-dir",
            "/opt/scripts",
            "-vv",
        ])
        .unwrap();
        let mut config = InstallerConfig::default();
        cli.apply_overrides(&mut config);

        assert!(cli.dry_run);
        assert_eq!(config.scripts_dir, PathBuf::from("/opt/scripts"));
        assert_eq!(cli.log_level(), "trace");
    }
}
