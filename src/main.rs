//! klipkit - main entry point
//!
//! Parses the command line, picks the selection source and hands the
//! confirmed selection to the orchestrator. Every path ends in an explicit
//! exit code.

use std::collections::BTreeSet;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use klipkit::app::select_interactively;
use klipkit::cli::{Cli, SelectionSource};
use klipkit::config_file::InstallerConfig;
use klipkit::error::{exit_code, KlipkitError, Result};
use klipkit::hooks::HostHooks;
use klipkit::logic::InstallOrchestrator;
use klipkit::process_guard::{self, ProcessGuard};
use klipkit::registry::ComponentRegistry;
use klipkit::sanity;
use klipkit::summary::{format_component_list, format_install_summary, format_plan};

/// Initialize the tracing subscriber. `RUST_LOG` overrides `default_level`.
fn init_logger(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .init();
}

fn main() {
    let cli = Cli::parse_args();
    init_logger(cli.log_level());
    debug!(?cli, "CLI arguments parsed");

    let code = match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            eprintln!("✗ {}", e);
            e.exit_code()
        }
    };
    std::process::exit(code);
}

fn load_config(cli: &Cli) -> Result<InstallerConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            info!("Loading settings from {:?}", path);
            InstallerConfig::load_from_file(path)
                .map_err(|e| KlipkitError::config(format!("{:#}", e)))?
        }
        None => InstallerConfig::default(),
    };
    cli.apply_overrides(&mut config);
    config
        .validate()
        .map_err(|e| KlipkitError::config(format!("{:#}", e)))?;
    Ok(config)
}

fn run(cli: &Cli) -> Result<i32> {
    let registry = ComponentRegistry::builtin()?;
    let source = cli.selection_source();

    if source == SelectionSource::List {
        print!("{}", format_component_list(&registry));
        return Ok(exit_code::SUCCESS);
    }

    let config = load_config(cli)?;
    if !cli.dry_run {
        sanity::run_preflight_checks(&config.scripts_dir)?;
    }

    if let Err(e) = process_guard::init_signal_handlers() {
        // Drop of the guard still stops running hooks
        warn!("Failed to initialize signal handlers: {}", e);
    }
    let _guard = ProcessGuard::new();

    let selected: BTreeSet<String> = match source {
        SelectionSource::Interactive => {
            let state = select_interactively(&registry)?;
            match state.confirmed_selection() {
                Some(selected) => selected,
                None => {
                    info!("Selection cancelled by user");
                    println!("Installation cancelled by user.");
                    return Ok(exit_code::CANCELLED);
                }
            }
        }
        SelectionSource::Explicit(slugs) => slugs.into_iter().collect(),
        SelectionSource::Defaults | SelectionSource::List => registry.defaults(),
    };
    info!("Selected: {}", selected.iter().cloned().collect::<Vec<_>>().join(", "));

    let mut orchestrator =
        InstallOrchestrator::new(&registry, HostHooks::from_config(&config)).dry_run(cli.dry_run);

    if cli.dry_run {
        let plan = orchestrator.plan(&selected)?;
        print!("{}", format_plan(&plan));
    }

    let report = orchestrator.run(&selected)?;
    print!("{}", format_install_summary(&report));
    Ok(report.exit_code())
}
