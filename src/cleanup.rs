//! Periodic pruning of Klipper config backups.
//!
//! Every `SAVE_CONFIG` leaves a `printer-<timestamp>.cfg` behind. Selecting the
//! `cleanup` component registers a timer with the host service supervisor that
//! keeps only the newest few of those files.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::config_file::InstallerConfig;
use crate::logic::HookOutcome;
use crate::script_runner::run_script_safe;
use crate::scripts::systemctl::SystemctlArgs;
use crate::types::CleanupInterval;

/// Base name of the generated systemd units
pub const UNIT_NAME: &str = "printer-backup-cleanup";

/// Which matching files survive a cleanup run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionPolicy {
    /// Shell glob, relative to the target directory
    pub pattern: String,
    /// Newest files (by mtime) that are always kept
    pub keep_latest: u32,
}

/// A periodic job description handed to the service supervisor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupJob {
    pub interval: CleanupInterval,
    pub target_dir: PathBuf,
    pub retention: RetentionPolicy,
}

impl CleanupJob {
    pub fn from_config(config: &InstallerConfig) -> Self {
        Self {
            interval: config.cleanup.interval,
            target_dir: config.cleanup_target_dir(),
            retention: RetentionPolicy {
                pattern: config.cleanup.pattern.trim().to_string(),
                keep_latest: config.cleanup.keep_latest,
            },
        }
    }

    /// The shell pipeline that deletes everything but the newest files
    pub fn prune_command(&self) -> String {
        format!(
            "cd \"{}\" && ls -1t -- {} 2>/dev/null | tail -n +{} | tr \"\\n\" \"\\0\" | xargs -r0 rm -f --",
            self.target_dir.display(),
            self.retention.pattern,
            u64::from(self.retention.keep_latest) + 1
        )
    }

    fn check_renderable(&self) -> Result<()> {
        let dir = self.target_dir.to_string_lossy();
        if dir.contains(['"', '\'', '\n']) {
            anyhow::bail!("Cleanup target {:?} contains quote or newline characters", dir);
        }
        if self.retention.pattern.contains(['/', '\'', '\n']) {
            anyhow::bail!("Cleanup pattern {:?} is not a plain file glob", self.retention.pattern);
        }
        Ok(())
    }
}

/// systemd expands `%` specifiers and C-style `\` escapes inside unit files
fn escape_unit_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('%', "%%")
}

/// Contents of `<UNIT_NAME>.service`
pub fn render_service_unit(job: &CleanupJob) -> String {
    format!(
        "[Unit]\n\
         Description=Prune old Klipper config backups in {dir}\n\
         \n\
         [Service]\n\
         Type=oneshot\n\
         ExecStart=/bin/sh -c '{cmd}'\n",
        dir = escape_unit_value(&job.target_dir.display().to_string()),
        cmd = escape_unit_value(&job.prune_command()),
    )
}

/// Contents of `<UNIT_NAME>.timer`
pub fn render_timer_unit(job: &CleanupJob) -> String {
    format!(
        "[Unit]\n\
         Description=Run {name} {interval}\n\
         \n\
         [Timer]\n\
         OnCalendar={calendar}\n\
         Persistent=true\n\
         Unit={name}.service\n\
         \n\
         [Install]\n\
         WantedBy=timers.target\n",
        name = UNIT_NAME,
        interval = job.interval,
        calendar = job.interval.on_calendar(),
    )
}

/// The host service supervisor, as seen by the cleanup scheduler
pub trait ServiceSupervisor {
    /// Install and start `job`. Returns a short description of what was
    /// registered.
    fn register_periodic(&mut self, job: &CleanupJob) -> Result<String>;
}

/// Registers jobs as a systemd service + timer pair
#[derive(Debug, Clone)]
pub struct SystemdSupervisor {
    unit_dir: PathBuf,
}

impl SystemdSupervisor {
    pub fn new(unit_dir: impl Into<PathBuf>) -> Self {
        Self {
            unit_dir: unit_dir.into(),
        }
    }

    /// Write both unit files, returning (service, timer) paths
    pub fn write_units(&self, job: &CleanupJob) -> Result<(PathBuf, PathBuf)> {
        job.check_renderable()?;
        fs::create_dir_all(&self.unit_dir)
            .with_context(|| format!("Failed to create unit directory {:?}", self.unit_dir))?;

        let service = self.unit_dir.join(format!("{}.service", UNIT_NAME));
        let timer = self.unit_dir.join(format!("{}.timer", UNIT_NAME));
        fs::write(&service, render_service_unit(job))
            .with_context(|| format!("Failed to write {:?}", service))?;
        fs::write(&timer, render_timer_unit(job))
            .with_context(|| format!("Failed to write {:?}", timer))?;
        debug!(?service, ?timer, "Wrote cleanup units");
        Ok((service, timer))
    }
}

impl ServiceSupervisor for SystemdSupervisor {
    fn register_periodic(&mut self, job: &CleanupJob) -> Result<String> {
        self.write_units(job)?;

        run_script_safe(&SystemctlArgs::daemon_reload())?
            .ensure_success("systemctl daemon-reload")?;
        let timer = format!("{}.timer", UNIT_NAME);
        run_script_safe(&SystemctlArgs::enable_now(&timer))?
            .ensure_success("systemctl enable")?;

        Ok(format!("{} enabled ({})", timer, job.interval))
    }
}

/// Applies the `cleanup` component
pub struct CleanupScheduler<S> {
    supervisor: S,
    job: CleanupJob,
}

impl<S: ServiceSupervisor> CleanupScheduler<S> {
    pub fn new(supervisor: S, job: CleanupJob) -> Self {
        Self { supervisor, job }
    }

    pub fn apply(&mut self) -> HookOutcome {
        info!(
            target_dir = %self.job.target_dir.display(),
            keep = self.job.retention.keep_latest,
            "Registering backup cleanup ({})",
            self.job.interval
        );
        match self.supervisor.register_periodic(&self.job) {
            Ok(detail) => HookOutcome::ok(detail),
            Err(e) => HookOutcome::failed(format!("{:#}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn job() -> CleanupJob {
        CleanupJob {
            interval: CleanupInterval::Weekly,
            target_dir: PathBuf::from("/home/pi/printer_data/config"),
            retention: RetentionPolicy {
                pattern: "printer-*.cfg".to_string(),
                keep_latest: 5,
            },
        }
    }

    struct Recording {
        jobs: Vec<CleanupJob>,
        fail_with: Option<&'static str>,
    }

    impl ServiceSupervisor for Recording {
        fn register_periodic(&mut self, job: &CleanupJob) -> Result<String> {
            self.jobs.push(job.clone());
            match self.fail_with {
                Some(msg) => anyhow::bail!(msg),
                None => Ok("registered".to_string()),
            }
        }
    }

    #[test]
    fn test_job_from_config_defaults() {
        let job = CleanupJob::from_config(&InstallerConfig::default());
        assert_eq!(job.interval, CleanupInterval::Daily);
        assert_eq!(job.target_dir, PathBuf::from("/home/pi/printer_data/config"));
        assert_eq!(job.retention.keep_latest, 5);
    }

    #[test]
    fn test_prune_command_keeps_newest() {
        let cmd = job().prune_command();
        assert!(cmd.starts_with("cd \"/home/pi/printer_data/config\" && ls -1t -- printer-*.cfg"));
        assert!(cmd.contains("tail -n +6"));
    }

    #[test]
    fn test_render_timer_unit() {
        let timer = render_timer_unit(&job());
        assert!(timer.contains("OnCalendar=weekly\n"));
        assert!(timer.contains("Persistent=true\n"));
        assert!(timer.contains("Unit=printer-backup-cleanup.service\n"));
        assert!(timer.contains("WantedBy=timers.target"));
    }

    #[test]
    fn test_render_service_unit_escapes_percent() {
        let mut job = job();
        job.target_dir = PathBuf::from("/srv/100%");
        let service = render_service_unit(&job);
        assert!(service.contains("Type=oneshot\n"));
        assert!(service.contains("ExecStart=/bin/sh -c 'cd \"/srv/100%%\""));
    }

    #[test]
    fn test_render_service_unit_escapes_backslashes() {
        let service = render_service_unit(&job());
        assert!(service.contains(r#"| tr "\\n" "\\0" |"#));
        assert!(!service.contains(r#"tr "\n""#));
    }

    #[test]
    fn test_write_units() {
        let dir = tempdir().unwrap();
        let supervisor = SystemdSupervisor::new(dir.path().join("units"));
        let (service, timer) = supervisor.write_units(&job()).unwrap();

        assert_eq!(service.file_name().unwrap(), "printer-backup-cleanup.service");
        assert_eq!(fs::read_to_string(&timer).unwrap(), render_timer_unit(&job()));
    }

    #[test]
    fn test_write_units_rejects_quoted_target() {
        let dir = tempdir().unwrap();
        let mut job = job();
        job.target_dir = PathBuf::from("/tmp/it's");
        let supervisor = SystemdSupervisor::new(dir.path());
        assert!(supervisor.write_units(&job).is_err());
        assert!(!dir.path().join("printer-backup-cleanup.service").exists());
    }

    #[test]
    fn test_scheduler_success() {
        let supervisor = Recording {
            jobs: Vec::new(),
            fail_with: None,
        };
        let mut scheduler = CleanupScheduler::new(supervisor, job());
        let outcome = scheduler.apply();

        assert!(outcome.success);
        assert_eq!(outcome.detail, "registered");
        assert_eq!(scheduler.supervisor.jobs, vec![job()]);
    }

    #[test]
    fn test_scheduler_failure_detail() {
        let supervisor = Recording {
            jobs: Vec::new(),
            fail_with: Some("systemd is not running"),
        };
        let outcome = CleanupScheduler::new(supervisor, job()).apply();
        assert!(!outcome.success);
        assert_eq!(outcome.detail, "systemd is not running");
    }
}
