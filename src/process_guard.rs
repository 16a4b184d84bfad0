//! Child process lifecycle for apply hooks
//!
//! Hook scripts clone repositories, build binaries and restart services. If
//! the installer is interrupted mid-hook, those children must not keep
//! writing into the printer's config directory on their own.
//!
//! - Every hook runs in its own process group with `PR_SET_PDEATHSIG`
//! - Running hook PIDs are tracked in a global [`ChildRegistry`]
//! - SIGINT/SIGTERM/SIGHUP terminate every tracked group before exiting
//! - Groups get a grace period after SIGTERM, then SIGKILL

use nix::libc;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, OnceLock};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

static CHILD_REGISTRY: OnceLock<Arc<Mutex<ChildRegistry>>> = OnceLock::new();

/// Grace period between SIGTERM and SIGKILL on signal-driven shutdown
const SIGNAL_GRACE: Duration = Duration::from_secs(3);

/// PIDs of running hook processes (each one a process-group leader)
#[derive(Debug, Default)]
pub struct ChildRegistry {
    pids: HashSet<u32>,
    terminating: bool,
}

impl ChildRegistry {
    /// The process-wide registry
    pub fn global() -> Arc<Mutex<ChildRegistry>> {
        CHILD_REGISTRY
            .get_or_init(|| Arc::new(Mutex::new(ChildRegistry::default())))
            .clone()
    }

    pub fn register(&mut self, pid: u32) {
        self.pids.insert(pid);
        debug!(pid, "Tracking hook process");
    }

    pub fn unregister(&mut self, pid: u32) {
        self.pids.remove(&pid);
        debug!(pid, "Hook process finished");
    }

    pub fn count(&self) -> usize {
        self.pids.len()
    }

    /// SIGTERM every tracked group, wait up to `grace`, then SIGKILL survivors.
    ///
    /// Only the first call does anything.
    pub fn terminate_all(&mut self, grace: Duration) {
        if self.terminating {
            return;
        }
        self.terminating = true;

        let pids: Vec<u32> = self.pids.drain().collect();
        if pids.is_empty() {
            return;
        }
        info!("Stopping {} running hook process(es)", pids.len());

        for &pid in &pids {
            signal_group_or_process(pid, Signal::SIGTERM);
        }

        let deadline = Instant::now() + grace;
        while Instant::now() < deadline {
            if !pids.iter().any(|&pid| is_process_alive(pid)) {
                return;
            }
            std::thread::sleep(Duration::from_millis(100));
        }

        for &pid in pids.iter().filter(|&&pid| is_process_alive(pid)) {
            warn!(pid, "Hook ignored SIGTERM, sending SIGKILL");
            signal_group_or_process(pid, Signal::SIGKILL);
        }
    }
}

/// Signal the whole group (negative PID), falling back to the leader alone.
fn signal_group_or_process(pid: u32, sig: Signal) {
    let raw = pid as i32;
    if let Err(e) = signal::kill(Pid::from_raw(-raw), sig) {
        debug!(pid, "Group signal failed ({}), signalling process", e);
        if let Err(e) = signal::kill(Pid::from_raw(raw), sig) {
            warn!(pid, "Failed to send {}: {}", sig, e);
        }
    }
}

/// True while the process exists and is not a zombie
fn is_process_alive(pid: u32) -> bool {
    if signal::kill(Pid::from_raw(pid as i32), None).is_err() {
        return false;
    }
    match std::fs::read_to_string(format!("/proc/{}/stat", pid)) {
        // Third field is the state letter
        Ok(stat) => !matches!(stat.split_whitespace().nth(2), Some("Z" | "X")),
        Err(_) => true,
    }
}

/// RAII guard that stops any still-running hook when dropped
pub struct ProcessGuard {
    registry: Arc<Mutex<ChildRegistry>>,
}

impl ProcessGuard {
    pub fn new() -> Self {
        Self {
            registry: ChildRegistry::global(),
        }
    }
}

impl Default for ProcessGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ProcessGuard {
    fn drop(&mut self) {
        if let Ok(mut registry) = self.registry.lock() {
            registry.terminate_all(Duration::from_secs(5));
        }
    }
}

/// Install SIGINT/SIGTERM/SIGHUP handlers that stop hooks, restore the
/// terminal if the selector holds it, and exit 128+signo.
///
/// Call once, before any hook is spawned.
pub fn init_signal_handlers() -> std::io::Result<()> {
    use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP])?;
    std::thread::spawn(move || {
        if let Some(sig) = signals.forever().next() {
            info!(signal = sig, "Interrupted, stopping hook processes");
            if let Ok(mut registry) = ChildRegistry::global().lock() {
                registry.terminate_all(SIGNAL_GRACE);
            }
            // process::exit skips destructors, so the selector's guard never runs
            if crate::app::restore_active_session() {
                debug!("Terminal restored after signal");
            }
            std::process::exit(128 + sig);
        }
    });
    Ok(())
}

/// Extension for `std::process::Command`: run the child as a new group leader
/// that dies with its parent.
pub trait CommandProcessGroup {
    fn in_new_process_group(&mut self) -> &mut Self;
}

impl CommandProcessGroup for std::process::Command {
    fn in_new_process_group(&mut self) -> &mut Self {
        use std::os::unix::process::CommandExt;
        // SAFETY: only async-signal-safe calls (setpgid, prctl) run between fork and exec
        unsafe {
            self.pre_exec(|| {
                nix::unistd::setpgid(Pid::from_raw(0), Pid::from_raw(0))
                    .map_err(std::io::Error::from)?;
                if libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGTERM) == -1 {
                    return Err(std::io::Error::last_os_error());
                }
                Ok(())
            });
        }
        self
    }
}
