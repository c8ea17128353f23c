//! Build tool lifecycle and interrupt handling
//!
//! Build tools run one at a time, each as leader of its own process group so
//! a Ctrl+C at the terminal reaches only the bootstrapper. While `SystemRunner`
//! waits on a tool it records the group in `ActiveTool::global()`, and clears
//! it once the tool has been reaped.
//!
//! The signal thread installed by `init_signal_handlers` stops the active
//! tool, prints a short message and exits. SIGINT is the operator cancelling
//! and exits 0; SIGTERM and SIGHUP exit with 128 + signal number.
//!
//! On Linux tools also get a parent-death signal, so a crashed bootstrapper
//! never leaves a half-finished `jake` running.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use tracing::{debug, info, warn};

use crate::theme::Theme;

static ACTIVE_TOOL: ActiveTool = ActiveTool::new();

/// Time a tool gets to exit after SIGTERM before its group is killed
const STOP_GRACE: Duration = Duration::from_secs(3);
const POLL: Duration = Duration::from_millis(50);

/// Process group of the build tool currently running, if any
#[derive(Debug, Default)]
pub struct ActiveTool {
    pgid: Mutex<Option<u32>>,
}

impl ActiveTool {
    pub const fn new() -> Self {
        Self {
            pgid: Mutex::new(None),
        }
    }

    /// Slot shared by `SystemRunner` and the signal thread
    pub fn global() -> &'static ActiveTool {
        &ACTIVE_TOOL
    }

    pub fn set(&self, pid: u32) {
        *self.slot() = Some(pid);
        debug!("tracking build tool PID {}", pid);
    }

    /// Clear the slot if it still holds `pid`
    pub fn clear(&self, pid: u32) {
        let mut slot = self.slot();
        if *slot == Some(pid) {
            *slot = None;
        }
    }

    pub fn current(&self) -> Option<u32> {
        *self.slot()
    }

    /// SIGTERM the active tool's process group, and SIGKILL it if the tool
    /// has not been reaped after `grace`.
    ///
    /// Returns false when no tool was running.
    pub fn stop(&self, grace: Duration) -> bool {
        let Some(pgid) = self.current() else {
            return false;
        };
        info!("stopping build tool (process group {})", pgid);

        // Negative PID addresses the whole group, so tools spawned by `jake` stop too
        let group = Pid::from_raw(-(pgid as i32));
        if let Err(e) = signal::kill(group, Signal::SIGTERM) {
            warn!("SIGTERM to process group {} failed: {}", pgid, e);
        }

        let deadline = Instant::now() + grace;
        while Instant::now() < deadline {
            if self.current() != Some(pgid) {
                return true;
            }
            thread::sleep(POLL);
        }

        warn!("process group {} ignored SIGTERM, sending SIGKILL", pgid);
        let _ = signal::kill(group, Signal::SIGKILL);
        true
    }

    fn slot(&self) -> MutexGuard<'_, Option<u32>> {
        self.pgid.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Exit status after being stopped by `sig`
pub fn interrupt_exit_code(sig: i32) -> i32 {
    if sig == signal_hook::consts::SIGINT {
        0
    } else {
        128 + sig
    }
}

/// Install SIGINT/SIGTERM/SIGHUP handling for the whole run.
///
/// Call once, before the first prompt.
pub fn init_signal_handlers() -> Result<(), std::io::Error> {
    use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP])?;

    thread::spawn(move || {
        if let Some(sig) = signals.forever().next() {
            info!("received signal {}, shutting down", sig);
            ActiveTool::global().stop(STOP_GRACE);

            eprintln!();
            eprintln!("{}{}", Theme::bullet(), Theme::warning("Interrupted. Bye."));
            std::process::exit(interrupt_exit_code(sig));
        }
    });

    Ok(())
}

/// Extension trait for `std::process::Command` to set up process groups
pub trait CommandProcessGroup {
    /// Run the command as leader of its own process group
    fn in_new_process_group(&mut self) -> &mut Self;
}

impl CommandProcessGroup for std::process::Command {
    fn in_new_process_group(&mut self) -> &mut Self {
        use std::os::unix::process::CommandExt;

        self.process_group(0);

        #[cfg(target_os = "linux")]
        unsafe {
            // Only async-signal-safe calls are allowed between fork and exec
            self.pre_exec(|| {
                if nix::libc::prctl(nix::libc::PR_SET_PDEATHSIG, nix::libc::SIGTERM) == -1 {
                    return Err(std::io::Error::last_os_error());
                }
                Ok(())
            });
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;

    /// Spawn `script` the way `SystemRunner` does and stop it through `slot`
    fn spawn_and_stop(script: &str, grace: Duration) -> ActiveTool {
        let slot = ActiveTool::new();
        let mut child = Command::new("sh")
            .args(["-c", script])
            .in_new_process_group()
            .spawn()
            .unwrap();
        let pid = child.id();
        slot.set(pid);

        thread::scope(|s| {
            s.spawn(|| {
                let _ = child.wait();
                slot.clear(pid);
            });
            // Give the shell time to install its traps
            thread::sleep(Duration::from_millis(200));
            assert!(slot.stop(grace));
        });
        slot
    }

    #[test]
    fn test_set_and_clear() {
        let slot = ActiveTool::new();
        assert_eq!(slot.current(), None);

        slot.set(1234);
        assert_eq!(slot.current(), Some(1234));

        // A stale PID does not clear a newer tool
        slot.clear(999);
        assert_eq!(slot.current(), Some(1234));

        slot.clear(1234);
        assert_eq!(slot.current(), None);
    }

    #[test]
    fn test_stop_without_tool() {
        assert!(!ActiveTool::new().stop(Duration::from_millis(10)));
    }

    #[test]
    fn test_stop_terminates_process_group() {
        let slot = spawn_and_stop("sleep 60", Duration::from_secs(3));
        assert_eq!(slot.current(), None);
    }

    #[test]
    fn test_stop_kills_tool_ignoring_sigterm() {
        let start = Instant::now();
        let slot = spawn_and_stop("trap '' TERM; sleep 60", Duration::from_millis(300));
        assert_eq!(slot.current(), None);
        assert!(start.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_interrupt_exit_codes() {
        assert_eq!(interrupt_exit_code(signal_hook::consts::SIGINT), 0);
        assert_eq!(interrupt_exit_code(signal_hook::consts::SIGTERM), 143);
        assert_eq!(interrupt_exit_code(signal_hook::consts::SIGHUP), 129);
    }
}
