//! Process-level resource probes backing the performance monitor.
//!
//! # Design
//! - The probe is a trait seam so the monitor can be exercised with scripted
//!   values in tests.
//! - The production implementation owns a `sysinfo::System` behind a mutex so
//!   sampling takes `&self` and the probe can be shared across requests.

use std::sync::{Mutex, MutexGuard};

use sysinfo::{Pid, System};
use tracing::error;

/// On-demand reads of process memory, live task count, and CPU topology.
pub trait ResourceProbe: Send + Sync + 'static {
    /// Current resident memory of this process, in bytes.
    fn process_memory_bytes(&self) -> u64;

    /// Number of live tasks on the current async runtime.
    fn alive_tasks(&self) -> usize;

    /// Number of logical CPUs; always at least one.
    fn cpu_count(&self) -> usize;
}

/// Production probe reading from the OS via `sysinfo` and from the tokio
/// runtime metrics.
pub struct SystemProbe {
    system: Mutex<System>,
    pid: Pid,
}

impl SystemProbe {
    /// Construct a probe bound to the current process.
    #[must_use]
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new_all()),
            pid: Pid::from_u32(std::process::id()),
        }
    }

    fn lock_system(&self) -> MutexGuard<'_, System> {
        match self.system.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                error!("probe system mutex poisoned; continuing with recovered guard");
                poisoned.into_inner()
            }
        }
    }
}

impl Default for SystemProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceProbe for SystemProbe {
    fn process_memory_bytes(&self) -> u64 {
        let mut system = self.lock_system();
        system.refresh_process(self.pid);
        system.process(self.pid).map_or(0, |process| process.memory())
    }

    fn alive_tasks(&self) -> usize {
        tokio::runtime::Handle::try_current()
            .map_or(0, |handle| handle.metrics().num_alive_tasks())
    }

    fn cpu_count(&self) -> usize {
        self.lock_system().cpus().len().max(1)
    }
}
