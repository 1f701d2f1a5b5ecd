//! Best-effort elevation of the worker thread (and, at `init` time, the
//! whole process) to the highest real-time scheduling class the host will
//! grant. Never fatal: a sandboxed or unprivileged process simply keeps
//! the default scheduling class, logged under `verbose`.

/// Raise the calling thread to `SCHED_FIFO` at its maximum priority on
/// Unix, or `THREAD_PRIORITY_TIME_CRITICAL` on Windows. Returns `true` on
/// success so callers can decide whether to log.
pub fn raise_thread_priority(verbose: bool) -> bool {
    let ok = platform::raise_thread_priority();
    if verbose && !ok {
        tracing::warn!("RSI: failed to raise worker thread priority, continuing at default");
    } else if verbose {
        tracing::info!("RSI: worker thread raised to real-time priority");
    }
    ok
}

/// Process-wide tuning applied once at `init`: raised process priority on
/// Windows, and (where the platform requires it) high-resolution timers.
/// On Unix this is a no-op beyond logging — per-thread `SCHED_FIFO` at
/// `Start` is what actually matters for cycle latency.
pub fn apply_process_tuning(verbose: bool) {
    platform::apply_process_tuning(verbose);
}

/// Undo whatever `apply_process_tuning` did that needs explicit teardown.
pub fn cleanup_process_tuning(verbose: bool) {
    platform::cleanup_process_tuning(verbose);
}

#[cfg(unix)]
mod platform {
    /// `sched_setscheduler(0, ...)` with pid `0` targets the calling
    /// thread's scheduling policy on Linux, where each pthread has its
    /// own scheduler-visible identity distinct from the process PID.
    pub fn raise_thread_priority() -> bool {
        let max_priority = unsafe { libc::sched_get_priority_max(libc::SCHED_FIFO) };
        if max_priority < 0 {
            return false;
        }
        let param = libc::sched_param { sched_priority: max_priority };
        let rc = unsafe { libc::sched_setscheduler(0, libc::SCHED_FIFO, &param) };
        rc == 0
    }

    pub fn apply_process_tuning(verbose: bool) {
        // Best-effort: bump the process's nice value. Requires no special
        // capability on most Linux configurations (within the rlimit),
        // unlike SCHED_FIFO which usually does.
        let rc = unsafe { libc::setpriority(libc::PRIO_PROCESS, 0, -5) };
        if rc != 0 && verbose {
            tracing::warn!("RSI: failed to raise process priority (nice value)");
        }
    }

    pub fn cleanup_process_tuning(_verbose: bool) {
        // Nothing to undo: nice value and per-thread SCHED_FIFO both
        // revert automatically when the process/thread exits.
    }
}

#[cfg(windows)]
mod platform {
    use windows_sys::Win32::Media::{timeBeginPeriod, timeEndPeriod};
    use windows_sys::Win32::System::Threading::{
        GetCurrentProcess, GetCurrentThread, SetPriorityClass, SetThreadPriority,
        HIGH_PRIORITY_CLASS, THREAD_PRIORITY_TIME_CRITICAL,
    };

    pub fn raise_thread_priority() -> bool {
        unsafe { SetThreadPriority(GetCurrentThread(), THREAD_PRIORITY_TIME_CRITICAL) != 0 }
    }

    pub fn apply_process_tuning(verbose: bool) {
        unsafe {
            // 1 ms timer resolution, matching the original's timeBeginPeriod(1).
            timeBeginPeriod(1);
            if SetPriorityClass(GetCurrentProcess(), HIGH_PRIORITY_CLASS) == 0 && verbose {
                tracing::warn!("RSI: failed to raise process priority class");
            }
        }
    }

    pub fn cleanup_process_tuning(_verbose: bool) {
        unsafe {
            timeEndPeriod(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raising_priority_never_panics_regardless_of_privilege() {
        // CI/sandboxed environments typically lack CAP_SYS_NICE, so this
        // only asserts the call completes, not that it succeeds.
        let _ = raise_thread_priority(false);
    }
}
