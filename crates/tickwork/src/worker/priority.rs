//! Worker priority hints

use std::fmt;
use std::str::FromStr;

/// Advisory scheduling priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum Priority {
    /// Yield to everything else
    Min = 0,
    /// Host default
    #[default]
    Normal = 1,
    /// Prefer this worker
    Max = 2,
}

impl Priority {
    /// Get priority name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Min => "min",
            Self::Normal => "normal",
            Self::Max => "max",
        }
    }

    /// Niceness applied to the worker thread
    pub fn nice(&self) -> i32 {
        match self {
            Self::Min => 10,
            Self::Normal => 0,
            Self::Max => -5,
        }
    }

    pub(crate) fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Min,
            2 => Self::Max,
            _ => Self::Normal,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unrecognized priority name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown priority: {0} (expected min, norm or max)")]
pub struct ParsePriorityError(pub String);

impl FromStr for Priority {
    type Err = ParsePriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "min" | "low" => Ok(Self::Min),
            "norm" | "normal" => Ok(Self::Normal),
            "max" | "high" => Ok(Self::Max),
            _ => Err(ParsePriorityError(s.to_string())),
        }
    }
}

/// Id of the calling thread as seen by the OS scheduler
#[cfg(target_os = "linux")]
pub(crate) fn current_thread_id() -> i64 {
    // SAFETY: gettid has no preconditions
    i64::from(unsafe { libc::gettid() })
}

#[cfg(not(target_os = "linux"))]
pub(crate) fn current_thread_id() -> i64 {
    0
}

/// Apply `priority` to the thread with OS id `tid`
#[cfg(target_os = "linux")]
pub(crate) fn apply(tid: i64, priority: Priority) -> std::io::Result<()> {
    // SAFETY: setpriority only reads its integer arguments
    let rc = unsafe { libc::setpriority(libc::PRIO_PROCESS, tid as libc::id_t, priority.nice()) };
    if rc == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

#[cfg(not(target_os = "linux"))]
pub(crate) fn apply(_tid: i64, _priority: Priority) -> std::io::Result<()> {
    Ok(())
}
