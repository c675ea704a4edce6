//! Non-fatal error types. Fatal conditions (§7: allocation failure, a
//! corrupt maps file, unwinder address-space/cursor init failure) are not
//! represented here — they panic where they're detected, matching the
//! teacher's posture of asserting invariants it considers structural.

use std::fmt;

#[derive(Debug)]
pub enum UnwindError {
    /// `/proc/<pid>/maps` could not be opened. Non-fatal per §7: the cache
    /// stays empty and callers treat that as "unavailable".
    MapsUnavailable { pid: i32, source: std::io::Error },
    /// The unwinder's cursor could not read a register mid-walk. Non-fatal
    /// per §7: the walk stops where it is.
    RegisterReadFailed { pid: i32 },
}

impl fmt::Display for UnwindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnwindError::MapsUnavailable { pid, source } => {
                write!(f, "fopen /proc/{}/maps: {}", pid, source)
            }
            UnwindError::RegisterReadFailed { pid } => {
                write!(f, "can't walk the stack of process {}", pid)
            }
        }
    }
}

impl std::error::Error for UnwindError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UnwindError::MapsUnavailable { source, .. } => Some(source),
            UnwindError::RegisterReadFailed { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, UnwindError>;
