// Wed Feb 4 2026 - Alex

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("permission denied for process {0}")]
    PermissionDenied(i32),
    #[error("process {0} is gone")]
    TargetGone(i32),
    #[error("malformed maps line: {0:?}")]
    MalformedMapLine(String),
    #[error("peek failed at address 0x{0:x}")]
    PeekFailed(u64),
}

impl MemoryError {
    /// Classify an OS error against the given target process.
    pub fn from_os(pid: i32, err: std::io::Error) -> Self {
        match err.raw_os_error() {
            Some(code) if code == libc::ESRCH => Self::TargetGone(pid),
            Some(code) if code == libc::EPERM || code == libc::EACCES => {
                Self::PermissionDenied(pid)
            }
            _ => Self::Io(err),
        }
    }

    /// True when the whole pass should abort rather than drop one candidate.
    pub fn is_fatal_for_pass(&self) -> bool {
        matches!(self, Self::PermissionDenied(_) | Self::TargetGone(_))
    }
}
