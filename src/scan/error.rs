// Thu Feb 5 2026 - Alex

use thiserror::Error;

use crate::memory::MemoryError;
use crate::store::StoreError;
use crate::value::NeedleError;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("memory error: {0}")]
    Memory(#[from] MemoryError),
    #[error("match store error: {0}")]
    Store(#[from] StoreError),
    #[error("needle error: {0}")]
    Needle(#[from] NeedleError),
    #[error("unknown range bound flags: {0:?}")]
    InvalidRangeFlag(String),
    #[error("pass cancelled")]
    Cancelled,
}
