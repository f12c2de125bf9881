// Thu Feb 5 2026 - Alex

pub mod cancel;
pub mod engine;
pub mod error;
pub mod narrow;
pub mod predicate;

pub use cancel::CancelToken;
pub use engine::ScanEngine;
pub use error::ScanError;
pub use predicate::{NarrowPredicate, RangeBounds, ScanPredicate};
