// Wed Feb 4 2026 - Alex

pub mod error;
pub mod filter;
pub mod maps;
pub mod peek;
pub mod pidmem;
pub mod region;
pub mod window;

pub use error::MemoryError;
pub use filter::RegionView;
pub use maps::RegionSet;
pub use peek::{PtracePeeker, WordPeeker, NATIVE_WORD};
pub use pidmem::PidMem;
pub use region::{CowKind, Perms, Region};
pub use window::{Alignment, FileWindows, PeekWindows, Window, WindowSource, WINDOW_BYTES};
