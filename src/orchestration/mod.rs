pub mod sync;

pub use sync::{SyncError, Synchronizer};
