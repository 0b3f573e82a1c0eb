//! Key-value persistence layer
//!
//! The mood series and conversation log are stored as whole JSON blocks
//! under well-known string keys. The [`KvStore`] trait is that seam:
//! [`FileStore`] keeps one file per key under a data directory,
//! [`MemoryStore`] backs tests and ephemeral sessions.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::Result;

/// A flat string-keyed, string-valued store.
///
/// Reads are infallible by contract: any failure to read or decode a
/// value is collapsed into `None`, matching the degrade-to-empty policy
/// of the callers. Writes and removals report errors so callers can
/// decide whether to surface or swallow them.
pub trait KvStore {
    /// Return the value stored under `key`, or `None` if absent or
    /// unreadable.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, overwriting any prior value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove the value stored under `key`. Removing an absent key is
    /// not an error.
    fn remove(&self, key: &str) -> Result<()>;

    /// List every key currently present in the store, in no particular
    /// order.
    fn keys(&self) -> Vec<String>;
}

impl<T: KvStore + ?Sized> KvStore for &T {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }

    fn keys(&self) -> Vec<String> {
        (**self).keys()
    }
}
