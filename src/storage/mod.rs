use crate::error::Result;

pub mod memory_storage;

#[cfg(feature = "file-storage")]
pub mod file_storage;

#[cfg(feature = "sqlite-storage")]
pub mod sqlite_storage;

#[cfg(feature = "web")]
pub mod local_storage;

pub use memory_storage::MemoryStorage;

#[cfg(feature = "file-storage")]
pub use file_storage::FileStorage;

#[cfg(feature = "sqlite-storage")]
pub use sqlite_storage::SqliteStorage;

#[cfg(feature = "web")]
pub use local_storage::LocalStorage;

/// Key-value backend that holds board snapshots
///
/// Calls complete synchronously. Failures come back as errors and the
/// caller decides whether they matter.
pub trait Storage {
    /// Reads the value stored under `key`, if any
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value
    fn write(&mut self, key: &str, value: &str) -> Result<()>;
}

impl<S: Storage + ?Sized> Storage for Box<S> {
    fn read(&self, key: &str) -> Result<Option<String>> {
        (**self).read(key)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).write(key, value)
    }
}
