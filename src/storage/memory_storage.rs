use crate::{
    error::{KanbanError, Result},
    storage::Storage,
};
use std::collections::HashMap;

/// In-memory storage with an optional size limit
///
/// Mirrors browser local storage closely enough for tests and for hosts
/// without a real backend: a write that would push the total size of keys
/// and values past the quota fails and leaves the old value in place.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
    quota: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limits the total bytes of keys plus values
    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: HashMap::new(),
            quota: Some(quota),
        }
    }

    /// Seeds a value directly, bypassing the quota
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    fn used_without(&self, key: &str) -> usize {
        self.entries
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        if let Some(quota) = self.quota {
            let needed = self.used_without(key) + key.len() + value.len();
            if needed > quota {
                return Err(KanbanError::Storage(format!(
                    "quota exceeded: {} of {} bytes",
                    needed, quota
                )));
            }
        }

        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
