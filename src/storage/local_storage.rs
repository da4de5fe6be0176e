use crate::{
    error::{KanbanError, Result},
    storage::Storage,
};

/// Browser `window.localStorage`
pub struct LocalStorage {
    inner: web_sys::Storage,
}

impl LocalStorage {
    /// Returns `None` when there is no window or storage is disabled
    pub fn from_window() -> Option<Self> {
        let window = web_sys::window()?;
        let inner = window.local_storage().ok().flatten()?;
        Some(Self { inner })
    }

    pub fn new(inner: web_sys::Storage) -> Self {
        Self { inner }
    }
}

fn storage_error(err: wasm_bindgen::JsValue) -> KanbanError {
    KanbanError::Storage(format!("{:?}", err))
}

impl Storage for LocalStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        self.inner.get_item(key).map_err(storage_error)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        // Throws QuotaExceededError when full
        self.inner.set_item(key, value).map_err(storage_error)
    }
}
