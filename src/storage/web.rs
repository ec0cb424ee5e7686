use super::{Storage, StorageError};

/// The browser's `window.localStorage`.
#[derive(Clone, Debug)]
pub struct LocalStorage {
    inner: web_sys::Storage,
}

impl LocalStorage {
    /// Look up `localStorage` on the current window.
    pub fn new() -> Result<Self, StorageError> {
        let window = web_sys::window()
            .ok_or_else(|| StorageError::Unavailable("no global `window`".to_string()))?;
        let inner = window
            .local_storage()
            .map_err(|err| StorageError::Unavailable(describe(&err)))?
            .ok_or_else(|| StorageError::Unavailable("`localStorage` is disabled".to_string()))?;
        Ok(Self { inner })
    }
}

impl Storage for LocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner
            .get_item(key)
            .map_err(|err| StorageError::Unavailable(describe(&err)))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        // Quota exhaustion surfaces here as a `QuotaExceededError`.
        self.inner
            .set_item(key, value)
            .map_err(|err| StorageError::Rejected {
                key: key.to_string(),
                reason: describe(&err),
            })
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.inner
            .remove_item(key)
            .map_err(|err| StorageError::Rejected {
                key: key.to_string(),
                reason: describe(&err),
            })
    }
}

fn describe(err: &wasm_bindgen::JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}
