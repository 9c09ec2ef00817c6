//! Bearer token persistence.

use std::sync::Mutex;

pub use ngo_admin_shared::TOKEN_STORAGE_KEY;

/// Storage for the single bearer token.
///
/// Implementations never parse the token. An empty string is never reported
/// as a stored token.
pub trait TokenStore {
    fn get(&self) -> Option<String>;
    /// Returns `false` when the token could not be persisted.
    fn set(&self, token: &str) -> bool;
    fn clear(&self);
}

/// Process-local token store. Used natively and in tests; the browser build
/// uses `localStorage` instead.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        let store = Self::new();
        store.set(token);
        store
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.token
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Option<String> {
        self.slot().clone().filter(|t| !t.is_empty())
    }

    fn set(&self, token: &str) -> bool {
        *self.slot() = Some(token.to_string());
        true
    }

    fn clear(&self) {
        *self.slot() = None;
    }
}

impl<T: TokenStore + ?Sized> TokenStore for std::sync::Arc<T> {
    fn get(&self) -> Option<String> {
        (**self).get()
    }

    fn set(&self, token: &str) -> bool {
        (**self).set(token)
    }

    fn clear(&self) {
        (**self).clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_clear() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.get(), None);

        assert!(store.set("abc"));
        assert_eq!(store.get().as_deref(), Some("abc"));

        store.clear();
        assert_eq!(store.get(), None);
        store.clear();
        assert_eq!(store.get(), None);
    }

    #[test]
    fn empty_token_reads_as_absent() {
        let store = MemoryTokenStore::with_token("");
        assert_eq!(store.get(), None);
    }
}
