//! LocalStorage 封装模块
//!
//! 使用 `web_sys::Storage` 实现浏览器端的 [`TokenStore`]。

use log::warn;
use ngo_admin::{TOKEN_STORAGE_KEY, TokenStore};

/// Token persisted in `localStorage` under [`TOKEN_STORAGE_KEY`].
///
/// Stateless: every call reads the browser storage, so a token written by
/// another tab is picked up on the next request.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalTokenStore;

impl LocalTokenStore {
    /// 获取 LocalStorage 实例
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }
}

impl TokenStore for LocalTokenStore {
    fn get(&self) -> Option<String> {
        Self::storage()?
            .get_item(TOKEN_STORAGE_KEY)
            .ok()?
            .filter(|token| !token.is_empty())
    }

    fn set(&self, token: &str) -> bool {
        let stored = Self::storage()
            .and_then(|s| s.set_item(TOKEN_STORAGE_KEY, token).ok())
            .is_some();
        if !stored {
            warn!("localStorage unavailable or full, token not persisted");
        }
        stored
    }

    fn clear(&self) {
        if let Some(storage) = Self::storage() {
            let _ = storage.remove_item(TOKEN_STORAGE_KEY);
        }
    }
}
