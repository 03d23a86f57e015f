//! Bundled web assets.
//!
//! The landing page template ships inside the binary; callers address
//! assets by path (`/index.html`), the leading slash is optional.

use std::borrow::Cow;
use std::collections::HashMap;

use rust_embed::RustEmbed;

/// Read-only virtual filesystem of named assets.
pub trait AssetSource: Send + Sync {
    /// Contents of the asset at `path`, or `None` when absent.
    fn open(&self, path: &str) -> Option<Cow<'static, [u8]>>;
}

/// Assets compiled into the binary from `web_assets/`.
#[derive(RustEmbed)]
#[folder = "web_assets/"]
pub struct WebAssets;

impl AssetSource for WebAssets {
    fn open(&self, path: &str) -> Option<Cow<'static, [u8]>> {
        WebAssets::get(path.trim_start_matches('/')).map(|file| file.data)
    }
}

/// In-memory assets, handy for swapping the page out in tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssets {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an asset.
    pub fn with(mut self, path: &str, contents: impl Into<Vec<u8>>) -> Self {
        self.files
            .insert(path.trim_start_matches('/').to_string(), contents.into());
        self
    }
}

impl AssetSource for MemoryAssets {
    fn open(&self, path: &str) -> Option<Cow<'static, [u8]>> {
        self.files
            .get(path.trim_start_matches('/'))
            .map(|contents| Cow::Owned(contents.clone()))
    }
}
