//! Embedded Web Content Abstraction
//!
//! An in-process web rendering surface (`WKWebView`, Android `WebView`). The
//! core uses it hidden, to host a third-party embeddable video player, and the
//! UI uses a visible one as a restricted browser.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::Result;

/// Callback invoked when the view finishes loading a page.
pub type LoadHandler = Arc<dyn Fn() + Send + Sync>;

/// How far a browser view may navigate away from the page it was opened on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationMode {
    /// Only the initial URL may be shown (read-only browsing).
    LockedToInitial,
    /// Any http(s) page may be visited.
    Free,
}

/// Hidden web view driven by script commands.
///
/// Script evaluation is fire-and-forget: `Ok(())` means the script was handed
/// to the view, not that the page acted on it.
#[async_trait]
pub trait WebContentView: Send + Sync {
    /// Replace the current page with `html`, resolving relative URLs against `base_url`.
    async fn load_html(&self, html: &str, base_url: &str) -> Result<()>;

    /// Evaluate `script` in the current page.
    async fn evaluate_script(&self, script: &str) -> Result<()>;

    /// Install (or with `None`, remove) the page-load-finished callback.
    fn set_load_handler(&self, handler: Option<LoadHandler>);
}
