//! In-app browser requests and their navigation policy
//!
//! The host's browser view consults [`NavigationPolicy::decide`] for every
//! navigation and [`NavigationPolicy::redirect_after_load`] whenever a page
//! finishes loading.

use bridge_traits::web::NavigationMode;
use serde::Serialize;
use url::Url;

use crate::error::{CoreError, Result};

/// Whether the browser may follow a navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NavigationDecision {
    Allow,
    Cancel,
}

/// Per-invocation navigation rules for one browser view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationPolicy {
    #[serde(serialize_with = "serialize_url")]
    initial: Url,
    mode: NavigationMode,
    blocked_schemes: Vec<String>,
}

impl NavigationPolicy {
    pub fn new(
        initial_url: &str,
        mode: NavigationMode,
        blocked_schemes: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<Self> {
        let initial = Url::parse(initial_url).map_err(|e| CoreError::InvalidUrl {
            url: initial_url.to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            initial,
            mode,
            blocked_schemes: blocked_schemes
                .into_iter()
                .map(|scheme| scheme.into().to_ascii_lowercase())
                .collect(),
        })
    }

    pub fn initial_url(&self) -> &str {
        self.initial.as_str()
    }

    pub fn mode(&self) -> NavigationMode {
        self.mode
    }

    /// Decide whether `url` may be loaded.
    ///
    /// App-launching custom schemes are always cancelled, `about:` pages are
    /// always allowed, and http(s) pages are allowed freely or only when they
    /// are the initial page, depending on the mode. Anything else, including
    /// unparseable input, is cancelled.
    pub fn decide(&self, url: &str) -> NavigationDecision {
        let Ok(target) = Url::parse(url) else {
            return NavigationDecision::Cancel;
        };

        let scheme = target.scheme();
        if self.blocked_schemes.iter().any(|blocked| blocked == scheme) {
            return NavigationDecision::Cancel;
        }

        match scheme {
            "about" => NavigationDecision::Allow,
            "http" | "https" => match self.mode {
                NavigationMode::Free => NavigationDecision::Allow,
                NavigationMode::LockedToInitial if target == self.initial => {
                    NavigationDecision::Allow
                }
                NavigationMode::LockedToInitial => NavigationDecision::Cancel,
            },
            _ => NavigationDecision::Cancel,
        }
    }

    /// After a page finished loading on `current`, the URL the view must be
    /// sent back to, if any.
    ///
    /// Only locked views redirect: pages can still move through scripts or
    /// server redirects that bypassed [`decide`](Self::decide).
    pub fn redirect_after_load(&self, current: &str) -> Option<String> {
        if self.mode != NavigationMode::LockedToInitial {
            return None;
        }

        match Url::parse(current) {
            Ok(url) if url == self.initial => None,
            Ok(url) if url.scheme() == "about" => None,
            _ => Some(self.initial.to_string()),
        }
    }
}

fn serialize_url<S: serde::Serializer>(url: &Url, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(url.as_str())
}

/// A request for the UI to open the in-app browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrowserRequest {
    pub url: String,
    pub policy: NavigationPolicy,
}

impl BrowserRequest {
    pub fn new(
        url: &str,
        mode: NavigationMode,
        blocked_schemes: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<Self> {
        let policy = NavigationPolicy::new(url, mode, blocked_schemes)?;
        Ok(Self {
            url: policy.initial_url().to_string(),
            policy,
        })
    }
}
