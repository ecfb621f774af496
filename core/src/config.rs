/// Host-supplied configuration: who the user is and which backend to talk to.
use std::fmt;

use reqwest::Url;
use zeroize::Zeroizing;

use crate::error::{Result, WidgetError};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// The `(userId, accessCode)` pair forwarded verbatim on every request.
/// Immutable once built; share it between widgets behind an `Arc`.
#[derive(Clone)]
pub struct Credentials {
    user_id: String,
    access_code: Zeroizing<String>,
}

impl Credentials {
    pub fn new(user_id: impl Into<String>, access_code: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            access_code: Zeroizing::new(access_code.into()),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn access_code(&self) -> &str {
        &self.access_code
    }

    /// Both halves present. The client itself forwards whatever it is given;
    /// widgets that need a complete pair check this before dispatching.
    pub fn is_complete(&self) -> bool {
        !self.user_id.is_empty() && !self.access_code.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user_id", &self.user_id)
            .field("access_code", &"<redacted>")
            .finish()
    }
}

/// Where requests go. `base_url: None` (or an empty string) means
/// [`DEFAULT_BASE_URL`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EndpointConfig {
    pub base_url: Option<String>,
}

impl EndpointConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: Some(base_url.into()),
        }
    }

    /// Resolve the effective base URL without a trailing slash.
    pub fn resolve_base_url(&self) -> &str {
        let base = match self.base_url.as_deref() {
            Some(url) if !url.trim().is_empty() => url.trim(),
            _ => DEFAULT_BASE_URL,
        };
        base.trim_end_matches('/')
    }

    /// Join an endpoint path (e.g. `/deposit`) onto the resolved base.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.resolve_base_url())
    }

    /// Reject base URLs that don't parse or use a scheme other than http(s).
    pub fn validate(&self) -> Result<()> {
        let base = self.resolve_base_url();
        let url = Url::parse(base)
            .map_err(|e| WidgetError::InvalidConfig(format!("Invalid base URL '{base}': {e}")))?;
        match url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(WidgetError::InvalidConfig(format!(
                "Invalid base URL scheme '{other}' in {base}. Expected http:// or https://."
            ))),
        }
    }
}
