//! Webhook configuration types.
//!
//! All types use `camelCase` serde renaming for wire compatibility with the
//! platform's TypeScript server and web client.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// HTTP method of a webhook request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// GET.
    Get,
    /// POST (the default).
    #[default]
    Post,
    /// PUT.
    Put,
    /// PATCH.
    Patch,
    /// DELETE.
    Delete,
}

impl HttpMethod {
    /// The corresponding `reqwest` method.
    #[must_use]
    pub fn as_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Patch => reqwest::Method::PATCH,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

/// One declared webhook.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookConfig {
    /// Unique webhook name, used in logs and errors.
    pub name: String,
    /// Target URL. May contain `${VAR}` environment references.
    pub url: String,
    /// HTTP method, defaulting to POST.
    #[serde(default)]
    pub method: HttpMethod,
    /// Header values. May contain `${{ … }}` placeholders.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Request body template. String leaves may contain `${{ … }}`
    /// placeholders; a whole-string placeholder keeps its result's type.
    #[serde(default)]
    pub body: Value,
}

/// The full hooks settings document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HooksSettings {
    /// Declared webhooks.
    #[serde(default)]
    pub webhooks: Vec<WebhookConfig>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
