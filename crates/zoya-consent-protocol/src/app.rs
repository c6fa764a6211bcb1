//! Purposes and apps — the consent-gated integrations.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::cookie::CookieMatcher;

/// Identifier of a purpose (a category of data use, e.g. `analytics`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PurposeId(String);

impl PurposeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PurposeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PurposeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl PartialEq<str> for PurposeId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

/// A third-party or first-party integration gated by consent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct App {
    pub name: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub purposes: Vec<PurposeId>,
    /// Cannot be disabled by the user.
    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,
    /// Enabled until explicitly declined.
    #[serde(default, skip_serializing_if = "is_false")]
    pub opt_out: bool,
    /// Consent is only asked at the point of use (embedded media).
    #[serde(default, skip_serializing_if = "is_false")]
    pub contextual_consent_only: bool,
    /// Per-app override of the top-level `default`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<bool>,
    /// Run the app's callback only once per page load.
    #[serde(default, skip_serializing_if = "is_false")]
    pub only_once: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cookies: Vec<CookieMatcher>,
    /// Other per-app library keys, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl App {
    pub fn new<I, P>(name: impl Into<String>, title: impl Into<String>, purposes: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PurposeId>,
    {
        Self {
            name: name.into(),
            title: title.into(),
            description: None,
            purposes: purposes.into_iter().map(Into::into).collect(),
            required: false,
            opt_out: false,
            contextual_consent_only: false,
            default: None,
            only_once: false,
            cookies: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn opt_out(mut self) -> Self {
        self.opt_out = true;
        self
    }

    pub fn contextual(mut self) -> Self {
        self.contextual_consent_only = true;
        self
    }

    pub fn default_enabled(mut self, enabled: bool) -> Self {
        self.default = Some(enabled);
        self
    }

    pub fn once(mut self) -> Self {
        self.only_once = true;
        self
    }

    pub fn cookies(mut self, cookies: impl IntoIterator<Item = CookieMatcher>) -> Self {
        self.cookies.extend(cookies);
        self
    }

    pub fn has_purpose(&self, purpose: &str) -> bool {
        self.purposes.iter().any(|p| p == purpose)
    }

    /// Whether any of this app's matchers claims `cookie_name`.
    pub fn owns_cookie(&self, cookie_name: &str) -> bool {
        self.cookies.iter().any(|m| m.matches(cookie_name))
    }

    /// Initial consent state before the user decides.
    ///
    /// Precedence: `required`, then `optOut`, then the per-app `default`,
    /// then the top-level `default`.
    pub fn enabled_by_default(&self, global_default: bool) -> bool {
        if self.required || self.opt_out {
            return true;
        }
        self.default.unwrap_or(global_default)
    }
}
