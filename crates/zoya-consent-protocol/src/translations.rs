//! Localized banner strings, keyed by locale code.
//!
//! Every key is optional: the banner library falls back to its built-in
//! text for anything missing, except purpose labels, which validation
//! requires for each declared purpose. Keys without a typed field are kept
//! verbatim in `extra` so they survive a load/save round trip.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Locale code → string table.
pub type Translations = BTreeMap<String, LocaleStrings>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentNoticeText {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learn_more: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Title and description pair, used by the modal and app overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TextBlock {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            description: Some(description.into()),
            extra: Map::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none()
    }
}

/// Labels shared by all apps in the modal (`app.required`, `app.optOut`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppLabels {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<TextBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opt_out: Option<TextBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purposes: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocaleStrings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consent_notice: Option<ConsentNoticeText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consent_modal: Option<TextBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ok: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accept_all: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accept_selected: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learn_more: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close: Option<String>,
    /// Purpose id → display label.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub purposes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app: Option<AppLabels>,
    /// Per-app overrides (keyed by app name) and any other library keys
    /// such as `poweredBy` or `save`.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LocaleStrings {
    pub fn purpose_label(&self, purpose: &str) -> Option<&str> {
        self.purposes.get(purpose).map(String::as_str)
    }

    /// Per-app override block. `None` when absent or not an object.
    pub fn app_override(&self, app_name: &str) -> Option<TextBlock> {
        match self.extra.get(app_name)? {
            block @ Value::Object(_) => serde_json::from_value(block.clone()).ok(),
            _ => None,
        }
    }

    /// Any unmodelled key, e.g. `poweredBy`.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(Value::as_str)
    }

    /// The `app.required` block, if present and non-empty.
    pub fn required_label(&self) -> Option<&TextBlock> {
        self.app
            .as_ref()
            .and_then(|a| a.required.as_ref())
            .filter(|b| !b.is_empty())
    }
}
