//! The consent configuration object handed to the banner library.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};
use zoya_consent_core::{Error, Result};

use crate::app::{App, PurposeId};
use crate::translations::{LocaleStrings, Translations};
use crate::validate::{validate, ValidationReport};

/// Where the library persists consent decisions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StorageMethod {
    #[default]
    Cookie,
    LocalStorage,
}

/// Complete Klaro configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentConfig {
    /// Bumping this invalidates stored consent and re-prompts users.
    pub version: u32,
    #[serde(rename = "elementID")]
    pub element_id: String,
    pub storage_method: StorageMethod,
    pub cookie_name: String,
    pub cookie_expires_after_days: u32,
    /// `null` scopes the cookie to the current host.
    #[serde(default)]
    pub cookie_domain: Option<String>,
    #[serde(default)]
    pub must_consent: bool,
    #[serde(default)]
    pub default: bool,
    #[serde(default)]
    pub accept_all: bool,
    #[serde(default)]
    pub hide_decline_all: bool,
    #[serde(default)]
    pub hide_learn_more: bool,
    #[serde(default)]
    pub group_by_purpose: bool,
    #[serde(default)]
    pub testing: bool,
    pub purposes: Vec<PurposeId>,
    pub apps: Vec<App>,
    #[serde(default)]
    pub translations: Translations,
    /// Library options without a typed field (`privacyPolicy`, `lang`, ...),
    /// passed through unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for ConsentConfig {
    fn default() -> Self {
        Self {
            version: 1,
            element_id: "klaro".into(),
            storage_method: StorageMethod::Cookie,
            cookie_name: "klaro".into(),
            cookie_expires_after_days: 365,
            cookie_domain: None,
            must_consent: false,
            default: false,
            accept_all: true,
            hide_decline_all: false,
            hide_learn_more: false,
            group_by_purpose: true,
            testing: false,
            purposes: Vec::new(),
            apps: Vec::new(),
            translations: Translations::new(),
            extra: Map::new(),
        }
    }
}

impl ConsentConfig {
    pub fn builder() -> ConsentConfigBuilder {
        ConsentConfigBuilder::default()
    }

    /// Parse JSON without validating.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read, parse and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let config = Self::from_json(&data)?;
        config.ensure_valid()?;
        info!(
            "Loaded consent config from {} ({} purposes, {} apps)",
            path.display(),
            config.purposes.len(),
            config.apps.len()
        );
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> ValidationReport {
        validate(self)
    }

    /// Validate, logging warnings and failing on any error.
    pub fn ensure_valid(&self) -> Result<ValidationReport> {
        let report = self.validate();
        for issue in report.warnings() {
            warn!("Consent config warning [{}]: {}", issue.code, issue.message);
        }
        if !report.is_valid() {
            let summary = report
                .errors()
                .map(|i| format!("[{}] {}", i.code, i.message))
                .collect::<Vec<_>>()
                .join("; ");
            return Err(Error::InvalidConfig(summary));
        }
        Ok(report)
    }

    pub fn app(&self, name: &str) -> Option<&App> {
        self.apps.iter().find(|a| a.name == name)
    }

    /// Like [`app`](Self::app), but a missing app is an error.
    pub fn require_app(&self, name: &str) -> Result<&App> {
        self.app(name)
            .ok_or_else(|| Error::NotFound(format!("app '{name}'")))
    }

    pub fn has_purpose(&self, purpose: &str) -> bool {
        self.purposes.iter().any(|p| p == purpose)
    }

    pub fn apps_for_purpose<'a>(&'a self, purpose: &'a str) -> impl Iterator<Item = &'a App> + 'a {
        self.apps.iter().filter(move |a| a.has_purpose(purpose))
    }

    /// Apps whose matchers claim `cookie_name`, in declaration order.
    pub fn apps_for_cookie(&self, cookie_name: &str) -> Vec<&App> {
        self.apps.iter().filter(|a| a.owns_cookie(cookie_name)).collect()
    }

    /// The first locale in key order, used for single-language summaries.
    pub fn primary_locale(&self) -> Option<(&str, &LocaleStrings)> {
        self.translations.iter().next().map(|(k, v)| (k.as_str(), v))
    }
}

/// Incremental construction of a [`ConsentConfig`]. Rejects duplicate
/// app names as they are added and validates on [`build`](Self::build).
#[derive(Debug, Clone, Default)]
pub struct ConsentConfigBuilder {
    config: ConsentConfig,
}

impl ConsentConfigBuilder {
    pub fn version(mut self, version: u32) -> Self {
        self.config.version = version;
        self
    }

    pub fn element_id(mut self, id: impl Into<String>) -> Self {
        self.config.element_id = id.into();
        self
    }

    pub fn storage_method(mut self, method: StorageMethod) -> Self {
        self.config.storage_method = method;
        self
    }

    pub fn cookie_name(mut self, name: impl Into<String>) -> Self {
        self.config.cookie_name = name.into();
        self
    }

    pub fn cookie_expires_after_days(mut self, days: u32) -> Self {
        self.config.cookie_expires_after_days = days;
        self
    }

    pub fn cookie_domain(mut self, domain: Option<String>) -> Self {
        self.config.cookie_domain = domain;
        self
    }

    pub fn must_consent(mut self, on: bool) -> Self {
        self.config.must_consent = on;
        self
    }

    pub fn default_consent(mut self, on: bool) -> Self {
        self.config.default = on;
        self
    }

    pub fn accept_all(mut self, on: bool) -> Self {
        self.config.accept_all = on;
        self
    }

    pub fn hide_decline_all(mut self, on: bool) -> Self {
        self.config.hide_decline_all = on;
        self
    }

    pub fn hide_learn_more(mut self, on: bool) -> Self {
        self.config.hide_learn_more = on;
        self
    }

    pub fn group_by_purpose(mut self, on: bool) -> Self {
        self.config.group_by_purpose = on;
        self
    }

    pub fn testing(mut self, on: bool) -> Self {
        self.config.testing = on;
        self
    }

    /// Declare a purpose. Repeats are ignored.
    pub fn purpose(mut self, id: impl Into<PurposeId>) -> Self {
        let id = id.into();
        if !self.config.purposes.contains(&id) {
            self.config.purposes.push(id);
        }
        self
    }

    pub fn purposes<I, P>(self, ids: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PurposeId>,
    {
        ids.into_iter().fold(self, |b, id| b.purpose(id))
    }

    pub fn app(mut self, app: App) -> Result<Self> {
        if self.config.app(&app.name).is_some() {
            return Err(Error::DuplicateApp(app.name));
        }
        self.config.apps.push(app);
        Ok(self)
    }

    pub fn translation(mut self, locale: impl Into<String>, strings: LocaleStrings) -> Self {
        self.config.translations.insert(locale.into(), strings);
        self
    }

    /// Validate and return the finished config.
    pub fn build(self) -> Result<ConsentConfig> {
        self.config.ensure_valid()?;
        Ok(self.config)
    }

    /// Return the config without validation.
    pub fn build_unchecked(self) -> ConsentConfig {
        self.config
    }
}
