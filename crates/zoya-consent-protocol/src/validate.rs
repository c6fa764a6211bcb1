//! Static validation of a consent configuration.
//!
//! The banner library's behavior on malformed input is undefined, so all
//! referential checks happen here, before the config is served.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Serialize;

use crate::app::PurposeId;
use crate::config::ConsentConfig;
use crate::cookie::CookieMatcher;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    UnknownPurpose,
    EmptyPurposes,
    DuplicateApp,
    DuplicatePurpose,
    RequiredOptOut,
    MissingPurposeTranslation,
    EmptyName,
    UnusedPurpose,
    CookieOverlap,
    MissingRequiredLabel,
    NoTranslations,
    TestingEnabled,
    ZeroExpiry,
    ContextualRequired,
}

impl IssueCode {
    pub fn severity(self) -> Severity {
        match self {
            Self::UnknownPurpose
            | Self::EmptyPurposes
            | Self::DuplicateApp
            | Self::DuplicatePurpose
            | Self::RequiredOptOut
            | Self::MissingPurposeTranslation
            | Self::EmptyName => Severity::Error,
            Self::UnusedPurpose
            | Self::CookieOverlap
            | Self::MissingRequiredLabel
            | Self::NoTranslations
            | Self::TestingEnabled
            | Self::ZeroExpiry
            | Self::ContextualRequired => Severity::Warning,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::UnknownPurpose => "unknown_purpose",
            Self::EmptyPurposes => "empty_purposes",
            Self::DuplicateApp => "duplicate_app",
            Self::DuplicatePurpose => "duplicate_purpose",
            Self::RequiredOptOut => "required_opt_out",
            Self::MissingPurposeTranslation => "missing_purpose_translation",
            Self::EmptyName => "empty_name",
            Self::UnusedPurpose => "unused_purpose",
            Self::CookieOverlap => "cookie_overlap",
            Self::MissingRequiredLabel => "missing_required_label",
            Self::NoTranslations => "no_translations",
            Self::TestingEnabled => "testing_enabled",
            Self::ZeroExpiry => "zero_expiry",
            Self::ContextualRequired => "contextual_required",
        }
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub severity: Severity,
    pub code: IssueCode,
    /// App name, purpose id or locale the issue is about.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub message: String,
}

impl Issue {
    fn new(code: IssueCode, subject: Option<&str>, message: String) -> Self {
        Self {
            severity: code.severity(),
            code,
            subject: subject.map(str::to_string),
            message,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub issues: Vec<Issue>,
}

impl ValidationReport {
    /// No error-severity issues.
    pub fn is_valid(&self) -> bool {
        self.errors().next().is_none()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| i.severity == Severity::Warning)
    }

    pub fn has(&self, code: IssueCode) -> bool {
        self.issues.iter().any(|i| i.code == code)
    }

    fn push(&mut self, code: IssueCode, subject: Option<&str>, message: String) {
        self.issues.push(Issue::new(code, subject, message));
    }
}

/// Run every check and collect the findings in a stable order.
pub fn validate(config: &ConsentConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    check_purposes(config, &mut report);
    check_apps(config, &mut report);
    check_cookie_overlap(config, &mut report);
    check_translations(config, &mut report);
    check_settings(config, &mut report);
    report
}

fn check_purposes(config: &ConsentConfig, report: &mut ValidationReport) {
    let mut seen = HashSet::new();
    for purpose in &config.purposes {
        if purpose.as_str().trim().is_empty() {
            report.push(IssueCode::EmptyName, None, "purpose id is empty".into());
            continue;
        }
        if !seen.insert(purpose.as_str()) {
            report.push(
                IssueCode::DuplicatePurpose,
                Some(purpose.as_str()),
                format!("purpose '{purpose}' is declared more than once"),
            );
        }
    }

    for purpose in distinct_purposes(config) {
        if !purpose.as_str().trim().is_empty()
            && config.apps_for_purpose(purpose.as_str()).next().is_none()
        {
            report.push(
                IssueCode::UnusedPurpose,
                Some(purpose.as_str()),
                format!("purpose '{purpose}' is not used by any app"),
            );
        }
    }
}

/// Declared purposes with repeats removed, in declaration order.
fn distinct_purposes(config: &ConsentConfig) -> impl Iterator<Item = &PurposeId> {
    let mut seen = HashSet::new();
    config
        .purposes
        .iter()
        .filter(move |p| seen.insert(p.as_str()))
}

fn check_apps(config: &ConsentConfig, report: &mut ValidationReport) {
    let mut names = HashSet::new();
    for app in &config.apps {
        let name = app.name.as_str();
        if name.trim().is_empty() {
            report.push(
                IssueCode::EmptyName,
                None,
                format!("app titled '{}' has an empty name", app.title),
            );
        } else if !names.insert(name) {
            report.push(
                IssueCode::DuplicateApp,
                Some(name),
                format!("app name '{name}' is used more than once"),
            );
        }

        if app.purposes.is_empty() {
            report.push(
                IssueCode::EmptyPurposes,
                Some(name),
                format!("app '{name}' has no purposes"),
            );
        }
        for purpose in &app.purposes {
            if !config.has_purpose(purpose.as_str()) {
                report.push(
                    IssueCode::UnknownPurpose,
                    Some(name),
                    format!("app '{name}' references undeclared purpose '{purpose}'"),
                );
            }
        }

        if app.required && app.opt_out {
            report.push(
                IssueCode::RequiredOptOut,
                Some(name),
                format!("app '{name}' is both required and optOut"),
            );
        }
        if app.required && app.contextual_consent_only {
            report.push(
                IssueCode::ContextualRequired,
                Some(name),
                format!("app '{name}' is required, so contextual consent is never asked"),
            );
        }
    }
}

fn check_cookie_overlap(config: &ConsentConfig, report: &mut ValidationReport) {
    // Exact names claimed by more than one app. Pattern-vs-pattern overlap
    // is undecidable in general and is not reported.
    let mut owners: HashMap<&str, Vec<&str>> = HashMap::new();
    for app in &config.apps {
        for matcher in &app.cookies {
            if let CookieMatcher::Exact(cookie) = matcher {
                for other in config.apps_for_cookie(cookie) {
                    let list = owners.entry(cookie.as_str()).or_default();
                    if !list.contains(&other.name.as_str()) {
                        list.push(other.name.as_str());
                    }
                }
            }
        }
    }

    let mut overlapping: Vec<_> = owners.into_iter().filter(|(_, apps)| apps.len() > 1).collect();
    overlapping.sort_by(|a, b| a.0.cmp(b.0));
    for (cookie, apps) in overlapping {
        report.push(
            IssueCode::CookieOverlap,
            Some(cookie),
            format!("cookie '{cookie}' is claimed by {}", apps.join(", ")),
        );
    }
}

fn check_translations(config: &ConsentConfig, report: &mut ValidationReport) {
    if config.translations.is_empty() {
        report.push(
            IssueCode::NoTranslations,
            None,
            "no translations; the library's built-in texts will be shown".into(),
        );
        return;
    }

    let has_required_app = config.apps.iter().any(|a| a.required);
    for (locale, strings) in &config.translations {
        for purpose in distinct_purposes(config) {
            if strings.purpose_label(purpose.as_str()).is_none() {
                report.push(
                    IssueCode::MissingPurposeTranslation,
                    Some(locale.as_str()),
                    format!("locale '{locale}' has no label for purpose '{purpose}'"),
                );
            }
        }
        if has_required_app && strings.required_label().is_none() {
            report.push(
                IssueCode::MissingRequiredLabel,
                Some(locale.as_str()),
                format!("locale '{locale}' has no app.required text for required apps"),
            );
        }
    }
}

fn check_settings(config: &ConsentConfig, report: &mut ValidationReport) {
    if config.testing {
        report.push(
            IssueCode::TestingEnabled,
            None,
            "testing is on; the banner is shown on every page load".into(),
        );
    }
    if config.cookie_expires_after_days == 0 {
        report.push(
            IssueCode::ZeroExpiry,
            None,
            "cookieExpiresAfterDays is 0; consent is forgotten immediately".into(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::App;
    use crate::translations::{AppLabels, LocaleStrings, TextBlock};

    fn locale(purposes: &[&str]) -> LocaleStrings {
        LocaleStrings {
            purposes: purposes
                .iter()
                .map(|p| (p.to_string(), p.to_uppercase()))
                .collect(),
            app: Some(AppLabels {
                required: Some(TextBlock::new("(always required)", "Needed.")),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn base() -> ConsentConfig {
        ConsentConfig::builder()
            .purposes(["essential", "analytics"])
            .app(App::new("essential-cookies", "Essential", ["essential"]).required())
            .unwrap()
            .app(App::new("ga4", "GA4", ["analytics"]))
            .unwrap()
            .translation("en", locale(&["essential", "analytics"]))
            .build_unchecked()
    }

    fn codes(report: &ValidationReport) -> Vec<IssueCode> {
        report.issues.iter().map(|i| i.code).collect()
    }

    #[test]
    fn test_clean_config_has_no_issues() {
        let report = validate(&base());
        assert!(report.is_valid());
        assert!(report.issues.is_empty(), "{:?}", report.issues);
    }

    #[test]
    fn test_unknown_and_empty_purposes() {
        let mut config = base();
        config.apps.push(App::new("paypal", "PayPal", ["payments"]));
        config.apps.push(App::new("none", "Nothing", Vec::<&str>::new()));
        let report = validate(&config);
        assert!(!report.is_valid());
        assert!(report.has(IssueCode::UnknownPurpose));
        assert!(report.has(IssueCode::EmptyPurposes));
    }

    #[test]
    fn test_duplicate_names_detected_after_manual_edit() {
        let mut config = base();
        config.apps.push(App::new("ga4", "GA4 again", ["analytics"]));
        config.purposes.push("analytics".into());
        let report = validate(&config);
        assert!(report.has(IssueCode::DuplicateApp));
        assert!(report.has(IssueCode::DuplicatePurpose));
    }

    #[test]
    fn test_required_opt_out_conflict() {
        let mut config = base();
        config.apps[0].opt_out = true;
        config.apps[0].contextual_consent_only = true;
        let report = validate(&config);
        assert_eq!(
            codes(&report),
            vec![IssueCode::RequiredOptOut, IssueCode::ContextualRequired]
        );
        assert!(!report.is_valid());
    }

    #[test]
    fn test_missing_translation_per_locale() {
        let mut config = base();
        config.translations.insert("fa".into(), locale(&["essential"]));
        let report = validate(&config);
        let missing: Vec<_> = report
            .issues
            .iter()
            .filter(|i| i.code == IssueCode::MissingPurposeTranslation)
            .collect();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].subject.as_deref(), Some("fa"));
        assert!(missing[0].message.contains("analytics"));
    }

    #[test]
    fn test_duplicate_purpose_reports_missing_label_once() {
        let mut config = base();
        config.purposes.push("analytics".into());
        config.translations.insert("fa".into(), locale(&["essential"]));
        let report = validate(&config);
        let missing: Vec<_> = report
            .issues
            .iter()
            .filter(|i| i.code == IssueCode::MissingPurposeTranslation)
            .collect();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].subject.as_deref(), Some("fa"));
        assert_eq!(
            report
                .issues
                .iter()
                .filter(|i| i.code == IssueCode::DuplicatePurpose)
                .count(),
            1
        );
    }

    #[test]
    fn test_empty_app_name_and_purpose_id() {
        let mut config = base();
        config.purposes.push("".into());
        config.apps.push(App::new("", "Nameless", ["analytics"]));
        let report = validate(&config);
        assert!(!report.is_valid());
        assert!(report.has(IssueCode::EmptyName));
        let empty: Vec<_> = report
            .errors()
            .filter(|i| i.code == IssueCode::EmptyName)
            .collect();
        assert_eq!(empty.len(), 2);
        assert!(empty.iter().any(|i| i.message == "purpose id is empty"));
        assert!(empty.iter().any(|i| i.message.contains("Nameless")));
    }

    #[test]
    fn test_warnings_do_not_invalidate() {
        let mut config = base();
        config.testing = true;
        config.cookie_expires_after_days = 0;
        config.purposes.push("support".into());
        config
            .translations
            .get_mut("en")
            .unwrap()
            .purposes
            .insert("support".into(), "Support".into());
        config.translations.get_mut("en").unwrap().app = None;
        let report = validate(&config);
        assert!(report.is_valid());
        assert!(report.has(IssueCode::TestingEnabled));
        assert!(report.has(IssueCode::ZeroExpiry));
        assert!(report.has(IssueCode::UnusedPurpose));
        assert!(report.has(IssueCode::MissingRequiredLabel));
    }

    #[test]
    fn test_cookie_overlap_warning() {
        let mut config = base();
        config.apps[0].cookies = vec![CookieMatcher::exact("_ga")];
        config.apps[1].cookies = vec![CookieMatcher::parse("/^_ga/").unwrap()];
        let report = validate(&config);
        let overlap: Vec<_> = report
            .issues
            .iter()
            .filter(|i| i.code == IssueCode::CookieOverlap)
            .collect();
        assert_eq!(overlap.len(), 1);
        assert_eq!(overlap[0].message, "cookie '_ga' is claimed by essential-cookies, ga4");
    }

    #[test]
    fn test_no_translations_warning() {
        let mut config = base();
        config.translations.clear();
        let report = validate(&config);
        assert!(report.is_valid());
        assert_eq!(codes(&report), vec![IssueCode::NoTranslations]);
    }

    #[test]
    fn test_report_serializes() {
        let mut config = base();
        config.testing = true;
        let json = serde_json::to_value(validate(&config)).unwrap();
        assert_eq!(json["issues"][0]["severity"], "warning");
        assert_eq!(json["issues"][0]["code"], "testing_enabled");
        assert!(json["issues"][0].get("subject").is_none());
    }
}
