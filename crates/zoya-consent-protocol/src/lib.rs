//! Consent contract for the Klaro banner library.
//!
//! Typed purposes, apps and cookie matchers, localized strings, static
//! validation, and rendering to the script the banner loads.

pub mod app;
pub mod config;
pub mod cookie;
pub mod render;
pub mod site;
pub mod translations;
pub mod validate;

pub use app::{App, PurposeId};
pub use config::{ConsentConfig, ConsentConfigBuilder, StorageMethod};
pub use cookie::{CookieMatcher, CookiePattern, MatcherKind};
pub use render::{render_js, render_json};
pub use translations::{LocaleStrings, TextBlock, Translations};
pub use validate::{validate, Issue, IssueCode, Severity, ValidationReport};
