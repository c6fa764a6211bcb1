//! Shared application state.

use zoya_consent_core::{Result, ServerConfig};
use zoya_consent_protocol::{render_js, site, ConsentConfig, ValidationReport};

/// Read-only state shared by all route handlers. Built once at startup.
pub struct AppState {
    pub server: ServerConfig,
    pub consent: ConsentConfig,
    pub report: ValidationReport,
    /// Pre-rendered `klaro-config.js` body.
    pub script: String,
}

impl AppState {
    /// Validate the consent config and pre-render the script.
    pub fn new(server: ServerConfig, consent: ConsentConfig) -> Result<Self> {
        let report = consent.ensure_valid()?;
        let script = render_js(&consent, &server.js_var)?;
        Ok(Self {
            server,
            consent,
            report,
            script,
        })
    }

    /// Build state from the configured file, or the bundled site config.
    pub fn load(server: ServerConfig) -> Result<Self> {
        let consent = load_consent(&server)?;
        Self::new(server, consent)
    }
}

pub fn load_consent(server: &ServerConfig) -> Result<ConsentConfig> {
    match &server.consent_config {
        Some(path) => ConsentConfig::load(path),
        None => site::openlibrary(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zoya_consent_protocol::App;

    #[test]
    fn test_bundled_state() {
        let state = AppState::load(ServerConfig::default()).unwrap();
        assert!(state.script.starts_with("var klaroConfig = "));
        assert!(state.report.is_valid());
        assert_eq!(state.consent.cookie_name, "ol-consent");
    }

    #[test]
    fn test_state_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("consent.json");
        let consent = site::openlibrary().unwrap();
        std::fs::write(&path, consent.to_json_pretty().unwrap()).unwrap();

        let server = ServerConfig {
            consent_config: Some(path),
            js_var: "siteConsent".into(),
            ..Default::default()
        };
        let state = AppState::load(server).unwrap();
        assert_eq!(state.consent, consent);
        assert!(state.script.starts_with("var siteConsent = "));
    }

    #[test]
    fn test_invalid_config_refused() {
        let mut consent = site::openlibrary().unwrap();
        consent.apps.push(App::new("ads", "Ad network", ["advertising"]));
        assert!(AppState::new(ServerConfig::default(), consent).is_err());
    }
}
