//! Server configuration loaded from the environment.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_PORT: u16 = 3010;
pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const DEFAULT_JS_VAR: &str = "klaroConfig";

/// Top-level Zoya Consent server configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerConfig {
    /// HTTP server port.
    pub port: u16,
    /// Interface to bind.
    pub bind: String,
    /// Optional JSON consent config. The bundled site config is used when unset.
    pub consent_config: Option<PathBuf>,
    /// Global variable name used in the rendered script.
    pub js_var: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.into(),
            consent_config: None,
            js_var: DEFAULT_JS_VAR.into(),
        }
    }
}

impl ServerConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("PORT is not a valid port: {raw}")))?,
            None => DEFAULT_PORT,
        };

        let bind = lookup("ZOYA_CONSENT_BIND")
            .filter(|b| !b.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BIND.into());

        let consent_config = lookup("ZOYA_CONSENT_CONFIG")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        let js_var = lookup("ZOYA_CONSENT_VAR")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_JS_VAR.into());
        if !is_js_identifier(&js_var) {
            return Err(Error::Config(format!(
                "ZOYA_CONSENT_VAR is not a valid JavaScript identifier: {js_var}"
            )));
        }

        Ok(Self {
            port,
            bind,
            consent_config,
            js_var,
        })
    }

    /// Socket address string for the listener.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

fn is_js_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
