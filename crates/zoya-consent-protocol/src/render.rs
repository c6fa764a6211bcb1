//! Render the config as a browser script for the banner library.
//!
//! JSON cannot carry regex literals, so the script form is produced from
//! the serde value with each app's `cookies` replaced by JS literals.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use zoya_consent_core::{Error, Result};

use crate::config::ConsentConfig;

static JS_IDENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").unwrap());

const INDENT: &str = "  ";

/// A JS expression tree: plain JSON values plus raw literals.
enum JsExpr {
    Json(Value),
    Raw(String),
    Array(Vec<JsExpr>),
    Object(Vec<(String, JsExpr)>),
}

/// Pretty JSON form, for API responses and config files.
pub fn render_json(config: &ConsentConfig) -> Result<String> {
    config.to_json_pretty()
}

/// `var <var_name> = {...};` with cookie matchers as JS literals.
pub fn render_js(config: &ConsentConfig, var_name: &str) -> Result<String> {
    if !JS_IDENT_RE.is_match(var_name) {
        return Err(Error::Config(format!(
            "not a valid JavaScript identifier: {var_name}"
        )));
    }

    let value = serde_json::to_value(config)?;
    let Value::Object(fields) = value else {
        return Err(Error::Internal("config did not serialize to an object".into()));
    };

    let mut entries = Vec::with_capacity(fields.len());
    for (key, field) in fields {
        let expr = if key == "apps" {
            apps_expr(config, field)?
        } else {
            JsExpr::Json(field)
        };
        entries.push((key, expr));
    }

    let mut out = format!("var {var_name} = ");
    write_expr(&JsExpr::Object(entries), 0, &mut out);
    out.push_str(";\n");
    Ok(out)
}

fn apps_expr(config: &ConsentConfig, apps: Value) -> Result<JsExpr> {
    let Value::Array(apps) = apps else {
        return Err(Error::Internal("apps did not serialize to an array".into()));
    };

    let mut items = Vec::with_capacity(apps.len());
    for (app, value) in config.apps.iter().zip(apps) {
        let Value::Object(fields) = value else {
            return Err(Error::Internal(format!("app '{}' is not an object", app.name)));
        };
        let entries = fields
            .into_iter()
            .map(|(key, field)| {
                let expr = if key == "cookies" {
                    JsExpr::Array(app.cookies.iter().map(|m| JsExpr::Raw(m.to_js())).collect())
                } else {
                    JsExpr::Json(field)
                };
                (key, expr)
            })
            .collect();
        items.push(JsExpr::Object(entries));
    }
    Ok(JsExpr::Array(items))
}

fn json_to_expr(value: Value) -> JsExpr {
    match value {
        Value::Array(items) => JsExpr::Array(items.into_iter().map(json_to_expr).collect()),
        Value::Object(map) => {
            JsExpr::Object(map.into_iter().map(|(k, v)| (k, json_to_expr(v))).collect())
        }
        scalar => JsExpr::Json(scalar),
    }
}

fn write_key(key: &str, out: &mut String) {
    if JS_IDENT_RE.is_match(key) {
        out.push_str(key);
    } else {
        out.push_str(&Value::String(key.to_string()).to_string());
    }
}

fn write_expr(expr: &JsExpr, depth: usize, out: &mut String) {
    match expr {
        JsExpr::Raw(raw) => out.push_str(raw),
        JsExpr::Json(value @ (Value::Array(_) | Value::Object(_))) => {
            write_expr(&json_to_expr(value.clone()), depth, out);
        }
        JsExpr::Json(scalar) => out.push_str(&scalar.to_string()),
        JsExpr::Array(items) if items.is_empty() => out.push_str("[]"),
        JsExpr::Array(items) => {
            out.push_str("[\n");
            for (i, item) in items.iter().enumerate() {
                out.push_str(&INDENT.repeat(depth + 1));
                write_expr(item, depth + 1, out);
                if i + 1 < items.len() {
                    out.push(',');
                }
                out.push('\n');
            }
            out.push_str(&INDENT.repeat(depth));
            out.push(']');
        }
        JsExpr::Object(entries) if entries.is_empty() => out.push_str("{}"),
        JsExpr::Object(entries) => {
            out.push_str("{\n");
            for (i, (key, value)) in entries.iter().enumerate() {
                out.push_str(&INDENT.repeat(depth + 1));
                write_key(key, out);
                out.push_str(": ");
                write_expr(value, depth + 1, out);
                if i + 1 < entries.len() {
                    out.push(',');
                }
                out.push('\n');
            }
            out.push_str(&INDENT.repeat(depth));
            out.push('}');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::App;
    use crate::cookie::CookieMatcher;
    use crate::translations::LocaleStrings;

    fn sample() -> ConsentConfig {
        let mut en = LocaleStrings::default();
        en.purposes.insert("analytics".into(), "Analytics".into());
        ConsentConfig::builder()
            .version(6)
            .cookie_name("ol-consent")
            .purpose("analytics")
            .app(App::new("ga4", "Google Analytics 4", ["analytics"]).cookies([
                CookieMatcher::parse("/^_ga/").unwrap(),
                CookieMatcher::prefix("ol_pref_"),
                CookieMatcher::exact("JSESSIONID"),
            ]))
            .unwrap()
            .translation("en", en)
            .build_unchecked()
    }

    #[test]
    fn test_renders_regex_literals() {
        let js = render_js(&sample(), "klaroConfig").unwrap();
        assert!(js.starts_with("var klaroConfig = {\n"));
        assert!(js.ends_with("};\n"));
        assert!(js.contains("        /^_ga/,\n"));
        assert!(js.contains("        /^ol_pref_/,\n"));
        assert!(js.contains("        \"JSESSIONID\"\n"));
        assert!(!js.contains("\"/^_ga/\""));
    }

    #[test]
    fn test_keys_and_scalars() {
        let js = render_js(&sample(), "klaroConfig").unwrap();
        assert!(js.contains("  elementID: \"klaro\",\n"));
        assert!(js.contains("  cookieDomain: null,\n"));
        // Keys are emitted in sorted order, so `version` closes the object.
        assert!(js.contains("  version: 6\n};\n"));
        assert!(js.contains("  default: false,\n"));
        assert!(js.contains("        analytics: \"Analytics\"\n"));
    }

    #[test]
    fn test_quotes_non_identifier_keys() {
        let mut config = sample();
        config
            .translations
            .get_mut("en")
            .unwrap()
            .purposes
            .insert("ad-tracking".into(), "Ads".into());
        let js = render_js(&config, "klaroConfig").unwrap();
        assert!(js.contains("\"ad-tracking\": \"Ads\""));
    }

    #[test]
    fn test_app_without_cookies_has_no_cookie_key() {
        let mut config = sample();
        config.apps[0].cookies.clear();
        let js = render_js(&config, "cfg").unwrap();
        assert!(!js.contains("cookies"));
        assert!(js.starts_with("var cfg = "));
    }

    #[test]
    fn test_rejects_bad_var_name() {
        assert!(render_js(&sample(), "klaro-config").is_err());
        assert!(render_js(&sample(), "").is_err());
    }

    #[test]
    fn test_json_keeps_matcher_notation() {
        let json = render_json(&sample()).unwrap();
        assert!(json.contains("\"/^_ga/\""));
        assert!(json.contains("\"ol_pref_*\""));
        let back = ConsentConfig::from_json(&json).unwrap();
        assert_eq!(back, sample());
    }
}
