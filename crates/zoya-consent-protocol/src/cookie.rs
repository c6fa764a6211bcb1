//! Cookie matchers — exact names, prefix wildcards and regex patterns.
//!
//! Matchers have a compact text notation used in JSON config files:
//! `"JSESSIONID"` is an exact name, `"ol_pref_*"` is a prefix and
//! `"/^_ga/"` is a regex (only the `i` flag is accepted). Values that the
//! notation cannot express unambiguously serialize as tagged objects
//! such as `{"exact": "a*"}`.

use std::fmt;

use regex::{Regex, RegexBuilder};
use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use zoya_consent_core::{Error, Result};

/// Matcher kind, used in API summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatcherKind {
    Exact,
    Prefix,
    Regex,
}

/// A compiled regex matcher. Equality compares source and flags only.
#[derive(Debug, Clone)]
pub struct CookiePattern {
    source: String,
    case_insensitive: bool,
    regex: Regex,
}

impl CookiePattern {
    /// Compile a pattern from its source and JS-style flags.
    pub fn new(source: impl Into<String>, flags: &str) -> Result<Self> {
        let source = source.into().replace(r"\/", "/");
        if source.is_empty() {
            return Err(Error::cookie_matcher(&source, "empty regex"));
        }

        let mut case_insensitive = false;
        for flag in flags.chars() {
            match flag {
                'i' if !case_insensitive => case_insensitive = true,
                'i' => return Err(Error::cookie_matcher(&source, "repeated flag 'i'")),
                other => {
                    return Err(Error::cookie_matcher(
                        &source,
                        format!("unsupported regex flag '{other}'"),
                    ))
                }
            }
        }

        let regex = RegexBuilder::new(&source)
            .case_insensitive(case_insensitive)
            .build()
            .map_err(|e| Error::cookie_matcher(&source, e.to_string()))?;

        Ok(Self {
            source,
            case_insensitive,
            regex,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn flags(&self) -> &'static str {
        if self.case_insensitive {
            "i"
        } else {
            ""
        }
    }

    pub fn is_match(&self, cookie_name: &str) -> bool {
        self.regex.is_match(cookie_name)
    }
}

impl PartialEq for CookiePattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.case_insensitive == other.case_insensitive
    }
}

impl Eq for CookiePattern {}

/// Identifies cookies set by an app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieMatcher {
    /// Cookie name must be equal.
    Exact(String),
    /// Cookie name must start with the prefix.
    Prefix(String),
    /// Cookie name must match the pattern anywhere (JS `RegExp.test`).
    Regex(CookiePattern),
}

impl CookieMatcher {
    pub fn exact(name: impl Into<String>) -> Self {
        Self::Exact(name.into())
    }

    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self::Prefix(prefix.into())
    }

    pub fn regex(source: impl Into<String>) -> Result<Self> {
        CookiePattern::new(source, "").map(Self::Regex)
    }

    /// Parse the text notation.
    pub fn parse(input: &str) -> Result<Self> {
        if input.is_empty() {
            return Err(Error::cookie_matcher(input, "empty cookie name"));
        }

        if let Some(rest) = input.strip_prefix('/') {
            let end = rest
                .rfind('/')
                .ok_or_else(|| Error::cookie_matcher(input, "unterminated regex literal"))?;
            let (source, flags) = (&rest[..end], &rest[end + 1..]);
            return CookiePattern::new(source, flags).map(Self::Regex);
        }

        if let Some(prefix) = input.strip_suffix('*') {
            if prefix.is_empty() {
                return Err(Error::cookie_matcher(input, "wildcard without a prefix"));
            }
            return Ok(Self::Prefix(prefix.to_string()));
        }

        Ok(Self::Exact(input.to_string()))
    }

    pub fn kind(&self) -> MatcherKind {
        match self {
            Self::Exact(_) => MatcherKind::Exact,
            Self::Prefix(_) => MatcherKind::Prefix,
            Self::Regex(_) => MatcherKind::Regex,
        }
    }

    /// True for prefix and regex matchers.
    pub fn is_pattern(&self) -> bool {
        !matches!(self, Self::Exact(_))
    }

    pub fn matches(&self, cookie_name: &str) -> bool {
        match self {
            Self::Exact(name) => name == cookie_name,
            Self::Prefix(prefix) => cookie_name.starts_with(prefix.as_str()),
            Self::Regex(pattern) => pattern.is_match(cookie_name),
        }
    }

    /// Text notation, or `None` when it would parse back differently.
    pub fn notation(&self) -> Option<String> {
        let text = match self {
            Self::Exact(name) => name.clone(),
            Self::Prefix(prefix) => format!("{prefix}*"),
            Self::Regex(pattern) => format!("/{}/{}", pattern.source(), pattern.flags()),
        };
        (Self::parse(&text).ok().as_ref() == Some(self)).then_some(text)
    }

    /// JavaScript literal accepted by the banner library. Prefixes become
    /// anchored regexes since the library compares plain strings exactly.
    pub fn to_js(&self) -> String {
        match self {
            Self::Exact(name) => js_string(name),
            Self::Prefix(prefix) => format!("/^{}/", regex_escape_js(prefix)),
            Self::Regex(pattern) => {
                format!("/{}/{}", escape_slashes(pattern.source()), pattern.flags())
            }
        }
    }
}

impl fmt::Display for CookieMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.notation() {
            Some(text) => f.write_str(&text),
            None => match self {
                Self::Exact(name) => write!(f, "exact:{name}"),
                Self::Prefix(prefix) => write!(f, "prefix:{prefix}"),
                Self::Regex(pattern) => write!(f, "regex:{}", pattern.source()),
            },
        }
    }
}

impl std::str::FromStr for CookieMatcher {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for CookieMatcher {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        if let Some(text) = self.notation() {
            return serializer.serialize_str(&text);
        }
        match self {
            Self::Exact(name) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("exact", name)?;
                map.end()
            }
            Self::Prefix(prefix) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("prefix", prefix)?;
                map.end()
            }
            Self::Regex(pattern) => {
                let flags = pattern.flags();
                let mut map = serializer.serialize_map(Some(if flags.is_empty() { 1 } else { 2 }))?;
                map.serialize_entry("regex", pattern.source())?;
                if !flags.is_empty() {
                    map.serialize_entry("flags", flags)?;
                }
                map.end()
            }
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MatcherRepr {
    Notation(String),
    Exact {
        exact: String,
    },
    Prefix {
        prefix: String,
    },
    Regex {
        regex: String,
        #[serde(default)]
        flags: String,
    },
}

impl<'de> Deserialize<'de> for CookieMatcher {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let matcher = match MatcherRepr::deserialize(deserializer)? {
            MatcherRepr::Notation(text) => Self::parse(&text),
            MatcherRepr::Exact { exact } if exact.is_empty() => {
                Err(Error::cookie_matcher(exact, "empty cookie name"))
            }
            MatcherRepr::Exact { exact } => Ok(Self::Exact(exact)),
            MatcherRepr::Prefix { prefix } if prefix.is_empty() => {
                Err(Error::cookie_matcher(prefix, "empty prefix"))
            }
            MatcherRepr::Prefix { prefix } => Ok(Self::Prefix(prefix)),
            MatcherRepr::Regex { regex, flags } => CookiePattern::new(regex, &flags).map(Self::Regex),
        };
        matcher.map_err(de::Error::custom)
    }
}

fn js_string(s: &str) -> String {
    // JSON string literals are valid JS string literals.
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{}\"", s.escape_default()))
}

fn regex_escape_js(literal: &str) -> String {
    let mut out = String::with_capacity(literal.len());
    for c in literal.chars() {
        if matches!(
            c,
            '\\' | '^' | '$' | '.' | '|' | '?' | '*' | '+' | '(' | ')' | '[' | ']' | '{' | '}' | '/'
        ) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn escape_slashes(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut escaped = false;
    for c in source.chars() {
        if c == '/' && !escaped {
            out.push('\\');
        }
        escaped = c == '\\' && !escaped;
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_notation() {
        assert_eq!(
            CookieMatcher::parse("JSESSIONID").unwrap(),
            CookieMatcher::exact("JSESSIONID")
        );
        assert_eq!(
            CookieMatcher::parse("ocEdit*").unwrap(),
            CookieMatcher::prefix("ocEdit")
        );
        let ga = CookieMatcher::parse("/^_ga/").unwrap();
        assert_eq!(ga.kind(), MatcherKind::Regex);
        assert!(ga.is_pattern());
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(CookieMatcher::parse("").is_err());
        assert!(CookieMatcher::parse("*").is_err());
        assert!(CookieMatcher::parse("/^_ga").is_err());
        assert!(CookieMatcher::parse("//").is_err());
        assert!(CookieMatcher::parse("/^_ga/g").is_err());
        assert!(CookieMatcher::parse("/^_ga/ii").is_err());
        assert!(CookieMatcher::parse("/(unclosed/").is_err());
    }

    #[test]
    fn test_matching_semantics() {
        let exact = CookieMatcher::exact("YSC");
        assert!(exact.matches("YSC"));
        assert!(!exact.matches("YSC2"));

        let prefix = CookieMatcher::prefix("ol_pref_");
        assert!(prefix.matches("ol_pref_theme"));
        assert!(!prefix.matches("xol_pref_theme"));

        let ga = CookieMatcher::parse("/^_ga/").unwrap();
        assert!(ga.matches("_ga"));
        assert!(ga.matches("_ga_ABC123"));
        assert!(!ga.matches("x_ga"));

        let unanchored = CookieMatcher::parse("/stripe/").unwrap();
        assert!(unanchored.matches("__stripe_mid"));

        let ci = CookieMatcher::parse("/^ysc$/i").unwrap();
        assert!(ci.matches("YSC"));
    }

    #[test]
    fn test_escaped_slash_in_regex() {
        let m = CookieMatcher::parse(r"/^a\/b/").unwrap();
        assert!(m.matches("a/b"));
        assert_eq!(m.to_js(), r"/^a\/b/");
        assert_eq!(m.notation().as_deref(), Some("/^a/b/"));
    }

    #[test]
    fn test_js_literals() {
        assert_eq!(CookieMatcher::exact("vuid").to_js(), "\"vuid\"");
        assert_eq!(CookieMatcher::prefix("ocEdit").to_js(), "/^ocEdit/");
        assert_eq!(CookieMatcher::prefix("a.b$").to_js(), r"/^a\.b\$/");
        assert_eq!(CookieMatcher::parse("/^_pk_/i").unwrap().to_js(), "/^_pk_/i");
    }

    #[test]
    fn test_ambiguous_values_use_tagged_form() {
        let starry = CookieMatcher::exact("weird*");
        assert_eq!(starry.notation(), None);
        let json = serde_json::to_value(&starry).unwrap();
        assert_eq!(json, serde_json::json!({ "exact": "weird*" }));
        let back: CookieMatcher = serde_json::from_value(json).unwrap();
        assert_eq!(back, starry);

        let slashy = CookieMatcher::prefix("/tmp");
        let json = serde_json::to_value(&slashy).unwrap();
        assert_eq!(json, serde_json::json!({ "prefix": "/tmp" }));
        assert_eq!(serde_json::from_value::<CookieMatcher>(json).unwrap(), slashy);
    }

    #[test]
    fn test_serde_keeps_patterns_as_patterns() {
        let matchers = vec![
            CookieMatcher::exact("JSESSIONID"),
            CookieMatcher::prefix("ocEdit"),
            CookieMatcher::parse("/^_gid/i").unwrap(),
        ];
        let json = serde_json::to_string(&matchers).unwrap();
        assert_eq!(json, r#"["JSESSIONID","ocEdit*","/^_gid/i"]"#);
        let back: Vec<CookieMatcher> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, matchers);
        assert_eq!(back[2].kind(), MatcherKind::Regex);
    }

    #[test]
    fn test_tagged_regex_input() {
        let m: CookieMatcher =
            serde_json::from_str(r#"{"regex": "^_pk_ses", "flags": "i"}"#).unwrap();
        assert!(m.matches("_PK_SES.1"));
        assert!(serde_json::from_str::<CookieMatcher>(r#"{"exact": ""}"#).is_err());
        assert!(serde_json::from_str::<CookieMatcher>(r#""/bad[/""#).is_err());
    }
}
