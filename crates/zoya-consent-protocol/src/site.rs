//! Bundled consent configuration for the OpenLibrary site.

use zoya_consent_core::Result;

use crate::app::App;
use crate::config::{ConsentConfig, StorageMethod};
use crate::cookie::CookieMatcher;
use crate::translations::{AppLabels, ConsentNoticeText, LocaleStrings, TextBlock};

pub const PURPOSES: &[(&str, &str)] = &[
    ("essential", "Essential"),
    ("security", "Security"),
    ("analytics", "Analytics"),
    ("external", "External media"),
    ("support", "Support/Chat"),
    ("payments", "Payments"),
    ("personalization", "Personalization"),
];

fn matchers(notations: &[&str]) -> Result<Vec<CookieMatcher>> {
    notations.iter().map(|n| CookieMatcher::parse(n)).collect()
}

fn english() -> LocaleStrings {
    LocaleStrings {
        consent_notice: Some(ConsentNoticeText {
            description: Some(
                "We use cookies to run OpenLibrary and to improve your experience \
                 (security, limited analytics, embedded media). You can accept all, \
                 reject optional cookies, or customize your choices."
                    .into(),
            ),
            ..Default::default()
        }),
        consent_modal: Some(TextBlock::new(
            "Privacy settings",
            "Use the switches below to enable or disable services by category. \
             Required services cannot be turned off.",
        )),
        ok: Some("Accept selected".into()),
        accept_all: Some("Accept all".into()),
        decline: Some("I decline".into()),
        learn_more: Some("Let me choose".into()),
        purposes: PURPOSES
            .iter()
            .map(|(id, label)| (id.to_string(), label.to_string()))
            .collect(),
        app: Some(AppLabels {
            required: Some(TextBlock::new(
                "(always required)",
                "These cookies are necessary for the website to function.",
            )),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// The `ol-consent` configuration, validated.
pub fn openlibrary() -> Result<ConsentConfig> {
    ConsentConfig::builder()
        .version(6)
        .element_id("klaro")
        .storage_method(StorageMethod::Cookie)
        .cookie_name("ol-consent")
        .cookie_expires_after_days(180)
        .cookie_domain(None)
        .must_consent(false)
        .default_consent(false)
        .accept_all(true)
        .hide_decline_all(false)
        .hide_learn_more(false)
        .group_by_purpose(true)
        .testing(true)
        .purposes(PURPOSES.iter().map(|(id, _)| *id))
        .app(
            App::new("essential-cookies", "Essential cookies", ["essential"])
                .required()
                .cookies(matchers(&["JSESSIONID", "opencms_session", "ocLocale", "ocEdit*"])?),
        )?
        .app(App::new("recaptcha", "Google reCAPTCHA", ["security"]))?
        .app(App::new("turnstile", "Cloudflare Turnstile", ["security"]))?
        .app(
            App::new("ga4", "Google Analytics 4", ["analytics"])
                .cookies(matchers(&["/^_ga/", "/^_gid/", "/^_gat/"])?),
        )?
        .app(
            App::new("matomo", "Matomo", ["analytics"])
                .cookies(matchers(&["/^_pk_/", "/^_pk_s/"])?),
        )?
        .app(
            App::new("youtube", "YouTube embeds", ["external"])
                .contextual()
                .cookies(matchers(&["VISITOR_INFO1_LIVE", "YSC"])?),
        )?
        .app(
            App::new("vimeo", "Vimeo embeds", ["external"])
                .contextual()
                .cookies(matchers(&["vuid"])?),
        )?
        .app(App::new("gmap", "Google Maps", ["external"]).contextual())?
        .app(App::new("tawkto", "Tawk.to (live chat)", ["support"]))?
        .app(App::new("intercom", "Intercom", ["support"]))?
        .app(
            App::new("stripe", "Stripe", ["payments"])
                .cookies(matchers(&["__stripe_mid", "__stripe_sid"])?),
        )?
        .app(App::new("paypal", "PayPal", ["payments"]))?
        .app(
            App::new("ol-recommendations", "On-site recommendations", ["personalization"])
                .cookies(matchers(&["ol_recs_enabled", "ol_pref_*"])?),
        )?
        .translation("en", english())
        .build()
}
