//! Consent configuration routes: the banner script and read-only API views.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use tracing::debug;

use crate::state::AppState;

// ---------------------------------------------------------------
// Route builders
// ---------------------------------------------------------------

/// Routes mounted at the site root.
pub fn script_routes() -> Router<Arc<AppState>> {
    Router::new().route("/klaro-config.js", get(klaro_script))
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/consent/config", get(get_config))
        .route("/consent/validation", get(get_validation))
        .route("/consent/purposes", get(list_purposes))
        .route("/consent/apps", get(list_apps))
        .route("/consent/apps/{name}", get(get_app))
        .route("/consent/cookies/{name}", get(cookie_owners))
}

// ---------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------

/// GET /klaro-config.js — the script the banner library loads.
async fn klaro_script(State(state): State<Arc<AppState>>) -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/javascript; charset=utf-8"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        state.script.clone(),
    )
        .into_response()
}

async fn get_config(State(state): State<Arc<AppState>>) -> Response {
    Json(&state.consent).into_response()
}

async fn get_validation(State(state): State<Arc<AppState>>) -> Response {
    Json(&state.report).into_response()
}

/// GET /api/consent/purposes — purposes in display order, with labels from
/// the primary locale and the apps grouped under each.
async fn list_purposes(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let consent = &state.consent;
    let strings = consent.primary_locale().map(|(_, s)| s);

    let purposes: Vec<_> = consent
        .purposes
        .iter()
        .map(|p| {
            let apps: Vec<&str> = consent
                .apps_for_purpose(p.as_str())
                .map(|a| a.name.as_str())
                .collect();
            serde_json::json!({
                "id": p,
                "label": strings.and_then(|s| s.purpose_label(p.as_str())),
                "apps": apps,
            })
        })
        .collect();

    Json(serde_json::json!({
        "purposes": purposes,
        "count": purposes.len(),
    }))
}

/// GET /api/consent/apps — per-app summary including the initial state.
async fn list_apps(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let consent = &state.consent;
    let apps: Vec<_> = consent
        .apps
        .iter()
        .map(|a| {
            serde_json::json!({
                "name": a.name,
                "title": a.title,
                "purposes": a.purposes,
                "required": a.required,
                "optOut": a.opt_out,
                "contextualConsentOnly": a.contextual_consent_only,
                "defaultEnabled": a.enabled_by_default(consent.default),
                "cookies": a.cookies.iter().map(|m| serde_json::json!({
                    "matcher": m,
                    "kind": m.kind(),
                })).collect::<Vec<_>>(),
            })
        })
        .collect();

    Json(serde_json::json!({
        "apps": apps,
        "count": apps.len(),
    }))
}

async fn get_app(State(state): State<Arc<AppState>>, Path(name): Path<String>) -> Response {
    match state.consent.require_app(&name) {
        Ok(app) => Json(app).into_response(),
        Err(err) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": err.to_string() })),
        )
            .into_response(),
    }
}

/// GET /api/consent/cookies/{name} — which apps claim a cookie.
async fn cookie_owners(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Json<serde_json::Value> {
    let owners: Vec<&str> = state
        .consent
        .apps_for_cookie(&name)
        .into_iter()
        .map(|a| a.name.as_str())
        .collect();
    debug!("Cookie {} owned by {:?}", name, owners);
    Json(serde_json::json!({
        "cookie": name,
        "owners": owners,
    }))
}
