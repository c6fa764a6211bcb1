//! Zoya Consent — validates and serves the Klaro consent configuration.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;
use zoya_consent_core::ServerConfig;
use zoya_consent_protocol::{render_js, site, ConsentConfig};

mod report;
mod routes;
mod state;

use state::AppState;

/// Config for the offline subcommands: an explicit file, else
/// `ZOYA_CONSENT_CONFIG`, else the bundled site config.
fn resolve_config_path(arg: Option<&String>, server: &ServerConfig) -> Option<PathBuf> {
    arg.map(PathBuf::from).or_else(|| server.consent_config.clone())
}

fn read_unvalidated(path: Option<&Path>) -> anyhow::Result<ConsentConfig> {
    Ok(match path {
        Some(path) => {
            let data = std::fs::read_to_string(path)
                .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
            ConsentConfig::from_json(&data)?
        }
        None => site::openlibrary()?,
    })
}

fn read_validated(path: Option<&Path>) -> anyhow::Result<ConsentConfig> {
    Ok(match path {
        Some(path) => ConsentConfig::load(path)?,
        None => site::openlibrary()?,
    })
}

fn print_help() {
    println!("Zoya Consent — Klaro consent configuration server");
    println!();
    println!("Usage: zoya-consent [command]");
    println!();
    println!("Commands:");
    println!("  (none)              Start the server");
    println!("  validate [file]     Validate a consent config and print the report");
    println!("  render [file]       Print the klaro-config.js script");
    println!("  json [file]         Print the normalized JSON config");
    println!("  help                Show this help message");
    println!();
    println!("Environment:");
    println!("  PORT                 HTTP port (default 3010)");
    println!("  ZOYA_CONSENT_BIND    Bind address (default 0.0.0.0)");
    println!("  ZOYA_CONSENT_CONFIG  JSON consent config (default: bundled site config)");
    println!("  ZOYA_CONSENT_VAR     Script variable name (default klaroConfig)");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let server = ServerConfig::from_env()?;

    // Handle CLI subcommands
    if args.len() > 1 {
        let path = resolve_config_path(args.get(2), &server);
        match args[1].as_str() {
            "--validate" | "validate" => {
                let config = read_unvalidated(path.as_deref())?;
                let report = config.validate();
                report::print_report(path.as_deref(), &config, &report);
                std::process::exit(if report.is_valid() { 0 } else { 1 });
            }
            "--render" | "render" => {
                let config = read_validated(path.as_deref())?;
                print!("{}", render_js(&config, &server.js_var)?);
                return Ok(());
            }
            "--json" | "json" => {
                let config = read_validated(path.as_deref())?;
                println!("{}", config.to_json_pretty()?);
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                print_help();
                return Ok(());
            }
            _ => {
                eprintln!(
                    "Unknown command: {}. Use 'zoya-consent help' for usage.",
                    args[1]
                );
                std::process::exit(1);
            }
        }
    }

    // Normal server startup
    match &server.consent_config {
        Some(path) => info!("Consent config: {}", path.display()),
        None => info!("Consent config: bundled site config"),
    }

    let state = Arc::new(AppState::load(server)?);
    info!(
        "Serving consent config v{} ({} purposes, {} apps, {} warnings)",
        state.consent.version,
        state.consent.purposes.len(),
        state.consent.apps.len(),
        state.report.warnings().count()
    );

    let app = routes::build_router(state.clone());

    let addr = state.server.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Zoya Consent server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
