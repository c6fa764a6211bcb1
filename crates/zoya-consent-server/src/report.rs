//! Console output for the `validate` subcommand.

use std::path::Path;

use zoya_consent_protocol::{ConsentConfig, Issue, ValidationReport};

pub fn print_report(path: Option<&Path>, config: &ConsentConfig, report: &ValidationReport) {
    print!("{}", format_report(path, config, report));
}

pub fn format_report(
    path: Option<&Path>,
    config: &ConsentConfig,
    report: &ValidationReport,
) -> String {
    let source = path
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "bundled site config".into());
    let locales: Vec<&str> = config.translations.keys().map(String::as_str).collect();

    let mut out = String::new();
    out.push_str("=== Zoya Consent Validation Report ===\n\n");
    out.push_str(&format!("Source:        {source}\n"));
    out.push_str(&format!("Version:       {}\n", config.version));
    out.push_str(&format!("Cookie:        {}\n", config.cookie_name));
    out.push_str(&format!("Purposes:      {}\n", config.purposes.len()));
    out.push_str(&format!("Apps:          {}\n", config.apps.len()));
    out.push_str(&format!(
        "Locales:       {}\n",
        if locales.is_empty() { "none".into() } else { locales.join(", ") }
    ));

    write_section(&mut out, "Warnings", report.warnings());
    write_section(&mut out, "Errors", report.errors());

    out.push('\n');
    if report.is_valid() {
        out.push_str("Status: VALID\n");
    } else {
        out.push_str("Status: INVALID\n");
    }
    out
}

fn write_section<'a>(out: &mut String, title: &str, issues: impl Iterator<Item = &'a Issue>) {
    let lines: Vec<String> = issues
        .map(|i| format!("  - [{}] {}\n", i.code, i.message))
        .collect();
    if lines.is_empty() {
        return;
    }
    out.push('\n');
    out.push_str(title);
    out.push_str(":\n");
    for line in lines {
        out.push_str(&line);
    }
}
