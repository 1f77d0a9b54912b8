use chrono::Utc;

use crate::config::app_config::AppConfig;
use crate::suite::{Check, SuiteReport, Verdict};

/// Column width for check labels so status lines line up.
const LABEL_WIDTH: usize = 34;

fn to_fixed_width(input: &str, width: usize) -> String {
    use unicode_truncate::UnicodeTruncateStr;

    let (truncated, _) = input.unicode_truncate(width);
    format!("{:<width$}", truncated, width = width)
}

fn marker(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Pass => "✅",
        Verdict::Warn => "⚠️",
        Verdict::Fail => "❌",
    }
}

/// Run banner: where the probes go and which credentials are available.
/// Credential values themselves are never printed.
pub fn run_header(config: &AppConfig) {
    println!(
        "gatecheck {} — {}",
        env!("CARGO_PKG_VERSION"),
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("target: {}", config.base_url);
    println!(
        "credentials: api token {}, admin password {}",
        presence(config.api_token.is_some()),
        presence(config.admin_password.is_some())
    );
    let suites: Vec<&str> = config.plan.suites.iter().map(|s| s.name()).collect();
    println!("suites: {}", suites.join(", "));
}

fn presence(present: bool) -> &'static str {
    if present { "set" } else { "not set" }
}

pub fn suite_header(name: &str, description: &str) {
    println!();
    println!("=== {name}: {description}");
}

/// One status line per executed check.
pub fn check(check: &Check) {
    let label = to_fixed_width(&check.label, LABEL_WIDTH);
    match (&check.result.error, check.result.status) {
        (Some(error), _) => {
            println!("  {} {label} transport failure: {error}", marker(check.verdict));
        }
        (None, Some(status)) => {
            let elapsed = check.result.elapsed * 1000.0;
            if check.result.matches(&check.expected) {
                println!("  {} {label} {status} in {elapsed:.0}ms", marker(check.verdict));
            } else {
                println!(
                    "  {} {label} {status} (expected {}) in {elapsed:.0}ms",
                    marker(check.verdict),
                    expected_list(&check.expected)
                );
                if !check.result.body_excerpt.is_empty() {
                    detail(&check.result.body_excerpt);
                }
            }
        }
        (None, None) => {
            println!("  {} {label} no response recorded", marker(check.verdict));
        }
    }
    if let Some(note) = &check.note {
        detail(note);
    }
}

fn expected_list(expected: &[u16]) -> String {
    expected
        .iter()
        .map(|code| code.to_string())
        .collect::<Vec<_>>()
        .join(" or ")
}

/// Indented context under a check line: excerpts, parsed fields, notes.
pub fn detail(message: &str) {
    println!("       {message}");
}

pub fn skipped(label: &str, reason: &str) {
    println!("  ·  {} skipped: {reason}", to_fixed_width(label, LABEL_WIDTH));
}

/// Closing tally: per-suite expected-vs-actual counts, the analysis notes,
/// and an overall line. Mirrors what each probe printed live.
pub fn summary(suites: &[SuiteReport]) {
    println!();
    println!("=== summary");

    let mut matched = 0;
    let mut total = 0;
    for suite in suites {
        matched += suite.matched();
        total += suite.checks.len();
        println!(
            "  {}: {}/{} checks matched expectations",
            suite.name,
            suite.matched(),
            suite.checks.len()
        );
        for (verdict, message) in &suite.analysis {
            println!("     {} {message}", marker(*verdict));
        }
    }

    println!();
    println!("{matched}/{total} checks matched expectations");
}
