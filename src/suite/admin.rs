use serde_json::json;

use super::{SuiteContext, SuiteReport, Verdict};
use crate::probe::{ProbeRequest, ProbeResult};
use crate::report;

/// The configuration entries worth surfacing in the console output.
const KEY_CONFIGS: [&str; 4] = ["coding_mode", "coding_token", "tenant_url", "auth_token"];

/// Entries whose values are credentials and must be redacted on display.
const SENSITIVE_CONFIGS: [&str; 2] = ["coding_token", "auth_token"];

/// Admin configuration session flow: log in for a session token, read the
/// system configs, push any externally supplied overrides, and re-read to
/// confirm. Without a session token the remaining probes are pointless and
/// are not attempted.
pub async fn run(ctx: &SuiteContext<'_>) -> SuiteReport {
    let mut suite = SuiteReport::new("admin");
    report::suite_header("admin", "admin configuration session flow");

    let Some(password) = &ctx.config.admin_password else {
        report::skipped("admin login", "GATECHECK_ADMIN_PASSWORD is not set");
        return suite;
    };

    let result = ctx
        .send(ProbeRequest::post("api/login").json(json!({"password": password})))
        .await;
    let session = session_token(&result);
    report::check(suite.record("admin login", vec![200], result));

    let Some(session) = session else {
        suite.note(
            Verdict::Fail,
            "login did not yield a session token; the remaining admin probes were not attempted",
        );
        return suite;
    };
    ctx.pause().await;

    let result = ctx
        .send(ProbeRequest::get("api/system/configs").session_token(session.as_str()))
        .await;
    describe_configs(&result);
    report::check(suite.record("fetch system configs", vec![200], result));
    ctx.pause().await;

    for entry in &ctx.config.overrides {
        let result = ctx
            .send(
                ProbeRequest::post("api/system/config")
                    .session_token(session.as_str())
                    .json(json!({
                        "key": entry.key,
                        "value": entry.value,
                        "description": entry.description,
                        "category": entry.category,
                    })),
            )
            .await;
        let acknowledged = result.json_str("/status") == Some("success");
        let label = format!("update config {}", entry.key);
        if acknowledged {
            report::check(suite.record(label, vec![200], result));
        } else {
            report::check(suite.record_note(
                label,
                vec![200],
                result,
                Verdict::Fail,
                "the update was not acknowledged with status=success",
            ));
        }
        ctx.pause().await;
    }

    if !ctx.config.overrides.is_empty() {
        let result = ctx
            .send(ProbeRequest::get("api/system/configs").session_token(session.as_str()))
            .await;
        describe_configs(&result);
        report::check(suite.record("confirm system configs", vec![200], result));
    }

    suite
}

/// Pulls the session token out of a successful login response, which looks
/// like `{"status": "success", "token": "..."}`.
fn session_token(result: &ProbeResult) -> Option<String> {
    if result.json_str("/status") != Some("success") {
        return None;
    }
    result.json_str("/token").map(str::to_string)
}

/// Prints the handful of configuration entries the probes care about.
fn describe_configs(result: &ProbeResult) {
    let Some(entries) = result
        .json
        .as_ref()
        .and_then(|body| body.pointer("/configs"))
        .and_then(|configs| configs.as_array())
    else {
        return;
    };
    report::detail(&format!("{} configuration entries", entries.len()));
    for entry in entries {
        let Some(key) = entry.pointer("/key").and_then(|k| k.as_str()) else {
            continue;
        };
        if !KEY_CONFIGS.contains(&key) {
            continue;
        }
        let value = entry.pointer("/value").and_then(|v| v.as_str()).unwrap_or("");
        report::detail(&format!("{key}: {}", display_value(key, value)));
    }
}

fn display_value(key: &str, value: &str) -> String {
    if value.is_empty() {
        "(empty)".to_string()
    } else if SENSITIVE_CONFIGS.contains(&key) {
        redact(value)
    } else {
        value.to_string()
    }
}

/// First 20 characters of a credential, the rest elided.
fn redact(value: &str) -> String {
    use unicode_truncate::UnicodeTruncateStr;

    let (prefix, _) = value.unicode_truncate(20);
    if prefix.len() < value.len() {
        format!("{prefix}...")
    } else {
        value.to_string()
    }
}
