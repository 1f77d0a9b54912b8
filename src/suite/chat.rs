use std::time::Duration;

use serde_json::json;

use super::{SuiteContext, SuiteReport, Verdict};
use crate::probe::{ProbeRequest, result::excerpt};
use crate::report;

/// A deliberately wrong credential; the gateway rejecting it is the
/// expected outcome, not a failure.
const INVALID_TOKEN: &str = "badtest";

const CHAT_WITH_TOKEN: &str = "chat with configured token";

/// Chat completion behavior: models and chat probes first with an invalid
/// token (expected failures), then with the configured one. A 200 chat
/// response must actually carry completion text.
pub async fn run(ctx: &SuiteContext<'_>) -> SuiteReport {
    let mut suite = SuiteReport::new("chat");
    report::suite_header("chat", "chat completion behavior");

    let result = ctx.send(models_probe(INVALID_TOKEN)).await;
    report::check(suite.record("models with invalid token", vec![401], result));
    ctx.pause().await;

    let result = ctx.send(chat_probe(ctx, INVALID_TOKEN)).await;
    report::check(suite.record("chat with invalid token", vec![401], result));
    ctx.pause().await;

    let Some(token) = ctx.config.api_token.clone() else {
        report::skipped(CHAT_WITH_TOKEN, "GATECHECK_API_TOKEN is not set");
        return suite;
    };

    let result = ctx.send(models_probe(&token)).await;
    report::check(suite.record("models with configured token", vec![200], result));
    ctx.pause().await;

    let result = ctx.send(chat_probe(ctx, &token)).await;
    let completion = result
        .json_str("/choices/0/message/content")
        .map(str::to_string);
    match (result.status, completion) {
        (Some(200), Some(text)) if !text.is_empty() => {
            report::check(suite.record(CHAT_WITH_TOKEN, vec![200], result));
            report::detail(&format!("completion: {}", excerpt(&text)));
        }
        (Some(200), _) => {
            report::check(suite.record_note(
                CHAT_WITH_TOKEN,
                vec![200],
                result,
                Verdict::Warn,
                "200 but no completion text at choices[0].message.content",
            ));
        }
        _ => {
            report::check(suite.record(CHAT_WITH_TOKEN, vec![200], result));
        }
    }

    analyze(&mut suite);
    suite
}

fn models_probe(token: &str) -> ProbeRequest {
    ProbeRequest::get("v1/models")
        .bearer(token)
        .header("Content-Type", "application/json")
}

fn chat_probe(ctx: &SuiteContext<'_>, token: &str) -> ProbeRequest {
    ProbeRequest::post("v1/chat/completions")
        .bearer(token)
        .json(json!({
            "model": ctx.config.plan.chat_model,
            "messages": [
                {"role": "user", "content": "Reply with one short sentence so the round trip can be verified."}
            ],
            "max_tokens": 150,
            "temperature": 0.7,
        }))
        .timeout(Duration::from_secs(ctx.config.plan.chat_timeout_seconds))
}

fn analyze(suite: &mut SuiteReport) {
    let all_passed =
        suite.checks.len() == 4 && suite.checks.iter().all(|c| c.verdict == Verdict::Pass);
    if all_passed {
        suite.note(
            Verdict::Pass,
            "invalid credentials are rejected and the configured token completes a chat round trip",
        );
    } else if suite
        .checks
        .iter()
        .any(|c| c.label == CHAT_WITH_TOKEN && c.verdict == Verdict::Fail)
    {
        suite.note(
            Verdict::Fail,
            "the configured token cannot complete a chat request; see the diagnose suite for classification",
        );
    }
}
