use std::time::Duration;

use serde_json::json;

use super::{SuiteContext, SuiteReport, Verdict};
use crate::probe::{ProbeRequest, ProbeResult, result::excerpt};
use crate::report;

/// Chat failure diagnosis: checks that the models endpoint is healthy, then
/// reproduces a completion request and classifies a 500 by what the gateway
/// actually sent back. An HTML body means the request died upstream of the
/// API handler; a JSON body is the gateway's own error.
pub async fn run(ctx: &SuiteContext<'_>) -> SuiteReport {
    let mut suite = SuiteReport::new("diagnose");
    report::suite_header("diagnose", "chat failure diagnosis");

    let Some(token) = ctx.config.api_token.clone() else {
        report::skipped("models endpoint health", "GATECHECK_API_TOKEN is not set");
        return suite;
    };

    let result = ctx
        .send(ProbeRequest::get("v1/models").bearer(token.as_str()))
        .await;
    let model_count = result
        .json
        .as_ref()
        .and_then(|body| body.pointer("/data"))
        .and_then(|data| data.as_array())
        .map(|models| models.len());
    report::check(suite.record("models endpoint health", vec![200], result));
    if let Some(count) = model_count {
        report::detail(&format!("{count} models advertised"));
    }
    ctx.pause().await;

    let result = ctx
        .send(
            ProbeRequest::post("v1/chat/completions")
                .bearer(token.as_str())
                .json(json!({
                    "model": ctx.config.plan.chat_model,
                    "messages": [{"role": "user", "content": "Hello, this is a test message."}],
                    "stream": false,
                }))
                .timeout(Duration::from_secs(ctx.config.plan.chat_timeout_seconds)),
        )
        .await;
    diagnose_chat(&mut suite, result);

    suite
}

fn diagnose_chat(suite: &mut SuiteReport, result: ProbeResult) {
    if result.status != Some(500) {
        report::check(suite.record("chat completion", vec![200], result));
        return;
    }

    let note = match result.content_type.as_deref() {
        Some(ct) if ct.contains("text/html") => {
            "the gateway returned an HTML error page; the request reached the platform but failed upstream of the API handler"
        }
        Some(ct) if ct.contains("application/json") => {
            "the gateway returned a structured error body"
        }
        _ => "the gateway returned an unclassified 500 body",
    };
    let error_body = result.json.as_ref().map(|body| body.to_string());
    report::check(suite.record_note("chat completion", vec![200], result, Verdict::Fail, note));
    if let Some(body) = error_body {
        report::detail(&format!("error body: {}", excerpt(&body)));
    }
}
