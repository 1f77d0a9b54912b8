use super::{SuiteContext, SuiteReport, Verdict};
use crate::probe::ProbeRequest;
use crate::report;

const NO_AUTH: &str = "no Authorization header";
const EMPTY_BEARER: &str = "empty bearer token";
const INVALID_BEARER: &str = "invalid bearer token";
const VALID_BEARER: &str = "configured bearer token";

/// Authentication behavior: the models endpoint under four credential
/// shapes, plus the public admin config endpoint. Each probe records its
/// status; the closing analysis reads them together.
pub async fn run(ctx: &SuiteContext<'_>) -> SuiteReport {
    let mut suite = SuiteReport::new("auth");
    report::suite_header("auth", "authentication behavior");

    let result = ctx.send(ProbeRequest::get("v1/models")).await;
    report::check(suite.record(NO_AUTH, vec![401], result));
    ctx.pause().await;

    let result = ctx.send(ProbeRequest::get("v1/models").bearer("")).await;
    report::check(suite.record(EMPTY_BEARER, vec![401], result));
    ctx.pause().await;

    let result = ctx
        .send(ProbeRequest::get("v1/models").bearer("invalid-token"))
        .await;
    report::check(suite.record(INVALID_BEARER, vec![401], result));
    ctx.pause().await;

    match &ctx.config.api_token {
        Some(token) => {
            let result = ctx
                .send(ProbeRequest::get("v1/models").bearer(token.as_str()))
                .await;
            report::check(suite.record(VALID_BEARER, vec![200], result));
            ctx.pause().await;
        }
        None => report::skipped(VALID_BEARER, "GATECHECK_API_TOKEN is not set"),
    }

    let result = ctx.send(ProbeRequest::get("admin/config")).await;
    let coding_mode = result.json_str("/coding_mode").map(str::to_string);
    report::check(suite.record("admin config endpoint", vec![200, 401, 403], result));
    if let Some(mode) = coding_mode {
        report::detail(&format!("coding_mode: {mode}"));
    }

    analyze(&mut suite);
    suite
}

fn analyze(suite: &mut SuiteReport) {
    let no_auth = suite.status_of(NO_AUTH);
    let invalid = suite.status_of(INVALID_BEARER);
    let valid = suite.status_of(VALID_BEARER);

    if no_auth == Some(200) && invalid == Some(200) {
        suite.note(
            Verdict::Warn,
            "authentication appears to be bypassed: unauthenticated and invalid-token requests both returned 200",
        );
    }
    match (valid, invalid) {
        (Some(401), _) => suite.note(
            Verdict::Fail,
            "the configured token was rejected; the token value or the gateway token configuration is wrong",
        ),
        (Some(200), Some(401)) => suite.note(
            Verdict::Pass,
            "authentication behaves as expected: configured token accepted, invalid token rejected",
        ),
        _ => {}
    }
}
