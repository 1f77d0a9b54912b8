pub mod admin;
pub mod auth;
pub mod chat;
pub mod diagnose;

use std::time::Duration;

use reqwest::Client;

use crate::config::app_config::AppConfig;
use crate::probe::{ProbeRequest, ProbeResult, runner};

/// How a check's observed outcome compares to what the scenario expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Warn,
    Fail,
}

/// One executed scenario: what was probed, which status codes were
/// acceptable, and what actually came back.
#[derive(Debug)]
pub struct Check {
    pub label: String,
    pub expected: Vec<u16>,
    pub result: ProbeResult,
    pub verdict: Verdict,
    pub note: Option<String>,
}

/// The outcome of one suite: its checks in execution order plus free-form
/// analysis lines surfaced again in the final summary.
#[derive(Debug)]
pub struct SuiteReport {
    pub name: &'static str,
    pub checks: Vec<Check>,
    pub analysis: Vec<(Verdict, String)>,
}

impl SuiteReport {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            checks: Vec::new(),
            analysis: Vec::new(),
        }
    }

    /// Records a check, deriving the verdict from the accepted status list.
    /// A transport failure is always a failed check.
    pub fn record(
        &mut self,
        label: impl Into<String>,
        expected: Vec<u16>,
        result: ProbeResult,
    ) -> &Check {
        let verdict = if result.error.is_some() {
            Verdict::Fail
        } else if result.matches(&expected) {
            Verdict::Pass
        } else {
            Verdict::Fail
        };
        self.push(label, expected, result, verdict, None)
    }

    /// Records a check with a verdict the suite decided itself, e.g. a 200
    /// whose body shape was still wrong.
    pub fn record_note(
        &mut self,
        label: impl Into<String>,
        expected: Vec<u16>,
        result: ProbeResult,
        verdict: Verdict,
        note: impl Into<String>,
    ) -> &Check {
        self.push(label, expected, result, verdict, Some(note.into()))
    }

    fn push(
        &mut self,
        label: impl Into<String>,
        expected: Vec<u16>,
        result: ProbeResult,
        verdict: Verdict,
        note: Option<String>,
    ) -> &Check {
        self.checks.push(Check {
            label: label.into(),
            expected,
            result,
            verdict,
            note,
        });
        self.checks.last().expect("just pushed")
    }

    /// Adds an analysis line for the summary.
    pub fn note(&mut self, verdict: Verdict, message: impl Into<String>) {
        self.analysis.push((verdict, message.into()));
    }

    /// The status a labelled check observed, for cross-check analysis rules.
    pub fn status_of(&self, label: &str) -> Option<u16> {
        self.checks
            .iter()
            .find(|check| check.label == label)
            .and_then(|check| check.result.status)
    }

    pub fn matched(&self) -> usize {
        self.checks
            .iter()
            .filter(|check| check.verdict == Verdict::Pass)
            .count()
    }
}

/// Shared handles for a suite run. Probes go out one at a time; the pause
/// keeps the target service from being hammered.
pub struct SuiteContext<'a> {
    pub client: &'a Client,
    pub config: &'a AppConfig,
}

impl SuiteContext<'_> {
    pub async fn send(&self, probe: ProbeRequest) -> ProbeResult {
        runner::send(self.client, &self.config.base_url, probe).await
    }

    pub async fn pause(&self) {
        tokio::time::sleep(Duration::from_secs(self.config.plan.pause_seconds)).await;
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn ok_result(status: u16) -> ProbeResult {
        ProbeResult {
            status: Some(status),
            ..ProbeResult::default()
        }
    }

    #[test]
    fn record_derives_verdicts_from_accepted_codes() {
        let mut suite = SuiteReport::new("demo");
        suite.record("accepted", vec![200], ok_result(200));
        suite.record("rejected", vec![200], ok_result(500));
        suite.record(
            "transport",
            vec![200],
            ProbeResult::transport_error("timed out".to_string(), 30.0),
        );

        assert_eq!(suite.checks[0].verdict, Verdict::Pass);
        assert_eq!(suite.checks[1].verdict, Verdict::Fail);
        assert_eq!(suite.checks[2].verdict, Verdict::Fail);
        assert_eq!(suite.matched(), 1);
    }

    #[test]
    fn status_of_finds_checks_by_label() {
        let mut suite = SuiteReport::new("demo");
        suite.record("first", vec![401], ok_result(401));

        assert_eq!(suite.status_of("first"), Some(401));
        assert_eq!(suite.status_of("missing"), None);
    }
}
