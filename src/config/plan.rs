use serde::Deserialize;

/// The diagnostic suites a run can execute, in the order they are listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuiteKind {
    Auth,
    Chat,
    Admin,
    Diagnose,
}

impl SuiteKind {
    pub fn name(self) -> &'static str {
        match self {
            SuiteKind::Auth => "auth",
            SuiteKind::Chat => "chat",
            SuiteKind::Admin => "admin",
            SuiteKind::Diagnose => "diagnose",
        }
    }
}

/// An optional YAML probe plan. Every field has a default, so the tool runs
/// a full sweep without any plan file.
///
/// ```yaml
/// suites: [auth, chat]
/// pause_seconds: 1
/// chat_model: augment-chat
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ProbePlan {
    /// Which suites to run, in order.
    #[serde(default = "default_suites")]
    pub suites: Vec<SuiteKind>,

    /// Pause between consecutive probes, so the target is not hammered.
    #[serde(default = "default_pause")]
    pub pause_seconds: u64,

    /// Timeout applied to every probe unless a suite overrides it.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,

    /// Longer timeout for chat completion probes.
    #[serde(default = "default_chat_timeout")]
    pub chat_timeout_seconds: u64,

    /// Model name sent in chat completion payloads.
    #[serde(default = "default_chat_model")]
    pub chat_model: String,
}

fn default_suites() -> Vec<SuiteKind> {
    vec![
        SuiteKind::Auth,
        SuiteKind::Chat,
        SuiteKind::Admin,
        SuiteKind::Diagnose,
    ]
}

fn default_pause() -> u64 {
    2
}

fn default_request_timeout() -> u64 {
    30
}

fn default_chat_timeout() -> u64 {
    60
}

fn default_chat_model() -> String {
    "claude-3-5-sonnet-20241022".to_string()
}

impl Default for ProbePlan {
    fn default() -> Self {
        Self {
            suites: default_suites(),
            pause_seconds: default_pause(),
            request_timeout_seconds: default_request_timeout(),
            chat_timeout_seconds: default_chat_timeout(),
            chat_model: default_chat_model(),
        }
    }
}
