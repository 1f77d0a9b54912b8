use serde_json::Value;

/// Display length for response body excerpts.
pub const EXCERPT_LIMIT: usize = 300;

/// Outcome of a single probe. `status` and `content_type` are absent when
/// the request never completed; `error` holds the transport failure instead.
#[derive(Debug, Clone, Default)]
pub struct ProbeResult {
    pub status: Option<u16>,
    pub content_type: Option<String>,
    pub body_excerpt: String,
    pub json: Option<Value>,
    pub error: Option<String>,
    pub elapsed: f64,
}

impl ProbeResult {
    pub fn transport_error(message: String, elapsed: f64) -> Self {
        Self {
            error: Some(message),
            elapsed,
            ..Self::default()
        }
    }

    /// Whether the recorded status is one of the codes the caller accepts.
    /// Transport failures match nothing.
    pub fn matches(&self, accepted: &[u16]) -> bool {
        self.status.map(|code| accepted.contains(&code)).unwrap_or(false)
    }

    /// Looks up a string field in the parsed JSON body by pointer,
    /// e.g. `/choices/0/message/content`.
    pub fn json_str(&self, pointer: &str) -> Option<&str> {
        self.json.as_ref()?.pointer(pointer)?.as_str()
    }
}

/// Truncates a response body to the excerpt limit without splitting a
/// multi-byte character, appending an ellipsis when anything was cut.
pub fn excerpt(body: &str) -> String {
    use unicode_truncate::UnicodeTruncateStr;

    let (truncated, _) = body.unicode_truncate(EXCERPT_LIMIT);
    if truncated.len() < body.len() {
        format!("{truncated}...")
    } else {
        truncated.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn matches_compares_against_accepted_codes() {
        let result = ProbeResult {
            status: Some(401),
            ..ProbeResult::default()
        };
        assert!(result.matches(&[401]));
        assert!(result.matches(&[200, 401, 403]));
        assert!(!result.matches(&[200]));
    }

    #[test]
    fn transport_errors_match_nothing() {
        let result = ProbeResult::transport_error("connection refused".to_string(), 0.1);
        assert!(result.status.is_none());
        assert!(result.content_type.is_none());
        assert!(!result.matches(&[200, 401, 403, 500]));
    }

    #[test]
    fn json_str_follows_pointers() {
        let result = ProbeResult {
            status: Some(200),
            json: Some(json!({"choices": [{"message": {"content": "hi"}}]})),
            ..ProbeResult::default()
        };
        assert_eq!(result.json_str("/choices/0/message/content"), Some("hi"));
        assert_eq!(result.json_str("/choices/1/message/content"), None);
    }

    #[test]
    fn excerpt_keeps_short_bodies_intact() {
        assert_eq!(excerpt("ok"), "ok");
        assert_eq!(excerpt(""), "");
    }

    #[test]
    fn excerpt_truncates_long_bodies() {
        let body = "x".repeat(EXCERPT_LIMIT * 2);
        let cut = excerpt(&body);
        assert_eq!(cut.len(), EXCERPT_LIMIT + 3);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn excerpt_never_splits_multibyte_characters() {
        let body = "日".repeat(EXCERPT_LIMIT);
        let cut = excerpt(&body);
        assert!(cut.ends_with("..."));
        // double-width characters: half the limit fits, plus the ellipsis
        assert_eq!(cut.chars().count(), EXCERPT_LIMIT / 2 + 3);
    }
}
