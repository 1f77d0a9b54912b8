use std::time::Instant;

use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use url::Url;

use super::request::ProbeRequest;
use super::result::{ProbeResult, excerpt};

/// Issues a single probe and classifies the response. Never fails: every
/// transport error comes back inside the result with `error` set, so a run
/// always proceeds to its next probe.
pub async fn send(client: &Client, base_url: &Url, probe: ProbeRequest) -> ProbeResult {
    let url = match base_url.join(probe.path.trim_start_matches('/')) {
        Ok(url) => url,
        Err(e) => {
            return ProbeResult::transport_error(
                format!("invalid probe path {:?}: {e}", probe.path),
                0.0,
            );
        }
    };

    log::debug!("{} {}", probe.method, url);

    let mut builder = client.request(probe.method.clone(), url);
    for (name, value) in &probe.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    if let Some(token) = &probe.bearer {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    if let Some(token) = &probe.session_token {
        builder = builder.header("X-Auth-Token", token.as_str());
    }
    if let Some(body) = &probe.body {
        builder = builder.json(body);
    }
    if let Some(timeout) = probe.timeout {
        builder = builder.timeout(timeout);
    }

    let start = Instant::now();
    let response = match builder.send().await {
        Ok(response) => response,
        Err(e) => {
            return ProbeResult::transport_error(super::report(&e), start.elapsed().as_secs_f64());
        }
    };

    let status = response.status().as_u16();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            // a failure mid-body counts as a transport failure
            return ProbeResult::transport_error(
                format!("failed to read response body: {}", super::report(&e)),
                start.elapsed().as_secs_f64(),
            );
        }
    };
    let elapsed = start.elapsed().as_secs_f64();

    let declared_json = content_type
        .as_deref()
        .is_some_and(|ct| ct.contains("application/json"));
    let json = if declared_json {
        match serde_json::from_str(&body) {
            Ok(value) => Some(value),
            Err(e) => {
                log::debug!("body declared application/json but did not parse: {e}");
                None
            }
        }
    } else {
        None
    };

    ProbeResult {
        status: Some(status),
        content_type,
        body_excerpt: excerpt(&body),
        json,
        error: None,
        elapsed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client() -> Client {
        Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap()
    }

    fn base_url(server: &MockServer) -> Url {
        Url::parse(&format!("{}/", server.uri())).unwrap()
    }

    #[tokio::test]
    async fn json_responses_are_parsed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/models"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"data": [{"id": "m1"}]})),
            )
            .mount(&server)
            .await;

        let result = send(&test_client(), &base_url(&server), ProbeRequest::get("v1/models")).await;

        assert_eq!(result.status, Some(200));
        assert!(result.content_type.as_ref().unwrap().contains("application/json"));
        assert!(result.error.is_none());
        assert_eq!(result.json_str("/data/0/id"), Some("m1"));
    }

    #[tokio::test]
    async fn malformed_json_falls_back_to_the_raw_excerpt() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/models"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("not json", "application/json"))
            .mount(&server)
            .await;

        let result = send(&test_client(), &base_url(&server), ProbeRequest::get("v1/models")).await;

        assert_eq!(result.status, Some(200));
        assert!(result.json.is_none());
        assert_eq!(result.body_excerpt, "not json");
    }

    #[tokio::test]
    async fn non_json_bodies_stay_opaque() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_raw("<html><body>Internal Error</body></html>", "text/html"),
            )
            .mount(&server)
            .await;

        let result = send(
            &test_client(),
            &base_url(&server),
            ProbeRequest::post("v1/chat/completions").json(json!({"model": "m"})),
        )
        .await;

        assert_eq!(result.status, Some(500));
        assert!(result.content_type.unwrap().contains("text/html"));
        assert!(result.json.is_none());
        assert!(result.body_excerpt.contains("Internal Error"));
    }

    #[tokio::test]
    async fn credentials_and_body_land_on_the_wire() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/system/config"))
            .and(header("Authorization", "Bearer live-token"))
            .and(header("X-Auth-Token", "sess-1"))
            .and(body_json(json!({"key": "tenant_url"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "success"})))
            .mount(&server)
            .await;

        let result = send(
            &test_client(),
            &base_url(&server),
            ProbeRequest::post("api/system/config")
                .bearer("live-token")
                .session_token("sess-1")
                .json(json!({"key": "tenant_url"})),
        )
        .await;

        assert_eq!(result.status, Some(200));
        assert_eq!(result.json_str("/status"), Some("success"));
    }

    #[tokio::test]
    async fn missing_credentials_record_the_status_instead_of_failing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/models"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"error": "unauthorized"})),
            )
            .mount(&server)
            .await;

        let result = send(&test_client(), &base_url(&server), ProbeRequest::get("v1/models")).await;

        assert_eq!(result.status, Some(401));
        assert!(result.error.is_none());
        assert!(result.matches(&[401]));
    }

    #[tokio::test]
    async fn a_request_exceeding_its_timeout_becomes_an_error_result() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/models"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let result = send(
            &test_client(),
            &base_url(&server),
            ProbeRequest::get("v1/models").timeout(Duration::from_millis(100)),
        )
        .await;

        assert!(result.status.is_none());
        assert!(result.content_type.is_none());
        assert!(result.error.is_some());
    }

    #[tokio::test]
    async fn connection_refused_becomes_an_error_result() {
        // nothing listens on the discard port
        let base = Url::parse("http://127.0.0.1:9/").unwrap();

        let result = send(&test_client(), &base, ProbeRequest::get("v1/models")).await;

        assert!(result.status.is_none());
        assert!(result.error.is_some());
    }

    #[tokio::test]
    async fn repeated_probes_classify_identically() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/models"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({"error": "forbidden"})))
            .mount(&server)
            .await;

        let first = send(&test_client(), &base_url(&server), ProbeRequest::get("v1/models")).await;
        let second = send(&test_client(), &base_url(&server), ProbeRequest::get("v1/models")).await;

        assert_eq!(first.status, second.status);
        assert_eq!(first.matches(&[403]), second.matches(&[403]));
    }
}
