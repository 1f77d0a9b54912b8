use std::env;
use std::time::Duration;

use reqwest::Client;
use thiserror::Error;
use url::Url;

use super::plan::ProbePlan;

/// A configuration entry the admin suite pushes to the gateway, matching
/// the key/value/description/category shape of `/api/system/config`.
#[derive(Debug, Clone)]
pub struct ConfigOverride {
    pub key: String,
    pub value: String,
    pub description: String,
    pub category: String,
}

pub struct AppConfig {
    pub base_url: Url,
    pub api_token: Option<String>,
    pub admin_password: Option<String>,
    pub overrides: Vec<ConfigOverride>,
    pub plan: ProbePlan,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("GATECHECK_BASE_URL is not set")]
    MissingBaseUrl,

    #[error("invalid base URL {url:?}: {source}")]
    InvalidBaseUrl {
        url: String,
        source: url::ParseError,
    },

    #[error("failed to read probe plan {path:?}: {source}")]
    UnreadablePlan {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid probe plan {path:?}: {source}")]
    InvalidPlan {
        path: String,
        source: serde_yaml::Error,
    },
}

/// Loads configuration from the environment and the optional YAML plan file
/// named by `GATECHECK_PLAN`. Credentials stay optional; suites that need a
/// missing credential skip their probes and say so. Secrets never come from
/// anywhere but the environment.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let raw = env::var("GATECHECK_BASE_URL").map_err(|_| ConfigError::MissingBaseUrl)?;
    let base_url = parse_base_url(&raw)?;

    let api_token = non_empty(env::var("GATECHECK_API_TOKEN").ok());
    let admin_password = non_empty(env::var("GATECHECK_ADMIN_PASSWORD").ok());

    let mut overrides = Vec::new();
    if let Some(token) = non_empty(env::var("GATECHECK_CODING_TOKEN").ok()) {
        overrides.push(ConfigOverride {
            key: "coding_token".to_string(),
            value: token,
            description: "coding token pushed by gatecheck".to_string(),
            category: "development".to_string(),
        });
    }
    if let Some(tenant_url) = non_empty(env::var("GATECHECK_TENANT_URL").ok()) {
        overrides.push(ConfigOverride {
            key: "tenant_url".to_string(),
            value: tenant_url,
            description: "tenant URL pushed by gatecheck".to_string(),
            category: "development".to_string(),
        });
    }

    let plan = match env::var("GATECHECK_PLAN") {
        Ok(path) => load_plan(&path)?,
        Err(_) => ProbePlan::default(),
    };

    log::info!(
        "probing {} with suites {:?}",
        base_url,
        plan.suites.iter().map(|s| s.name()).collect::<Vec<_>>()
    );

    Ok(AppConfig {
        base_url,
        api_token,
        admin_password,
        overrides,
        plan,
    })
}

/// Parses and normalizes the base URL. The trailing slash matters: without
/// it `Url::join` would drop the last path segment of the base.
pub fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    Url::parse(&with_slash).map_err(|source| ConfigError::InvalidBaseUrl {
        url: raw.to_string(),
        source,
    })
}

fn load_plan(path: &str) -> Result<ProbePlan, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::UnreadablePlan {
        path: path.to_string(),
        source,
    })?;
    serde_yaml::from_str(&contents).map_err(|source| ConfigError::InvalidPlan {
        path: path.to_string(),
        source,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Builds the shared HTTP client with the plan-wide probe timeout. Invalid
/// certificates are accepted: the gateways under diagnosis often sit behind
/// self-signed or platform-issued certificates.
pub fn build_client(plan: &ProbePlan) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(Duration::from_secs(plan.request_timeout_seconds))
        .danger_accept_invalid_certs(true)
        .user_agent(concat!("gatecheck/", env!("CARGO_PKG_VERSION")))
        .build()
}
