//! Client for communicating with the FMC REST API

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use fmc_common::{Error, FmcVersion, ProviderConfig, Result};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use tracing::{debug, info};

use crate::state::{items_of, json_at};

const TOKEN_PATH: &str = "/api/fmc_platform/v1/auth/generatetoken";
const VERSION_PATH: &str = "/api/fmc_platform/v1/info/serverversion";
const DOMAIN_PATH: &str = "/api/fmc_platform/v1/info/domain";

/// Minimal REST surface the reconciler and resource handlers depend on
#[async_trait]
pub trait RestClient: Send + Sync {
    async fn get(&self, path: &str) -> Result<Value>;

    async fn post(&self, path: &str, body: &Value) -> Result<Value>;

    async fn put(&self, path: &str, body: &Value) -> Result<Value>;

    async fn delete(&self, path: &str) -> Result<Value>;

    /// Version of the connected FMC
    fn version(&self) -> &FmcVersion;

    /// UUID of a domain by name; `None` selects the default domain
    fn domain_uuid(&self, domain: Option<&str>) -> Result<String>;
}

/// Client wrapper for FMC communication
pub struct FmcClient {
    http: reqwest::Client,
    base_url: String,
    auth: Auth,
    version: FmcVersion,
    default_domain: String,
    domains: HashMap<String, String>,
}

enum Auth {
    AccessToken(String),
    Bearer(String),
}

impl FmcClient {
    /// Log in, then learn the server version and domain layout
    pub async fn connect(config: &ProviderConfig) -> Result<Self> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(config.insecure)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| Error::Transport(e.to_string()))?;

        let base_url = config.url.trim_end_matches('/').to_string();

        let (auth, login_domain) = match &config.token {
            Some(token) => (Auth::Bearer(token.clone()), None),
            None => login(&http, &base_url, config).await?,
        };

        let mut client = Self {
            http,
            base_url,
            auth,
            version: FmcVersion::new(0, 0, 0),
            default_domain: String::new(),
            domains: HashMap::new(),
        };

        client.version = client.fetch_version().await?;
        client.domains = client.fetch_domains().await?;

        client.default_domain = match (&config.domain, login_domain) {
            (Some(name), _) => client.lookup_domain(name)?,
            (None, Some(uuid)) => uuid,
            (None, None) => client.lookup_domain("Global")?,
        };

        info!(
            "Connected to FMC {} (version {}, {} domains)",
            client.base_url,
            client.version,
            client.domains.len()
        );

        Ok(client)
    }

    async fn fetch_version(&self) -> Result<FmcVersion> {
        let response = self.get(VERSION_PATH).await?;
        let raw = items_of(&response)
            .first()
            .and_then(|item| json_at(item, "serverVersion"))
            .and_then(Value::as_str)
            .ok_or_else(|| {
                Error::UnexpectedResponse("server version missing from response".to_string())
            })?;
        FmcVersion::parse(raw)
    }

    async fn fetch_domains(&self) -> Result<HashMap<String, String>> {
        let response = self.get(DOMAIN_PATH).await?;
        Ok(items_of(&response)
            .iter()
            .filter_map(|item| {
                let name = item.get("name")?.as_str()?;
                let uuid = item.get("uuid")?.as_str()?;
                Some((name.to_string(), uuid.to_string()))
            })
            .collect())
    }

    fn lookup_domain(&self, name: &str) -> Result<String> {
        self.domains
            .get(name)
            .cloned()
            .ok_or_else(|| Error::DomainNotFound(name.to_string()))
    }

    async fn request(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        debug!("{} {}", method, url);

        let mut request = self.http.request(method, &url);
        request = match &self.auth {
            Auth::AccessToken(token) => request.header("X-auth-access-token", token),
            Auth::Bearer(token) => request.bearer_auth(token),
        };
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                message: error_message(&text, status),
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl RestClient for FmcClient {
    async fn get(&self, path: &str) -> Result<Value> {
        self.request(Method::GET, path, None).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        self.request(Method::POST, path, Some(body)).await
    }

    async fn put(&self, path: &str, body: &Value) -> Result<Value> {
        self.request(Method::PUT, path, Some(body)).await
    }

    async fn delete(&self, path: &str) -> Result<Value> {
        self.request(Method::DELETE, path, None).await
    }

    fn version(&self) -> &FmcVersion {
        &self.version
    }

    fn domain_uuid(&self, domain: Option<&str>) -> Result<String> {
        match domain {
            Some(name) => self.lookup_domain(name),
            None => Ok(self.default_domain.clone()),
        }
    }
}

/// Generate an access token with basic auth
async fn login(
    http: &reqwest::Client,
    base_url: &str,
    config: &ProviderConfig,
) -> Result<(Auth, Option<String>)> {
    let username = config.username.clone().unwrap_or_default();
    let response = http
        .post(format!("{}{}", base_url, TOKEN_PATH))
        .basic_auth(username, config.password.clone())
        .send()
        .await
        .map_err(|e| Error::Transport(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        return Err(Error::Http {
            status: status.as_u16(),
            message: error_message(&text, status),
        });
    }

    let header = |name: &str| {
        response
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    let token = header("X-auth-access-token").ok_or_else(|| {
        Error::UnexpectedResponse("token generation returned no access token".to_string())
    })?;
    let domain = header("DOMAIN_UUID");

    Ok((Auth::AccessToken(token), domain))
}

/// Pull FMC's error description out of a response body when present
fn error_message(body: &str, status: StatusCode) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("messages"))
                .and_then(Value::as_array)
                .and_then(|msgs| msgs.first())
                .and_then(|m| m.get("description"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_string()
            } else {
                body.to_string()
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_extracts_description() {
        let body = r#"{"error":{"category":"FRAMEWORK","messages":[{"description":"Duplicate Name"}],"severity":"ERROR"}}"#;
        assert_eq!(error_message(body, StatusCode::BAD_REQUEST), "Duplicate Name");
    }

    #[test]
    fn test_error_message_falls_back() {
        assert_eq!(error_message("", StatusCode::NOT_FOUND), "Not Found");
        assert_eq!(error_message("plain text", StatusCode::BAD_GATEWAY), "plain text");
    }
}
