//! reqwest-backed Redfish transport.
//! Basic auth on every request, bounded per-request timeout, and certificate
//! validation switched off because BMCs ship self-signed certificates.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, Url};
use serde_json::Value;
use tracing::{debug, trace, warn};

use super::{decode_body, ensure_redfish_path, RedfishTransport, REDFISH_ROOT};
use crate::error::{RedfishError, Result};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

pub struct HttpTransport {
    host: String,
    base_url: Url,
    credentials: Credentials,
    client: Client,
}

impl HttpTransport {
    pub fn new(host: &str, credentials: Credentials, request_timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(&format!("https://{host}")).map_err(|e| RedfishError::Transport {
            path: String::new(),
            message: format!("https://{host}: invalid base URL: {e}"),
        })?;

        // BMC certificates are self-signed in practice; trust is carried by the credentials.
        let client = Client::builder()
            .timeout(request_timeout)
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|e| RedfishError::Transport {
                path: String::new(),
                message: format!("{base_url}: failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            host: host.to_string(),
            base_url,
            credentials,
            client,
        })
    }

    /// Resolve `path` against the BMC origin. The resolved URL is checked again,
    /// since URL parsing can normalize a path out of the namespace.
    fn join_path(&self, path: &str) -> Result<Url> {
        let url = self.base_url.join(path).map_err(|e| {
            RedfishError::ProtocolViolation(format!("{}: failed to join path {path}: {e}", self.base_url))
        })?;

        let in_namespace = url.path() == REDFISH_ROOT
            || url
                .path()
                .strip_prefix(REDFISH_ROOT)
                .is_some_and(|rest| rest.starts_with('/'));
        if url.origin() != self.base_url.origin() || !in_namespace {
            return Err(RedfishError::ProtocolViolation(format!(
                "{path:?} resolves to {url}, outside {REDFISH_ROOT}"
            )));
        }
        Ok(url)
    }

    async fn send(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value> {
        ensure_redfish_path(path)?;
        let url = self.join_path(path)?;

        trace!(host = %self.host, %method, %path, "Redfish request");

        let mut request = self
            .client
            .request(method, url)
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .header("Accept", "application/json");

        if let Some(body) = body {
            request = request
                .header("Content-Type", "application/json")
                .body(body.to_string());
        }

        let response = request.send().await.map_err(|e| {
            warn!(host = %self.host, %path, error = %e, "Redfish request failed");
            RedfishError::Transport {
                path: path.to_string(),
                message: e.to_string(),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(host = %self.host, %path, code = status.as_u16(), "Unexpected status code");
            return Err(RedfishError::HttpStatus {
                path: path.to_string(),
                code: status.as_u16(),
                status: status.canonical_reason().unwrap_or("").to_string(),
            });
        }

        let bytes = response.bytes().await.map_err(|e| RedfishError::Transport {
            path: path.to_string(),
            message: format!("failed to read body: {e}"),
        })?;

        let value = decode_body(path, &bytes).map_err(|e| {
            warn!(host = %self.host, %path, error = %e, "Malformed JSON body");
            e
        })?;

        debug!(host = %self.host, %path, bytes = bytes.len(), "Redfish response decoded");
        Ok(value)
    }
}

#[async_trait]
impl RedfishTransport for HttpTransport {
    fn host(&self) -> &str {
        &self.host
    }

    async fn get(&self, path: &str) -> Result<Value> {
        self.send(Method::GET, path, None).await
    }

    async fn post_action(&self, path: &str, body: &Value) -> Result<Value> {
        self.send(Method::POST, path, Some(body)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport() -> HttpTransport {
        HttpTransport::new(
            "10.0.0.1",
            Credentials {
                username: "root".to_string(),
                password: "calvin".to_string(),
            },
            DEFAULT_REQUEST_TIMEOUT,
        )
        .expect("client should build")
    }

    #[tokio::test]
    async fn test_out_of_namespace_path_fails_before_network() {
        // 10.0.0.1 is never contacted: the path check runs first.
        let err = transport()
            .get("https://attacker.example/redfish/v1/Systems")
            .await
            .unwrap_err();
        assert!(matches!(err, RedfishError::ProtocolViolation(_)));
    }

    #[test]
    fn test_join_path_keeps_host() {
        let url = transport().join_path("/redfish/v1/Systems/1").unwrap();
        assert_eq!(url.as_str(), "https://10.0.0.1/redfish/v1/Systems/1");
    }

    #[test]
    fn test_join_path_rejects_urls_normalized_out_of_namespace() {
        let transport = transport();
        for path in [
            "/redfish/v1/%2e%2e/%2e%2e/admin",
            "/redfish/v1/..\\..\\admin",
            "//attacker.example/redfish/v1/Systems",
        ] {
            let err = transport.join_path(path).unwrap_err();
            assert!(
                matches!(err, RedfishError::ProtocolViolation(_)),
                "expected violation for {path:?}, got {err:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_encoded_traversal_fails_before_network() {
        for path in ["/redfish/v1/%2e%2e/%2e%2e/admin", "/redfish/v1/..\\..\\admin"] {
            let err = transport().get(path).await.unwrap_err();
            assert!(matches!(err, RedfishError::ProtocolViolation(_)));
        }
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials {
            username: "admin".to_string(),
            password: "hunter2".to_string(),
        };
        let rendered = format!("{creds:?}");
        assert!(rendered.contains("admin"));
        assert!(!rendered.contains("hunter2"));
    }
}
