//! RedfishTransport trait definition and HTTPS implementation.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{RedfishError, Result};

pub mod client;
pub mod types;

#[cfg(test)]
pub(crate) mod mock;

pub use client::{Credentials, HttpTransport};

/// Root of the management API. Every path handed to a transport must live below it.
pub const REDFISH_ROOT: &str = "/redfish/v1";

#[async_trait]
pub trait RedfishTransport: Send + Sync {
    /// Host (or host:port) this transport talks to.
    fn host(&self) -> &str;

    /// GET a resource and decode its JSON body.
    async fn get(&self, path: &str) -> Result<Value>;

    /// POST an action request and decode its JSON body.
    async fn post_action(&self, path: &str, body: &Value) -> Result<Value>;
}

/// Reject anything that does not sit under [`REDFISH_ROOT`], including absolute
/// URLs pointing at another host.
pub fn ensure_redfish_path(path: &str) -> Result<()> {
    let under_root = match path.strip_prefix(REDFISH_ROOT) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    };
    // URL parsing treats `\` as `/` and `%2e` as `.`, so both count as traversal.
    let traverses = path.contains('\\')
        || path.split('/').any(|segment| {
            matches!(segment.to_ascii_lowercase().replace("%2e", ".").as_str(), "." | "..")
        });
    if !under_root || traverses {
        return Err(RedfishError::ProtocolViolation(format!(
            "{path:?} is outside {REDFISH_ROOT}"
        )));
    }
    Ok(())
}

/// Decode a response body. Malformed JSON is always surfaced as
/// [`RedfishError::Decode`]; callers decide whether to substitute anything.
pub fn decode_body(path: &str, body: &[u8]) -> Result<Value> {
    serde_json::from_slice(body).map_err(|source| RedfishError::Decode {
        path: path.to_string(),
        source,
    })
}

/// Convert a decoded body into a typed resource.
pub fn from_value<T: DeserializeOwned>(path: &str, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|source| RedfishError::Decode {
        path: path.to_string(),
        source,
    })
}

/// GET `path` and deserialize it as `T`.
pub async fn get_as<T: DeserializeOwned>(
    transport: &dyn RedfishTransport,
    path: &str,
) -> Result<T> {
    let value = transport.get(path).await?;
    from_value(path, value)
}

/// Append a child segment to a resource path, keeping the trailing slash
/// convention some legacy firmwares require.
pub fn child_path(parent: &str, child: &str) -> String {
    format!("{}/{}/", parent.trim_end_matches('/'), child)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_under_root_are_accepted() {
        assert!(ensure_redfish_path("/redfish/v1").is_ok());
        assert!(ensure_redfish_path("/redfish/v1/Systems/1").is_ok());
        assert!(ensure_redfish_path("/redfish/v1/Systems/1/Memory/").is_ok());
    }

    #[test]
    fn test_paths_outside_root_are_protocol_violations() {
        for path in [
            "https://evil.example/redfish/v1/Systems/1",
            "/redfish/v10/Systems",
            "/api/v1/Systems",
            "",
            "/redfish/v1/../../etc/passwd",
            "/redfish/v1/%2e%2e/%2e%2e/admin",
            "/redfish/v1/.%2E/admin",
            "/redfish/v1/..\\..\\admin",
        ] {
            let err = ensure_redfish_path(path).unwrap_err();
            assert!(
                matches!(err, RedfishError::ProtocolViolation(_)),
                "expected violation for {path:?}, got {err:?}"
            );
        }
    }

    #[test]
    fn test_malformed_body_surfaces_decode_error() {
        let err = decode_body("/redfish/v1/Chassis", b"<html>oops</html>").unwrap_err();
        assert!(err.is_decode());

        // No synthesized collection is returned in place of the body.
        let err = decode_body("/redfish/v1/Systems", b"{\"Members\": [").unwrap_err();
        assert!(matches!(err, RedfishError::Decode { ref path, .. } if path == "/redfish/v1/Systems"));
    }

    #[test]
    fn test_well_formed_body_decodes() {
        let value = decode_body("/redfish/v1", br#"{"Name": "Root"}"#).unwrap();
        assert_eq!(value["Name"], "Root");
    }

    #[test]
    fn test_child_path_normalizes_trailing_slash() {
        assert_eq!(
            child_path("/redfish/v1/Systems/1/SmartStorage/ArrayControllers/0/", "DiskDrives"),
            "/redfish/v1/Systems/1/SmartStorage/ArrayControllers/0/DiskDrives/"
        );
        assert_eq!(
            child_path("/redfish/v1/Systems/1/SmartStorage/ArrayControllers/0", "DiskDrives"),
            "/redfish/v1/Systems/1/SmartStorage/ArrayControllers/0/DiskDrives/"
        );
    }
}
