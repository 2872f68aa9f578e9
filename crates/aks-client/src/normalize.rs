//! Response normalisation.
//!
//! Turns a raw status code and body into a snapshot or a provider error
//! message. Nothing in here fails on malformed JSON: bodies that do not
//! decode degrade to default values.

use log::debug;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{AksError, AksResult};
use crate::types::{ClusterSnapshot, ManagedCluster};

/// Statuses treated as success, per operation.
pub mod ok_codes {
    pub const CREATE_OR_UPDATE: &[u16] = &[200, 201];
    pub const GET: &[u16] = &[200];
    pub const DELETE: &[u16] = &[200, 202, 204];
    pub const LIST: &[u16] = &[200];
}

pub const STATUS_OK: u16 = 200;
pub const STATUS_CREATED: u16 = 201;
pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_NOT_FOUND: u16 = 404;

#[derive(Deserialize, Default)]
struct ArmErrorEnvelope {
    #[serde(default)]
    error: Option<ArmErrorBody>,
}

#[derive(Deserialize, Default)]
struct ArmErrorBody {
    #[serde(default)]
    message: String,
}

#[derive(Deserialize, Default)]
struct BareMessage {
    #[serde(default)]
    message: String,
}

#[derive(Deserialize, Default)]
struct TokenErrorBody {
    #[serde(default)]
    error: String,
    #[serde(default)]
    error_description: String,
}

pub fn is_ok(status: u16, ok: &[u16]) -> bool {
    ok.contains(&status)
}

/// Decode `body`, falling back to `T::default()` when it is empty or
/// malformed.
pub fn decode_or_default<T: DeserializeOwned + Default>(body: &[u8]) -> T {
    if body.is_empty() {
        return T::default();
    }
    match serde_json::from_slice(body) {
        Ok(v) => v,
        Err(e) => {
            debug!("discarding undecodable body ({} bytes): {}", body.len(), e);
            T::default()
        }
    }
}

/// Lenient snapshot decode. A malformed body yields an empty snapshot whose
/// provisioning state reads as in progress.
pub fn snapshot(body: &[u8]) -> ClusterSnapshot {
    ClusterSnapshot::from(decode_or_default::<ManagedCluster>(body))
}

/// Extract the provider's message: nested `error.message` first, then a
/// top-level `message` on 400. Empty when neither is present.
pub fn error_message(status: u16, body: &[u8]) -> String {
    let nested = decode_or_default::<ArmErrorEnvelope>(body)
        .error
        .map(|e| e.message)
        .unwrap_or_default();
    if !nested.is_empty() {
        return nested;
    }
    if status == STATUS_BAD_REQUEST {
        return decode_or_default::<BareMessage>(body).message;
    }
    String::new()
}

/// Message from an Azure AD token-endpoint error body.
pub fn token_error_message(body: &[u8]) -> String {
    let b = decode_or_default::<TokenErrorBody>(body);
    if !b.error_description.is_empty() {
        b.error_description
    } else {
        b.error
    }
}

/// `Ok(())` when `status` is in `ok`, otherwise a provider error carrying
/// the extracted message.
pub fn check(status: u16, body: &[u8], ok: &[u16]) -> AksResult<()> {
    if is_ok(status, ok) {
        Ok(())
    } else {
        Err(AksError::provider(status, error_message(status, body)))
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AksErrorKind;
    use crate::types::ProvisioningState;

    #[test]
    fn nested_error_message() {
        let body = br#"{"error":{"code":"QuotaExceeded","message":"quota exceeded"}}"#;
        assert_eq!(error_message(409, body), "quota exceeded");
    }

    #[test]
    fn bare_message_on_bad_request() {
        let body = br#"{"message":"bad dns prefix"}"#;
        assert_eq!(error_message(400, body), "bad dns prefix");
    }

    #[test]
    fn bare_message_ignored_for_other_statuses() {
        let body = br#"{"message":"not for you"}"#;
        assert_eq!(error_message(409, body), "");
    }

    #[test]
    fn nested_wins_on_bad_request() {
        let body = br#"{"message":"outer","error":{"message":"inner"}}"#;
        assert_eq!(error_message(400, body), "inner");
    }

    #[test]
    fn malformed_error_body_is_empty_message() {
        assert_eq!(error_message(500, b"<html>oops</html>"), "");
        assert_eq!(error_message(400, b""), "");
    }

    #[test]
    fn malformed_snapshot_is_in_progress() {
        let s = snapshot(b"{not json");
        assert_eq!(s, ClusterSnapshot::default());
        assert_eq!(s.provisioning_state, ProvisioningState::InProgress(String::new()));
    }

    #[test]
    fn snapshot_reads_state() {
        let s = snapshot(br#"{"name":"c1","properties":{"provisioningState":"Succeeded"}}"#);
        assert_eq!(s.name, "c1");
        assert_eq!(s.provisioning_state, ProvisioningState::Succeeded);
    }

    #[test]
    fn check_ok_sets() {
        assert!(check(201, b"", ok_codes::CREATE_OR_UPDATE).is_ok());
        assert!(check(202, b"", ok_codes::DELETE).is_ok());
        assert!(check(204, b"", ok_codes::DELETE).is_ok());
        assert!(check(201, b"", ok_codes::GET).is_err());
    }

    #[test]
    fn check_error_carries_status_and_message() {
        let e = check(409, br#"{"error":{"message":"quota exceeded"}}"#, ok_codes::CREATE_OR_UPDATE)
            .unwrap_err();
        assert_eq!(e.kind, AksErrorKind::Provider);
        assert_eq!(e.status_code, Some(409));
        assert_eq!(e.message, "quota exceeded");
    }

    #[test]
    fn token_error_prefers_description() {
        let body = br#"{"error":"invalid_client",
            "error_description":"AADSTS7000215: Invalid client secret"}"#;
        assert!(token_error_message(body).starts_with("AADSTS7000215"));
        assert_eq!(token_error_message(br#"{"error":"invalid_request"}"#), "invalid_request");
    }
}
