//! Service-principal token exchange with Azure AD.
//!
//! Client-credentials grant against the Microsoft Identity Platform v2.0
//! endpoint, scoped to the resource manager audience.

use chrono::{Duration, Utc};
use log::{debug, warn};
use reqwest::Client;

use crate::credentials::Credentials;
use crate::error::{AksError, AksResult};
use crate::normalize;
use crate::types::{AzureToken, TokenResponse};

/// v2.0 token endpoint of `tenant_id` under `login_base`.
pub(crate) fn token_url(login_base: &str, tenant_id: &str) -> String {
    format!("{}/{}/oauth2/v2.0/token", login_base, tenant_id)
}

/// `.default` scope of the resource manager audience.
pub(crate) fn arm_scope(arm_base: &str) -> String {
    format!("{}/.default", arm_base.trim_end_matches('/'))
}

/// Acquire a token using the client-credentials grant.
pub async fn acquire_token(
    http: &Client,
    login_base: &str,
    arm_base: &str,
    creds: &Credentials,
) -> AksResult<AzureToken> {
    if [&creds.client_id, &creds.client_secret, &creds.tenant_id]
        .iter()
        .any(|v| v.is_empty())
    {
        return Err(AksError::configuration(
            "token exchange needs a client id, a client secret and a tenant id",
        ));
    }

    let url = token_url(login_base, &creds.tenant_id);
    debug!("token exchange for {} → {}", creds.client_id, url);

    let scope = arm_scope(arm_base);
    let form: [(&str, &str); 4] = [
        ("grant_type", "client_credentials"),
        ("client_id", creds.client_id.as_str()),
        ("client_secret", creds.client_secret.as_str()),
        ("scope", scope.as_str()),
    ];

    let resp = http
        .post(&url)
        .form(&form)
        .send()
        .await
        .map_err(|e| AksError::auth(format!("Failed to authenticate with Azure: {e}")))?;

    let status = resp.status().as_u16();
    let body = resp
        .bytes()
        .await
        .map_err(|e| AksError::auth(format!("Failed to authenticate with Azure: {e}")))?;

    if !(200..300).contains(&status) {
        let detail = normalize::token_error_message(&body);
        warn!("Azure token endpoint → {} {}", status, detail);
        return Err(AksError::auth(format!(
            "Failed to authenticate with Azure (HTTP {}): {}",
            status, detail
        )));
    }

    let parsed: TokenResponse = serde_json::from_slice(&body)
        .map_err(|e| AksError::auth(format!("Malformed token response: {e}")))?;
    Ok(token_from_response(parsed))
}

/// Stamp an absolute expiry on a fresh token.
fn token_from_response(resp: TokenResponse) -> AzureToken {
    let expires_at = resp
        .expires_in
        .map(|secs| Utc::now() + Duration::seconds(secs as i64));

    AzureToken {
        access_token: resp.access_token,
        token_type: resp.token_type,
        expires_at,
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AksErrorKind;

    #[test]
    fn token_url_per_tenant() {
        assert_eq!(
            token_url("https://login.microsoftonline.us", "tenant-789"),
            "https://login.microsoftonline.us/tenant-789/oauth2/v2.0/token"
        );
    }

    #[test]
    fn scope_from_arm_base() {
        assert_eq!(
            arm_scope("https://management.azure.com/"),
            "https://management.azure.com/.default"
        );
    }

    #[test]
    fn expiry_is_relative_to_now() {
        let before = Utc::now();
        let tok = token_from_response(TokenResponse {
            access_token: "arm-token".into(),
            token_type: "Bearer".into(),
            expires_in: Some(600),
        });
        let exp = tok.expires_at.unwrap();
        assert!(exp >= before + Duration::seconds(600));
        assert!(!tok.is_expired());

        let open_ended = token_from_response(TokenResponse {
            access_token: "arm-token".into(),
            token_type: "Bearer".into(),
            expires_in: None,
        });
        assert!(open_ended.expires_at.is_none());
    }

    #[tokio::test]
    async fn empty_client_id_fails_before_any_request() {
        let creds = Credentials {
            client_id: String::new(),
            client_secret: "s".into(),
            subscription_id: "sub".into(),
            tenant_id: "t".into(),
        };
        let e = acquire_token(&Client::new(), "http://127.0.0.1:9", "http://127.0.0.1:9", &creds)
            .await
            .unwrap_err();
        assert_eq!(e.kind, AksErrorKind::Configuration);
    }
}
