//! Authenticated transport.
//!
//! [`ArmTransport`] is the single seam through which every outbound call
//! passes. [`HttpTransport`] is the production implementation: it
//! acquires a bearer token, caches it until expiry and signs each request.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Client, Method};
use tokio::sync::Mutex;

use crate::auth;
use crate::config::AksConfig;
use crate::credentials::Credentials;
use crate::error::{AksError, AksResult};
use crate::types::AzureToken;

/// Correlation header understood by ARM.
pub const CLIENT_REQUEST_ID: &str = "x-ms-client-request-id";

/// One unsigned ARM request.
#[derive(Debug, Clone)]
pub struct ArmRequest {
    pub method: Method,
    pub url: String,
    pub body: Option<serde_json::Value>,
}

impl ArmRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            body: None,
        }
    }

    pub fn put(url: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: Method::PUT,
            url: url.into(),
            body: Some(body),
        }
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self {
            method: Method::DELETE,
            url: url.into(),
            body: None,
        }
    }
}

/// Status and body of any HTTP answer, successful or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Signs and sends requests. Implementations return `Err` only for
/// transport-level failures; every HTTP status comes back as `Ok`.
#[async_trait]
pub trait ArmTransport: Send + Sync {
    async fn send(&self, request: ArmRequest) -> AksResult<RawResponse>;
}

/// reqwest-backed transport with a cached client-credentials token.
pub struct HttpTransport {
    http: Client,
    credentials: Credentials,
    login_base: String,
    arm_base: String,
    token: Mutex<Option<AzureToken>>,
}

impl HttpTransport {
    pub fn new(credentials: Credentials, config: &AksConfig) -> AksResult<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| AksError::transport(format!("cannot build HTTP client: {e}")))?;
        Ok(Self {
            http,
            credentials,
            login_base: config.login_base.clone(),
            arm_base: config.arm_base.clone(),
            token: Mutex::new(None),
        })
    }

    /// Current bearer token, refreshed when missing or expired. The lock is
    /// held only for the check and refresh.
    async fn bearer(&self) -> AksResult<String> {
        let mut guard = self.token.lock().await;
        if let Some(tok) = guard.as_ref().filter(|t| !t.is_expired()) {
            return Ok(tok.access_token.clone());
        }
        debug!("acquiring ARM token for tenant {}", self.credentials.tenant_id);
        let fresh =
            auth::acquire_token(&self.http, &self.login_base, &self.arm_base, &self.credentials)
                .await?;
        let access = fresh.access_token.clone();
        *guard = Some(fresh);
        Ok(access)
    }

    /// Drop the cached token so the next request re-authenticates.
    pub async fn invalidate_token(&self) {
        *self.token.lock().await = None;
    }
}

#[async_trait]
impl ArmTransport for HttpTransport {
    async fn send(&self, request: ArmRequest) -> AksResult<RawResponse> {
        let token = self.bearer().await?;
        let auth_value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| AksError::auth(format!("Header value error: {e}")))?;

        let request_id = uuid::Uuid::new_v4().to_string();
        debug!("ARM {} {} ({})", request.method, request.url, request_id);

        let mut builder = self
            .http
            .request(request.method, &request.url)
            .header(AUTHORIZATION, auth_value)
            .header(CLIENT_REQUEST_ID, request_id);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let resp = builder.send().await?;
        let status = resp.status().as_u16();
        if status == 401 {
            warn!("ARM rejected the bearer token; dropping cached token");
            self.invalidate_token().await;
        }
        let body = resp.bytes().await?;
        Ok(RawResponse::new(status, body.to_vec()))
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
