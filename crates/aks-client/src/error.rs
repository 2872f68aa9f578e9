//! Error types for AKS operations.
//!
//! Every failure is returned to the caller as an [`AksError`]; logging is
//! done in addition to, never instead of, returning it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Generic internal-error status attached to transport failures.
pub const INTERNAL_ERROR_CODE: u16 = 500;

/// Categorised error kinds for AKS operations.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AksErrorKind {
    /// A required credential is missing or empty.
    Configuration,
    /// A create request failed its required-field checks.
    Validation,
    /// Network, TLS or timeout failure below HTTP.
    Transport,
    /// The token endpoint refused the service principal.
    Auth,
    /// The provider answered with a status outside the ok set.
    Provider,
    /// The provider reported the terminal `Failed` provisioning state.
    ProvisioningFailed,
    /// The caller's cancellation token fired while polling.
    Cancelled,
    /// The polling deadline passed before a terminal state.
    Timeout,
}

impl fmt::Display for AksErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "Configuration error"),
            Self::Validation => write!(f, "Validation error"),
            Self::Transport => write!(f, "Transport error"),
            Self::Auth => write!(f, "Authentication error"),
            Self::Provider => write!(f, "Provider error"),
            Self::ProvisioningFailed => write!(f, "Provisioning failed"),
            Self::Cancelled => write!(f, "Cancelled"),
            Self::Timeout => write!(f, "Timed out"),
        }
    }
}

/// Main error type for AKS operations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AksError {
    pub kind: AksErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

impl AksError {
    pub fn new(kind: AksErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status_code: None,
        }
    }

    pub fn with_status(kind: AksErrorKind, message: impl Into<String>, status: u16) -> Self {
        Self {
            kind,
            message: message.into(),
            status_code: Some(status),
        }
    }

    /// A credential variable is unset or empty.
    pub fn missing_env(variable: &str) -> Self {
        Self::new(
            AksErrorKind::Configuration,
            format!("Environmental variable is empty: {}", variable),
        )
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(AksErrorKind::Configuration, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(AksErrorKind::Validation, message)
    }

    /// Transport failures always carry the generic internal-error code.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::with_status(AksErrorKind::Transport, message, INTERNAL_ERROR_CODE)
    }

    /// Token failures travel the transport path, so they share its code.
    pub fn auth(message: impl Into<String>) -> Self {
        Self::with_status(AksErrorKind::Auth, message, INTERNAL_ERROR_CODE)
    }

    pub fn provider(status: u16, message: impl Into<String>) -> Self {
        Self::with_status(AksErrorKind::Provider, message, status)
    }

    /// Fixed error for the terminal `Failed` stage; carries no provider
    /// detail.
    pub fn provisioning_failed() -> Self {
        Self::new(AksErrorKind::ProvisioningFailed, "cluster provisioning failed")
    }

    pub fn cancelled() -> Self {
        Self::new(AksErrorKind::Cancelled, "polling cancelled by caller")
    }

    pub fn timeout(secs: u64) -> Self {
        Self::new(
            AksErrorKind::Timeout,
            format!("cluster did not reach a terminal state within {}s", secs),
        )
    }

    pub fn is_kind(&self, kind: AksErrorKind) -> bool {
        self.kind == kind
    }
}

impl fmt::Display for AksError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status_code {
            Some(code) => write!(f, "[{}] {} (HTTP {})", self.kind, self.message, code),
            None => write!(f, "[{}] {}", self.kind, self.message),
        }
    }
}

impl std::error::Error for AksError {}

impl From<reqwest::Error> for AksError {
    fn from(e: reqwest::Error) -> Self {
        AksError::transport(e.to_string())
    }
}

impl From<AksError> for String {
    fn from(e: AksError) -> String {
        e.to_string()
    }
}

pub type AksResult<T> = Result<T, AksError>;

// ─── Tests ──────────────────────────────────────────────────────────
