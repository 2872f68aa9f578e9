//! In-memory fakes shared by unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::client::AksClient;
use crate::config::AksConfig;
use crate::credentials::Credentials;
use crate::error::{AksError, AksResult};
use crate::transport::{ArmRequest, ArmTransport, RawResponse};

pub fn test_credentials() -> Credentials {
    Credentials {
        client_id: "cid-456".into(),
        client_secret: "top-secret".into(),
        subscription_id: "sub-123".into(),
        tenant_id: "tenant-789".into(),
    }
}

/// Replays canned results in order and records every request it sees.
pub struct ScriptedTransport {
    script: Mutex<VecDeque<AksResult<RawResponse>>>,
    seen: Mutex<Vec<ArmRequest>>,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<RawResponse>) -> Self {
        Self::with_results(responses.into_iter().map(Ok).collect())
    }

    pub fn with_results(results: Vec<AksResult<RawResponse>>) -> Self {
        Self {
            script: Mutex::new(results.into()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ArmRequest> {
        self.seen.lock().unwrap().clone()
    }

    pub fn urls(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.url).collect()
    }
}

#[async_trait]
impl ArmTransport for ScriptedTransport {
    async fn send(&self, request: ArmRequest) -> AksResult<RawResponse> {
        self.seen.lock().unwrap().push(request);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AksError::transport("script exhausted")))
    }
}

pub fn test_client(transport: ScriptedTransport) -> (AksClient, Arc<ScriptedTransport>) {
    let transport = Arc::new(transport);
    let client = AksClient::with_transport(test_credentials(), AksConfig::new(), transport.clone());
    (client, transport)
}
