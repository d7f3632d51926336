use crate::catalog::{CapabilityCatalog, CatalogError};
use crate::shared::ids::BackendId;
use crate::shared::EventLog;
use crate::transport::{endpoint, BackendTransport, TransportError, EXECUTE_PATH};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

pub const STATUS_NOT_FOUND: u16 = 400;
pub const STATUS_BACKEND_FAILURE: u16 = 500;

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    CapabilityNotFound(#[from] CatalogError),
    #[error("Failed to reach backend `{backend}`: request timed out")]
    Timeout { backend: BackendId },
    #[error("Failed to reach backend `{backend}`: {source}")]
    Transport {
        backend: BackendId,
        #[source]
        source: TransportError,
    },
}

impl DispatchError {
    pub fn status_code(&self) -> u16 {
        match self {
            DispatchError::CapabilityNotFound(_) => STATUS_NOT_FOUND,
            DispatchError::Timeout { .. } | DispatchError::Transport { .. } => {
                STATUS_BACKEND_FAILURE
            }
        }
    }

    pub fn body(&self) -> Value {
        json!({ "error": self.to_string() })
    }
}

/// What the caller gets back from one invocation, success or not.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchOutcome {
    pub status_code: u16,
    pub body: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<BackendId>,
}

impl DispatchOutcome {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

impl From<DispatchError> for DispatchOutcome {
    fn from(err: DispatchError) -> Self {
        let backend = match &err {
            DispatchError::CapabilityNotFound(_) => None,
            DispatchError::Timeout { backend } | DispatchError::Transport { backend, .. } => {
                Some(backend.clone())
            }
        };
        DispatchOutcome {
            status_code: err.status_code(),
            body: err.body(),
            backend,
        }
    }
}

/// Sends invocations to the backend that owns the capability. One attempt, no retries.
pub struct Dispatcher {
    transport: Arc<dyn BackendTransport>,
    log: Arc<EventLog>,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn BackendTransport>, log: Arc<EventLog>) -> Self {
        Self { transport, log }
    }

    pub fn try_invoke(
        &self,
        catalog: &CapabilityCatalog,
        capability: &str,
        args: &Value,
    ) -> Result<DispatchOutcome, DispatchError> {
        let resolved = catalog.resolve(capability)?;
        let url = endpoint(resolved.address, EXECUTE_PATH);
        let payload = json!({ "tool": resolved.tool.name, "args": args });
        self.log.info(
            "dispatch.sent",
            &format!("backend={} capability={capability}", resolved.backend),
        );

        let response = self
            .transport
            .post_json(&url, &payload)
            .map_err(|source| match source {
                TransportError::Timeout { .. } => DispatchError::Timeout {
                    backend: resolved.backend.clone(),
                },
                source => DispatchError::Transport {
                    backend: resolved.backend.clone(),
                    source,
                },
            })?;

        self.log.info(
            "dispatch.completed",
            &format!(
                "backend={} capability={capability} status={}",
                resolved.backend, response.status
            ),
        );
        Ok(DispatchOutcome {
            status_code: response.status,
            body: response.body,
            backend: Some(resolved.backend.clone()),
        })
    }

    /// Like [`Dispatcher::try_invoke`], with failures folded into the status/body pair.
    pub fn invoke(
        &self,
        catalog: &CapabilityCatalog,
        capability: &str,
        args: &Value,
    ) -> DispatchOutcome {
        self.try_invoke(catalog, capability, args)
            .unwrap_or_else(|err| {
                self.log
                    .error("dispatch.failed", &format!("capability={capability} error={err}"));
                err.into()
            })
    }
}
