use crate::shared::ids::BackendId;
use serde_json::{json, Map, Value};
use std::collections::HashMap;

pub mod descriptor;
pub mod discovery;
pub mod store;

pub use descriptor::{ParameterSpec, ToolDescriptor, NO_DESCRIPTION};
pub use discovery::discover;
pub use store::SharedCatalog;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("Capability `{capability}` is not available on any backend")]
    NotFound { capability: String },
}

/// Problems seen while building a catalog. None of them abort discovery.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiscoveryIssue {
    #[error("backend `{backend}` unreachable: {reason}")]
    Unreachable { backend: BackendId, reason: String },
    #[error("backend `{backend}` answered discovery with status {status}")]
    BadStatus { backend: BackendId, status: u16 },
    #[error("backend `{backend}` returned a malformed capability list: {reason}")]
    MalformedBody { backend: BackendId, reason: String },
    #[error("backend `{backend}` declared a tool without a name at index {index}")]
    UnnamedTool { backend: BackendId, index: usize },
    #[error("capability `{capability}` declared by `{duplicate}` is already owned by `{owner}`")]
    DuplicateCapability {
        capability: String,
        owner: BackendId,
        duplicate: BackendId,
    },
}

impl DiscoveryIssue {
    pub fn backend(&self) -> &BackendId {
        match self {
            Self::Unreachable { backend, .. }
            | Self::BadStatus { backend, .. }
            | Self::MalformedBody { backend, .. }
            | Self::UnnamedTool { backend, .. } => backend,
            Self::DuplicateCapability { duplicate, .. } => duplicate,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BackendEntry {
    pub id: BackendId,
    pub address: String,
    pub tools: Vec<ToolDescriptor>,
}

/// Where a capability lives after resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedCapability<'a> {
    pub backend: &'a BackendId,
    pub address: &'a str,
    pub tool: &'a ToolDescriptor,
}

/// Snapshot of every reachable backend and the capabilities it exposes.
///
/// Built in one piece by discovery and never mutated afterwards, so readers can hold
/// an `Arc` to it while a newer catalog replaces it.
#[derive(Debug, Clone, Default)]
pub struct CapabilityCatalog {
    backends: Vec<BackendEntry>,
    owners: HashMap<String, (usize, usize)>,
    issues: Vec<DiscoveryIssue>,
}

impl CapabilityCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Indexes backends in declaration order. A capability name seen a second time
    /// stays with its first owner and the later declaration is dropped as an issue.
    pub fn assemble(entries: Vec<BackendEntry>, mut issues: Vec<DiscoveryIssue>) -> Self {
        let mut backends: Vec<BackendEntry> = Vec::with_capacity(entries.len());
        let mut owners: HashMap<String, (usize, usize)> = HashMap::new();

        for entry in entries {
            let backend_index = backends.len();
            let mut kept = Vec::with_capacity(entry.tools.len());
            for tool in entry.tools {
                if let Some(&(owner_index, _)) = owners.get(&tool.name) {
                    let owner = if owner_index == backend_index {
                        entry.id.clone()
                    } else {
                        backends[owner_index].id.clone()
                    };
                    issues.push(DiscoveryIssue::DuplicateCapability {
                        capability: tool.name.clone(),
                        owner,
                        duplicate: entry.id.clone(),
                    });
                    continue;
                }
                owners.insert(tool.name.clone(), (backend_index, kept.len()));
                kept.push(tool);
            }
            backends.push(BackendEntry {
                id: entry.id,
                address: entry.address,
                tools: kept,
            });
        }

        Self {
            backends,
            owners,
            issues,
        }
    }

    pub fn resolve(&self, capability: &str) -> Result<ResolvedCapability<'_>, CatalogError> {
        let (backend_index, tool_index) =
            self.owners
                .get(capability)
                .copied()
                .ok_or_else(|| CatalogError::NotFound {
                    capability: capability.to_string(),
                })?;
        let entry = &self.backends[backend_index];
        Ok(ResolvedCapability {
            backend: &entry.id,
            address: &entry.address,
            tool: &entry.tools[tool_index],
        })
    }

    pub fn backends(&self) -> &[BackendEntry] {
        &self.backends
    }

    pub fn backend(&self, id: &str) -> Option<&BackendEntry> {
        self.backends.iter().find(|entry| entry.id.as_str() == id)
    }

    pub fn issues(&self) -> &[DiscoveryIssue] {
        &self.issues
    }

    pub fn tool_count(&self) -> usize {
        self.backends.iter().map(|entry| entry.tools.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.tool_count() == 0
    }

    /// `{"servers": {id: {"url", "tools"}}, "issues": [...]}` for the tools listing.
    pub fn to_wire(&self) -> Value {
        let servers: Map<String, Value> = self
            .backends
            .iter()
            .map(|entry| {
                (
                    entry.id.to_string(),
                    json!({
                        "url": entry.address,
                        "tools": entry.tools.iter().map(ToolDescriptor::to_wire).collect::<Vec<_>>(),
                    }),
                )
            })
            .collect();
        json!({
            "servers": servers,
            "issues": self.issues.iter().map(ToString::to_string).collect::<Vec<_>>(),
        })
    }
}
