use super::{BackendEntry, CapabilityCatalog, DiscoveryIssue, ToolDescriptor};
use crate::config::BackendConfig;
use crate::shared::EventLog;
use crate::transport::{endpoint, BackendTransport, CAPABILITIES_PATH};
use serde_json::Value;

/// Queries every configured backend in order and assembles a fresh catalog.
///
/// A backend that cannot be reached, answers non-200, or returns something other
/// than `{"tools": [...]}` is left out and recorded; the rest still make it in.
pub fn discover(
    backends: &[BackendConfig],
    transport: &dyn BackendTransport,
    log: &EventLog,
) -> CapabilityCatalog {
    let mut entries = Vec::with_capacity(backends.len());
    let mut issues = Vec::new();

    for backend in backends {
        if let Some(entry) = discover_backend(backend, transport, &mut issues) {
            log.info(
                "catalog.backend_discovered",
                &format!("backend={} tools={}", entry.id, entry.tools.len()),
            );
            entries.push(entry);
        }
    }

    let catalog = CapabilityCatalog::assemble(entries, issues);
    for issue in catalog.issues() {
        log.warn("catalog.discovery_issue", &issue.to_string());
    }
    log.info(
        "catalog.discovered",
        &format!(
            "backends={} tools={} issues={}",
            catalog.backends().len(),
            catalog.tool_count(),
            catalog.issues().len()
        ),
    );
    catalog
}

fn discover_backend(
    backend: &BackendConfig,
    transport: &dyn BackendTransport,
    issues: &mut Vec<DiscoveryIssue>,
) -> Option<BackendEntry> {
    let url = endpoint(&backend.address, CAPABILITIES_PATH);
    let response = match transport.get_json(&url) {
        Ok(response) => response,
        Err(err) => {
            issues.push(DiscoveryIssue::Unreachable {
                backend: backend.id.clone(),
                reason: err.to_string(),
            });
            return None;
        }
    };
    if response.status != 200 {
        issues.push(DiscoveryIssue::BadStatus {
            backend: backend.id.clone(),
            status: response.status,
        });
        return None;
    }

    let Some(raw_tools) = response.body.get("tools").and_then(Value::as_array) else {
        issues.push(DiscoveryIssue::MalformedBody {
            backend: backend.id.clone(),
            reason: "expected an object with a `tools` array".to_string(),
        });
        return None;
    };

    let mut tools = Vec::with_capacity(raw_tools.len());
    for (index, raw) in raw_tools.iter().enumerate() {
        match ToolDescriptor::from_value(raw) {
            Some(tool) => tools.push(tool),
            None => issues.push(DiscoveryIssue::UnnamedTool {
                backend: backend.id.clone(),
                index,
            }),
        }
    }

    Some(BackendEntry {
        id: backend.id.clone(),
        address: backend.address.trim().to_string(),
        tools,
    })
}
