use crate::catalog::CapabilityCatalog;
use serde_json::Value;
use sha2::{Digest, Sha256};

const SYSTEM_PROMPT_TEMPLATE: &str = include_str!("prompts/assets/system.prompt.md");
const FINAL_RESPONSE_TEMPLATE: &str = include_str!("prompts/assets/final_response.prompt.md");

pub const TOOLS_HEADER: &str = "Available Tools:";
pub const NO_TOOLS_LINE: &str = "No tools are currently available.";
const DEFAULT_SERVER_CHOICE: &str = "\"backend_id\"";

/// Lists every backend's tools in declaration order. Identical catalogs render
/// identical text.
pub fn render_tools_description(catalog: &CapabilityCatalog) -> String {
    let mut out = format!("{TOOLS_HEADER}\n\n");
    if catalog.backends().is_empty() {
        out.push_str(NO_TOOLS_LINE);
        out.push_str("\n\n");
        return out;
    }

    for backend in catalog.backends() {
        out.push_str(&format!(
            "=== {} SERVER ===\n",
            backend.id.as_str().to_ascii_uppercase()
        ));
        for tool in &backend.tools {
            out.push_str(&format!("- {}: {}\n", tool.name, tool.description));
            let params: Vec<String> = tool
                .parameters
                .iter()
                .map(|param| format!("{} ({}): {}", param.name, param.kind, param.description))
                .collect();
            if !params.is_empty() {
                out.push_str(&format!("  Parameters: {}\n", params.join(", ")));
            }
            out.push('\n');
        }
    }
    out
}

pub fn render_system_prompt(vehicle_state: &str, catalog: &CapabilityCatalog) -> String {
    let server_choices = if catalog.backends().is_empty() {
        DEFAULT_SERVER_CHOICE.to_string()
    } else {
        catalog
            .backends()
            .iter()
            .map(|backend| format!("\"{}\"", backend.id))
            .collect::<Vec<_>>()
            .join(" or ")
    };
    let tools_description = render_tools_description(catalog);
    render_template(
        SYSTEM_PROMPT_TEMPLATE,
        &[
            ("vehicle_state", vehicle_state),
            ("tools_description", &tools_description),
            ("server_choices", &server_choices),
        ],
    )
}

/// Follow-up prompt that turns a tool result into a reply for the driver.
pub fn render_final_response_prompt(query: &str, reasoning: &str, tool_result: &Value) -> String {
    let rendered_result =
        serde_json::to_string_pretty(tool_result).unwrap_or_else(|_| tool_result.to_string());
    render_template(
        FINAL_RESPONSE_TEMPLATE,
        &[
            ("query", query.trim()),
            ("reasoning", reasoning.trim()),
            ("tool_result", &rendered_result),
        ],
    )
}

/// Reply used when the follow-up prompt cannot be answered.
pub fn fallback_final_response(tool_result: &Value) -> String {
    format!("Action completed. Tool result: {tool_result}")
}

pub fn prompt_digest(prompt: &str) -> String {
    let digest = Sha256::digest(prompt.as_bytes());
    to_hex(&digest)
}

fn to_hex(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(HEX[(byte >> 4) as usize] as char);
        out.push(HEX[(byte & 0x0f) as usize] as char);
    }
    out
}

// Unknown placeholders are left in place; templates are compiled in, so a typo shows
// up in the rendered text and in the tests below.
fn render_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut rendered = String::with_capacity(template.len());
    let mut cursor = template;

    while let Some(start) = cursor.find("{{") {
        rendered.push_str(&cursor[..start]);
        let after_open = &cursor[start + 2..];
        let Some(close_offset) = after_open.find("}}") else {
            rendered.push_str(&cursor[start..]);
            return rendered;
        };
        let token = after_open[..close_offset].trim();
        match values.iter().find(|(key, _)| *key == token) {
            Some((_, value)) => rendered.push_str(value),
            None => rendered.push_str(&cursor[start..start + 2 + close_offset + 2]),
        }
        cursor = &after_open[close_offset + 2..];
    }

    rendered.push_str(cursor);
    rendered
}
