use crate::command::{SEAT_ADJUSTMENT_CAPABILITY, SEAT_COMMAND_KEY};
use crate::shared::serde_ext::{extract_json_value, parse_json_document};
use serde::Serialize;
use serde_json::{Map, Value};

pub const ACTION_CALL_TOOL: &str = "call_tool";
pub const ACTION_DIRECT_RESPONSE: &str = "direct_response";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecisionError {
    #[error("malformed decision: {reason}")]
    Malformed { reason: String },
}

fn malformed(reason: impl Into<String>) -> DecisionError {
    DecisionError::Malformed {
        reason: reason.into(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolInvocation {
    pub capability: String,
    /// Always a JSON object.
    pub args: Value,
    pub rationale: Option<String>,
    pub backend_hint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecisionEnvelope {
    DirectAnswer { text: String },
    ToolInvocation(ToolInvocation),
}

impl DecisionEnvelope {
    pub fn direct(text: impl Into<String>) -> Self {
        DecisionEnvelope::DirectAnswer { text: text.into() }
    }
}

/// Reads a decision-source reply.
///
/// Text without a JSON object is an answer in its own right. An object must either
/// be a direct response, name a tool (`{"action": "call_tool", "tool": ...}` or the
/// compact `{"tool": ..., "args": ...}`), or carry a `seatCommand`; anything else is
/// rejected rather than guessed at. An object that only appears inside prose is
/// acted on when it is recognizable and otherwise leaves the reply a plain answer.
pub fn interpret(reply: &str) -> Result<DecisionEnvelope, DecisionError> {
    if let Some(Value::Object(object)) = parse_json_document(reply) {
        return interpret_object(&object);
    }
    let envelope = match extract_json_value(reply) {
        Some(Value::Object(object)) => interpret_object(&object).ok(),
        _ => None,
    };
    Ok(envelope.unwrap_or_else(|| DecisionEnvelope::direct(reply.trim())))
}

fn interpret_object(object: &Map<String, Value>) -> Result<DecisionEnvelope, DecisionError> {
    match object.get("action") {
        Some(Value::String(action)) => match action.trim() {
            ACTION_DIRECT_RESPONSE => direct_response(object),
            ACTION_CALL_TOOL => {
                if !object.get("tool").is_some_and(Value::is_string) {
                    return Err(malformed("`call_tool` requires a string `tool`"));
                }
                explicit_invocation(object)
            }
            other => Err(malformed(format!("unknown action `{other}`"))),
        },
        Some(other) => Err(malformed(format!("`action` must be a string, got {other}"))),
        None if object.get("tool").is_some_and(Value::is_string) => explicit_invocation(object),
        None => implicit_invocation(object),
    }
}

fn direct_response(object: &Map<String, Value>) -> Result<DecisionEnvelope, DecisionError> {
    match object.get("response") {
        Some(Value::String(text)) => Ok(DecisionEnvelope::direct(text.clone())),
        _ => Err(malformed("`direct_response` requires a string `response`")),
    }
}

fn explicit_invocation(object: &Map<String, Value>) -> Result<DecisionEnvelope, DecisionError> {
    let capability = object
        .get("tool")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|tool| !tool.is_empty())
        .ok_or_else(|| malformed("`tool` must be a non-empty string"))?;
    let args = match object.get("args") {
        None | Some(Value::Null) => Value::Object(Map::new()),
        Some(Value::Object(args)) => Value::Object(args.clone()),
        Some(other) => return Err(malformed(format!("`args` must be an object, got {other}"))),
    };
    Ok(DecisionEnvelope::ToolInvocation(ToolInvocation {
        capability: capability.to_string(),
        args,
        rationale: optional_text(object, "reasoning"),
        backend_hint: optional_text(object, "server"),
    }))
}

fn implicit_invocation(object: &Map<String, Value>) -> Result<DecisionEnvelope, DecisionError> {
    if let Some(command) = object.get(SEAT_COMMAND_KEY) {
        return seat_command_invocation(command, optional_text(object, "reasoning"));
    }

    if let Some(Value::String(answer)) = object.get("answer") {
        let wrapped = extract_json_value(answer);
        if let Some(command) = wrapped.as_ref().and_then(|value| value.get(SEAT_COMMAND_KEY)) {
            return seat_command_invocation(command, None);
        }
        return Ok(DecisionEnvelope::direct(answer.trim()));
    }

    Err(malformed(
        "reply names neither an action, a tool, nor a seat command",
    ))
}

fn seat_command_invocation(
    command: &Value,
    rationale: Option<String>,
) -> Result<DecisionEnvelope, DecisionError> {
    if !command.is_object() {
        return Err(malformed("`seatCommand` must be an object"));
    }
    Ok(DecisionEnvelope::ToolInvocation(ToolInvocation {
        capability: SEAT_ADJUSTMENT_CAPABILITY.to_string(),
        args: command.clone(),
        rationale,
        backend_hint: None,
    }))
}

fn optional_text(object: &Map<String, Value>, key: &str) -> Option<String> {
    object
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn compact_tool_form_is_an_invocation() {
        let envelope = interpret(r#"{"tool": "adjust_thermal", "args": {"heatingLevel": 2}}"#)
            .expect("decision");
        match envelope {
            DecisionEnvelope::ToolInvocation(invocation) => {
                assert_eq!(invocation.capability, "adjust_thermal");
                assert_eq!(invocation.args, json!({"heatingLevel": 2}));
                assert!(invocation.backend_hint.is_none());
            }
            other => panic!("unexpected envelope: {other:?}"),
        }
    }

    #[test]
    fn call_tool_without_args_defaults_to_empty_object() {
        let envelope = interpret(
            r#"{"action": "call_tool", "tool": "get_knowledge", "reasoning": " needs docs "}"#,
        )
        .expect("decision");
        assert_eq!(
            envelope,
            DecisionEnvelope::ToolInvocation(ToolInvocation {
                capability: "get_knowledge".to_string(),
                args: json!({}),
                rationale: Some("needs docs".to_string()),
                backend_hint: None,
            })
        );
    }

    #[test]
    fn seat_command_key_selects_seat_adjustment() {
        let envelope =
            interpret(r#"{"seatCommand": {"thermal": {"heatingLevel": 1}}}"#).expect("decision");
        match envelope {
            DecisionEnvelope::ToolInvocation(invocation) => {
                assert_eq!(invocation.capability, SEAT_ADJUSTMENT_CAPABILITY);
                assert_eq!(invocation.args, json!({"thermal": {"heatingLevel": 1}}));
            }
            other => panic!("unexpected envelope: {other:?}"),
        }
    }

    #[test]
    fn answer_wrapper_is_unwrapped() {
        let wrapped = r#"{"answer": "Done: {\"seatCommand\": {\"seatbelt\": {\"percentage\": 10}}}"}"#;
        assert!(matches!(
            interpret(wrapped),
            Ok(DecisionEnvelope::ToolInvocation(ToolInvocation { ref capability, .. }))
                if capability == SEAT_ADJUSTMENT_CAPABILITY
        ));
        assert_eq!(
            interpret(r#"{"answer": "The lever is under the seat."}"#),
            Ok(DecisionEnvelope::direct("The lever is under the seat."))
        );
    }

    #[test]
    fn malformed_structures_are_rejected() {
        for reply in [
            r#"{"action": "direct_response"}"#,
            r#"{"action": "direct_response", "response": 7}"#,
            r#"{"action": "call_tool"}"#,
            r#"{"action": "call_tool", "tool": "x", "args": [1, 2]}"#,
            r#"{"action": "dance"}"#,
            r#"{"action": 3}"#,
            r#"{"status": "thinking"}"#,
            r#"{"seatCommand": "warm"}"#,
        ] {
            assert!(
                matches!(interpret(reply), Err(DecisionError::Malformed { .. })),
                "{reply}"
            );
        }
    }

    #[test]
    fn unrecognized_object_inside_prose_stays_an_answer() {
        let reply = "To warm the seat you can send {\"heatingLevel\": 2} to the thermal tool.";
        assert_eq!(interpret(reply), Ok(DecisionEnvelope::direct(reply)));
        assert!(matches!(
            interpret("Sure! {\"tool\": \"adjust_thermal\", \"args\": {\"heatingLevel\": 2}}"),
            Ok(DecisionEnvelope::ToolInvocation(_))
        ));
    }

    #[test]
    fn non_object_json_is_a_direct_answer() {
        assert_eq!(interpret(" 42 "), Ok(DecisionEnvelope::direct("42")));
        assert_eq!(
            interpret("[\"a\", \"b\"]"),
            Ok(DecisionEnvelope::direct("[\"a\", \"b\"]"))
        );
    }
}
