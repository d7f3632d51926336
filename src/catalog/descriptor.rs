use serde::Serialize;
use serde_json::{json, Map, Value};

pub const NO_DESCRIPTION: &str = "No description";
const UNKNOWN_TYPE: &str = "unknown";

/// One argument of a capability, in the order the backend declared it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub allowed: Vec<Value>,
}

impl ParameterSpec {
    pub fn new(name: &str, kind: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: kind.to_string(),
            description: description.to_string(),
            minimum: None,
            maximum: None,
            default: None,
            allowed: Vec::new(),
        }
    }

    pub fn bounded(mut self, minimum: i64, maximum: i64) -> Self {
        self.minimum = Some(json!(minimum));
        self.maximum = Some(json!(maximum));
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    fn from_property(name: &str, raw: &Value) -> Self {
        let text = |key: &str| raw.get(key).and_then(Value::as_str).map(str::to_string);
        Self {
            name: name.to_string(),
            kind: text("type").unwrap_or_else(|| UNKNOWN_TYPE.to_string()),
            description: text("description").unwrap_or_default(),
            minimum: raw.get("minimum").cloned(),
            maximum: raw.get("maximum").cloned(),
            default: raw.get("default").cloned(),
            allowed: raw
                .get("enum")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default(),
        }
    }

    fn to_property(&self) -> Value {
        let mut property = Map::new();
        property.insert("type".to_string(), json!(self.kind));
        property.insert("description".to_string(), json!(self.description));
        if let Some(minimum) = &self.minimum {
            property.insert("minimum".to_string(), minimum.clone());
        }
        if let Some(maximum) = &self.maximum {
            property.insert("maximum".to_string(), maximum.clone());
        }
        if let Some(default) = &self.default {
            property.insert("default".to_string(), default.clone());
        }
        if !self.allowed.is_empty() {
            property.insert("enum".to_string(), Value::Array(self.allowed.clone()));
        }
        Value::Object(property)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ParameterSpec>,
    pub required: Vec<String>,
}

impl ToolDescriptor {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            parameters: Vec::new(),
            required: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, parameter: ParameterSpec, required: bool) -> Self {
        if required {
            self.required.push(parameter.name.clone());
        }
        self.parameters.push(parameter);
        self
    }

    /// Parses one entry of a backend's `tools` array. Returns `None` when the entry
    /// has no usable name; every other field is optional.
    pub fn from_value(raw: &Value) -> Option<Self> {
        let name = raw
            .get("name")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|name| !name.is_empty())?;
        let description = raw
            .get("description")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .unwrap_or(NO_DESCRIPTION);

        let schema = raw.get("parameters").or_else(|| raw.get("inputSchema"));
        let parameters = schema
            .and_then(|schema| schema.get("properties"))
            .and_then(Value::as_object)
            .map(|properties| {
                properties
                    .iter()
                    .map(|(name, property)| ParameterSpec::from_property(name, property))
                    .collect()
            })
            .unwrap_or_default();
        let required = schema
            .and_then(|schema| schema.get("required"))
            .and_then(Value::as_array)
            .map(|names| {
                names
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Some(Self {
            name: name.to_string(),
            description: description.to_string(),
            parameters,
            required,
        })
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|parameter| parameter.name == name)
    }

    /// The JSON-schema shaped form backends publish, used by the `tools` listing.
    pub fn to_wire(&self) -> Value {
        let properties: Map<String, Value> = self
            .parameters
            .iter()
            .map(|parameter| (parameter.name.clone(), parameter.to_property()))
            .collect();
        json!({
            "name": self.name,
            "description": self.description,
            "parameters": {
                "type": "object",
                "properties": properties,
                "required": self.required,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_schema_and_keeps_declared_order() {
        let raw = json!({
            "name": "move_track_forward",
            "description": "Move the seat track forward",
            "parameters": {
                "type": "object",
                "properties": {
                    "step": {"type": "integer", "description": "Step size", "minimum": 1, "maximum": 100, "default": 10},
                    "current_value": {"type": "integer", "description": "Current position"}
                },
                "required": ["current_value"]
            }
        });
        let tool = ToolDescriptor::from_value(&raw).expect("descriptor");
        let names: Vec<&str> = tool.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["step", "current_value"]);
        assert_eq!(tool.required, vec!["current_value".to_string()]);
        let step = tool.parameter("step").expect("step");
        assert_eq!(step.minimum, Some(json!(1)));
        assert_eq!(step.default, Some(json!(10)));
    }

    #[test]
    fn missing_fields_fall_back() {
        let tool = ToolDescriptor::from_value(&json!({"name": "get_knowledge"})).expect("tool");
        assert_eq!(tool.description, NO_DESCRIPTION);
        assert!(tool.parameters.is_empty());

        let untyped =
            ToolDescriptor::from_value(&json!({"name": "x", "parameters": {"properties": {"q": {}}}}))
                .expect("tool");
        assert_eq!(untyped.parameters[0].kind, "unknown");
    }

    #[test]
    fn entries_without_a_name_are_rejected() {
        assert!(ToolDescriptor::from_value(&json!({"description": "anonymous"})).is_none());
        assert!(ToolDescriptor::from_value(&json!({"name": "  "})).is_none());
        assert!(ToolDescriptor::from_value(&json!("move_track_forward")).is_none());
    }

    #[test]
    fn wire_form_round_trips_through_the_parser() {
        let tool = ToolDescriptor::new("adjust_thermal", "Set heating level")
            .with_parameter(
                ParameterSpec::new("heatingLevel", "integer", "Heating level").bounded(0, 3),
                true,
            );
        let reparsed = ToolDescriptor::from_value(&tool.to_wire()).expect("tool");
        assert_eq!(reparsed, tool);
    }
}
