//! # Schema Documents
//!
//! The externally consumable, JSON-Schema-like document shape. Documents
//! are plain data: building and deriving them is `compose.rs`'s job, and
//! validating actual values against them belongs to an external engine.

use serde::Serialize;
use serde_json::{Map, Value};

use msk_reflect::PropertyMap;

/// Top-level `type` of a schema document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
    /// An object schema carrying `properties`.
    Object,
    /// An array schema carrying `items`.
    Array,
}

/// A named schema document, structurally compatible with the JSON-Schema
/// shape consumed by downstream validation engines.
///
/// `properties` keys are exactly the attribute names discoverable by
/// reflection over the owning type and its ancestors, possibly narrowed or
/// widened by an explicit spec — never silently extended.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaDocument {
    /// Unique identifier; uniqueness is enforced by the registry.
    #[serde(rename = "$id")]
    pub id: String,

    /// `object` for property maps, `array` for array wrappers.
    #[serde(rename = "type")]
    pub kind: SchemaKind,

    /// Human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Property fragments by attribute name, in discovery order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<PropertyMap>,

    /// Element schema for array documents.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Value>,

    /// Names of required properties.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,

    /// Per-keyword error messages, passed through to the validation engine.
    #[serde(rename = "errorMessage", skip_serializing_if = "Option::is_none")]
    pub error_message: Option<Value>,

    /// Any further authored keywords (e.g. `minItems`), passed through.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SchemaDocument {
    /// Serialize to the JSON value handed to a validation engine.
    ///
    /// Infallible in practice: every field is itself JSON data.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_object_document_serialization() {
        let mut properties = PropertyMap::new();
        properties.insert("a".to_string(), json!({"type": "string"}));
        properties.insert("b".to_string(), json!({}));

        let doc = SchemaDocument {
            id: "Thing".to_string(),
            kind: SchemaKind::Object,
            description: Some("A thing".to_string()),
            properties: Some(properties),
            items: None,
            required: Some(vec!["a".to_string()]),
            error_message: None,
            extra: Map::new(),
        };

        assert_eq!(
            doc.to_value(),
            json!({
                "$id": "Thing",
                "type": "object",
                "description": "A thing",
                "properties": {"a": {"type": "string"}, "b": {}},
                "required": ["a"],
            })
        );
    }

    #[test]
    fn test_array_document_serialization() {
        let mut extra = Map::new();
        extra.insert("minItems".to_string(), json!(1));

        let doc = SchemaDocument {
            id: "Thing_array".to_string(),
            kind: SchemaKind::Array,
            description: None,
            properties: None,
            items: Some(json!({"$ref": "Thing"})),
            required: None,
            error_message: None,
            extra,
        };

        assert_eq!(
            doc.to_value(),
            json!({
                "$id": "Thing_array",
                "type": "array",
                "items": {"$ref": "Thing"},
                "minItems": 1,
            })
        );
    }
}
