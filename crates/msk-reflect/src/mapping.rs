//! # Type Tag Mapping
//!
//! Converts the `@type` expression of an attribute's documentation into a
//! JSON schema property fragment. Fragments are plain JSON objects because
//! downstream composition merges them with arbitrary authored validator
//! keywords.
//!
//! Mapping table (names compared case-insensitively):
//!
//! | expression                                  | fragment                                  |
//! |---------------------------------------------|-------------------------------------------|
//! | `string` `number` `boolean` `integer`       | `{"type": <lowercased>}`                  |
//! | `bool`                                      | `{"type": "boolean"}`                     |
//! | `date`                                      | `{"type": "string", "format": "date-time"}` |
//! | `regexp`                                    | `{"type": "string"}`                      |
//! | leading-uppercase name                      | `{"$ref": <as written>}`                  |
//! | anything else                               | `{}`                                      |
//!
//! Array expressions wrap the element mapping in
//! `{"type": "array", "items": ...}`. A non-empty doc description is always
//! written onto the fragment, even when no type is inferable.

use serde_json::{Map, Value};

use crate::docblock::{Documentation, TypeExpression};

/// Build the schema property fragment for one attribute's documentation.
///
/// `None` (no documentation at all) yields the empty fragment `{}`.
pub fn fragment_for(doc: Option<&Documentation>) -> Value {
    let mut fragment = match doc.and_then(Documentation::type_tag) {
        Some(TypeExpression::Name { name }) => name_fragment(name),
        Some(TypeExpression::Array { element }) => {
            let mut array = Map::new();
            array.insert("type".to_string(), Value::String("array".to_string()));
            if let Some(element) = element {
                array.insert("items".to_string(), Value::Object(name_fragment(element)));
            }
            array
        }
        None => Map::new(),
    };

    if let Some(doc) = doc {
        if !doc.description.is_empty() {
            fragment.insert(
                "description".to_string(),
                Value::String(doc.description.clone()),
            );
        }
    }

    Value::Object(fragment)
}

/// Map a bare type name to its schema fragment.
fn name_fragment(name: &str) -> Map<String, Value> {
    let mut lowercase = name.to_ascii_lowercase();
    if lowercase == "bool" {
        lowercase = "boolean".to_string();
    }

    let mut fragment = Map::new();
    match lowercase.as_str() {
        "string" | "number" | "boolean" | "integer" => {
            fragment.insert("type".to_string(), Value::String(lowercase));
        }
        "date" => {
            fragment.insert("type".to_string(), Value::String("string".to_string()));
            fragment.insert("format".to_string(), Value::String("date-time".to_string()));
        }
        "regexp" => {
            fragment.insert("type".to_string(), Value::String("string".to_string()));
        }
        _ => {
            // A name whose first character changed under lowercasing started
            // uppercase: treat it as a reference to another named schema.
            if name.chars().next() != lowercase.chars().next() {
                fragment.insert("$ref".to_string(), Value::String(name.to_string()));
            }
            // Anything else is unknown; the fragment stays empty.
        }
    }
    fragment
}
