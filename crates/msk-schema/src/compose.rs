//! # Schema Composition
//!
//! The [`Schema`] entity wraps an identifier, a property map, and authored
//! metadata, and derives new schemas from existing ones:
//!
//! - [`Schema::refine`] — deep-merge authored partials, same identifier;
//! - [`Schema::with_only`] / [`Schema::without`] — subset / complement of
//!   the property set, ids suffixed `/with` and `/without`;
//! - [`Schema::with_required`] — required-field override, id suffixed
//!   `/required`;
//! - [`Schema::array_of`] — array wrapper referencing the original by
//!   `$ref`, id suffixed `_array`.
//!
//! Every authored property key is validated against the schema's current
//! property set when the schema is built or derived — an unknown key is a
//! configuration error and fails eagerly, never at data-validation time.
//!
//! [`SchemaBuilder`] ties a registry and a reflector together and memoizes
//! the built output per type, supporting both single specs and maps of
//! named variants (`TypeName/variantName` identifiers).

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::{Map, Value};

use msk_reflect::merge::deep_merge_values;
use msk_reflect::{PropertyMap, Reflector, TypeDef};

use crate::document::{SchemaDocument, SchemaKind};
use crate::error::SchemaError;
use crate::registry::{InstanceToken, SchemaRegistry};

/// Top-level keys that identify a spec object as a single schema spec
/// rather than a map of named variants.
pub const RESERVED_SPEC_KEYS: &[&str] =
    &["$id", "description", "properties", "required", "errorMessage"];

/// A composable schema: identifier, property map, authored metadata, and a
/// handle to the registry that keeps its identifier unique.
#[derive(Debug)]
pub struct Schema {
    registry: SchemaRegistry,
    /// Identity of this schema lineage within the registry. Refinements
    /// share it (same document, superseded fields); the other derivations
    /// mint a fresh one.
    token: InstanceToken,
    id: String,
    kind: SchemaKind,
    properties: PropertyMap,
    items: Option<Value>,
    description: Option<String>,
    required: Option<Vec<String>>,
    error_message: Option<Value>,
    extra: Map<String, Value>,
}

impl Schema {
    /// Build a schema from the aggregated reflection of `ty`, with the
    /// type's name as the candidate identifier.
    ///
    /// # Errors
    ///
    /// Propagates reflection failures.
    pub fn based_on(builder: &SchemaBuilder, ty: &TypeDef) -> Result<Schema, SchemaError> {
        let properties = builder.reflector().properties(ty)?;
        Ok(Self::from_parts(
            builder.registry(),
            ty.name(),
            (*properties).clone(),
        ))
    }

    /// Build a schema from an explicitly supplied property map.
    pub fn with_properties(
        registry: &SchemaRegistry,
        candidate_id: &str,
        properties: PropertyMap,
    ) -> Schema {
        Self::from_parts(registry, candidate_id, properties)
    }

    fn from_parts(
        registry: &SchemaRegistry,
        candidate_id: &str,
        properties: PropertyMap,
    ) -> Schema {
        let token = registry.issue_token();
        let id = registry.claim(candidate_id, token, None);
        Schema {
            registry: registry.clone(),
            token,
            id,
            kind: SchemaKind::Object,
            properties,
            items: None,
            description: None,
            required: None,
            error_message: None,
            extra: Map::new(),
        }
    }

    /// The schema's registered identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The current property key set, in order.
    pub fn property_keys(&self) -> Vec<&str> {
        self.properties.keys().map(String::as_str).collect()
    }

    /// Deep-merge authored partials over this schema, in order; a later
    /// partial wins on conflicting scalar fields. The result keeps this
    /// schema's identifier (it supersedes the same document).
    ///
    /// `$id` and `type` keys inside partials are ignored: the identifier
    /// and document kind come from the operation, not from authored data.
    ///
    /// # Errors
    ///
    /// [`SchemaError::UnknownProperty`] if any partial's `properties`
    /// references a key outside the current property set;
    /// [`SchemaError::InvalidSpec`] if a partial is not a JSON object.
    pub fn refine<I>(&self, partials: I) -> Result<Schema, SchemaError>
    where
        I: IntoIterator<Item = Value>,
    {
        let mut next = self.fork(self.token, self.id.clone());
        for partial in partials {
            let partial = expect_object(partial, &self.id)?;
            next.apply_partial(&partial)?;
        }
        Ok(next)
    }

    /// A new schema retaining only the given property keys; derived
    /// identifier `<id>/with`.
    ///
    /// # Errors
    ///
    /// [`SchemaError::UnknownProperty`] if any key is absent.
    pub fn with_only<'k>(
        &self,
        keys: impl IntoIterator<Item = &'k str>,
    ) -> Result<Schema, SchemaError> {
        let keep = self.validated_key_set(keys)?;
        let mut next = self.derive(format!("{}/with", self.id));
        next.properties = self
            .properties
            .iter()
            .filter(|(key, _)| keep.iter().any(|k| k == *key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Ok(next)
    }

    /// A new schema excluding the given property keys; derived identifier
    /// `<id>/without`.
    ///
    /// # Errors
    ///
    /// [`SchemaError::UnknownProperty`] if any key is absent.
    pub fn without<'k>(
        &self,
        keys: impl IntoIterator<Item = &'k str>,
    ) -> Result<Schema, SchemaError> {
        let drop = self.validated_key_set(keys)?;
        let mut next = self.derive(format!("{}/without", self.id));
        next.properties = self
            .properties
            .iter()
            .filter(|(key, _)| !drop.iter().any(|k| k == *key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Ok(next)
    }

    /// A new schema whose `required` list is exactly `keys`; derived
    /// identifier `<id>/required`.
    ///
    /// # Errors
    ///
    /// [`SchemaError::UnknownProperty`] if any key is absent.
    pub fn with_required<'k>(
        &self,
        keys: impl IntoIterator<Item = &'k str>,
    ) -> Result<Schema, SchemaError> {
        let required = self.validated_key_set(keys)?;
        let mut next = self.derive(format!("{}/required", self.id));
        next.required = Some(required);
        Ok(next)
    }

    /// A new array schema whose items reference this schema by `$ref`,
    /// deep-merged with any partials; derived identifier `<id>_array`.
    ///
    /// # Errors
    ///
    /// [`SchemaError::InvalidSpec`] if a partial is not a JSON object;
    /// [`SchemaError::UnknownProperty`] if a partial carries `properties`
    /// (an array document has no property set).
    pub fn array_of<I>(&self, partials: I) -> Result<Schema, SchemaError>
    where
        I: IntoIterator<Item = Value>,
    {
        let token = self.registry.issue_token();
        let id = self.registry.claim(&format!("{}_array", self.id), token, None);

        let mut items = Map::new();
        items.insert("$ref".to_string(), Value::String(self.id.clone()));

        let mut next = Schema {
            registry: self.registry.clone(),
            token,
            id,
            kind: SchemaKind::Array,
            properties: PropertyMap::new(),
            items: Some(Value::Object(items)),
            description: None,
            required: None,
            error_message: None,
            extra: Map::new(),
        };

        for partial in partials {
            let partial = expect_object(partial, &next.id)?;
            next.apply_partial(&partial)?;
        }
        Ok(next)
    }

    /// Re-register this schema under a new identifier, releasing the old
    /// one. The candidate is collision-resolved like any other claim.
    pub fn register_as(&mut self, candidate_id: &str) -> &str {
        self.id = self
            .registry
            .claim(candidate_id, self.token, Some(&self.id));
        &self.id
    }

    /// Produce the schema document in its current state.
    pub fn document(&self) -> SchemaDocument {
        SchemaDocument {
            id: self.id.clone(),
            kind: self.kind,
            description: self.description.clone(),
            properties: match self.kind {
                SchemaKind::Object => Some(self.properties.clone()),
                SchemaKind::Array => None,
            },
            items: self.items.clone(),
            required: self.required.clone(),
            error_message: self.error_message.clone(),
            extra: self.extra.clone(),
        }
    }

    /// Copy of this schema under a given identity; used by derivations.
    fn fork(&self, token: InstanceToken, id: String) -> Schema {
        Schema {
            registry: self.registry.clone(),
            token,
            id,
            kind: self.kind,
            properties: self.properties.clone(),
            items: self.items.clone(),
            description: self.description.clone(),
            required: self.required.clone(),
            error_message: self.error_message.clone(),
            extra: self.extra.clone(),
        }
    }

    /// Fork under a fresh identity claiming `candidate`.
    fn derive(&self, candidate: String) -> Schema {
        let token = self.registry.issue_token();
        let id = self.registry.claim(&candidate, token, None);
        self.fork(token, id)
    }

    /// Validate that every key exists in the current property set; returns
    /// the keys as owned strings, preserving argument order.
    fn validated_key_set<'k>(
        &self,
        keys: impl IntoIterator<Item = &'k str>,
    ) -> Result<Vec<String>, SchemaError> {
        let mut validated = Vec::new();
        for key in keys {
            if !self.properties.contains_key(key) {
                return Err(SchemaError::UnknownProperty {
                    schema_id: self.id.clone(),
                    property: key.to_string(),
                });
            }
            validated.push(key.to_string());
        }
        Ok(validated)
    }

    /// Apply one authored spec/partial object onto this schema in place.
    ///
    /// Property keys are validated before anything merges, so a failed
    /// application leaves no partial writes behind the caller's back.
    fn apply_partial(&mut self, partial: &Map<String, Value>) -> Result<(), SchemaError> {
        if let Some(Value::Object(authored)) = partial.get("properties") {
            for key in authored.keys() {
                if !self.properties.contains_key(key) {
                    return Err(SchemaError::UnknownProperty {
                        schema_id: self.id.clone(),
                        property: key.clone(),
                    });
                }
            }
        }

        for (key, value) in partial {
            match key.as_str() {
                // Identifier and document kind come from the operation.
                "$id" | "type" => {}
                "description" => {
                    if let Some(text) = value.as_str() {
                        self.description = Some(text.to_string());
                    }
                }
                "properties" => {
                    if let Value::Object(authored) = value {
                        for (name, fragment) in authored {
                            match self.properties.get_mut(name) {
                                Some(existing) => deep_merge_values(existing, fragment),
                                None => {
                                    self.properties.insert(name.clone(), fragment.clone());
                                }
                            }
                        }
                    }
                }
                "required" => {
                    if let Some(list) = value.as_array() {
                        self.required = Some(
                            list.iter()
                                .filter_map(Value::as_str)
                                .map(String::from)
                                .collect(),
                        );
                    }
                }
                "errorMessage" => match &mut self.error_message {
                    Some(existing) => deep_merge_values(existing, value),
                    None => self.error_message = Some(value.clone()),
                },
                "items" => match &mut self.items {
                    Some(existing) => deep_merge_values(existing, value),
                    None => self.items = Some(value.clone()),
                },
                _ => match self.extra.get_mut(key) {
                    Some(existing) => deep_merge_values(existing, value),
                    None => {
                        self.extra.insert(key.clone(), value.clone());
                    }
                },
            }
        }
        Ok(())
    }
}

/// A spec supplied for a type: either one schema spec, or a map of named
/// variants each built into its own document.
///
/// Classification is a structural heuristic, not a type tag: an object is
/// a variant map only when *none* of the reserved top-level keys
/// ([`RESERVED_SPEC_KEYS`]) are present.
#[derive(Debug, Clone)]
pub enum SpecForm {
    /// A single schema spec.
    Single(Map<String, Value>),
    /// Named variants, each an independent spec.
    Variants(Vec<(String, Map<String, Value>)>),
}

impl SpecForm {
    /// Classify a raw spec value.
    ///
    /// # Errors
    ///
    /// [`SchemaError::InvalidSpec`] if the spec (or any variant) is not a
    /// JSON object.
    pub fn classify(spec: &Value, owner: &str) -> Result<SpecForm, SchemaError> {
        let map = spec.as_object().ok_or_else(|| SchemaError::InvalidSpec {
            schema_id: owner.to_string(),
            found: json_type_name(spec).to_string(),
        })?;

        let is_single = map.keys().any(|key| RESERVED_SPEC_KEYS.contains(&key.as_str()));
        if is_single {
            return Ok(SpecForm::Single(map.clone()));
        }

        let mut variants = Vec::with_capacity(map.len());
        for (name, value) in map {
            let variant = value.as_object().ok_or_else(|| SchemaError::InvalidSpec {
                schema_id: format!("{owner}/{name}"),
                found: json_type_name(value).to_string(),
            })?;
            variants.push((name.clone(), variant.clone()));
        }
        Ok(SpecForm::Variants(variants))
    }
}

/// The built output for one type: a single document or named variants.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaOutput {
    /// One document, id = type name (or the spec's `$id`).
    Single(SchemaDocument),
    /// Named variants, ids `TypeName/variantName`.
    Variants(Vec<(String, SchemaDocument)>),
}

impl SchemaOutput {
    /// The single document, if this output is not a variant map.
    pub fn as_single(&self) -> Option<&SchemaDocument> {
        match self {
            SchemaOutput::Single(doc) => Some(doc),
            SchemaOutput::Variants(_) => None,
        }
    }

    /// Look up a variant document by name.
    pub fn variant(&self, name: &str) -> Option<&SchemaDocument> {
        match self {
            SchemaOutput::Single(_) => None,
            SchemaOutput::Variants(variants) => variants
                .iter()
                .find(|(variant, _)| variant == name)
                .map(|(_, doc)| doc),
        }
    }
}

/// Builds schema documents from type definitions: one registry, one
/// reflector, and a memo of built outputs per type name.
///
/// The memoized read path is idempotent: requesting a type's schema twice
/// returns the same shared output without re-parsing any source text or
/// re-claiming any identifier.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    registry: SchemaRegistry,
    reflector: Reflector,
    built: Mutex<HashMap<String, Arc<SchemaOutput>>>,
}

impl SchemaBuilder {
    /// A builder with its own registry and reflector.
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder sharing an existing registry.
    pub fn with_registry(registry: SchemaRegistry) -> Self {
        Self {
            registry,
            reflector: Reflector::default(),
            built: Mutex::new(HashMap::new()),
        }
    }

    /// The identifier registry backing this builder.
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// The reflector backing this builder.
    pub fn reflector(&self) -> &Reflector {
        &self.reflector
    }

    /// Build a composable [`Schema`] from the type's reflection. Not
    /// memoized: every call claims a (collision-resolved) identifier.
    ///
    /// # Errors
    ///
    /// Propagates reflection failures.
    pub fn based_on(&self, ty: &TypeDef) -> Result<Schema, SchemaError> {
        Schema::based_on(self, ty)
    }

    /// The built schema document(s) for a type, memoized per type name.
    ///
    /// With no spec, the output is a single document carrying the type's
    /// aggregated reflection. With a spec, the output follows the spec's
    /// form: single, or one document per named variant with identifiers
    /// `TypeName/variantName`. Each variant carries the type's full
    /// reflected property map merged with its own authored fields.
    ///
    /// The memo is keyed by type name alone: the first call for a type
    /// binds its spec, and later calls return that build regardless of the
    /// `spec` argument. A type has one authored spec per builder; use a
    /// fresh builder to rebuild under a different one.
    ///
    /// # Errors
    ///
    /// [`SchemaError::UnknownProperty`] for authored keys outside the
    /// reflected set (eagerly, on first build); [`SchemaError::InvalidSpec`]
    /// for non-object specs; reflection failures propagate.
    pub fn schemas_of(
        &self,
        ty: &TypeDef,
        spec: Option<&Value>,
    ) -> Result<Arc<SchemaOutput>, SchemaError> {
        if let Some(hit) = self.lock_built().get(ty.name()).cloned() {
            return Ok(hit);
        }

        let output = match spec {
            None => SchemaOutput::Single(self.based_on(ty)?.document()),
            Some(value) => match SpecForm::classify(value, ty.name())? {
                SpecForm::Single(map) => {
                    SchemaOutput::Single(self.build_one(ty, ty.name(), &map)?)
                }
                SpecForm::Variants(variants) => {
                    let mut documents = Vec::with_capacity(variants.len());
                    for (name, map) in variants {
                        let id = format!("{}/{}", ty.name(), name);
                        documents.push((name, self.build_one(ty, &id, &map)?));
                    }
                    SchemaOutput::Variants(documents)
                }
            },
        };

        let shared = Arc::new(output);
        tracing::debug!(type_name = ty.name(), "memoized built schema output");
        self.lock_built()
            .insert(ty.name().to_string(), Arc::clone(&shared));
        Ok(shared)
    }

    fn build_one(
        &self,
        ty: &TypeDef,
        default_id: &str,
        spec: &Map<String, Value>,
    ) -> Result<SchemaDocument, SchemaError> {
        let candidate = spec
            .get("$id")
            .and_then(Value::as_str)
            .unwrap_or(default_id);

        let properties = self.reflector.properties(ty)?;
        let mut schema = Schema::from_parts(&self.registry, candidate, (*properties).clone());
        schema.apply_partial(spec)?;
        Ok(schema.document())
    }

    fn lock_built(&self) -> MutexGuard<'_, HashMap<String, Arc<SchemaOutput>>> {
        self.built.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn expect_object(value: Value, owner: &str) -> Result<Map<String, Value>, SchemaError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(SchemaError::InvalidSpec {
            schema_id: owner.to_string(),
            found: json_type_name(&other).to_string(),
        }),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const BARE_SRC: &str = r#"
class Bare {
  constructor(source) {
    /**
     * Some property
     * @type {string}
     */
    this.a = 'a';

    /**
     * Circular reference
     * @type {Bare}
     */
    this.b = 'b';
  }
}
"#;

    const MY_MODEL_SRC: &str = r#"
class MyModel {
  constructor(source) {
    /**
     * Some prop with type
     * @type {string}
     */
    this.a = 'a';

    /**
     * Other prop without type
     */
    this.b = 'b';
  }
}
"#;

    const PLAIN_AB_SRC: &str = r#"
class Plain {
  constructor() {
    this.a = 'a';
    this.b = 'b';
  }
}
"#;

    #[test]
    fn test_default_schema_from_reflection() {
        let builder = SchemaBuilder::new();
        let ty = TypeDef::new("Bare", BARE_SRC);

        let output = builder.schemas_of(&ty, None).unwrap();
        let doc = output.as_single().unwrap();
        assert_eq!(
            doc.to_value(),
            json!({
                "$id": "Bare",
                "type": "object",
                "properties": {
                    "a": {"type": "string", "description": "Some property"},
                    "b": {"$ref": "Bare", "description": "Circular reference"},
                },
            })
        );
    }

    #[test]
    fn test_spec_merges_over_reflection() {
        let builder = SchemaBuilder::new();
        let ty = TypeDef::new("MyModel", MY_MODEL_SRC);

        let spec = json!({
            "description": "This is MyModel",
            "properties": {
                "a": {"description": "Changed desc"},
                "b": {"$ref": "AddedType"},
            },
        });

        let output = builder.schemas_of(&ty, Some(&spec)).unwrap();
        let doc = output.as_single().unwrap();
        assert_eq!(
            doc.to_value(),
            json!({
                "$id": "MyModel",
                "type": "object",
                "description": "This is MyModel",
                "properties": {
                    "a": {"type": "string", "description": "Changed desc"},
                    "b": {"description": "Other prop without type", "$ref": "AddedType"},
                },
            })
        );
    }

    #[test]
    fn test_multi_variant_spec() {
        let builder = SchemaBuilder::new();
        let ty = TypeDef::new("MyMultiModel", PLAIN_AB_SRC);

        let error_message = json!({
            "required": {"a": "A is required", "b": "B is required"},
        });
        let spec = json!({
            "base": {
                "description": "This is My MULTI Model",
                "errorMessage": error_message.clone(),
            },
            "forCreate": {
                "description": "My MULTI model for create",
                "required": ["a", "b"],
                "errorMessage": error_message.clone(),
            },
        });

        let output = builder.schemas_of(&ty, Some(&spec)).unwrap();

        let base = output.variant("base").unwrap();
        assert_eq!(
            base.to_value(),
            json!({
                "$id": "MyMultiModel/base",
                "type": "object",
                "description": "This is My MULTI Model",
                "properties": {"a": {}, "b": {}},
                "errorMessage": error_message.clone(),
            })
        );

        let for_create = output.variant("forCreate").unwrap();
        assert_eq!(
            for_create.to_value(),
            json!({
                "$id": "MyMultiModel/forCreate",
                "type": "object",
                "description": "My MULTI model for create",
                "properties": {"a": {}, "b": {}},
                "required": ["a", "b"],
                "errorMessage": error_message,
            })
        );
    }

    #[test]
    fn test_unknown_property_in_spec_is_fatal() {
        let builder = SchemaBuilder::new();
        let ty = TypeDef::new(
            "SmallModel",
            r#"
class SmallModel {
  constructor() {
    this.a = 'a';
  }
}
"#,
        );

        let spec = json!({
            "properties": {
                "b": {"description": "B doesn't exist, we'll have to crash now"},
            },
        });

        let err = builder.schemas_of(&ty, Some(&spec)).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::UnknownProperty { ref property, .. } if property == "b"
        ));
    }

    #[test]
    fn test_schemas_of_is_memoized() {
        let builder = SchemaBuilder::new();
        let ty = TypeDef::new("Plain", PLAIN_AB_SRC);

        let first = builder.schemas_of(&ty, None).unwrap();
        let second = builder.schemas_of(&ty, None).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        // One identifier claimed, not two.
        assert_eq!(builder.registry().len(), 1);
    }

    #[test]
    fn test_first_spec_binds_the_type() {
        let builder = SchemaBuilder::new();
        let ty = TypeDef::new("Plain", PLAIN_AB_SRC);

        let first = builder
            .schemas_of(&ty, Some(&json!({"description": "bound"})))
            .unwrap();
        // A later, different spec does not rebuild: the first build stands.
        let second = builder
            .schemas_of(&ty, Some(&json!({"description": "ignored"})))
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(
            second.as_single().unwrap().description.as_deref(),
            Some("bound")
        );
    }

    #[test]
    fn test_refine_keeps_the_identifier() {
        let builder = SchemaBuilder::new();
        let ty = TypeDef::new("Plain", PLAIN_AB_SRC);
        let schema = builder.based_on(&ty).unwrap();

        let refined = schema
            .refine([json!({
                "description": "refined",
                "properties": {"a": {"minLength": 3}},
            })])
            .unwrap();

        assert_eq!(refined.id(), "Plain");
        assert_eq!(
            refined.document().to_value(),
            json!({
                "$id": "Plain",
                "type": "object",
                "description": "refined",
                "properties": {"a": {"minLength": 3}, "b": {}},
            })
        );
    }

    #[test]
    fn test_refine_later_partial_wins() {
        let builder = SchemaBuilder::new();
        let ty = TypeDef::new("Plain", PLAIN_AB_SRC);
        let schema = builder.based_on(&ty).unwrap();

        let refined = schema
            .refine([
                json!({"description": "first", "required": ["a"]}),
                json!({"description": "second"}),
            ])
            .unwrap();

        let doc = refined.document();
        assert_eq!(doc.description.as_deref(), Some("second"));
        assert_eq!(doc.required, Some(vec!["a".to_string()]));
    }

    #[test]
    fn test_refine_rejects_unknown_property() {
        let builder = SchemaBuilder::new();
        let ty = TypeDef::new("Plain", PLAIN_AB_SRC);
        let schema = builder.based_on(&ty).unwrap();

        let err = schema
            .refine([json!({"properties": {"nope": {}}})])
            .unwrap_err();
        assert!(matches!(err, SchemaError::UnknownProperty { .. }));
    }

    #[test]
    fn test_refine_rejects_non_object_partial() {
        let builder = SchemaBuilder::new();
        let ty = TypeDef::new("Plain", PLAIN_AB_SRC);
        let schema = builder.based_on(&ty).unwrap();

        let err = schema.refine([json!("nope")]).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::InvalidSpec { ref found, .. } if found == "string"
        ));
    }

    #[test]
    fn test_with_only_and_without() {
        let builder = SchemaBuilder::new();
        let ty = TypeDef::new("Plain", PLAIN_AB_SRC);
        let schema = builder.based_on(&ty).unwrap();

        let only_a = schema.with_only(["a"]).unwrap();
        assert_eq!(only_a.id(), "Plain/with");
        assert_eq!(only_a.property_keys(), ["a"]);

        let without_a = schema.without(["a"]).unwrap();
        assert_eq!(without_a.id(), "Plain/without");
        assert_eq!(without_a.property_keys(), ["b"]);

        assert!(matches!(
            schema.with_only(["missing"]),
            Err(SchemaError::UnknownProperty { .. })
        ));
        assert!(matches!(
            schema.without(["missing"]),
            Err(SchemaError::UnknownProperty { .. })
        ));
    }

    #[test]
    fn test_with_only_keeps_discovery_order() {
        let builder = SchemaBuilder::new();
        let ty = TypeDef::new(
            "Wide",
            r#"
class Wide {
  constructor() {
    this.a = 1;
    this.b = 2;
    this.c = 3;
  }
}
"#,
        );
        let schema = builder.based_on(&ty).unwrap();

        // Selection order does not reorder the property map.
        let subset = schema.with_only(["c", "a"]).unwrap();
        assert_eq!(subset.property_keys(), ["a", "c"]);

        let complement = schema.without(["b"]).unwrap();
        assert_eq!(complement.property_keys(), ["a", "c"]);
    }

    #[test]
    fn test_with_required() {
        let builder = SchemaBuilder::new();
        let ty = TypeDef::new("Plain", PLAIN_AB_SRC);
        let schema = builder.based_on(&ty).unwrap();

        let required = schema.with_required(["a"]).unwrap();
        assert_eq!(required.id(), "Plain/required");
        assert_eq!(required.document().required, Some(vec!["a".to_string()]));

        assert!(matches!(
            schema.with_required(["missing"]),
            Err(SchemaError::UnknownProperty { .. })
        ));
    }

    #[test]
    fn test_array_of() {
        let builder = SchemaBuilder::new();
        let ty = TypeDef::new("Plain", PLAIN_AB_SRC);
        let schema = builder.based_on(&ty).unwrap();

        let array = schema.array_of([json!({"minItems": 1})]).unwrap();
        assert_eq!(array.id(), "Plain_array");
        assert_eq!(
            array.document().to_value(),
            json!({
                "$id": "Plain_array",
                "type": "array",
                "items": {"$ref": "Plain"},
                "minItems": 1,
            })
        );
    }

    #[test]
    fn test_array_of_rejects_authored_properties() {
        let builder = SchemaBuilder::new();
        let ty = TypeDef::new("Plain", PLAIN_AB_SRC);
        let schema = builder.based_on(&ty).unwrap();

        let err = schema
            .array_of([json!({"properties": {"a": {}}})])
            .unwrap_err();
        assert!(matches!(err, SchemaError::UnknownProperty { .. }));
    }

    #[test]
    fn test_register_as_releases_the_old_id() {
        let builder = SchemaBuilder::new();
        let ty = TypeDef::new("Plain", PLAIN_AB_SRC);
        let mut schema = builder.based_on(&ty).unwrap();

        schema.register_as("Renamed");
        assert_eq!(schema.id(), "Renamed");
        assert!(!builder.registry().contains("Plain"));
        assert!(builder.registry().contains("Renamed"));
    }

    #[test]
    fn test_identifier_collisions_suffix() {
        let builder = SchemaBuilder::new();
        // Two distinct types that happen to share a name.
        let first = TypeDef::new("X", PLAIN_AB_SRC);
        let second = TypeDef::new("X", PLAIN_AB_SRC);
        let third = TypeDef::new("X", PLAIN_AB_SRC);

        assert_eq!(builder.based_on(&first).unwrap().id(), "X");
        assert_eq!(builder.based_on(&second).unwrap().id(), "X_1");
        assert_eq!(builder.based_on(&third).unwrap().id(), "X_2");
    }

    #[test]
    fn test_spec_form_heuristic() {
        // Any reserved key at top level means "single spec".
        assert!(matches!(
            SpecForm::classify(&json!({"description": "d"}), "T").unwrap(),
            SpecForm::Single(_)
        ));
        // No reserved keys: a map of named variants.
        assert!(matches!(
            SpecForm::classify(&json!({"forCreate": {}, "forResult": {}}), "T").unwrap(),
            SpecForm::Variants(ref v) if v.len() == 2
        ));
        // Non-object specs are rejected.
        assert!(matches!(
            SpecForm::classify(&json!([1, 2]), "T"),
            Err(SchemaError::InvalidSpec { .. })
        ));
        // Non-object variant values are rejected.
        assert!(matches!(
            SpecForm::classify(&json!({"forCreate": 7}), "T"),
            Err(SchemaError::InvalidSpec { .. })
        ));
    }

    #[test]
    fn test_explicit_property_map_construction() {
        let registry = SchemaRegistry::new();
        let mut properties = PropertyMap::new();
        properties.insert("x".to_string(), json!({"type": "number"}));

        let schema = Schema::with_properties(&registry, "Handmade", properties);
        assert_eq!(schema.id(), "Handmade");
        assert_eq!(schema.property_keys(), ["x"]);
    }
}
