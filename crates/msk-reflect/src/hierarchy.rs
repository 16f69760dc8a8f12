//! # Hierarchy Aggregation
//!
//! Walks a type's explicitly declared ancestor chain and merges each
//! level's own property fragments into one map. The chain is static data
//! on [`TypeDef`] (an `extends` link set at definition time), not a live
//! object-model traversal.
//!
//! ## Merge Precedence
//!
//! For a property key present at multiple levels, the level visited later
//! in the walk — an **ancestor** — overwrites the more derived level's
//! contribution (shallow fields replaced, nested objects deep-merged).
//! That is the historical contract of this engine, counter-intuitive as it
//! is for an inheritance model. The policy is isolated in
//! [`MergePrecedence`] so it can be flipped in one place without touching
//! any other component.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;

use crate::error::ReflectError;
use crate::mapping;
use crate::merge;
use crate::scanner::SourceScanner;

/// Ordered map from attribute name to its schema property fragment.
///
/// Key order is attribute discovery order (`serde_json`'s `preserve_order`
/// feature is enabled workspace-wide).
pub type PropertyMap = serde_json::Map<String, Value>;

/// A class-like type definition: a name, the full source text of its
/// constructor-bearing definition, and an optional parent link.
///
/// Cheaply cloneable; clones share the same underlying definition.
#[derive(Debug, Clone)]
pub struct TypeDef {
    inner: Arc<TypeDefInner>,
}

#[derive(Debug)]
struct TypeDefInner {
    name: String,
    source: String,
    parent: Option<TypeDef>,
}

impl TypeDef {
    /// A root type with no ancestors.
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(TypeDefInner {
                name: name.into(),
                source: source.into(),
                parent: None,
            }),
        }
    }

    /// A type extending `parent`.
    pub fn extending(
        name: impl Into<String>,
        source: impl Into<String>,
        parent: &TypeDef,
    ) -> Self {
        Self {
            inner: Arc::new(TypeDefInner {
                name: name.into(),
                source: source.into(),
                parent: Some(parent.clone()),
            }),
        }
    }

    /// The type's name; doubles as the default schema identifier.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Full source text of the type definition.
    pub fn source(&self) -> &str {
        &self.inner.source
    }

    /// The direct ancestor, if any.
    pub fn parent(&self) -> Option<&TypeDef> {
        self.inner.parent.as_ref()
    }

    /// The type and its ancestors, most derived first.
    pub fn ancestry(&self) -> Ancestry<'_> {
        Ancestry {
            next: Some(self),
        }
    }
}

/// Iterator over a type's ancestor chain, leaf first.
#[derive(Debug)]
pub struct Ancestry<'a> {
    next: Option<&'a TypeDef>,
}

impl<'a> Iterator for Ancestry<'a> {
    type Item = &'a TypeDef;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.parent();
        Some(current)
    }
}

/// Which level wins when the same property key appears at multiple levels
/// of the ancestor chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergePrecedence {
    /// The ancestor's fragment overwrites the descendant's. Historical
    /// behavior of this engine; the default.
    #[default]
    AncestorWins,
    /// The most derived type's fragment overwrites the ancestor's. The
    /// conventional inheritance expectation, available should the
    /// historical precedence ever be confirmed as a defect.
    DerivedWins,
}

/// Reflects property maps out of type definitions, memoizing the merged
/// result per type name for its own lifetime.
///
/// The memoized read path is idempotent: repeated requests for the same
/// type return the same shared map without re-scanning any source text.
#[derive(Debug, Default)]
pub struct Reflector {
    precedence: MergePrecedence,
    cache: Mutex<HashMap<String, Arc<PropertyMap>>>,
}

impl Reflector {
    /// A reflector with the default (ancestor-wins) merge precedence.
    pub fn new() -> Self {
        Self::default()
    }

    /// A reflector with an explicit merge precedence.
    pub fn with_precedence(precedence: MergePrecedence) -> Self {
        Self {
            precedence,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Reflect one level only: the property map of the type's own
    /// constructor, ignoring ancestors.
    ///
    /// # Errors
    ///
    /// Propagates doc-block parse failures from the scanner.
    pub fn own_properties(ty: &TypeDef) -> Result<PropertyMap, ReflectError> {
        let attributes = SourceScanner::new(ty.source()).attributes()?;

        let mut properties = PropertyMap::new();
        for attribute in attributes {
            properties.insert(
                attribute.name,
                mapping::fragment_for(attribute.doc.as_ref()),
            );
        }
        Ok(properties)
    }

    /// The merged property map for the type and all its ancestors,
    /// memoized per type name.
    ///
    /// # Errors
    ///
    /// Propagates doc-block parse failures from any level of the chain.
    /// Failed reflections are not memoized.
    pub fn properties(&self, ty: &TypeDef) -> Result<Arc<PropertyMap>, ReflectError> {
        if let Some(hit) = self.lock_cache().get(ty.name()).cloned() {
            return Ok(hit);
        }

        let mut merged = PropertyMap::new();
        for level in ty.ancestry() {
            let own = Self::own_properties(level)?;
            match self.precedence {
                MergePrecedence::AncestorWins => {
                    // The later-visited (ancestor) level overlays the
                    // accumulator.
                    merge::deep_merge(&mut merged, &own);
                }
                MergePrecedence::DerivedWins => {
                    // The accumulator (more derived) overlays the ancestor.
                    let mut base = own;
                    merge::deep_merge(&mut base, &merged);
                    merged = base;
                }
            }
        }

        let shared = Arc::new(merged);
        tracing::debug!(
            type_name = ty.name(),
            properties = shared.len(),
            "memoized reflected property map"
        );
        self.lock_cache()
            .insert(ty.name().to_string(), Arc::clone(&shared));
        Ok(shared)
    }

    /// The ordered reflected key list for the type and its ancestors.
    pub fn keys(&self, ty: &TypeDef) -> Result<Vec<String>, ReflectError> {
        Ok(self.properties(ty)?.keys().cloned().collect())
    }

    /// Assert that the type's reflected key set is a superset of `keys`.
    ///
    /// # Errors
    ///
    /// Returns [`ReflectError::SupersetFailed`] naming the first missing
    /// property.
    pub fn assert_superset<'k>(
        &self,
        ty: &TypeDef,
        keys: impl IntoIterator<Item = &'k str>,
    ) -> Result<(), ReflectError> {
        let properties = self.properties(ty)?;
        for key in keys {
            if !properties.contains_key(key) {
                return Err(ReflectError::SupersetFailed {
                    type_name: ty.name().to_string(),
                    property: key.to_string(),
                });
            }
        }
        Ok(())
    }

    fn lock_cache(
        &self,
    ) -> std::sync::MutexGuard<'_, HashMap<String, Arc<PropertyMap>>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
