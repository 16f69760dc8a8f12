//! Error types for schema construction and derivation.

use thiserror::Error;

use msk_reflect::ReflectError;

/// Error raised while building or deriving a schema. All variants are
/// fatal and synchronous; there are no retries.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// A spec or derivation referenced a property key that is not part of
    /// the schema's current property set. Raised eagerly at build time.
    #[error("unknown property '{property}' referenced by schema '{schema_id}'")]
    UnknownProperty {
        /// Identifier of the schema whose property set was consulted.
        schema_id: String,
        /// The offending key.
        property: String,
    },

    /// A supplied spec or partial was not a JSON object.
    #[error("schema spec for '{schema_id}' must be a JSON object, got {found}")]
    InvalidSpec {
        /// Identifier of the schema being built.
        schema_id: String,
        /// Short description of what was found instead.
        found: String,
    },

    /// Reflection over the underlying type failed.
    #[error(transparent)]
    Reflect(#[from] ReflectError),
}
