//! Error types for reflection. All errors use `thiserror` for derive-based
//! `Display` and `Error` implementations.

use thiserror::Error;

/// Error raised while reflecting over a type's source text.
#[derive(Error, Debug)]
pub enum ReflectError {
    /// A `@type {...}` tag opened a type expression that never closed.
    /// Malformed documentation propagates to the caller unmodified.
    #[error("unterminated type expression in doc tag '@{tag}'")]
    UnterminatedTypeExpression {
        /// Title of the tag carrying the malformed expression.
        tag: String,
    },

    /// A superset assertion failed: the type's reflected key set is missing
    /// a property the other key set declares.
    #[error("superset check failed for {type_name}: missing property '{property}'")]
    SupersetFailed {
        /// Name of the type whose key set was checked.
        type_name: String,
        /// The first property found to be missing.
        property: String,
    },
}
