//! # msk-reflect — Source-Text Reflection
//!
//! Recovers structural information about class-like type definitions from
//! their raw constructor source text, without a full language parser:
//!
//! - **Scanner** (`scanner.rs`): locates the constructor span with a
//!   brace-depth counter and extracts ordered attribute descriptors, pairing
//!   each doc comment with the next qualifying property assignment.
//!
//! - **Doc blocks** (`docblock.rs`): interprets `/** ... */` blocks into a
//!   description plus tags, including `@type {...}` type expressions.
//!
//! - **Mapping** (`mapping.rs`): converts a documented type expression into
//!   a JSON schema property fragment (`type`, `items`, `$ref`).
//!
//! - **Hierarchy** (`hierarchy.rs`): aggregates property fragments across an
//!   explicitly declared ancestor chain, with a memoizing [`Reflector`].
//!
//! ## Crate Policy
//!
//! - No dependencies on other `msk-*` crates (leaf of the DAG).
//! - No `unsafe` code, no `panic!()` or `.unwrap()` outside tests.
//! - All public data types derive `Debug` and `Clone`, and implement
//!   `Serialize`/`Deserialize` where they cross the output boundary.
//! - The scanner is a textual approximation, not a lexer. Braces inside
//!   string or comment literals within a constructor can mis-locate the
//!   span. This limitation is deliberate and documented on
//!   [`scanner::SourceScanner`]; do not "fix" it silently.

pub mod docblock;
pub mod error;
pub mod hierarchy;
pub mod mapping;
pub mod merge;
pub mod scanner;

pub use docblock::{Documentation, Tag, TypeExpression};
pub use error::ReflectError;
pub use hierarchy::{MergePrecedence, PropertyMap, Reflector, TypeDef};
pub use scanner::{AttributeDescriptor, SourceScanner};
