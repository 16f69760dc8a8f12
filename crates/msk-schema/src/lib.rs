//! # msk-schema — Schema Documents & Composition Algebra
//!
//! Wraps reflected property maps (from `msk-reflect`) into named,
//! JSON-Schema-like documents and derives new documents from existing ones.
//!
//! - **Documents** (`document.rs`): the serializable [`SchemaDocument`]
//!   shape (`$id`, `type`, `properties`, `items`, `required`,
//!   `errorMessage`, `description`) consumed by external validation
//!   engines.
//!
//! - **Registry** (`registry.rs`): an injected identifier registry that
//!   keeps `$id`s unique, resolving collisions by numeric suffixing. One
//!   registry per schema-compilation run; no process-global state.
//!
//! - **Composition** (`compose.rs`): the [`Schema`] entity with its
//!   derivation operators (`refine`, `with_only`, `without`,
//!   `with_required`, `array_of`) and the [`SchemaBuilder`] that memoizes
//!   built documents per type, including multi-variant specs.
//!
//! ## Crate Policy
//!
//! - Depends only on `msk-reflect` internally.
//! - Every authored property key is validated against the reflected key
//!   set eagerly, at schema-build time — never deferred to data-validation
//!   time. Data validation itself belongs to an external engine.
//! - No `unsafe` code, no `panic!()` or `.unwrap()` outside tests.

pub mod compose;
pub mod document;
pub mod error;
pub mod registry;

pub use compose::{Schema, SchemaBuilder, SchemaOutput, SpecForm};
pub use document::{SchemaDocument, SchemaKind};
pub use error::SchemaError;
pub use registry::SchemaRegistry;
