//! # Constructor Scanning
//!
//! Locates the constructor span of a class-like type definition and walks
//! it token by token, pairing each `/** ... */` documentation block with
//! the next qualifying `this.<name> =` property assignment.
//!
//! ## Approximation, Not a Lexer
//!
//! The locator counts braces byte-wise over the raw source text. A `{` or
//! `}` inside a string or comment literal within the constructor can
//! mis-locate the span boundary. This is a deliberate design constraint
//! carried over from the reflection contract: the scanner's job is to
//! recover attribute names and docs from well-formed definitions, not to
//! understand the language.
//!
//! ## Termination
//!
//! The extraction loop advances at least one byte per iteration: if
//! neither a doc block nor an assignment is recognized at the cursor, the
//! cursor moves forward by one. Every input terminates.

use crate::docblock::{self, Documentation};
use crate::error::ReflectError;

/// A discovered property name plus its optional documentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDescriptor {
    /// Identifier assigned via `this.<name> = ...`.
    pub name: String,
    /// Documentation block immediately preceding the assignment, if any.
    pub doc: Option<Documentation>,
}

/// Qualifier denoting "this instance's own property".
const OWN_PROPERTY_PREFIX: &str = "this.";

/// Incremental scanner over one type definition's full source text.
#[derive(Debug)]
pub struct SourceScanner<'a> {
    source: &'a str,
    index: usize,
    /// Exclusive scan bound; clamped to the constructor span once located.
    length: usize,
}

impl<'a> SourceScanner<'a> {
    /// Create a scanner over the full source text of one type definition.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            index: 0,
            length: source.len(),
        }
    }

    /// Extract the ordered attribute descriptors from the constructor body.
    ///
    /// A type without a constructor yields an empty list; that is not an
    /// error. Within the constructor, the same name assigned twice keeps
    /// its first position, and its documentation is backfilled from a later
    /// occurrence only if the first had none.
    ///
    /// # Errors
    ///
    /// Propagates doc-block parse failures (see [`docblock::parse`])
    /// unmodified.
    pub fn attributes(&mut self) -> Result<Vec<AttributeDescriptor>, ReflectError> {
        let mut attributes: Vec<AttributeDescriptor> = Vec::new();

        if !self.enter_constructor() {
            return Ok(attributes);
        }

        while self.index < self.length {
            let start = self.index;

            self.eat_space();
            let doc = self.parse_doc_block()?;
            self.eat_space();

            if let Some(name) = self.parse_assignment() {
                match attributes.iter_mut().find(|attr| attr.name == name) {
                    Some(existing) => {
                        // Reassignment: keep the first position, backfill
                        // the doc only if the first occurrence had none.
                        if existing.doc.is_none() {
                            existing.doc = doc;
                        }
                    }
                    None => attributes.push(AttributeDescriptor { name, doc }),
                }
            }

            if self.index == start {
                self.index += 1;
            }
        }

        Ok(attributes)
    }

    /// Locate the constructor span with a brace-depth counter.
    ///
    /// The token `constructor` followed by `(` at depth 1 (directly inside
    /// the type body) records the start; the closing brace that returns the
    /// depth to 1 ends the span. On success the cursor sits at the start
    /// and the scan bound is clamped just past the closing brace.
    fn enter_constructor(&mut self) -> bool {
        self.index = 0;

        let bytes = self.source.as_bytes();
        let mut depth: i64 = 0;
        let mut start: Option<usize> = None;

        while self.index < self.length {
            match bytes[self.index] {
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if start.is_some() && depth == 1 {
                        self.length = self.index + 1;
                        self.index = start.unwrap_or(0);
                        return true;
                    }
                }
                _ => {
                    if depth == 1
                        && self.peek("constructor")
                        && self.paren_follows(self.index + "constructor".len())
                    {
                        start = Some(self.index);
                    }
                }
            }
            self.index += 1;
        }

        false
    }

    /// True if the next non-whitespace byte at or after `from` is `(`.
    fn paren_follows(&self, from: usize) -> bool {
        self.source.as_bytes()[from..self.length.min(self.source.len())]
            .iter()
            .find(|b| !b.is_ascii_whitespace())
            .is_some_and(|b| *b == b'(')
    }

    /// Parse a documentation block starting at the cursor, if present.
    ///
    /// Recognizes the `/**` opener and scans to the `*/` closer (or the end
    /// of the span). Interpretation of the contents is delegated to
    /// [`docblock::parse`].
    fn parse_doc_block(&mut self) -> Result<Option<Documentation>, ReflectError> {
        if !self.peek("/**") {
            return Ok(None);
        }

        let start = self.index;
        while self.index < self.length {
            if self.peek("*/") {
                self.index += 2;
                break;
            }
            self.index += 1;
        }

        let block = &self.source[start..self.index.min(self.source.len())];
        docblock::parse(block).map(Some)
    }

    /// Parse a property assignment of the shape
    /// `this.<identifier> <ws>? =` where the `=` is not followed by another
    /// `=` (which would be an equality comparison).
    ///
    /// On success returns the identifier and leaves the cursor ON the `=`,
    /// so chained assignments (`this.a = this.b = 0`) each get scanned.
    fn parse_assignment(&mut self) -> Option<String> {
        if !self.peek(OWN_PROPERTY_PREFIX) {
            return None;
        }
        self.index += OWN_PROPERTY_PREFIX.len();

        let name = self.parse_identifier()?;
        self.eat_space();

        if self.peek("=") && !self.peek_at("=", 1) {
            return Some(name);
        }

        None
    }

    /// Identifier characters: ASCII letters, `$`, `_`. Digits are not
    /// identifier characters in this scanner, mirroring the reflection
    /// contract exactly.
    fn parse_identifier(&mut self) -> Option<String> {
        let start = self.index;
        let bytes = self.source.as_bytes();

        while self.index < self.length {
            match bytes[self.index] {
                b'A'..=b'Z' | b'a'..=b'z' | b'$' | b'_' => self.index += 1,
                _ => break,
            }
        }

        if self.index == start {
            return None;
        }
        Some(self.source[start..self.index].to_string())
    }

    fn eat_space(&mut self) {
        let bytes = self.source.as_bytes();
        while self.index < self.length {
            match bytes[self.index] {
                b' ' | b'\t' | b'\n' | b'\r' => self.index += 1,
                _ => break,
            }
        }
    }

    /// True if `what` appears at the cursor (bounded by the span).
    fn peek(&self, what: &str) -> bool {
        self.peek_at(what, 0)
    }

    fn peek_at(&self, what: &str, skip: usize) -> bool {
        let start = self.index + skip;
        let end = start + what.len();
        if end > self.length {
            return false;
        }
        self.source.as_bytes()[start..end] == *what.as_bytes()
    }
}
