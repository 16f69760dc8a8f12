//! # Doc Block Interpretation
//!
//! Turns a raw `/** ... */` documentation block into a [`Documentation`]
//! value: a free-text description plus a list of tags, where a `@type {...}`
//! tag additionally carries a parsed [`TypeExpression`].
//!
//! ## Contract
//!
//! [`parse`] accepts the block text *including* its delimiters. Unwrapping
//! strips the `/**` opener and `*/` closer, then on every line after the
//! first removes leading whitespace, a single `*` margin, and one optional
//! space. Whatever remains on the first line (e.g. a run of extra
//! asterisks in a banner comment) stays in the description verbatim.
//!
//! Tags begin at the first line whose first non-whitespace character is
//! `@` and run until the next such line. A tag's description is `None`
//! when nothing follows the title (or the type expression).

use serde::{Deserialize, Serialize};

use crate::error::ReflectError;

/// Parsed documentation for one attribute: description plus tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Documentation {
    /// Free text preceding the first tag, with comment margins stripped.
    pub description: String,
    /// Tags in source order.
    pub tags: Vec<Tag>,
}

impl Documentation {
    /// The parsed expression of the first `@type` tag that carries one.
    pub fn type_tag(&self) -> Option<&TypeExpression> {
        self.tags
            .iter()
            .find(|tag| tag.title == "type" && tag.type_expr.is_some())
            .and_then(|tag| tag.type_expr.as_ref())
    }
}

/// A single `@title ...` tag inside a documentation block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Tag title without the leading `@`.
    pub title: String,
    /// Free text following the title (and type expression, if any).
    pub description: Option<String>,
    /// Parsed `{...}` type expression, present on `@type` tags.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_expr: Option<TypeExpression>,
}

/// A documented type expression: a bare name or an array application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TypeExpression {
    /// A bare name such as `Number` or `SomeType`.
    Name {
        /// The name as written.
        name: String,
    },
    /// An array application: `T[]`, `Array<T>`, or `Array` with no element.
    Array {
        /// Element type name, absent for `[]` / `Array<>` / bare `Array`.
        element: Option<String>,
    },
}

/// Parse a raw documentation block (delimiters included) into
/// [`Documentation`].
///
/// # Errors
///
/// Returns [`ReflectError::UnterminatedTypeExpression`] when a tag opens a
/// `{` type expression that never closes. All other inputs parse totally;
/// a block with no tags yields an empty tag list.
pub fn parse(block: &str) -> Result<Documentation, ReflectError> {
    let unwrapped = unwrap_block(block);

    let mut description_lines: Vec<&str> = Vec::new();
    let mut tags: Vec<Tag> = Vec::new();

    for line in unwrapped {
        if let Some(rest) = tag_start(line) {
            tags.push(parse_tag(rest)?);
        } else if let Some(tag) = tags.last_mut() {
            // Continuation line of the preceding tag's description.
            append_tag_line(tag, line);
        } else {
            description_lines.push(line);
        }
    }

    Ok(Documentation {
        description: description_lines.join("\n").trim().to_string(),
        tags,
    })
}

/// Strip the block delimiters and per-line `*` margins.
///
/// The first line keeps whatever follows the `/**` opener; later lines lose
/// leading whitespace, one `*`, and one space.
fn unwrap_block(block: &str) -> Vec<&str> {
    let body = block
        .trim()
        .trim_start_matches("/**")
        .trim_end_matches("*/");

    body.lines()
        .enumerate()
        .map(|(i, line)| if i == 0 { line } else { strip_margin(line) })
        .collect()
}

fn strip_margin(line: &str) -> &str {
    let line = line.trim_start_matches([' ', '\t']);
    match line.strip_prefix('*') {
        Some(rest) => rest.strip_prefix(' ').unwrap_or(rest),
        None => line,
    }
}

/// If the line begins a tag, return the text after the `@`.
fn tag_start(line: &str) -> Option<&str> {
    line.trim_start().strip_prefix('@')
}

/// Parse `title rest-of-line`, where a `type` title may carry a `{...}`
/// expression before its description text.
fn parse_tag(rest: &str) -> Result<Tag, ReflectError> {
    let title_len = rest
        .find(|c: char| c.is_whitespace())
        .unwrap_or(rest.len());
    let title = &rest[..title_len];
    let mut remainder = rest[title_len..].trim_start();

    let mut type_expr = None;
    if title == "type" && remainder.starts_with('{') {
        let close = remainder.find('}').ok_or_else(|| {
            ReflectError::UnterminatedTypeExpression {
                tag: title.to_string(),
            }
        })?;
        type_expr = Some(parse_type_expression(&remainder[1..close]));
        remainder = remainder[close + 1..].trim_start();
    }

    let description = remainder.trim();
    Ok(Tag {
        title: title.to_string(),
        description: (!description.is_empty()).then(|| description.to_string()),
        type_expr,
    })
}

fn append_tag_line(tag: &mut Tag, line: &str) {
    let line = line.trim();
    if line.is_empty() {
        return;
    }
    match &mut tag.description {
        Some(text) => {
            text.push('\n');
            text.push_str(line);
        }
        None => tag.description = Some(line.to_string()),
    }
}

/// Parse the inside of a `{...}` expression: `Name`, `Name[]`, `Array<Name>`,
/// or an element-less array form.
fn parse_type_expression(src: &str) -> TypeExpression {
    let src = src.trim();

    if let Some(element) = src.strip_suffix("[]") {
        let element = element.trim();
        return TypeExpression::Array {
            element: (!element.is_empty()).then(|| element.to_string()),
        };
    }

    if let Some(inner) = src
        .strip_prefix("Array<")
        .and_then(|rest| rest.strip_suffix('>'))
    {
        let inner = inner.trim();
        return TypeExpression::Array {
            element: (!inner.is_empty()).then(|| inner.to_string()),
        };
    }

    if src == "Array" {
        return TypeExpression::Array { element: None };
    }

    TypeExpression::Name {
        name: src.to_string(),
    }
}
