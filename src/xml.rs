//! XML parsing into a [`Document`].
//!
//! Uses quick-xml as tokenizer behind a [`LineEndingNormalizer`]; the
//! resulting [`Token`] stream feeds the [`TreeBuilder`].

use std::io::Read;

use crate::Result;
use crate::builder::TreeBuilder;
use crate::line_ending::LineEndingNormalizer;
use crate::qname::{Attribute, QName};
use crate::tree::Document;

mod emit;
pub(crate) use emit::emit_tokens;

/// Structural event produced by the tokenizer. Borrowed; consumers copy
/// what they keep.
///
/// Text and attribute values are already in canonical escaped form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    StartTag { name: &'a QName, attributes: &'a [Attribute] },
    EndTag { name: &'a QName },
    Text(&'a str),
    Comment(&'a str),
    ProcessingInstruction { target: &'a str, instruction: &'a str },
    /// Markup declaration without `<!` and `>`, e.g. `DOCTYPE root`.
    Directive(&'a str),
}

/// Parses one XML document from a byte stream.
pub fn parse(xml_reader: impl Read) -> Result<Document> {
    let mut builder = TreeBuilder::new();
    emit_tokens(LineEndingNormalizer::new(xml_reader), |token| builder.push(token))?;
    builder.finish()
}

/// Parses one XML document from a string.
pub fn parse_str(xml: &str) -> Result<Document> {
    parse(xml.as_bytes())
}
