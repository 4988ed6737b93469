//! xmlc14n – Canonical XML 1.0 (C14N) for XML signature verification
//!
//! Pipeline: bytes → line-ending normalization → tokenizer → tree builder →
//! canonicalizer → serializer. Logically equivalent documents (attribute
//! order, prefix spelling, comments, `<?xml?>` declaration, whitespace
//! between top-level items) come out byte-identical.
//!
//! # Beispiel
//!
//! ```
//! use xmlc14n::{Method, canonicalize_str};
//!
//! let out = canonicalize_str(
//!     r#"<?xml version="1.0"?><a:root xmlns:a="urn:x" b="2" a:c="1"><!--hi--></a:root>"#,
//!     Method::Inclusive,
//! )
//! .unwrap();
//! assert_eq!(out, r#"<a:root xmlns:a="urn:x" b="2" a:c="1"></a:root>"#);
//! ```

use std::io::{Read, Write};

pub mod builder;
pub mod c14n;
pub mod error;
pub mod line_ending;
pub mod namespace;
pub mod qname;
pub mod serializer;
pub mod tree;
pub mod xml;

pub use error::{Error, Result};

/// HashMap mit ahash (schneller, nicht DoS-resistent, für interne Datenstrukturen).
pub(crate) type FastHashMap<K, V> = hashbrown::HashMap<K, V, ahash::RandomState>;

// Public API: Tree
pub use qname::{Attribute, QName};
pub use tree::{Document, Element, NodeId, NodeValue, NsBinding, ProcessingInstruction};

// Public API: Pipeline
pub use c14n::{C14nOptions, Method, canonicalize, canonicalize_with_options};
pub use serializer::{print, print_to, print_to_string};
pub use xml::{parse, parse_str};

/// Parses, canonicalizes and prints one document from `xml_reader` to `sink`.
pub fn canonicalize_reader(xml_reader: impl Read, method: Method, sink: impl Write) -> Result<()> {
    let doc = parse(xml_reader)?;
    let canonical = canonicalize(&doc, method)?;
    print_to(&canonical, sink)
}

/// Canonical form of an XML string.
pub fn canonicalize_str(xml: &str, method: Method) -> Result<String> {
    let doc = parse_str(xml)?;
    print_to_string(&canonicalize(&doc, method)?)
}
