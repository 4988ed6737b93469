//! Canonicalization: tree-to-tree transform.
//!
//! The source [`Document`] is never modified; a parallel tree is built by a
//! depth-first copy-and-filter pass:
//!
//! - processing instructions whose target is filtered (always `xml`) are dropped
//! - character data directly below the document root is dropped
//! - directives are dropped
//! - comments are dropped unless the method keeps them
//! - elements are copied with trimmed attribute names in canonical order
//!
//! Finally a single newline text node is placed between each pair of
//! adjacent document-level nodes.
//!
//! Document-level text is dropped wholesale, not only when it is whitespace.
//! Mixed content at document level cannot occur in well-formed XML, but
//! nothing here checks it.

use std::fmt;
use std::str::FromStr;

use log::{debug, trace};

use crate::qname::{Attribute, XML_PREFIX, compare_attributes};
use crate::tree::{Document, Element, NodeId, NodeValue};
use crate::{Error, Result};

/// Canonical XML 1.0, comments omitted.
pub const C14N_URI: &str = "http://www.w3.org/TR/2001/REC-xml-c14n-20010315";
/// Canonical XML 1.0 with comments.
pub const C14N_WITH_COMMENTS_URI: &str = "http://www.w3.org/TR/2001/REC-xml-c14n-20010315#WithComments";
/// Exclusive XML Canonicalization 1.0, comments omitted.
pub const EXC_C14N_URI: &str = "http://www.w3.org/2001/10/xml-exc-c14n#";
/// Exclusive XML Canonicalization 1.0 with comments.
pub const EXC_C14N_WITH_COMMENTS_URI: &str = "http://www.w3.org/2001/10/xml-exc-c14n#WithComments";

/// Canonicalization method, identified by its algorithm URI.
///
/// Only [`Method::Inclusive`] is implemented; the others are recognized so
/// that callers get an explicit error instead of a silent fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Method {
    #[default]
    Inclusive,
    InclusiveWithComments,
    Exclusive,
    ExclusiveWithComments,
}

impl Method {
    pub fn as_uri(self) -> &'static str {
        match self {
            Self::Inclusive => C14N_URI,
            Self::InclusiveWithComments => C14N_WITH_COMMENTS_URI,
            Self::Exclusive => EXC_C14N_URI,
            Self::ExclusiveWithComments => EXC_C14N_WITH_COMMENTS_URI,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_uri())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(uri: &str) -> Result<Self> {
        match uri {
            C14N_URI => Ok(Self::Inclusive),
            C14N_WITH_COMMENTS_URI => Ok(Self::InclusiveWithComments),
            EXC_C14N_URI => Ok(Self::Exclusive),
            EXC_C14N_WITH_COMMENTS_URI => Ok(Self::ExclusiveWithComments),
            other => Err(Error::UnsupportedCanonicalizationKind(other.to_string())),
        }
    }
}

/// Extra settings for canonicalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct C14nOptions {
    /// Processing-instruction targets removed from the output. The `xml`
    /// target is removed whether or not it is listed.
    pub filtered_pi_targets: Vec<String>,
}

impl Default for C14nOptions {
    fn default() -> Self {
        Self { filtered_pi_targets: vec![XML_PREFIX.to_string()] }
    }
}

impl C14nOptions {
    /// Adds a processing-instruction target to filter.
    pub fn filter_pi(mut self, target: impl Into<String>) -> Self {
        self.filtered_pi_targets.push(target.into());
        self
    }
}

/// Filter-Einstellungen eines Durchlaufs.
struct Filter<'a> {
    keep_comments: bool,
    filtered_pi_targets: &'a [String],
}

impl Filter<'_> {
    fn drops_pi(&self, target: &str) -> bool {
        target == XML_PREFIX || self.filtered_pi_targets.iter().any(|t| t == target)
    }
}

/// Canonicalizes `doc` with default options.
pub fn canonicalize(doc: &Document, method: Method) -> Result<Document> {
    canonicalize_with_options(doc, method, &C14nOptions::default())
}

/// Canonicalizes `doc`, returning a new tree. Unsupported methods fail
/// before any work is done.
pub fn canonicalize_with_options(doc: &Document, method: Method, options: &C14nOptions) -> Result<Document> {
    let filter = match method {
        Method::Inclusive => Filter {
            keep_comments: false,
            filtered_pi_targets: &options.filtered_pi_targets,
        },
        Method::InclusiveWithComments | Method::Exclusive | Method::ExclusiveWithComments => {
            return Err(Error::UnsupportedCanonicalizationKind(method.as_uri().to_string()));
        }
    };
    transform(doc, &filter)
}

fn transform(doc: &Document, filter: &Filter<'_>) -> Result<Document> {
    let mut out = Document::new();
    copy_children(doc, NodeId::ROOT, &mut out, NodeId::ROOT, filter, true)?;
    interleave_newlines(&mut out)?;
    debug!("canonicalized {} nodes into {} nodes", doc.len(), out.len());
    Ok(out)
}

fn copy_children(
    src: &Document,
    src_parent: NodeId,
    dst: &mut Document,
    dst_parent: NodeId,
    filter: &Filter<'_>,
    document_level: bool,
) -> Result<()> {
    for &child in src.children(src_parent) {
        let Some(value) = filter_node(src.value(child), filter, document_level) else {
            trace!("dropping {:?}", src.value(child));
            continue;
        };
        let copy = dst.append(dst_parent, value)?;
        if !src.children(child).is_empty() {
            copy_children(src, child, dst, copy, filter, false)?;
        }
    }
    Ok(())
}

/// Canonical copy of a single node's payload, or `None` if it is dropped.
fn filter_node(value: &NodeValue, filter: &Filter<'_>, document_level: bool) -> Option<NodeValue> {
    match value {
        NodeValue::Root | NodeValue::Directive(_) => None,
        NodeValue::ProcessingInstruction(pi) => {
            (!filter.drops_pi(&pi.target)).then(|| value.clone())
        }
        NodeValue::Text(_) => (!document_level).then(|| value.clone()),
        NodeValue::Comment(_) => filter.keep_comments.then(|| value.clone()),
        NodeValue::Element(elem) => Some(NodeValue::Element(canonical_element(elem))),
    }
}

fn canonical_element(elem: &Element) -> Element {
    let mut attributes: Vec<Attribute> = elem.attributes.iter().map(Attribute::normalized).collect();
    attributes.sort_by(compare_attributes);
    Element {
        name: elem.name.clone(),
        attributes,
        close: elem.close.clone(),
    }
}

/// Puts one `"\n"` text node between adjacent document-level nodes.
fn interleave_newlines(doc: &mut Document) -> Result<()> {
    let children = doc.children(NodeId::ROOT).to_vec();
    if children.len() < 2 {
        return Ok(());
    }
    let mut layout = Vec::with_capacity(children.len() * 2 - 1);
    for (i, child) in children.into_iter().enumerate() {
        if i > 0 {
            layout.push(doc.append(NodeId::ROOT, NodeValue::Text("\n".to_string()))?);
        }
        layout.push(child);
    }
    doc.set_children(NodeId::ROOT, layout);
    Ok(())
}
