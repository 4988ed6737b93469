//! Namespace prefix resolution by ancestor lookup.
//!
//! A namespace URI is resolved by walking from a node up through its
//! parents; the nearest declaration wins. A declaration only counts while
//! its prefix is still visible: if an element between the use site and the
//! declaring element rebinds the same prefix (or the default namespace) to
//! another URI, that binding is skipped and the walk continues. A URI
//! without a visible binding is a hard error, there is no fallback prefix.
//! The only implicit binding is the reserved `xml` prefix.

use std::borrow::Cow;

use crate::qname::{Attribute, QName, XML_NAMESPACE, XML_PREFIX, XMLNS};
use crate::tree::{Document, NodeId, NsBinding};
use crate::{Error, Result};

/// Finds the binding in effect for `uri` at `node`.
///
/// Returns `None` for a default-namespace binding (no prefix printed) and
/// `Some(prefix)` otherwise. Among several visible bindings declared on the
/// same element, the last declared one is used.
pub fn resolve_prefix<'d>(doc: &'d Document, node: NodeId, uri: &str) -> Result<Option<&'d str>> {
    resolve(doc, node, uri, true)
}

/// Prefix for an attribute name. Unprefixed attributes are in no namespace,
/// so default-namespace bindings never apply.
fn resolve_attribute_prefix<'d>(doc: &'d Document, node: NodeId, uri: &str) -> Result<Option<&'d str>> {
    resolve(doc, node, uri, false)
}

fn resolve<'d>(doc: &'d Document, node: NodeId, uri: &str, allow_default: bool) -> Result<Option<&'d str>> {
    let mut current = Some(node);
    while let Some(id) = current {
        if let Some(bindings) = doc.node(id).namespace_scope.get(uri) {
            let visible = bindings
                .iter()
                .rev()
                .filter(|binding| allow_default || **binding != NsBinding::Default)
                .find(|binding| !is_shadowed(doc, node, id, uri, binding));
            if let Some(binding) = visible {
                return Ok(binding.prefix());
            }
        }
        current = doc.parent(id);
    }
    if uri == XML_NAMESPACE {
        return Ok(Some(XML_PREFIX));
    }
    Err(Error::malformed_namespace(uri))
}

/// True if a node from `node` up to (excluding) `declared_at` binds the
/// same prefix to a URI other than `uri`.
fn is_shadowed(doc: &Document, node: NodeId, declared_at: NodeId, uri: &str, binding: &NsBinding) -> bool {
    let mut current = Some(node);
    while let Some(id) = current {
        if id == declared_at {
            return false;
        }
        let rebound = doc
            .node(id)
            .namespace_scope
            .iter()
            .any(|(other, bindings)| other != uri && bindings.contains(binding));
        if rebound {
            return true;
        }
        current = doc.parent(id);
    }
    false
}

/// Printable name of an element at `node`.
pub fn element_name<'q>(doc: &Document, node: NodeId, name: &'q QName) -> Result<Cow<'q, str>> {
    if name.space.is_empty() {
        return Ok(Cow::Borrowed(&name.local));
    }
    Ok(prefixed(resolve_prefix(doc, node, &name.space)?, &name.local))
}

/// Printable name of an attribute on the element at `node`.
///
/// Namespace declarations print as written (`xmlns`, `xmlns:p`); attributes
/// without namespace print their local name.
pub fn attribute_name<'a>(doc: &Document, node: NodeId, attr: &'a Attribute) -> Result<Cow<'a, str>> {
    if attr.name.space.is_empty() {
        return Ok(Cow::Borrowed(&attr.name.local));
    }
    if attr.is_namespace_decl() {
        return Ok(Cow::Owned(format!("{XMLNS}:{}", attr.name.local)));
    }
    Ok(prefixed(resolve_attribute_prefix(doc, node, &attr.name.space)?, &attr.name.local))
}

fn prefixed<'q>(prefix: Option<&str>, local: &'q str) -> Cow<'q, str> {
    match prefix {
        Some(prefix) => Cow::Owned(format!("{prefix}:{local}")),
        None => Cow::Borrowed(local),
    }
}
