//! Canonical serializer.
//!
//! Walks a (canonical) [`Document`] depth-first and emits the exact output
//! text. Text and attribute values are stored escaped and printed verbatim.
//! Element and close-tag names are resolved independently against the
//! scopes of the tree being printed.
//!
//! The whole output is assembled in memory first: a namespace-resolution
//! failure never leaves partial canonical output in the sink.

use std::io::Write;

use crate::Result;
use crate::namespace::{attribute_name, element_name};
use crate::tree::{Document, NodeId, NodeValue};

/// Serializes `doc` into a byte buffer.
pub fn print(doc: &Document) -> Result<Vec<u8>> {
    print_to_string(doc).map(String::into_bytes)
}

/// Serializes `doc` into a `String`.
pub fn print_to_string(doc: &Document) -> Result<String> {
    let mut out = String::new();
    write_node(doc, doc.root(), &mut out)?;
    Ok(out)
}

/// Serializes `doc` and writes it to `sink` in one piece.
pub fn print_to(doc: &Document, mut sink: impl Write) -> Result<()> {
    let out = print_to_string(doc)?;
    sink.write_all(out.as_bytes())?;
    sink.flush()?;
    Ok(())
}

fn write_node(doc: &Document, id: NodeId, out: &mut String) -> Result<()> {
    match doc.value(id) {
        NodeValue::Root => write_children(doc, id, out)?,
        NodeValue::Element(elem) => {
            out.push('<');
            out.push_str(&element_name(doc, id, &elem.name)?);
            for attr in &elem.attributes {
                out.push(' ');
                out.push_str(&attribute_name(doc, id, attr)?);
                out.push_str("=\"");
                out.push_str(&attr.value);
                out.push('"');
            }
            out.push('>');
            write_children(doc, id, out)?;
            out.push_str("</");
            out.push_str(&element_name(doc, id, elem.close_name())?);
            out.push('>');
        }
        NodeValue::Text(text) => out.push_str(text),
        NodeValue::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        NodeValue::ProcessingInstruction(pi) => {
            out.push_str("<?");
            out.push_str(&pi.target);
            if !pi.instruction.is_empty() {
                out.push(' ');
                out.push_str(&pi.instruction);
            }
            out.push_str("?>");
        }
        NodeValue::Directive(text) => {
            out.push_str("<!");
            out.push_str(text);
            out.push('>');
        }
    }
    Ok(())
}

fn write_children(doc: &Document, id: NodeId, out: &mut String) -> Result<()> {
    for &child in doc.children(id) {
        write_node(doc, child, out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::qname::{Attribute, QName, XMLNS};
    use crate::tree::{Element, ProcessingInstruction};

    fn element(doc: &mut Document, parent: NodeId, name: QName, attrs: Vec<Attribute>) -> NodeId {
        doc.append(parent, NodeValue::Element(Element::new(name, attrs))).unwrap()
    }

    fn pi(doc: &mut Document, target: &str, instruction: &str) {
        doc.append(
            NodeId::ROOT,
            NodeValue::ProcessingInstruction(ProcessingInstruction {
                target: target.into(),
                instruction: instruction.into(),
            }),
        )
        .unwrap();
    }

    #[test]
    fn prints_every_node_kind() {
        let mut doc = Document::new();
        pi(&mut doc, "style", "href=\"a\"");
        pi(&mut doc, "empty", "");
        doc.append(NodeId::ROOT, NodeValue::Directive("DOCTYPE r".into())).unwrap();
        let r = element(&mut doc, NodeId::ROOT, QName::local("r"), vec![]);
        doc.append(r, NodeValue::Text("a &amp; b".into())).unwrap();
        doc.append(r, NodeValue::Comment(" c ".into())).unwrap();
        assert_eq!(
            print_to_string(&doc).unwrap(),
            "<?style href=\"a\"?><?empty?><!DOCTYPE r><r>a &amp; b<!-- c --></r>"
        );
    }

    #[test]
    fn prints_attributes_in_stored_order() {
        let mut doc = Document::new();
        let attrs = vec![
            Attribute::new(QName::new(XMLNS, "p"), "urn:p"),
            Attribute::new(QName::local("id"), "&quot;x&quot;"),
            Attribute::new(QName::new("urn:p", "ref"), "1"),
        ];
        element(&mut doc, NodeId::ROOT, QName::new("urn:p", "r"), attrs);
        assert_eq!(
            print_to_string(&doc).unwrap(),
            r#"<p:r xmlns:p="urn:p" id="&quot;x&quot;" p:ref="1"></p:r>"#
        );
    }

    #[test]
    fn empty_elements_get_explicit_close_tag() {
        let mut doc = Document::new();
        let r = element(&mut doc, NodeId::ROOT, QName::local("r"), vec![]);
        element(&mut doc, r, QName::local("e"), vec![]);
        assert_eq!(print(&doc).unwrap(), b"<r><e></e></r>");
    }

    #[test]
    fn close_tag_is_resolved_from_current_scope() {
        let mut doc = Document::new();
        let attrs = vec![Attribute::new(QName::new(XMLNS, "q"), "urn:x")];
        let r = element(&mut doc, NodeId::ROOT, QName::new("urn:x", "r"), attrs);
        doc.set_close_name(r, QName::new("urn:x", "r"));
        assert_eq!(print_to_string(&doc).unwrap(), r#"<q:r xmlns:q="urn:x"></q:r>"#);
    }

    #[test]
    fn undeclared_namespace_fails_without_output() {
        let mut doc = Document::new();
        element(&mut doc, NodeId::ROOT, QName::new("urn:missing", "r"), vec![]);
        let mut sink = Vec::new();
        let err = print_to(&doc, &mut sink).unwrap_err();
        assert_eq!(err, Error::malformed_namespace("urn:missing"));
        assert!(sink.is_empty());
    }

    #[test]
    fn sink_errors_become_io_errors() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("disk full"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }
        let mut doc = Document::new();
        element(&mut doc, NodeId::ROOT, QName::local("r"), vec![]);
        assert!(matches!(print_to(&doc, Broken), Err(Error::Io(_))));
    }
}
