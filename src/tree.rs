//! Document tree: an arena of nodes addressed by [`NodeId`].
//!
//! Index 0 is always the synthetic root. Children are stored in document
//! order; the `parent` link exists only for upward namespace lookup.

use std::fmt::Write as _;

use crate::qname::{Attribute, QName};
use crate::{Error, FastHashMap, Result};

/// Typed index into a [`Document`]'s node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// The synthetic document root.
    pub const ROOT: NodeId = NodeId(0);

    fn as_index(self) -> usize {
        self.0 as usize
    }
}

/// How a namespace URI was declared on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NsBinding {
    /// `xmlns="uri"`: names in this namespace print without prefix.
    Default,
    /// `xmlns:prefix="uri"`.
    Prefix(String),
}

impl NsBinding {
    /// Printable prefix: `None` for the default namespace.
    pub fn prefix(&self) -> Option<&str> {
        match self {
            Self::Default => None,
            Self::Prefix(prefix) => Some(prefix),
        }
    }
}

/// Namespace URI → all bindings declared for it directly on a node, in
/// declaration order.
pub type NamespaceScope = FastHashMap<String, Vec<NsBinding>>;

/// Element payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: QName,
    pub attributes: Vec<Attribute>,
    /// Name from the end tag, set when the element is closed.
    pub close: Option<QName>,
}

impl Element {
    pub fn new(name: QName, attributes: Vec<Attribute>) -> Self {
        Self { name, attributes, close: None }
    }

    /// Name used for the close tag: the recorded end-tag name, or the open
    /// name if the element was never closed explicitly.
    pub fn close_name(&self) -> &QName {
        self.close.as_ref().unwrap_or(&self.name)
    }
}

/// Processing instruction payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingInstruction {
    pub target: String,
    pub instruction: String,
}

/// Payload of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeValue {
    Root,
    Element(Element),
    /// Character data in canonical escaped form.
    Text(String),
    Comment(String),
    ProcessingInstruction(ProcessingInstruction),
    /// Markup declaration such as `DOCTYPE …`, without `<!` and `>`.
    Directive(String),
}

#[derive(Debug, Clone)]
pub struct Node {
    pub value: NodeValue,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
    pub namespace_scope: NamespaceScope,
}

/// Builds the namespace scope declared by an attribute list.
///
/// Mehrere Prefixe fuer dieselbe URI bleiben alle erhalten.
pub fn scope_from_attributes(attributes: &[Attribute]) -> NamespaceScope {
    let mut scope = NamespaceScope::default();
    for attr in attributes.iter().filter(|a| a.is_namespace_decl()) {
        let binding = match attr.declared_prefix() {
            None => NsBinding::Default,
            Some(prefix) => NsBinding::Prefix(prefix.to_string()),
        };
        scope.entry_ref(attr.value.as_str()).or_default().push(binding);
    }
    scope
}

/// Highest node count a [`Document`] can hold; ids are `u32`.
pub const MAX_NODES: usize = u32::MAX as usize;

/// Id for the node appended to an arena of `len` nodes.
fn next_id(len: usize) -> Result<NodeId> {
    u32::try_from(len)
        .ok()
        .filter(|&index| index < u32::MAX)
        .map(NodeId)
        .ok_or(Error::TooManyNodes { limit: MAX_NODES })
}

/// An XML document tree owning all its nodes.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Empty document holding only the root node.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                value: NodeValue::Root,
                children: Vec::new(),
                parent: None,
                namespace_scope: NamespaceScope::default(),
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.as_index()]
    }

    pub fn value(&self, id: NodeId) -> &NodeValue {
        &self.node(id).value
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Number of nodes including the root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the document holds nothing but the root.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// The first element among the root's children.
    pub fn root_element(&self) -> Option<NodeId> {
        self.children(NodeId::ROOT)
            .iter()
            .copied()
            .find(|&id| matches!(self.value(id), NodeValue::Element(_)))
    }

    /// Appends a new node as the last child of `parent`. Element scopes are
    /// derived from the element's namespace declarations here and never
    /// change afterwards.
    ///
    /// Fails with [`Error::TooManyNodes`] once the arena is full.
    pub fn append(&mut self, parent: NodeId, value: NodeValue) -> Result<NodeId> {
        let id = next_id(self.nodes.len())?;
        let namespace_scope = match &value {
            NodeValue::Element(elem) => scope_from_attributes(&elem.attributes),
            _ => NamespaceScope::default(),
        };
        self.nodes.push(Node {
            value,
            children: Vec::new(),
            parent: Some(parent),
            namespace_scope,
        });
        self.nodes[parent.as_index()].children.push(id);
        Ok(id)
    }

    /// Records the end-tag name on an element; ignored for other nodes.
    pub(crate) fn set_close_name(&mut self, id: NodeId, close: QName) {
        if let NodeValue::Element(elem) = &mut self.nodes[id.as_index()].value {
            elem.close = Some(close);
        }
    }

    /// Replaces the child list of `parent`. Every id must already name a node
    /// of this document whose parent is `parent`.
    pub(crate) fn set_children(&mut self, parent: NodeId, children: Vec<NodeId>) {
        self.nodes[parent.as_index()].children = children;
    }

    /// Indented dump of the tree for diagnostics.
    pub fn debug_dump(&self) -> String {
        let mut out = String::new();
        self.dump_node(NodeId::ROOT, 0, &mut out);
        out
    }

    fn dump_node(&self, id: NodeId, depth: usize, out: &mut String) {
        let indent = "  ".repeat(depth);
        let node = self.node(id);
        // write! auf String kann nicht fehlschlagen
        let _ = match &node.value {
            NodeValue::Root => writeln!(out, "{indent}Root"),
            NodeValue::Element(elem) => {
                let _ = write!(out, "{indent}Element {}", elem.name);
                for attr in &elem.attributes {
                    let _ = write!(out, " {}=\"{}\"", attr.name, attr.value);
                }
                if !node.namespace_scope.is_empty() {
                    let mut scope: Vec<_> = node.namespace_scope.iter().collect();
                    scope.sort_by(|a, b| a.0.cmp(b.0));
                    let _ = write!(out, " scope={scope:?}");
                }
                writeln!(out)
            }
            NodeValue::Text(text) => writeln!(out, "{indent}Text {text:?}"),
            NodeValue::Comment(text) => writeln!(out, "{indent}Comment {text:?}"),
            NodeValue::ProcessingInstruction(pi) => {
                writeln!(out, "{indent}PI {} {:?}", pi.target, pi.instruction)
            }
            NodeValue::Directive(text) => writeln!(out, "{indent}Directive {text:?}"),
        };
        for &child in &node.children {
            self.dump_node(child, depth + 1, out);
        }
    }
}
