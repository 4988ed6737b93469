//! Document tree builder.
//!
//! Consumes [`Token`]s and assembles a [`Document`] using an explicit stack
//! of open elements that starts with the synthetic root. Token payloads are
//! copied, so the tree never borrows from the tokenizer's buffers.
//!
//! End tags are checked against the element they close: an end tag naming a
//! different expanded name fails with [`Error::MismatchedCloseTag`].

use log::debug;

use crate::tree::{Document, Element, NodeId, NodeValue, ProcessingInstruction};
use crate::xml::Token;
use crate::{Error, Result};

pub struct TreeBuilder {
    doc: Document,
    /// Offene Elemente, unten immer die Wurzel.
    stack: Vec<NodeId>,
    has_root_element: bool,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self {
            doc: Document::new(),
            stack: vec![NodeId::ROOT],
            has_root_element: false,
        }
    }

    fn top(&self) -> NodeId {
        // Der Stack enthaelt immer mindestens die Wurzel.
        self.stack.last().copied().unwrap_or(NodeId::ROOT)
    }

    /// Feeds one token into the tree.
    pub fn push(&mut self, token: Token<'_>) -> Result<()> {
        match token {
            Token::StartTag { name, attributes } => {
                if self.stack.len() == 1 {
                    if self.has_root_element {
                        return Err(Error::MultipleRootElements);
                    }
                    self.has_root_element = true;
                }
                let element = Element::new(name.clone(), attributes.to_vec());
                let id = self.doc.append(self.top(), NodeValue::Element(element))?;
                self.stack.push(id);
            }
            Token::EndTag { name } => {
                if self.stack.len() <= 1 {
                    return Err(Error::UnbalancedTags);
                }
                let top = self.top();
                let NodeValue::Element(open) = self.doc.value(top) else {
                    return Err(Error::UnbalancedTags);
                };
                if open.name != *name {
                    return Err(Error::MismatchedCloseTag {
                        open: open.name.to_string(),
                        close: name.to_string(),
                    });
                }
                self.doc.set_close_name(top, name.clone());
                self.stack.pop();
            }
            Token::Text(text) => {
                self.doc.append(self.top(), NodeValue::Text(text.to_string()))?;
            }
            Token::Comment(text) => {
                self.doc.append(self.top(), NodeValue::Comment(text.to_string()))?;
            }
            Token::ProcessingInstruction { target, instruction } => {
                let pi = ProcessingInstruction {
                    target: target.to_string(),
                    instruction: instruction.to_string(),
                };
                self.doc.append(self.top(), NodeValue::ProcessingInstruction(pi))?;
            }
            Token::Directive(text) => {
                self.doc.append(self.top(), NodeValue::Directive(text.to_string()))?;
            }
        }
        Ok(())
    }

    /// Ends the token stream and returns the finished tree.
    pub fn finish(self) -> Result<Document> {
        if self.stack.len() > 1 {
            return Err(Error::UnclosedTags { open: self.stack.len() - 1 });
        }
        if !self.has_root_element {
            return Err(Error::MissingRootElement);
        }
        debug!("parsed document with {} nodes", self.doc.len());
        Ok(self.doc)
    }
}
