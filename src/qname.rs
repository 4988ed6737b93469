//! Qualified names and attributes.
//!
//! A [`QName`] is the expanded name of an element or attribute: namespace
//! URI plus local name, without any prefix. Prefixes only come back during
//! serialization, resolved against the namespace scopes of the tree.
//!
//! Namespace declarations are represented as attributes whose `space` is the
//! reserved [`XMLNS`] marker (`xmlns:p="…"` → `{xmlns}p`) or, for the default
//! namespace declaration `xmlns="…"`, an empty space with local name `xmlns`.

use std::cmp::Ordering;
use std::fmt;

/// Reserved name / prefix of namespace declaration attributes.
pub const XMLNS: &str = "xmlns";

/// The `xml` prefix, implicitly bound to [`XML_NAMESPACE`].
pub const XML_PREFIX: &str = "xml";

/// Namespace URI permanently bound to the `xml` prefix.
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Zeichen, die bei der Attribut-Normalisierung von Namen abgeschnitten werden.
const NAME_TRIM_CHARS: [char; 2] = ['\t', ' '];

/// Expanded name: namespace URI (empty for "no namespace") and local name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct QName {
    pub space: String,
    pub local: String,
}

impl QName {
    pub fn new(space: impl Into<String>, local: impl Into<String>) -> Self {
        Self { space: space.into(), local: local.into() }
    }

    /// Name without namespace.
    pub fn local(local: impl Into<String>) -> Self {
        Self::new(String::new(), local)
    }

    /// Trims spaces and tabs from both name components.
    pub fn trimmed(&self) -> Self {
        Self {
            space: self.space.trim_matches(NAME_TRIM_CHARS).to_string(),
            local: self.local.trim_matches(NAME_TRIM_CHARS).to_string(),
        }
    }
}

/// Clark-Notation `{uri}local`, bzw. nur `local` ohne Namespace.
impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.space.is_empty() {
            f.write_str(&self.local)
        } else {
            write!(f, "{{{}}}{}", self.space, self.local)
        }
    }
}

/// An attribute on an element. `value` is stored in canonical escaped form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: QName,
    pub value: String,
}

impl Attribute {
    pub fn new(name: QName, value: impl Into<String>) -> Self {
        Self { name, value: value.into() }
    }

    /// Namespace declaration: `xmlns` itself or any `xmlns:*` attribute.
    pub fn is_namespace_decl(&self) -> bool {
        self.name.space == XMLNS || (self.name.space.is_empty() && self.name.local == XMLNS)
    }

    /// Prefix declared by this attribute: `None` for the default namespace
    /// declaration, `Some(prefix)` for `xmlns:prefix`. Only meaningful when
    /// [`is_namespace_decl`](Self::is_namespace_decl) holds.
    pub fn declared_prefix(&self) -> Option<&str> {
        if self.name.space.is_empty() { None } else { Some(&self.name.local) }
    }

    /// Copy with whitespace-trimmed name components.
    pub fn normalized(&self) -> Self {
        Self { name: self.name.trimmed(), value: self.value.clone() }
    }
}

/// Canonical attribute order.
///
/// Namespace declarations come before all other attributes. Within each
/// group attributes compare by namespace URI, then local name. For
/// declarations this puts the default declaration (empty space) first and
/// the prefixed ones after it, ordered by prefix.
pub fn compare_attributes(a: &Attribute, b: &Attribute) -> Ordering {
    match (a.is_namespace_decl(), b.is_namespace_decl()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a
            .name
            .space
            .cmp(&b.name.space)
            .then_with(|| a.name.local.cmp(&b.name.local)),
    }
}
