//! Central error types for parsing, canonicalization and serialization.
//!
//! Parse-time structural errors abort the whole parse, an unsupported
//! canonicalization method aborts before any transform work, and namespace
//! resolution failures abort serialization before any byte reaches the sink.

use core::fmt;

/// All errors produced by the canonicalization pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The XML tokenizer rejected the input (passed through with its message).
    Tokenization(String),
    /// An end tag arrived with no open element to close.
    UnbalancedTags,
    /// End of input reached while elements were still open.
    UnclosedTags {
        /// Anzahl der noch offenen Elemente.
        open: usize,
    },
    /// An end tag names a different element than the one it closes.
    MismatchedCloseTag {
        /// Expanded name of the open element (`{uri}local`).
        open: String,
        /// Expanded name found in the end tag (`{uri}local`).
        close: String,
    },
    /// The document contains no element at all.
    MissingRootElement,
    /// A second element appeared at document level.
    MultipleRootElements,
    /// The requested canonicalization method is known but not implemented,
    /// or not known at all.
    UnsupportedCanonicalizationKind(String),
    /// An element or attribute references a namespace URI that no ancestor
    /// declares.
    MalformedNamespaceReference {
        /// Die nicht deklarierte Namespace-URI.
        uri: String,
    },
    /// The node arena of a document is full.
    TooManyNodes {
        /// Maximale Knotenzahl eines Dokuments.
        limit: usize,
    },
    /// Writing canonical output failed.
    Io(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tokenization(msg) => write!(f, "XML tokenization error: {msg}"),
            Self::UnbalancedTags => write!(f, "unbalanced element tags: end tag without open element"),
            Self::UnclosedTags { open } => write!(f, "unclosed element tags: {open} element(s) still open at end of input"),
            Self::MismatchedCloseTag { open, close } => {
                write!(f, "mismatched close tag: element '{open}' closed by '{close}'")
            }
            Self::MissingRootElement => write!(f, "document has no root element"),
            Self::MultipleRootElements => write!(f, "document has more than one root element"),
            Self::UnsupportedCanonicalizationKind(method) => {
                write!(f, "unsupported canonicalization kind '{method}'")
            }
            Self::MalformedNamespaceReference { uri } => {
                write!(f, "malformed namespace reference: no declaration in scope for '{uri}'")
            }
            Self::TooManyNodes { limit } => write!(f, "document exceeds {limit} nodes"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Erstellt einen `Tokenization` Fehler aus einer beliebigen Fehlermeldung.
    pub fn tokenization(msg: impl fmt::Display) -> Self {
        Self::Tokenization(msg.to_string())
    }

    /// Erstellt einen `MalformedNamespaceReference` Fehler fuer eine URI.
    pub fn malformed_namespace(uri: impl Into<String>) -> Self {
        Self::MalformedNamespaceReference { uri: uri.into() }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

/// A convenience `Result` type alias using [`Error`].
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenization_display() {
        let e = Error::tokenization("unexpected EOF");
        let msg = e.to_string();
        assert!(msg.contains("tokenization"), "{msg}");
        assert!(msg.contains("unexpected EOF"), "{msg}");
    }

    #[test]
    fn unbalanced_tags_display() {
        let msg = Error::UnbalancedTags.to_string();
        assert!(msg.contains("unbalanced"), "{msg}");
    }

    #[test]
    fn unclosed_tags_display() {
        let msg = Error::UnclosedTags { open: 2 }.to_string();
        assert!(msg.contains("unclosed"), "{msg}");
        assert!(msg.contains('2'), "{msg}");
    }

    #[test]
    fn mismatched_close_tag_display() {
        let e = Error::MismatchedCloseTag {
            open: "{urn:x}a".into(),
            close: "b".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("{urn:x}a"), "{msg}");
        assert!(msg.contains("'b'"), "{msg}");
    }

    #[test]
    fn unsupported_kind_display() {
        let e = Error::UnsupportedCanonicalizationKind("http://www.w3.org/2001/10/xml-exc-c14n#".into());
        let msg = e.to_string();
        assert!(msg.contains("unsupported"), "{msg}");
        assert!(msg.contains("xml-exc-c14n"), "{msg}");
    }

    #[test]
    fn malformed_namespace_display() {
        let msg = Error::malformed_namespace("urn:missing").to_string();
        assert!(msg.contains("urn:missing"), "{msg}");
    }

    #[test]
    fn too_many_nodes_display() {
        let msg = Error::TooManyNodes { limit: 7 }.to_string();
        assert!(msg.contains("exceeds 7 nodes"), "{msg}");
    }

    /// io::Error wird als `Io` mit Meldung uebernommen.
    #[test]
    fn io_error_conversion() {
        let e: Error = std::io::Error::other("disk full").into();
        assert_eq!(e, Error::Io("disk full".into()));
    }

    #[test]
    fn error_implements_std_error() {
        let e: Box<dyn std::error::Error> = Box::new(Error::MissingRootElement);
        assert!(!e.to_string().is_empty());
    }

    #[test]
    fn error_is_clone_and_eq() {
        let e1 = Error::MultipleRootElements;
        let e2 = e1.clone();
        assert_eq!(e1, e2);
    }
}
