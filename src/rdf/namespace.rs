//! RDF namespace and prefix management
//!
//! This module holds the IRI grammar shared by the whole crate and the
//! prefix table used by the model and the query parser.
//!
//! The grammar is deliberately narrow and must stay bit-exact:
//!
//! - namespace: `^http://.+[#/]$`
//! - full IRI: `^http://.+[#/][A-Za-z0-9]+$`
//! - prefix and local name: `^[A-Za-z0-9]+$`

use indexmap::IndexMap;
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

static NAMESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^http://.+[#/]$").expect("valid namespace regex"));

static IRI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^http://.+[#/][A-Za-z0-9]+$").expect("valid iri regex"));

static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]+$").expect("valid token regex"));

static PREFIXED_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<prefix>[A-Za-z0-9]+):(?P<name>[A-Za-z0-9]+)$").expect("valid curie regex")
});

/// Common vocabularies, loaded on request
pub const COMMON_PREFIXES: &[(&str, &str)] = &[
    ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
    ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
    ("xsd", "http://www.w3.org/2001/XMLSchema#"),
    ("owl", "http://www.w3.org/2002/07/owl#"),
    ("foaf", "http://xmlns.com/foaf/0.1/"),
    ("dc", "http://purl.org/dc/elements/1.1/"),
    ("dcterms", "http://purl.org/dc/terms/"),
];

/// XML Schema namespace, used to map literal datatypes at format boundaries
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema#";

/// Check if a string is a namespace (`http://...` ending in `/` or `#`)
pub fn is_namespace(s: &str) -> bool {
    NAMESPACE_RE.is_match(s)
}

/// Check if a string is a full IRI (namespace plus terminal segment)
pub fn is_iri(s: &str) -> bool {
    IRI_RE.is_match(s)
}

/// Check if a string is a valid prefix
pub fn is_prefix(s: &str) -> bool {
    TOKEN_RE.is_match(s)
}

/// Check if a string is a valid local name
pub fn is_name(s: &str) -> bool {
    TOKEN_RE.is_match(s)
}

/// Split a compact `prefix:name` token
pub fn split_prefixed_name(s: &str) -> Option<(&str, &str)> {
    let caps = PREFIXED_NAME_RE.captures(s)?;
    let prefix = caps.name("prefix")?.as_str();
    let name = caps.name("name")?.as_str();
    Some((prefix, name))
}

/// Byte offset where the local name of an IRI starts.
///
/// The namespace ends after the last `#`, `/` or `:`.
pub fn namespace_end(iri: &str) -> usize {
    iri.rfind(['#', '/', ':']).map(|pos| pos + 1).unwrap_or(0)
}

/// Prefix errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PrefixError {
    /// Unknown prefix
    #[error("Unknown prefix: {0}")]
    UnknownPrefix(String),

    /// Prefix does not match the prefix grammar
    #[error("Invalid prefix: {0}")]
    InvalidPrefix(String),

    /// Namespace does not match the namespace grammar
    #[error("Invalid namespace: {0}")]
    InvalidNamespace(String),

    /// Invalid compact IRI
    #[error("Invalid IRI: {0}")]
    InvalidIri(String),
}

pub type PrefixResult<T> = Result<T, PrefixError>;

/// Namespace (prefix → IRI mapping)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    /// Prefix
    pub prefix: String,
    /// IRI
    pub iri: String,
}

impl Namespace {
    /// Create a new namespace
    pub fn new(prefix: impl Into<String>, iri: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            iri: iri.into(),
        }
    }
}

/// Validated prefix table
#[derive(Debug, Clone, Default)]
pub struct NamespaceManager {
    /// Prefix → IRI mappings, in registration order
    prefixes: IndexMap<String, String>,
}

impl NamespaceManager {
    /// Create an empty namespace manager
    pub fn new() -> Self {
        Self {
            prefixes: IndexMap::new(),
        }
    }

    /// Create a namespace manager preloaded with the common RDF prefixes
    pub fn with_common_prefixes() -> Self {
        let mut mgr = Self::new();
        for (prefix, iri) in COMMON_PREFIXES {
            mgr.prefixes.insert(prefix.to_string(), iri.to_string());
        }
        mgr
    }

    /// Add a prefix, replacing any previous mapping for it
    pub fn add_prefix(&mut self, prefix: &str, iri: &str) -> PrefixResult<()> {
        if !is_prefix(prefix) {
            return Err(PrefixError::InvalidPrefix(prefix.to_string()));
        }
        if !is_namespace(iri) {
            return Err(PrefixError::InvalidNamespace(iri.to_string()));
        }
        self.prefixes.insert(prefix.to_string(), iri.to_string());
        Ok(())
    }

    /// Remove a prefix, returns true if it was registered
    pub fn remove_prefix(&mut self, prefix: &str) -> bool {
        self.prefixes.shift_remove(prefix).is_some()
    }

    /// Check if a prefix is registered
    pub fn contains(&self, prefix: &str) -> bool {
        self.prefixes.contains_key(prefix)
    }

    /// Get IRI for a prefix
    pub fn get_iri(&self, prefix: &str) -> PrefixResult<&str> {
        self.prefixes
            .get(prefix)
            .map(|s| s.as_str())
            .ok_or_else(|| PrefixError::UnknownPrefix(prefix.to_string()))
    }

    /// Expand a compact IRI (prefix:local) to full IRI
    pub fn expand(&self, compact_iri: &str) -> PrefixResult<String> {
        match split_prefixed_name(compact_iri) {
            Some((prefix, local)) => {
                let iri = self.get_iri(prefix)?;
                Ok(format!("{}{}", iri, local))
            }
            None => Err(PrefixError::InvalidIri(compact_iri.to_string())),
        }
    }

    /// Compact an IRI using the longest matching namespace
    pub fn compact(&self, iri: &str) -> Option<String> {
        self.prefixes
            .iter()
            .filter(|(_, ns)| iri.starts_with(ns.as_str()) && is_name(&iri[ns.len()..]))
            .max_by_key(|(_, ns)| ns.len())
            .map(|(prefix, ns)| format!("{}:{}", prefix, &iri[ns.len()..]))
    }

    /// Iterate over `(prefix, iri)` pairs in registration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.prefixes.iter().map(|(p, i)| (p.as_str(), i.as_str()))
    }

    /// Get all registered prefixes
    pub fn prefixes(&self) -> Vec<Namespace> {
        self.prefixes
            .iter()
            .map(|(prefix, iri)| Namespace::new(prefix.clone(), iri.clone()))
            .collect()
    }

    /// Number of registered prefixes
    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    /// Check if no prefix is registered
    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NS: &str = "http://example.org/";

    #[test]
    fn test_namespace_grammar() {
        assert!(is_namespace(NS));
        assert!(is_namespace("http://example.org/test#"));
        assert!(!is_namespace("http://example.org/test"));
        assert!(!is_namespace("http://example.org/:name"));
        assert!(!is_namespace("extest"));
        assert!(!is_namespace("+#"));
    }

    #[test]
    fn test_iri_grammar() {
        assert!(is_iri("http://example.org/test"));
        assert!(is_iri("http://example.org/test/test2"));
        assert!(!is_iri("test"));
        assert!(!is_iri("http://example.org/test/"));
        assert!(!is_iri("http://example.org/test#"));
    }

    #[test]
    fn test_prefix_and_name_grammar() {
        assert!(is_prefix("ex"));
        assert!(is_prefix("test2"));
        assert!(!is_prefix("+#"));
        assert!(!is_prefix("http://example.org/test/"));
        assert!(is_name("test"));
        assert!(!is_name("http://example.org/test#"));

        assert_eq!(split_prefixed_name("ex:test"), Some(("ex", "test")));
        assert_eq!(split_prefixed_name("extest"), None);
        assert_eq!(split_prefixed_name("http://example.org/:name"), None);
    }

    #[test]
    fn test_namespace_end() {
        let iri = "http://example.org/test";
        assert_eq!(&iri[..namespace_end(iri)], NS);
        assert_eq!(&iri[namespace_end(iri)..], "test");

        let iri = "http://www.w3.org/2001/XMLSchema#string";
        assert_eq!(&iri[namespace_end(iri)..], "string");
    }

    #[test]
    fn test_common_prefixes() {
        let mgr = NamespaceManager::with_common_prefixes();

        assert_eq!(
            mgr.get_iri("rdf").unwrap(),
            "http://www.w3.org/1999/02/22-rdf-syntax-ns#"
        );
        assert_eq!(mgr.get_iri("xsd").unwrap(), XSD_NAMESPACE);
        assert!(NamespaceManager::new().is_empty());
    }

    #[test]
    fn test_expand_and_compact() {
        let mut mgr = NamespaceManager::new();
        mgr.add_prefix("ex", NS).unwrap();

        assert_eq!(mgr.expand("ex:alice").unwrap(), "http://example.org/alice");
        assert_eq!(
            mgr.expand("foaf:name"),
            Err(PrefixError::UnknownPrefix("foaf".to_string()))
        );
        assert_eq!(mgr.compact("http://example.org/alice"), Some("ex:alice".to_string()));
        assert_eq!(mgr.compact("http://other.org/alice"), None);
    }

    #[test]
    fn test_invalid_registration() {
        let mut mgr = NamespaceManager::new();
        assert!(matches!(
            mgr.add_prefix("+#", NS),
            Err(PrefixError::InvalidPrefix(_))
        ));
        assert!(matches!(
            mgr.add_prefix("ex", "http://example.org/test"),
            Err(PrefixError::InvalidNamespace(_))
        ));
        assert!(mgr.is_empty());
    }

    #[test]
    fn test_remove_prefix() {
        let mut mgr = NamespaceManager::new();
        mgr.add_prefix("ns", NS).unwrap();
        assert!(mgr.contains("ns"));
        assert!(mgr.remove_prefix("ns"));
        assert!(!mgr.contains("ns"));
        assert!(!mgr.remove_prefix("ns"));
    }
}
