//! RDF type definitions
//!
//! Nodes are small immutable values. Equality is structural:
//! resources compare by IRI, blank nodes by id and literals by value,
//! datatype and language tag together.

use super::namespace::{is_iri, is_name, is_namespace, namespace_end, XSD_NAMESPACE};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Datatype given to literals created without one
pub const DEFAULT_DATATYPE: &str = "string";

/// RDF errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RdfError {
    /// Invalid IRI
    #[error("Invalid IRI: {0}")]
    InvalidUri(String),

    /// Invalid namespace
    #[error("Invalid namespace: {0}")]
    InvalidNamespace(String),

    /// Invalid local name
    #[error("Invalid name: {0}")]
    InvalidName(String),

    /// Invalid blank node
    #[error("Invalid blank node: {0}")]
    InvalidBlankNode(String),

    /// Invalid literal
    #[error("Invalid literal: {0}")]
    InvalidLiteral(String),

    /// Node cannot be used as a subject
    #[error("Subject has to be a resource or a blank node: {0}")]
    NotASubject(String),

    /// Node cannot be used as a predicate
    #[error("Predicate has to be a resource and can't be a blank node: {0}")]
    NotAPredicate(String),
}

pub type RdfResult<T> = Result<T, RdfError>;

/// Resource identified by an IRI
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Resource {
    uri: String,
}

impl Resource {
    /// Create a resource from a full IRI
    pub fn new(iri: &str) -> RdfResult<Self> {
        if !is_iri(iri) {
            return Err(RdfError::InvalidUri(iri.to_string()));
        }
        Ok(Self {
            uri: iri.to_string(),
        })
    }

    /// Create a resource from a namespace and a local name
    pub fn from_parts(namespace: &str, name: &str) -> RdfResult<Self> {
        if !is_namespace(namespace) {
            return Err(RdfError::InvalidNamespace(namespace.to_string()));
        }
        if !is_name(name) {
            return Err(RdfError::InvalidName(name.to_string()));
        }
        Ok(Self {
            uri: format!("{}{}", namespace, name),
        })
    }

    /// Get the IRI string
    pub fn as_str(&self) -> &str {
        &self.uri
    }

    /// Namespace part of the IRI
    pub fn namespace(&self) -> &str {
        &self.uri[..namespace_end(&self.uri)]
    }

    /// Local name part of the IRI
    pub fn name(&self) -> &str {
        &self.uri[namespace_end(&self.uri)..]
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.uri)
    }
}

impl TryFrom<String> for Resource {
    type Error = RdfError;

    fn try_from(iri: String) -> RdfResult<Self> {
        Self::new(&iri)
    }
}

impl From<Resource> for String {
    fn from(resource: Resource) -> Self {
        resource.uri
    }
}

/// Blank node with a store-local identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BlankNode {
    id: String,
}

impl BlankNode {
    /// Create a blank node from an identifier
    pub fn new(id: &str) -> RdfResult<Self> {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(RdfError::InvalidBlankNode(id.to_string()));
        }
        Ok(Self { id: id.to_string() })
    }

    /// Blank node whose id was minted from a validated prefix
    pub(crate) fn from_minted(id: String) -> Self {
        Self { id }
    }

    /// Get the blank node identifier
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for BlankNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "_:{}", self.id)
    }
}

impl TryFrom<String> for BlankNode {
    type Error = RdfError;

    fn try_from(id: String) -> RdfResult<Self> {
        Self::new(&id)
    }
}

impl From<BlankNode> for String {
    fn from(node: BlankNode) -> Self {
        node.id
    }
}

/// Literal value with datatype and optional language tag
///
/// An absent language tag is different from an empty one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LiteralNode {
    literal: String,
    datatype: String,
    language: Option<String>,
}

impl LiteralNode {
    /// Create a literal with the default datatype
    pub fn new(literal: impl Into<String>) -> Self {
        Self::typed(literal, DEFAULT_DATATYPE)
    }

    /// Create a typed literal
    pub fn typed(literal: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self {
            literal: literal.into(),
            datatype: datatype.into(),
            language: None,
        }
    }

    /// Return a copy carrying a language tag
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Get the lexical value
    pub fn literal(&self) -> &str {
        &self.literal
    }

    /// Get the datatype as stored (local name or full IRI)
    pub fn datatype(&self) -> &str {
        &self.datatype
    }

    /// Get the language tag if present
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Datatype as a full IRI; bare names live in the XML Schema namespace
    pub fn datatype_iri(&self) -> String {
        if is_iri(&self.datatype) {
            self.datatype.clone()
        } else {
            format!("{}{}", XSD_NAMESPACE, self.datatype)
        }
    }

    /// Inverse of [`LiteralNode::datatype_iri`]
    pub fn datatype_from_iri(iri: &str) -> String {
        match iri.strip_prefix(XSD_NAMESPACE) {
            Some(local) if is_name(local) => local.to_string(),
            _ => iri.to_string(),
        }
    }
}

impl fmt::Display for LiteralNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let escaped = self.literal.replace('\\', "\\\\").replace('"', "\\\"");
        if let Some(lang) = &self.language {
            write!(f, "\"{}\"@{}", escaped, lang)
        } else if self.datatype == DEFAULT_DATATYPE {
            write!(f, "\"{}\"", escaped)
        } else {
            write!(f, "\"{}\"^^<{}>", escaped, self.datatype_iri())
        }
    }
}

/// Any RDF node
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Node {
    /// Resource (IRI)
    Resource(Resource),
    /// Blank node
    Blank(BlankNode),
    /// Literal value
    Literal(LiteralNode),
}

impl Node {
    /// Check if this is a resource
    pub fn is_resource(&self) -> bool {
        matches!(self, Node::Resource(_))
    }

    /// Check if this is a blank node
    pub fn is_blank_node(&self) -> bool {
        matches!(self, Node::Blank(_))
    }

    /// Check if this is a literal
    pub fn is_literal(&self) -> bool {
        matches!(self, Node::Literal(_))
    }

    /// Check if this node may appear as a subject
    pub fn is_subject(&self) -> bool {
        !self.is_literal()
    }

    pub fn as_resource(&self) -> Option<&Resource> {
        match self {
            Node::Resource(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_blank_node(&self) -> Option<&BlankNode> {
        match self {
            Node::Blank(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<&LiteralNode> {
        match self {
            Node::Literal(l) => Some(l),
            _ => None,
        }
    }

    /// Plain text form: IRI, `_:id` or the literal value
    pub fn to_plain_string(&self) -> String {
        match self {
            Node::Resource(r) => r.as_str().to_string(),
            Node::Blank(b) => b.to_string(),
            Node::Literal(l) => l.literal().to_string(),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Resource(r) => write!(f, "{}", r),
            Node::Blank(b) => write!(f, "{}", b),
            Node::Literal(l) => write!(f, "{}", l),
        }
    }
}

impl From<Resource> for Node {
    fn from(resource: Resource) -> Self {
        Node::Resource(resource)
    }
}

impl From<BlankNode> for Node {
    fn from(node: BlankNode) -> Self {
        Node::Blank(node)
    }
}

impl From<LiteralNode> for Node {
    fn from(lit: LiteralNode) -> Self {
        Node::Literal(lit)
    }
}

impl From<Subject> for Node {
    fn from(subject: Subject) -> Self {
        match subject {
            Subject::Resource(r) => Node::Resource(r),
            Subject::Blank(b) => Node::Blank(b),
        }
    }
}

/// Statement subject (resource or blank node)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Subject {
    /// Resource (IRI)
    Resource(Resource),
    /// Blank node
    Blank(BlankNode),
}

impl Subject {
    /// Identity key used when indexing by subject: the IRI, or `_:id`
    pub fn key(&self) -> String {
        match self {
            Subject::Resource(r) => r.as_str().to_string(),
            Subject::Blank(b) => b.to_string(),
        }
    }

    /// Check if this is a blank node
    pub fn is_blank_node(&self) -> bool {
        matches!(self, Subject::Blank(_))
    }

    /// Compare against any node
    pub fn matches_node(&self, node: &Node) -> bool {
        match (self, node) {
            (Subject::Resource(a), Node::Resource(b)) => a == b,
            (Subject::Blank(a), Node::Blank(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Resource(r) => write!(f, "{}", r),
            Subject::Blank(b) => write!(f, "{}", b),
        }
    }
}

impl From<Resource> for Subject {
    fn from(resource: Resource) -> Self {
        Subject::Resource(resource)
    }
}

impl From<BlankNode> for Subject {
    fn from(node: BlankNode) -> Self {
        Subject::Blank(node)
    }
}

impl TryFrom<Node> for Subject {
    type Error = RdfError;

    fn try_from(node: Node) -> RdfResult<Self> {
        match node {
            Node::Resource(r) => Ok(Subject::Resource(r)),
            Node::Blank(b) => Ok(Subject::Blank(b)),
            Node::Literal(l) => Err(RdfError::NotASubject(l.to_string())),
        }
    }
}

impl TryFrom<&Node> for Subject {
    type Error = RdfError;

    fn try_from(node: &Node) -> RdfResult<Self> {
        Subject::try_from(node.clone())
    }
}

/// Subject of an identity key, for nodes that may act as subjects
pub fn subject_key(node: &Node) -> Option<String> {
    match node {
        Node::Resource(r) => Some(r.as_str().to_string()),
        Node::Blank(b) => Some(b.to_string()),
        Node::Literal(_) => None,
    }
}

/// RDF statement (subject-predicate-object)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Statement {
    subject: Subject,
    predicate: Resource,
    object: Node,
}

impl Statement {
    /// Create a statement, checking every node against its role
    pub fn new(
        subject: impl Into<Node>,
        predicate: impl Into<Node>,
        object: impl Into<Node>,
    ) -> RdfResult<Self> {
        let subject = Subject::try_from(subject.into())?;
        let predicate = match predicate.into() {
            Node::Resource(r) => r,
            other => return Err(RdfError::NotAPredicate(other.to_string())),
        };
        Ok(Self::from_parts(subject, predicate, object.into()))
    }

    /// Create a statement from already typed parts
    pub fn from_parts(subject: Subject, predicate: Resource, object: Node) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }

    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    pub fn predicate(&self) -> &Resource {
        &self.predicate
    }

    pub fn object(&self) -> &Node {
        &self.object
    }

    /// Convert to an oxrdf triple
    pub fn to_oxrdf(&self) -> RdfResult<oxrdf::Triple> {
        let subject: oxrdf::Subject = match &self.subject {
            Subject::Resource(r) => ox_named_node(r.as_str())?.into(),
            Subject::Blank(b) => ox_blank_node(b.id())?.into(),
        };
        let predicate = ox_named_node(self.predicate.as_str())?;
        let object: oxrdf::Term = match &self.object {
            Node::Resource(r) => ox_named_node(r.as_str())?.into(),
            Node::Blank(b) => ox_blank_node(b.id())?.into(),
            Node::Literal(l) => ox_literal(l)?.into(),
        };
        Ok(oxrdf::Triple::new(subject, predicate, object))
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
    }
}

fn ox_named_node(iri: &str) -> RdfResult<oxrdf::NamedNode> {
    oxrdf::NamedNode::new(iri).map_err(|e| RdfError::InvalidUri(e.to_string()))
}

fn ox_blank_node(id: &str) -> RdfResult<oxrdf::BlankNode> {
    oxrdf::BlankNode::new(id).map_err(|e| RdfError::InvalidBlankNode(e.to_string()))
}

fn ox_literal(lit: &LiteralNode) -> RdfResult<oxrdf::Literal> {
    if let Some(lang) = lit.language() {
        return oxrdf::Literal::new_language_tagged_literal(lit.literal(), lang)
            .map_err(|e| RdfError::InvalidLiteral(e.to_string()));
    }
    if lit.datatype() == DEFAULT_DATATYPE {
        return Ok(oxrdf::Literal::new_simple_literal(lit.literal()));
    }
    let datatype = ox_named_node(&lit.datatype_iri())?;
    Ok(oxrdf::Literal::new_typed_literal(lit.literal(), datatype))
}

#[cfg(test)]
mod tests {
    use super::*;

    const NS: &str = "http://example.org/";

    #[test]
    fn test_resource() {
        let res = Resource::new("http://example.org/R2").unwrap();
        assert_eq!(res.as_str(), "http://example.org/R2");
        assert_eq!(res.namespace(), NS);
        assert_eq!(res.name(), "R2");
        assert_eq!(res.to_string(), "<http://example.org/R2>");

        let res = Resource::from_parts(NS, "R1").unwrap();
        assert_eq!(res.as_str(), "http://example.org/R1");
        assert_eq!(res, Resource::new("http://example.org/R1").unwrap());
    }

    #[test]
    fn test_resource_grammar_boundary() {
        assert!(Resource::new("http://example.org/test").is_ok());
        assert!(matches!(
            Resource::new("http://example.org/test/"),
            Err(RdfError::InvalidUri(_))
        ));
        assert!(matches!(
            Resource::from_parts("http://example.org/test", "x"),
            Err(RdfError::InvalidNamespace(_))
        ));
        assert!(matches!(
            Resource::from_parts(NS, "not a name"),
            Err(RdfError::InvalidName(_))
        ));
    }

    #[test]
    fn test_blank_node() {
        let blank = BlankNode::new("bnode1").unwrap();
        assert_eq!(blank.id(), "bnode1");
        assert_eq!(blank.to_string(), "_:bnode1");
        assert_eq!(blank, BlankNode::new("bnode1").unwrap());
        assert!(BlankNode::new("").is_err());
        assert!(BlankNode::new("has space").is_err());
    }

    #[test]
    fn test_literal() {
        let lit = LiteralNode::new("Test");
        assert_eq!(lit.literal(), "Test");
        assert_eq!(lit.datatype(), "string");
        assert_eq!(lit.language(), None);

        let lit = LiteralNode::typed("Test", "date");
        assert_eq!(lit.datatype(), "date");
        assert_eq!(lit.datatype_iri(), "http://www.w3.org/2001/XMLSchema#date");

        let lit = LiteralNode::new("Test").with_language("de");
        assert_eq!(lit.language(), Some("de"));
    }

    #[test]
    fn test_literal_equality() {
        let de = LiteralNode::new("Test").with_language("de");
        assert_eq!(de, de.clone());
        assert_ne!(de, LiteralNode::new("Test").with_language("en"));
        assert_eq!(de, LiteralNode::new("Test").with_language("de"));
        assert_ne!(LiteralNode::new("Test"), LiteralNode::typed("Test", "boolean"));
    }

    #[test]
    fn test_literal_absent_and_empty_language_differ() {
        let plain = LiteralNode::new("Test");
        let empty_tag = LiteralNode::new("Test").with_language("");
        assert_ne!(plain, empty_tag);
        assert_ne!(LiteralNode::typed("Test", ""), plain);
    }

    #[test]
    fn test_datatype_mapping() {
        assert_eq!(
            LiteralNode::datatype_from_iri("http://www.w3.org/2001/XMLSchema#integer"),
            "integer"
        );
        assert_eq!(
            LiteralNode::datatype_from_iri("http://example.org/custom"),
            "http://example.org/custom"
        );
        let lit = LiteralNode::typed("1", "http://example.org/custom");
        assert_eq!(lit.datatype_iri(), "http://example.org/custom");
    }

    #[test]
    fn test_statement_roles() {
        let subject = Resource::new("http://example.org/test").unwrap();
        let predicate = Resource::new("http://example.org/pred").unwrap();
        let object = LiteralNode::new("literal");

        let statement = Statement::new(subject.clone(), predicate.clone(), object.clone()).unwrap();
        assert_eq!(statement.subject(), &Subject::Resource(subject.clone()));
        assert_eq!(statement.predicate(), &predicate);
        assert_eq!(statement.object(), &Node::Literal(object.clone()));

        assert!(matches!(
            Statement::new(object.clone(), predicate.clone(), object.clone()),
            Err(RdfError::NotASubject(_))
        ));
        assert!(matches!(
            Statement::new(subject.clone(), BlankNode::new("id").unwrap(), object.clone()),
            Err(RdfError::NotAPredicate(_))
        ));
        assert!(matches!(
            Statement::new(subject.clone(), object.clone(), object),
            Err(RdfError::NotAPredicate(_))
        ));

        let blank = BlankNode::new("id").unwrap();
        assert!(Statement::new(blank.clone(), predicate, blank).is_ok());
    }

    #[test]
    fn test_statement_equality() {
        let make = |lit: &str| {
            Statement::new(
                Resource::new("http://example.org/test").unwrap(),
                Resource::new("http://example.org/pred").unwrap(),
                LiteralNode::new(lit),
            )
            .unwrap()
        };
        assert_eq!(make("a"), make("a"));
        assert_ne!(make("a"), make("b"));
    }

    #[test]
    fn test_display() {
        let statement = Statement::new(
            BlankNode::new("b1").unwrap(),
            Resource::new("http://example.org/pred").unwrap(),
            LiteralNode::typed("5", "integer"),
        )
        .unwrap();
        assert_eq!(
            statement.to_string(),
            "_:b1 <http://example.org/pred> \"5\"^^<http://www.w3.org/2001/XMLSchema#integer> ."
        );
        assert_eq!(Node::from(LiteralNode::new("x").with_language("en")).to_string(), "\"x\"@en");
    }

    #[test]
    fn test_to_oxrdf() {
        let statement = Statement::new(
            Resource::new("http://example.org/alice").unwrap(),
            Resource::new("http://xmlns.com/foaf/0.1/name").unwrap(),
            LiteralNode::new("Alice"),
        )
        .unwrap();

        let triple = statement.to_oxrdf().unwrap();
        assert_eq!(triple.predicate.as_str(), "http://xmlns.com/foaf/0.1/name");
        match triple.object {
            oxrdf::Term::Literal(lit) => {
                assert_eq!(lit.value(), "Alice");
                assert_eq!(lit.datatype().as_str(), "http://www.w3.org/2001/XMLSchema#string");
            }
            other => panic!("Expected literal, got {:?}", other),
        }
    }

    #[test]
    fn test_serde_roundtrip_validates() {
        let node = Node::from(Resource::new("http://example.org/test").unwrap());
        let json = serde_json::to_string(&node).unwrap();
        let back: Node = serde_json::from_str(&json).unwrap();
        assert_eq!(back, node);

        let bad = r#"{"type":"resource","value":"not-an-iri"}"#;
        assert!(serde_json::from_str::<Node>(bad).is_err());
    }
}
