//! Property-decorated resources
//!
//! A [`Description`] is the tree view of a subject: its outgoing
//! properties, where an object may itself be a described resource.
//! It is what callers build to add a group of statements at once and what
//! the model returns when it rebuilds a resource graph from statements.

use super::types::{BlankNode, LiteralNode, Node, Resource, Statement, Subject};
use indexmap::IndexMap;
use std::fmt;

/// Object of a property: a plain node or a nested description
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    /// Plain node
    Node(Node),
    /// Resource with its own properties
    Resource(Box<Description>),
}

impl PropertyValue {
    /// The node in object position, ignoring any nested properties
    pub fn node(&self) -> Node {
        match self {
            PropertyValue::Node(node) => node.clone(),
            PropertyValue::Resource(desc) => Node::from(desc.subject().clone()),
        }
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            PropertyValue::Node(node) => Some(node),
            PropertyValue::Resource(_) => None,
        }
    }

    pub fn as_description(&self) -> Option<&Description> {
        match self {
            PropertyValue::Node(_) => None,
            PropertyValue::Resource(desc) => Some(desc),
        }
    }
}

impl From<Node> for PropertyValue {
    fn from(node: Node) -> Self {
        PropertyValue::Node(node)
    }
}

impl From<Resource> for PropertyValue {
    fn from(resource: Resource) -> Self {
        PropertyValue::Node(resource.into())
    }
}

impl From<BlankNode> for PropertyValue {
    fn from(node: BlankNode) -> Self {
        PropertyValue::Node(node.into())
    }
}

impl From<LiteralNode> for PropertyValue {
    fn from(lit: LiteralNode) -> Self {
        PropertyValue::Node(lit.into())
    }
}

impl From<Subject> for PropertyValue {
    fn from(subject: Subject) -> Self {
        PropertyValue::Node(subject.into())
    }
}

impl From<Description> for PropertyValue {
    fn from(desc: Description) -> Self {
        PropertyValue::Resource(Box::new(desc))
    }
}

/// Subject with its outgoing properties, keyed by predicate IRI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Description {
    subject: Subject,
    properties: IndexMap<String, (Resource, PropertyValue)>,
}

impl Description {
    /// Create a description without properties
    pub fn new(subject: impl Into<Subject>) -> Self {
        Self {
            subject: subject.into(),
            properties: IndexMap::new(),
        }
    }

    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    /// Set a property; an existing value for the same predicate is replaced
    pub fn add_property(
        &mut self,
        predicate: Resource,
        object: impl Into<PropertyValue>,
    ) -> &mut Self {
        self.properties
            .insert(predicate.as_str().to_string(), (predicate, object.into()));
        self
    }

    /// Builder form of [`Description::add_property`]
    pub fn with_property(mut self, predicate: Resource, object: impl Into<PropertyValue>) -> Self {
        self.add_property(predicate, object);
        self
    }

    pub fn has_property(&self, predicate: &Resource) -> bool {
        self.properties.contains_key(predicate.as_str())
    }

    pub fn property(&self, predicate: &Resource) -> Option<&PropertyValue> {
        self.properties.get(predicate.as_str()).map(|(_, value)| value)
    }

    /// Remove a property, returns the removed value
    pub fn remove_property(&mut self, predicate: &Resource) -> Option<PropertyValue> {
        self.properties
            .shift_remove(predicate.as_str())
            .map(|(_, value)| value)
    }

    /// Iterate over `(predicate, value)` pairs in insertion order
    pub fn properties(&self) -> impl Iterator<Item = (&Resource, &PropertyValue)> {
        self.properties.values().map(|(p, v)| (p, v))
    }

    pub fn has_properties(&self) -> bool {
        !self.properties.is_empty()
    }

    pub fn clear_properties(&mut self) {
        self.properties.clear();
    }

    /// One statement per property, nested descriptions referenced by subject only
    pub fn shallow_statements(&self) -> Vec<Statement> {
        self.properties()
            .map(|(predicate, value)| {
                Statement::from_parts(self.subject.clone(), predicate.clone(), value.node())
            })
            .collect()
    }

    /// Flatten the whole tree into statements.
    ///
    /// Statements of a nested description come before the statement that
    /// links to it.
    pub fn to_statements(&self) -> Vec<Statement> {
        let mut out = Vec::new();
        self.flatten_into(&mut out);
        out
    }

    fn flatten_into(&self, out: &mut Vec<Statement>) {
        for (predicate, value) in self.properties() {
            if let PropertyValue::Resource(nested) = value {
                nested.flatten_into(out);
            }
            out.push(Statement::from_parts(
                self.subject.clone(),
                predicate.clone(),
                value.node(),
            ));
        }
    }
}

impl fmt::Display for Description {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for statement in self.to_statements() {
            writeln!(f, "{}", statement)?;
        }
        Ok(())
    }
}
