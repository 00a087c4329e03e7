//! RDF/JSON format implementation
//!
//! A document maps each subject (`_:` prefix for blank nodes) to its
//! predicates, and each predicate to an array of objects:
//!
//! ```json
//! { "http://example.org/a": { "http://example.org/p": [
//!     { "type": "literal", "value": "x", "lang": "en" } ] } }
//! ```
//!
//! Subjects and predicates are written in sorted order.

use super::{store_parsed, ModelParser, ModelSerializer, SerializationError, SerializationResult};
use crate::rdf::store::Model;
use crate::rdf::types::{
    BlankNode, LiteralNode, Node, Resource, Statement, Subject, DEFAULT_DATATYPE,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use tracing::debug;

type JsonDocument = BTreeMap<String, BTreeMap<String, Vec<JsonObject>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum JsonTermType {
    Uri,
    Bnode,
    Literal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct JsonObject {
    value: String,
    #[serde(rename = "type")]
    kind: JsonTermType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    lang: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    datatype: Option<String>,
}

impl JsonObject {
    fn from_node(node: &Node) -> Self {
        let (value, kind) = match node {
            Node::Resource(r) => (r.as_str().to_string(), JsonTermType::Uri),
            Node::Blank(b) => (format!("_:{}", b.id()), JsonTermType::Bnode),
            Node::Literal(l) => (l.literal().to_string(), JsonTermType::Literal),
        };
        let literal = node.as_literal();
        Self {
            value,
            kind,
            lang: literal.and_then(|l| l.language()).map(str::to_string),
            datatype: literal
                .filter(|l| l.language().is_none() && l.datatype() != DEFAULT_DATATYPE)
                .map(LiteralNode::datatype_iri),
        }
    }

    fn into_node(self) -> SerializationResult<Node> {
        let node = match self.kind {
            JsonTermType::Uri => Resource::new(&self.value)?.into(),
            JsonTermType::Bnode => blank_node(&self.value)?.into(),
            JsonTermType::Literal => {
                let literal = match self.datatype {
                    Some(iri) => {
                        LiteralNode::typed(self.value, LiteralNode::datatype_from_iri(&iri))
                    }
                    None => LiteralNode::new(self.value),
                };
                match self.lang {
                    Some(lang) if !lang.is_empty() => literal.with_language(lang).into(),
                    _ => literal.into(),
                }
            }
        };
        Ok(node)
    }
}

fn blank_node(value: &str) -> SerializationResult<BlankNode> {
    let id = value.strip_prefix("_:").ok_or_else(|| {
        SerializationError::UnsupportedTerm(format!("blank node without '_:' prefix: {}", value))
    })?;
    Ok(BlankNode::new(id)?)
}

fn subject_from_key(key: &str) -> SerializationResult<Subject> {
    if key.starts_with("_:") {
        Ok(blank_node(key)?.into())
    } else {
        Ok(Resource::new(key)?.into())
    }
}

/// RDF/JSON parser and serializer
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormat;

impl JsonFormat {
    fn document(model: &Model) -> JsonDocument {
        let mut document = JsonDocument::new();
        for statement in model.statements() {
            document
                .entry(statement.subject().key())
                .or_default()
                .entry(statement.predicate().as_str().to_string())
                .or_default()
                .push(JsonObject::from_node(statement.object()));
        }
        document
    }
}

impl ModelParser for JsonFormat {
    fn parse(&self, source: &str, model: &mut Model) -> SerializationResult<usize> {
        let document: JsonDocument = serde_json::from_str(source)?;

        let mut statements = Vec::new();
        for (subject, predicates) in document {
            let subject = subject_from_key(&subject)?;
            for (predicate, objects) in predicates {
                let predicate = Resource::new(&predicate)?;
                for object in objects {
                    statements.push(Statement::from_parts(
                        subject.clone(),
                        predicate.clone(),
                        object.into_node()?,
                    ));
                }
            }
        }

        store_parsed(statements, model)
    }
}

impl ModelSerializer for JsonFormat {
    fn serialize_to<W: Write>(&self, model: &Model, sink: W) -> SerializationResult<()> {
        let document = Self::document(model);
        serde_json::to_writer(sink, &document)?;
        debug!(subjects = document.len(), "Serialized model as RDF/JSON");
        Ok(())
    }
}
