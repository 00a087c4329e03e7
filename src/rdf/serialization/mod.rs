//! RDF serialization formats
//!
//! Supports:
//! - N-Triples (NT)
//! - Turtle (TTL)
//! - RDF/JSON
//!
//! Parsers populate a [`Model`], serializers read one. Nothing here opens
//! files; callers hand in text or a writer.
//!
//! Literal datatypes are mapped at this boundary: the default datatype is
//! written as a plain literal, bare names live in the XML Schema namespace
//! and full IRIs are kept as they are.

mod json;
mod ntriples;
mod turtle;

pub use json::JsonFormat;
pub use ntriples::NTriplesFormat;
pub use turtle::TurtleFormat;

use super::store::{Model, ModelError};
use super::types::{
    BlankNode, LiteralNode, Node, RdfError, Resource, Statement, Subject, DEFAULT_DATATYPE,
};
use rio_api::formatter::TriplesFormatter;
use rio_api::model as rio;
use std::io::Write;
use thiserror::Error;
use tracing::debug;

/// RDF serialization format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RdfFormat {
    /// N-Triples format (.nt)
    NTriples,
    /// Turtle format (.ttl)
    Turtle,
    /// RDF/JSON format (.rj, .json)
    Json,
}

impl RdfFormat {
    /// Guess the format from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "nt" => Some(RdfFormat::NTriples),
            "ttl" | "turtle" => Some(RdfFormat::Turtle),
            "rj" | "json" => Some(RdfFormat::Json),
            _ => None,
        }
    }
}

/// Serialization errors
#[derive(Error, Debug)]
pub enum SerializationError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Syntax error in the source document
    #[error("Parse error: {0}")]
    Syntax(#[from] rio_turtle::TurtleError),

    /// Malformed RDF/JSON document
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Term that the model cannot hold
    #[error("Unsupported term: {0}")]
    UnsupportedTerm(String),

    /// Node error
    #[error(transparent)]
    Rdf(#[from] RdfError),

    /// Model error
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Output was not valid UTF-8
    #[error("Invalid UTF-8 output: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub type SerializationResult<T> = Result<T, SerializationError>;

/// Reads a document into a model
pub trait ModelParser {
    /// Parse every statement first, then add them all.
    ///
    /// Returns the number of statements added.
    fn parse(&self, source: &str, model: &mut Model) -> SerializationResult<usize>;
}

/// Writes a model as a document
pub trait ModelSerializer {
    /// Write the model to a sink
    fn serialize_to<W: Write>(&self, model: &Model, sink: W) -> SerializationResult<()>;

    /// Write the model to a string
    fn serialize(&self, model: &Model) -> SerializationResult<String> {
        let mut out = Vec::new();
        self.serialize_to(model, &mut out)?;
        Ok(String::from_utf8(out)?)
    }
}

/// Format dispatch for parsing
pub struct RdfParser;

impl RdfParser {
    /// Parse text in the given format into a model
    pub fn parse(input: &str, format: RdfFormat, model: &mut Model) -> SerializationResult<usize> {
        match format {
            RdfFormat::NTriples => NTriplesFormat.parse(input, model),
            RdfFormat::Turtle => TurtleFormat.parse(input, model),
            RdfFormat::Json => JsonFormat.parse(input, model),
        }
    }
}

/// Format dispatch for serialization
pub struct RdfSerializer;

impl RdfSerializer {
    /// Serialize a model in the given format
    pub fn serialize(model: &Model, format: RdfFormat) -> SerializationResult<String> {
        match format {
            RdfFormat::NTriples => NTriplesFormat.serialize(model),
            RdfFormat::Turtle => TurtleFormat.serialize(model),
            RdfFormat::Json => JsonFormat.serialize(model),
        }
    }
}

/// Add parsed statements to a model in one go
fn store_parsed(statements: Vec<Statement>, model: &mut Model) -> SerializationResult<usize> {
    let mut added = 0;
    for statement in statements {
        if model.add(statement, true)? {
            added += 1;
        }
    }
    debug!(added, "Parsed statements into model");
    Ok(added)
}

/// Write all statements of a model through a rio formatter
fn format_model<F: TriplesFormatter>(formatter: &mut F, model: &Model) -> SerializationResult<()>
where
    F::Error: Into<SerializationError>,
{
    for statement in model.statements() {
        let datatype = statement.object().as_literal().map(LiteralNode::datatype_iri);
        let subject = match statement.subject() {
            Subject::Resource(r) => rio::Subject::NamedNode(rio::NamedNode { iri: r.as_str() }),
            Subject::Blank(b) => rio::Subject::BlankNode(rio::BlankNode { id: b.id() }),
        };
        let object = match statement.object() {
            Node::Resource(r) => rio::Term::NamedNode(rio::NamedNode { iri: r.as_str() }),
            Node::Blank(b) => rio::Term::BlankNode(rio::BlankNode { id: b.id() }),
            Node::Literal(l) => rio::Term::Literal(rio_literal(l, datatype.as_deref())),
        };
        let triple = rio::Triple {
            subject,
            predicate: rio::NamedNode {
                iri: statement.predicate().as_str(),
            },
            object,
        };
        formatter.format(&triple).map_err(Into::into)?;
    }
    debug!(statements = model.len(), "Serialized model");
    Ok(())
}

fn rio_literal<'a>(lit: &'a LiteralNode, datatype_iri: Option<&'a str>) -> rio::Literal<'a> {
    if let Some(language) = lit.language() {
        return rio::Literal::LanguageTaggedString {
            value: lit.literal(),
            language,
        };
    }
    match datatype_iri {
        Some(iri) if lit.datatype() != DEFAULT_DATATYPE => rio::Literal::Typed {
            value: lit.literal(),
            datatype: rio::NamedNode { iri },
        },
        _ => rio::Literal::Simple {
            value: lit.literal(),
        },
    }
}

/// Convert a parsed rio triple into a statement
fn statement_from_rio(triple: rio::Triple<'_>) -> SerializationResult<Statement> {
    let subject: Subject = match triple.subject {
        rio::Subject::NamedNode(n) => Resource::new(n.iri)?.into(),
        rio::Subject::BlankNode(b) => BlankNode::new(b.id)?.into(),
        other => return Err(SerializationError::UnsupportedTerm(other.to_string())),
    };
    let predicate = Resource::new(triple.predicate.iri)?;
    let object: Node = match triple.object {
        rio::Term::NamedNode(n) => Resource::new(n.iri)?.into(),
        rio::Term::BlankNode(b) => BlankNode::new(b.id)?.into(),
        rio::Term::Literal(rio::Literal::Simple { value }) => LiteralNode::new(value).into(),
        rio::Term::Literal(rio::Literal::LanguageTaggedString { value, language }) => {
            LiteralNode::new(value).with_language(language).into()
        }
        rio::Term::Literal(rio::Literal::Typed { value, datatype }) => {
            LiteralNode::typed(value, LiteralNode::datatype_from_iri(datatype.iri)).into()
        }
        other => return Err(SerializationError::UnsupportedTerm(other.to_string())),
    };
    Ok(Statement::from_parts(subject, predicate, object))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(RdfFormat::from_extension("nt"), Some(RdfFormat::NTriples));
        assert_eq!(RdfFormat::from_extension("TTL"), Some(RdfFormat::Turtle));
        assert_eq!(RdfFormat::from_extension("rj"), Some(RdfFormat::Json));
        assert_eq!(RdfFormat::from_extension("rdf"), None);
    }

    #[test]
    fn test_literal_mapping() {
        let plain = LiteralNode::new("a");
        let iri = plain.datatype_iri();
        assert!(matches!(
            rio_literal(&plain, Some(&iri)),
            rio::Literal::Simple { value: "a" }
        ));

        let typed = LiteralNode::typed("1", "integer");
        let iri = typed.datatype_iri();
        match rio_literal(&typed, Some(&iri)) {
            rio::Literal::Typed { datatype, .. } => {
                assert_eq!(datatype.iri, "http://www.w3.org/2001/XMLSchema#integer")
            }
            other => panic!("Expected typed literal, got {}", other),
        }
    }
}
