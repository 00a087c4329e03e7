//! Turtle format implementation

use super::{
    format_model, statement_from_rio, store_parsed, ModelParser, ModelSerializer,
    SerializationError, SerializationResult,
};
use crate::rdf::store::Model;
use rio_api::formatter::TriplesFormatter;
use rio_api::parser::TriplesParser;
use rio_turtle::{TurtleFormatter, TurtleParser};
use std::io::{BufReader, Cursor, Write};

/// Turtle parser and serializer
#[derive(Debug, Clone, Copy, Default)]
pub struct TurtleFormat;

impl ModelParser for TurtleFormat {
    fn parse(&self, source: &str, model: &mut Model) -> SerializationResult<usize> {
        let mut reader = BufReader::new(Cursor::new(source));
        let mut parser = TurtleParser::new(&mut reader, None);

        let mut statements = Vec::new();
        parser.parse_all(&mut |t| -> Result<(), SerializationError> {
            statements.push(statement_from_rio(t)?);
            Ok(())
        })?;

        store_parsed(statements, model)
    }
}

impl ModelSerializer for TurtleFormat {
    fn serialize_to<W: Write>(&self, model: &Model, sink: W) -> SerializationResult<()> {
        let mut formatter = TurtleFormatter::new(sink);
        format_model(&mut formatter, model)?;
        formatter.finish()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::{Node, Resource, Subject};

    #[test]
    fn test_turtle_prefixes_and_literals() {
        let input = r#"
            @prefix ex: <http://example.org/> .
            ex:alice ex:name "Alice"@en ;
                     ex:knows ex:bob .
        "#;
        let mut model = Model::new();
        assert_eq!(TurtleFormat.parse(input, &mut model).unwrap(), 2);

        let alice = Subject::from(Resource::new("http://example.org/alice").unwrap());
        let found = model.search(Some(&alice), None, None);
        assert_eq!(found.len(), 2);
        assert_eq!(
            found[0].object().as_literal().and_then(|l| l.language()),
            Some("en")
        );
        assert_eq!(
            found[1].object(),
            &Node::from(Resource::new("http://example.org/bob").unwrap())
        );
    }

    #[test]
    fn test_turtle_rejects_iri_outside_grammar() {
        let input = "<https://example.org/a> <http://example.org/b> \"c\" .";
        let mut model = Model::new();
        assert!(TurtleFormat.parse(input, &mut model).is_err());
    }

    #[test]
    fn test_turtle_roundtrip() {
        let input = r#"<http://example.org/a> <http://example.org/b> "c" ."#;
        let mut model = Model::new();
        TurtleFormat.parse(input, &mut model).unwrap();

        let output = TurtleFormat.serialize(&model).unwrap();
        assert!(output.contains("http://example.org/a"));

        let mut reparsed = Model::new();
        TurtleFormat.parse(&output, &mut reparsed).unwrap();
        assert_eq!(reparsed.statements(), model.statements());
    }
}
