//! N-Triples format implementation

use super::{
    format_model, statement_from_rio, store_parsed, ModelParser, ModelSerializer,
    SerializationError, SerializationResult,
};
use crate::rdf::store::Model;
use rio_api::formatter::TriplesFormatter;
use rio_api::parser::TriplesParser;
use rio_turtle::{NTriplesFormatter, NTriplesParser};
use std::io::{BufReader, Cursor, Write};

/// N-Triples parser and serializer
#[derive(Debug, Clone, Copy, Default)]
pub struct NTriplesFormat;

impl ModelParser for NTriplesFormat {
    fn parse(&self, source: &str, model: &mut Model) -> SerializationResult<usize> {
        let mut reader = BufReader::new(Cursor::new(source));
        let mut parser = NTriplesParser::new(&mut reader);

        let mut statements = Vec::new();
        parser.parse_all(&mut |t| -> Result<(), SerializationError> {
            statements.push(statement_from_rio(t)?);
            Ok(())
        })?;

        store_parsed(statements, model)
    }
}

impl ModelSerializer for NTriplesFormat {
    fn serialize_to<W: Write>(&self, model: &Model, sink: W) -> SerializationResult<()> {
        let mut formatter = NTriplesFormatter::new(sink);
        format_model(&mut formatter, model)?;
        formatter.finish()?;
        Ok(())
    }
}
