//! SPARQL SELECT support
//!
//! A small hand-written parser turns the query text into a [`ParsedQuery`]:
//! PREFIX declarations, the SELECT variable list and the WHERE basic graph
//! pattern. The executor evaluates that pattern against a [`Model`] and
//! projects the SELECT variables.
//!
//! Not supported: FROM, FILTER, OPTIONAL, UNION, modifiers and the ASK,
//! CONSTRUCT and DESCRIBE forms.
//!
//! # Example
//!
//! ```rust
//! use erp_rdf::rdf::{LiteralNode, Model, Resource, Statement};
//!
//! let mut model = Model::new();
//! let alice = Resource::new("http://example.org/alice").unwrap();
//! let name = Resource::new("http://xmlns.com/foaf/0.1/name").unwrap();
//! let stmt = Statement::new(alice, name, LiteralNode::new("Alice")).unwrap();
//! model.add(stmt, false).unwrap();
//!
//! let query = r#"
//!     PREFIX foaf: <http://xmlns.com/foaf/0.1/>
//!     SELECT ?name WHERE {
//!         ?person foaf:name ?name .
//!     }
//! "#;
//!
//! let results = model.query(query).unwrap();
//! assert_eq!(results.strings("?name").unwrap(), vec!["Alice"]);
//! ```

mod executor;
mod parser;
mod pattern;
mod query;
mod results;

pub use executor::{ResultTable, SparqlExecutor};
pub use parser::{detect_result_form, parse_query, resolve_term, ParseError, ParseResult};
pub use pattern::{build_patterns, Pattern, PatternTriple};
pub use query::{ParsedQuery, QueryTerm, ResultForm, TriplePattern};
pub use results::{OutputMode, QueryOptions, QueryResults, QueryTable};

use crate::rdf::Model;
use std::time::Instant;
use thiserror::Error;
use tracing::info;

/// SPARQL errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SparqlError {
    /// Query text could not be parsed
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Result form other than SELECT
    #[error("Unsupported result form: {0}")]
    UnsupportedForm(ResultForm),
}

pub type SparqlResult<T> = Result<T, SparqlError>;

/// SPARQL query engine over one model
pub struct SparqlEngine<'a> {
    model: &'a Model,
    options: QueryOptions,
}

impl<'a> SparqlEngine<'a> {
    /// Create a new SPARQL engine
    pub fn new(model: &'a Model) -> Self {
        Self {
            model,
            options: QueryOptions::default(),
        }
    }

    pub fn with_options(mut self, options: QueryOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> QueryOptions {
        self.options
    }

    /// Parse and execute a SPARQL query
    pub fn query(&self, query: &str) -> SparqlResult<QueryResults> {
        let start = Instant::now();
        let parsed = parse_query(query)?;
        let mut results = self.execute(&parsed)?;
        results.elapsed = start.elapsed();
        info!(
            rows = results.len(),
            elapsed_us = results.elapsed.as_micros() as u64,
            "Query executed"
        );
        Ok(results)
    }

    /// Execute an already parsed query
    pub fn execute(&self, parsed: &ParsedQuery) -> SparqlResult<QueryResults> {
        if parsed.form != ResultForm::Select {
            return Err(SparqlError::UnsupportedForm(parsed.form));
        }
        let start = Instant::now();
        let evaluated = parsed.triple_count() > 0;
        let columns = SparqlExecutor::new(self.model).execute_select(parsed);
        Ok(QueryResults::new(
            parsed.query.clone(),
            columns,
            start.elapsed(),
            evaluated,
            self.options.output,
        ))
    }
}
