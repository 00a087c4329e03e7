//! Parsed query representation

use crate::rdf::Node;
use indexmap::IndexMap;
use std::fmt;

/// Query result form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultForm {
    Select,
    Ask,
    Construct,
    Describe,
}

impl ResultForm {
    /// Keywords in detection order
    pub const KEYWORDS: [(&'static str, ResultForm); 4] = [
        ("SELECT", ResultForm::Select),
        ("ASK", ResultForm::Ask),
        ("CONSTRUCT", ResultForm::Construct),
        ("DESCRIBE", ResultForm::Describe),
    ];

    pub fn keyword(&self) -> &'static str {
        match self {
            ResultForm::Select => "SELECT",
            ResultForm::Ask => "ASK",
            ResultForm::Construct => "CONSTRUCT",
            ResultForm::Describe => "DESCRIBE",
        }
    }
}

impl fmt::Display for ResultForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// One position of a triple pattern
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryTerm {
    /// Variable, stored with its leading `?`
    Variable(String),
    /// Constant node
    Node(Node),
}

impl QueryTerm {
    pub fn as_variable(&self) -> Option<&str> {
        match self {
            QueryTerm::Variable(v) => Some(v),
            QueryTerm::Node(_) => None,
        }
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            QueryTerm::Variable(_) => None,
            QueryTerm::Node(n) => Some(n),
        }
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, QueryTerm::Variable(_))
    }
}

impl fmt::Display for QueryTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryTerm::Variable(v) => f.write_str(v),
            QueryTerm::Node(n) => write!(f, "{}", n),
        }
    }
}

impl From<Node> for QueryTerm {
    fn from(node: Node) -> Self {
        QueryTerm::Node(node)
    }
}

/// Triple pattern of the WHERE clause
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TriplePattern {
    pub subject: QueryTerm,
    pub predicate: QueryTerm,
    pub object: QueryTerm,
}

impl TriplePattern {
    pub fn new(subject: QueryTerm, predicate: QueryTerm, object: QueryTerm) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }

    /// Variables in subject, predicate, object order (repeats included)
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        [&self.subject, &self.predicate, &self.object]
            .into_iter()
            .filter_map(QueryTerm::as_variable)
    }
}

impl fmt::Display for TriplePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.subject, self.predicate, self.object)
    }
}

/// Query after parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuery {
    /// Original query text
    pub query: String,
    pub form: ResultForm,
    /// Prefixes declared with PREFIX
    pub namespaces: IndexMap<String, String>,
    /// SELECT variables, first occurrence order, no repeats
    pub variables: Vec<String>,
    /// WHERE triples grouped by their subject token
    pub where_triples: IndexMap<String, Vec<TriplePattern>>,
    /// Whether the query had a WHERE clause
    pub has_where: bool,
}

impl ParsedQuery {
    /// Empty query of the given form
    pub fn new(query: impl Into<String>, form: ResultForm) -> Self {
        Self {
            query: query.into(),
            form,
            namespaces: IndexMap::new(),
            variables: Vec::new(),
            where_triples: IndexMap::new(),
            has_where: false,
        }
    }

    /// Register a SELECT variable once
    pub fn add_variable(&mut self, variable: &str) {
        if !self.variables.iter().any(|v| v == variable) {
            self.variables.push(variable.to_string());
        }
    }

    /// Add a WHERE triple under its grouping key
    pub fn add_triple(&mut self, key: &str, triple: TriplePattern) {
        self.where_triples
            .entry(key.to_string())
            .or_default()
            .push(triple);
    }

    /// All WHERE triples in group order
    pub fn triples(&self) -> impl Iterator<Item = &TriplePattern> {
        self.where_triples.values().flatten()
    }

    pub fn triple_count(&self) -> usize {
        self.where_triples.values().map(Vec::len).sum()
    }

    /// Check if a variable occurs in any WHERE triple
    pub fn mentions(&self, variable: &str) -> bool {
        self.triples().any(|t| t.variables().any(|v| v == variable))
    }
}
