//! SPARQL query results

use crate::rdf::Node;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::time::Duration;

/// How result cells are presented
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// IRI, `_:id` or literal value
    #[default]
    Stringified,
    /// Node values
    Objects,
}

/// Query options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryOptions {
    pub output: OutputMode,
}

impl QueryOptions {
    pub fn objects() -> Self {
        Self {
            output: OutputMode::Objects,
        }
    }
}

/// Result columns in the selected output mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryTable {
    Strings(IndexMap<String, Vec<String>>),
    Nodes(IndexMap<String, Vec<Node>>),
}

/// Results of a SELECT query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryResults {
    /// Result variables in SELECT order
    pub variables: Vec<String>,
    columns: IndexMap<String, Vec<Node>>,
    /// Query text
    pub query: String,
    /// Time spent parsing and evaluating
    pub elapsed: Duration,
    /// False when there was no triple pattern to evaluate
    pub evaluated: bool,
    pub output: OutputMode,
}

impl QueryResults {
    pub fn new(
        query: impl Into<String>,
        columns: IndexMap<String, Vec<Node>>,
        elapsed: Duration,
        evaluated: bool,
        output: OutputMode,
    ) -> Self {
        Self {
            variables: columns.keys().cloned().collect(),
            columns,
            query: query.into(),
            elapsed,
            evaluated,
            output,
        }
    }

    /// Number of result rows
    pub fn len(&self) -> usize {
        self.columns.values().next().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Node column of a variable
    pub fn column(&self, variable: &str) -> Option<&[Node]> {
        self.columns.get(variable).map(Vec::as_slice)
    }

    /// Stringified column of a variable
    pub fn strings(&self, variable: &str) -> Option<Vec<String>> {
        self.column(variable)
            .map(|col| col.iter().map(Node::to_plain_string).collect())
    }

    /// One row as `(variable, node)` pairs
    pub fn row(&self, index: usize) -> Option<Vec<(&str, &Node)>> {
        if index >= self.len() {
            return None;
        }
        Some(
            self.columns
                .iter()
                .filter_map(|(var, col)| col.get(index).map(|n| (var.as_str(), n)))
                .collect(),
        )
    }

    /// Columns in the configured output mode
    pub fn table(&self) -> QueryTable {
        match self.output {
            OutputMode::Objects => QueryTable::Nodes(self.columns.clone()),
            OutputMode::Stringified => QueryTable::Strings(
                self.columns
                    .iter()
                    .map(|(var, col)| (var.clone(), col.iter().map(Node::to_plain_string).collect()))
                    .collect(),
            ),
        }
    }

    /// SPARQL JSON results layout
    pub fn to_json(&self) -> Value {
        let vars: Vec<&str> = self
            .variables
            .iter()
            .map(|v| v.trim_start_matches('?'))
            .collect();

        let bindings: Vec<Value> = (0..self.len())
            .map(|row| {
                let mut binding = Map::new();
                for (var, col) in &self.columns {
                    if let Some(node) = col.get(row) {
                        binding.insert(var.trim_start_matches('?').to_string(), term_json(node));
                    }
                }
                Value::Object(binding)
            })
            .collect();

        json!({
            "head": { "vars": vars },
            "results": { "bindings": bindings },
        })
    }

    /// SPARQL TSV results layout
    pub fn to_tsv(&self) -> String {
        let mut out = self.variables.join("\t");
        out.push('\n');
        for row in 0..self.len() {
            let cells: Vec<String> = self
                .columns
                .values()
                .map(|col| col.get(row).map(|n| n.to_string()).unwrap_or_default())
                .collect();
            out.push_str(&cells.join("\t"));
            out.push('\n');
        }
        out
    }
}

fn term_json(node: &Node) -> Value {
    match node {
        Node::Resource(r) => json!({ "type": "uri", "value": r.as_str() }),
        Node::Blank(b) => json!({ "type": "bnode", "value": b.id() }),
        Node::Literal(l) => {
            let mut term = json!({ "type": "literal", "value": l.literal() });
            if let Some(lang) = l.language() {
                term["xml:lang"] = json!(lang);
            } else if l.datatype() != crate::rdf::DEFAULT_DATATYPE {
                term["datatype"] = json!(l.datatype_iri());
            }
            term
        }
    }
}
