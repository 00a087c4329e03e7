//! SPARQL query executor
//!
//! Evaluates a basic graph pattern against a [`Model`] by growing a
//! columnar binding table one triple at a time.
//!
//! A triple that uses no bound variable is looked up once and its matches
//! are combined with every existing row. A triple that uses a bound
//! variable is looked up once per row with that row's values substituted:
//! no match drops the row, one match fills the new variables in place and
//! several matches replace the row with one copy per match.

use super::pattern::{build_patterns, Pattern};
use super::query::{ParsedQuery, QueryTerm, TriplePattern};
use crate::rdf::{Model, Node, Statement, Subject};
use indexmap::IndexMap;
use tracing::{debug, trace};

/// Columnar binding table; every column has `rows` entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultTable {
    columns: IndexMap<String, Vec<Option<Node>>>,
    rows: usize,
}

impl ResultTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn has_column(&self, variable: &str) -> bool {
        self.columns.contains_key(variable)
    }

    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(|k| k.as_str())
    }

    /// Bound value of a variable in a row
    pub fn get(&self, variable: &str, row: usize) -> Option<&Node> {
        self.columns.get(variable)?.get(row)?.as_ref()
    }

    /// Add an empty column for every row
    fn add_column(&mut self, variable: &str) {
        let rows = self.rows;
        self.columns
            .entry(variable.to_string())
            .or_insert_with(|| vec![None; rows]);
    }

    fn set(&mut self, variable: &str, row: usize, value: Node) {
        if let Some(cell) = self.columns.get_mut(variable).and_then(|c| c.get_mut(row)) {
            *cell = Some(value);
        }
    }

    /// Snapshot of one row
    fn row(&self, row: usize) -> IndexMap<String, Option<Node>> {
        self.columns
            .iter()
            .map(|(var, col)| (var.clone(), col.get(row).cloned().flatten()))
            .collect()
    }

    /// Append a row; columns missing from `values` stay unbound
    fn push_row(&mut self, values: &IndexMap<String, Option<Node>>) {
        for (var, col) in self.columns.iter_mut() {
            col.push(values.get(var).cloned().flatten());
        }
        self.rows += 1;
    }

    /// Remove rows in lock-step across all columns
    fn remove_rows(&mut self, marked: &[bool]) {
        if !marked.iter().any(|m| *m) {
            return;
        }
        for col in self.columns.values_mut() {
            let mut idx = 0;
            col.retain(|_| {
                let keep = !marked.get(idx).copied().unwrap_or(false);
                idx += 1;
                keep
            });
        }
        let removed = marked.iter().take(self.rows).filter(|m| **m).count();
        self.rows -= removed;
    }

    /// Drop every row, keep the columns
    fn clear_rows(&mut self) {
        for col in self.columns.values_mut() {
            col.clear();
        }
        self.rows = 0;
    }

    /// Keep only the given variables, in the given order.
    ///
    /// Variables without a column (never used by a triple) are dropped.
    pub fn project(&self, variables: &[String]) -> IndexMap<String, Vec<Node>> {
        variables
            .iter()
            .filter_map(|var| {
                // bound columns hold a value in every surviving row
                let col = self.columns.get(var)?;
                Some((var.clone(), col.iter().flatten().cloned().collect()))
            })
            .collect()
    }
}

/// Outcome of evaluating a triple or pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    /// No solution can exist any more
    Empty,
}

/// Constraint for one position of a store lookup
enum Slot<T> {
    Any,
    Fixed(T),
    /// The value can never occupy this position
    Impossible,
}

impl<T> Slot<T> {
    fn as_option(&self) -> Option<&T> {
        match self {
            Slot::Fixed(v) => Some(v),
            _ => None,
        }
    }

    fn is_impossible(&self) -> bool {
        matches!(self, Slot::Impossible)
    }
}

/// Basic graph pattern evaluator over one model
pub struct SparqlExecutor<'a> {
    model: &'a Model,
}

impl<'a> SparqlExecutor<'a> {
    /// Create a new executor
    pub fn new(model: &'a Model) -> Self {
        Self { model }
    }

    /// Evaluate the WHERE clause and project the SELECT variables
    pub fn execute_select(&self, query: &ParsedQuery) -> IndexMap<String, Vec<Node>> {
        let table = self.evaluate(query);
        table.project(&query.variables)
    }

    /// Evaluate the WHERE clause into a binding table
    pub fn evaluate(&self, query: &ParsedQuery) -> ResultTable {
        let mut table = ResultTable::new();
        let patterns = build_patterns(query);
        debug!(roots = patterns.len(), "Built query patterns");

        for pattern in &patterns {
            if self.apply_pattern(pattern, &mut table) == Flow::Empty {
                // conjunctive query: one empty branch empties everything
                table.clear_rows();
                break;
            }
        }
        table
    }

    fn apply_pattern(&self, pattern: &Pattern, table: &mut ResultTable) -> Flow {
        for entry in &pattern.triples {
            if let Some(nested) = &entry.nested {
                if self.apply_pattern(nested, table) == Flow::Empty {
                    return Flow::Empty;
                }
            }
            if self.apply_triple(&entry.triple, table) == Flow::Empty {
                return Flow::Empty;
            }
        }
        Flow::Continue
    }

    fn apply_triple(&self, triple: &TriplePattern, table: &mut ResultTable) -> Flow {
        let bound = triple.variables().any(|v| table.has_column(v));
        let flow = if bound {
            self.join_rows(triple, table)
        } else {
            self.scan(triple, table)
        };
        trace!(triple = %triple, rows = table.row_count(), "Applied triple pattern");
        flow
    }

    /// Triple without bound variables: one lookup, combined with every row
    fn scan(&self, triple: &TriplePattern, table: &mut ResultTable) -> Flow {
        let fresh = table.variables().next().is_none();
        let matches = self.lookup(triple, &IndexMap::new());
        for var in new_variables(triple, table) {
            table.add_column(&var);
        }
        if matches.is_empty() {
            return Flow::Empty;
        }
        if triple.variables().next().is_none() {
            // constant triple, only its presence matters
            return Flow::Continue;
        }

        let base: Vec<IndexMap<String, Option<Node>>> = if fresh {
            vec![IndexMap::new()]
        } else {
            (0..table.row_count()).map(|row| table.row(row)).collect()
        };

        table.clear_rows();
        for current in &base {
            for bindings in &matches {
                table.push_row(&extend_row(current, bindings));
            }
        }

        if table.row_count() == 0 {
            Flow::Empty
        } else {
            Flow::Continue
        }
    }

    /// Triple with bound variables: one lookup per row
    fn join_rows(&self, triple: &TriplePattern, table: &mut ResultTable) -> Flow {
        let new_vars = new_variables(triple, table);
        for var in &new_vars {
            table.add_column(var);
        }

        let rows = table.row_count();
        let mut marked = vec![false; rows];

        for (row, mark) in marked.iter_mut().enumerate() {
            let current = table.row(row);
            let matches = self.lookup(triple, &current);
            match matches.len() {
                0 => *mark = true,
                1 => {
                    for (var, node) in &matches[0] {
                        if new_vars.contains(var) {
                            table.set(var, row, node.clone());
                        }
                    }
                }
                _ => {
                    *mark = true;
                    for bindings in &matches {
                        table.push_row(&extend_row(&current, bindings));
                    }
                }
            }
        }

        table.remove_rows(&marked);
        if table.row_count() == 0 {
            Flow::Empty
        } else {
            Flow::Continue
        }
    }

    /// Statements matching a triple under the given row bindings,
    /// returned as variable bindings
    fn lookup(
        &self,
        triple: &TriplePattern,
        row: &IndexMap<String, Option<Node>>,
    ) -> Vec<IndexMap<String, Node>> {
        let resolve = |term: &QueryTerm| -> Option<Node> {
            match term {
                QueryTerm::Node(n) => Some(n.clone()),
                QueryTerm::Variable(v) => row.get(v).cloned().flatten(),
            }
        };

        let subject = match resolve(&triple.subject) {
            None => Slot::Any,
            Some(node) => Subject::try_from(node).map_or(Slot::Impossible, Slot::Fixed),
        };
        let predicate = match resolve(&triple.predicate) {
            None => Slot::Any,
            Some(Node::Resource(r)) => Slot::Fixed(r),
            Some(_) => Slot::Impossible,
        };
        let object = match resolve(&triple.object) {
            None => Slot::Any,
            Some(node) => Slot::Fixed(node),
        };
        if subject.is_impossible() || predicate.is_impossible() || object.is_impossible() {
            return Vec::new();
        }

        self.model
            .search(subject.as_option(), predicate.as_option(), object.as_option())
            .iter()
            .filter_map(|statement| bind(triple, statement))
            .collect()
    }
}

/// Variable bindings a statement gives a triple; `None` when a repeated
/// variable would need two different values
fn bind(triple: &TriplePattern, statement: &Statement) -> Option<IndexMap<String, Node>> {
    let positions: [(&QueryTerm, Node); 3] = [
        (&triple.subject, Node::from(statement.subject().clone())),
        (&triple.predicate, Node::from(statement.predicate().clone())),
        (&triple.object, statement.object().clone()),
    ];

    let mut bindings = IndexMap::new();
    for (term, value) in positions {
        if let QueryTerm::Variable(var) = term {
            match bindings.get(var) {
                Some(existing) if existing != &value => return None,
                Some(_) => {}
                None => {
                    bindings.insert(var.clone(), value);
                }
            }
        }
    }
    Some(bindings)
}

fn new_variables(triple: &TriplePattern, table: &ResultTable) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for var in triple.variables() {
        if !table.has_column(var) && !out.iter().any(|v| v == var) {
            out.push(var.to_string());
        }
    }
    out
}

fn extend_row(
    row: &IndexMap<String, Option<Node>>,
    bindings: &IndexMap<String, Node>,
) -> IndexMap<String, Option<Node>> {
    let mut values = row.clone();
    for (var, node) in bindings {
        values.insert(var.clone(), Some(node.clone()));
    }
    values
}
