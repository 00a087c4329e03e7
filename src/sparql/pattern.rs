//! Pattern tree construction
//!
//! WHERE triples are grouped by subject token. Each group becomes a
//! pattern; a triple whose object is a variable with its own group gets
//! that group nested as a sub-pattern, which is evaluated before the
//! triple itself. Every group is expanded at most once.

use super::query::{ParsedQuery, TriplePattern};
use std::collections::HashSet;
use tracing::trace;

/// Triple of a pattern, with an optional sub-pattern for its object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternTriple {
    pub triple: TriplePattern,
    pub nested: Option<Pattern>,
}

/// Triples sharing one grouping key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    pub key: String,
    pub triples: Vec<PatternTriple>,
}

impl Pattern {
    /// Number of triples including nested patterns
    pub fn triple_count(&self) -> usize {
        self.triples
            .iter()
            .map(|t| 1 + t.nested.as_ref().map_or(0, Pattern::triple_count))
            .sum()
    }

    /// Nesting depth, a flat pattern has depth 1
    pub fn depth(&self) -> usize {
        1 + self
            .triples
            .iter()
            .filter_map(|t| t.nested.as_ref().map(Pattern::depth))
            .max()
            .unwrap_or(0)
    }
}

#[derive(Debug, Default)]
struct BuildContext {
    processing: HashSet<String>,
    processed: HashSet<String>,
}

/// Build the forest of root patterns for a query
pub fn build_patterns(query: &ParsedQuery) -> Vec<Pattern> {
    let mut ctx = BuildContext::default();
    let mut roots = Vec::new();

    for key in query.where_triples.keys() {
        if ctx.processed.contains(key) {
            continue;
        }
        if let Some(pattern) = expand(key, query, &mut ctx) {
            roots.push(pattern);
        }
    }
    roots
}

fn expand(key: &str, query: &ParsedQuery, ctx: &mut BuildContext) -> Option<Pattern> {
    let group = query.where_triples.get(key)?;
    ctx.processing.insert(key.to_string());

    let mut triples = Vec::with_capacity(group.len());
    for triple in group {
        let nested = match triple.object.as_variable() {
            Some(var) if var != key && query.where_triples.contains_key(var) => {
                if ctx.processing.contains(var) {
                    trace!(variable = var, "Cycle in query pattern");
                    None
                } else if ctx.processed.contains(var) {
                    None
                } else {
                    expand(var, query, ctx)
                }
            }
            _ => None,
        };
        triples.push(PatternTriple {
            triple: triple.clone(),
            nested,
        });
    }

    ctx.processing.remove(key);
    ctx.processed.insert(key.to_string());
    Some(Pattern {
        key: key.to_string(),
        triples,
    })
}
