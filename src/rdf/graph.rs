//! Statement list to resource graph reconstruction
//!
//! Statements are indexed by subject and every subject is expanded into a
//! [`Description`], nesting objects that are themselves subjects of the
//! index. Expansion is memoized and cycle-safe: each subject key moves
//! from unseen to processing to processed, a visit while processing is a
//! cycle and keeps the plain node, a visit once processed reuses the
//! already built node. A subject that another subject needs as a child is
//! no longer reported as a root.

use super::resource::Description;
use super::types::{subject_key, Node, Resource, Statement, Subject};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use tracing::trace;

/// Visit state of one traversal; lives for a single call only
#[derive(Debug, Default)]
pub(crate) struct TraversalContext {
    processing: HashSet<String>,
    processed: HashSet<String>,
}

impl TraversalContext {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn is_processing(&self, key: &str) -> bool {
        self.processing.contains(key)
    }

    pub(crate) fn is_processed(&self, key: &str) -> bool {
        self.processed.contains(key)
    }

    /// Either guard is set
    pub(crate) fn is_visited(&self, key: &str) -> bool {
        self.is_processing(key) || self.is_processed(key)
    }

    pub(crate) fn start(&mut self, key: &str) {
        self.processing.insert(key.to_string());
    }

    pub(crate) fn finish(&mut self, key: &str) {
        self.processing.remove(key);
        self.processed.insert(key.to_string());
    }
}

#[derive(Debug, Clone)]
enum GraphObject {
    Node(Node),
    Nested(usize),
}

#[derive(Debug, Clone)]
struct GraphNode {
    subject: Subject,
    properties: IndexMap<String, (Resource, GraphObject)>,
}

/// Acyclic resource graph stored in an arena
#[derive(Debug, Clone, Default)]
pub struct ResourceGraph {
    arena: Vec<GraphNode>,
    built: HashMap<String, usize>,
    roots: IndexMap<String, usize>,
}

impl ResourceGraph {
    /// Build the forest of root resources for a statement list
    pub fn from_statements(statements: &[Statement]) -> Self {
        let index = index_by_subject(statements);
        let mut graph = Self::default();
        let mut ctx = TraversalContext::new();

        for key in index.keys() {
            if ctx.is_processed(key) {
                continue;
            }
            if let Some(idx) = graph.expand(key, &index, &mut ctx) {
                graph.roots.insert(key.clone(), idx);
            }
        }

        trace!(
            statements = statements.len(),
            nodes = graph.arena.len(),
            roots = graph.roots.len(),
            "Built resource graph"
        );
        graph
    }

    fn expand(
        &mut self,
        key: &str,
        index: &IndexMap<String, Vec<&Statement>>,
        ctx: &mut TraversalContext,
    ) -> Option<usize> {
        if let Some(&idx) = self.built.get(key) {
            // needed as a child, so not a root any more
            self.roots.shift_remove(key);
            return Some(idx);
        }
        if ctx.is_processing(key) {
            trace!(subject = key, "Cycle in resource graph");
            return None;
        }
        let statements = index.get(key)?;
        let first = statements.first()?;

        ctx.start(key);
        let mut node = GraphNode {
            subject: first.subject().clone(),
            properties: IndexMap::new(),
        };

        for statement in statements {
            let object = statement.object();
            let nested = subject_key(object)
                .filter(|child| index.contains_key(child))
                .and_then(|child| self.expand(&child, index, ctx));
            let value = match nested {
                Some(idx) => GraphObject::Nested(idx),
                None => GraphObject::Node(object.clone()),
            };
            let predicate = statement.predicate();
            node.properties
                .insert(predicate.as_str().to_string(), (predicate.clone(), value));
        }

        let idx = self.arena.len();
        self.arena.push(node);
        self.built.insert(key.to_string(), idx);
        ctx.finish(key);
        Some(idx)
    }

    /// Subject keys of the root resources, in first-seen order
    pub fn root_keys(&self) -> impl Iterator<Item = &str> {
        self.roots.keys().map(|k| k.as_str())
    }

    /// Number of roots
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Materialize one root as a description tree
    pub fn describe(&self, key: &str) -> Option<Description> {
        self.roots.get(key).map(|&idx| self.materialize(idx))
    }

    /// Materialize every root, keyed by subject
    pub fn into_descriptions(self) -> IndexMap<String, Description> {
        self.roots
            .iter()
            .map(|(key, &idx)| (key.clone(), self.materialize(idx)))
            .collect()
    }

    fn materialize(&self, idx: usize) -> Description {
        let node = &self.arena[idx];
        let mut desc = Description::new(node.subject.clone());
        for (predicate, object) in node.properties.values() {
            match object {
                GraphObject::Node(n) => desc.add_property(predicate.clone(), n.clone()),
                GraphObject::Nested(child) => {
                    desc.add_property(predicate.clone(), self.materialize(*child))
                }
            };
        }
        desc
    }
}

/// Group statements by subject key, keeping first-seen order
pub fn index_by_subject(statements: &[Statement]) -> IndexMap<String, Vec<&Statement>> {
    let mut index: IndexMap<String, Vec<&Statement>> = IndexMap::new();
    for statement in statements {
        index
            .entry(statement.subject().key())
            .or_default()
            .push(statement);
    }
    index
}

/// Extend `seeds` with every statement reachable from their objects.
///
/// A seed's subject is marked processed just before its object is
/// followed, so a subject reached through an earlier seed still gets all
/// of its statements. Statements already collected are not repeated.
pub fn collect_reachable(statements: &[Statement], seeds: Vec<Statement>) -> Vec<Statement> {
    let index = index_by_subject(statements);
    let mut ctx = TraversalContext::new();
    let mut seen: HashSet<Statement> = seeds.iter().cloned().collect();
    let mut out = seeds.clone();

    for seed in &seeds {
        ctx.finish(&seed.subject().key());
        if let Some(key) = subject_key(seed.object()) {
            gather(&key, &index, &mut ctx, &mut seen, &mut out);
        }
    }
    trace!(seeds = seeds.len(), reached = out.len(), "Collected reachable statements");
    out
}

fn gather(
    key: &str,
    index: &IndexMap<String, Vec<&Statement>>,
    ctx: &mut TraversalContext,
    seen: &mut HashSet<Statement>,
    out: &mut Vec<Statement>,
) {
    if ctx.is_visited(key) {
        return;
    }
    if let Some(statements) = index.get(key) {
        ctx.start(key);
        for statement in statements {
            if seen.insert((*statement).clone()) {
                out.push((*statement).clone());
            }
        }
        for statement in statements {
            if let Some(child) = subject_key(statement.object()) {
                gather(&child, index, ctx, seen, out);
            }
        }
    }
    ctx.finish(key);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::resource::PropertyValue;
    use crate::rdf::types::LiteralNode;

    fn res(name: &str) -> Resource {
        Resource::from_parts("http://example.org/", name).unwrap()
    }

    fn link(s: &str, o: &str) -> Statement {
        Statement::new(res(s), res("pred"), res(o)).unwrap()
    }

    #[test]
    fn test_tree() {
        let statements = vec![
            link("test1", "test2"),
            Statement::new(res("test2"), res("pred"), LiteralNode::new("literal2")).unwrap(),
        ];
        let graph = ResourceGraph::from_statements(&statements);
        assert_eq!(graph.len(), 1);

        let root = graph.describe("http://example.org/test1").unwrap();
        let child = root.property(&res("pred")).and_then(|v| v.as_description()).unwrap();
        assert_eq!(child.subject(), &Subject::from(res("test2")));
        assert_eq!(
            child.property(&res("pred")).map(|v| v.node()),
            Some(Node::from(LiteralNode::new("literal2")))
        );
    }

    #[test]
    fn test_cycle_terminates() {
        let statements = vec![link("test1", "test2"), link("test2", "test1")];
        let graph = ResourceGraph::from_statements(&statements);
        assert_eq!(graph.len(), 1);

        let root = graph.describe("http://example.org/test1").unwrap();
        let child = root.property(&res("pred")).and_then(|v| v.as_description()).unwrap();
        assert_eq!(
            child.property(&res("pred")),
            Some(&PropertyValue::Node(res("test1").into()))
        );
    }

    #[test]
    fn test_later_parent_absorbs_root() {
        // child listed before its parent
        let statements = vec![
            Statement::new(res("test2"), res("pred"), LiteralNode::new("x")).unwrap(),
            link("test1", "test2"),
        ];
        let graph = ResourceGraph::from_statements(&statements);
        let keys: Vec<&str> = graph.root_keys().collect();
        assert_eq!(keys, vec!["http://example.org/test1"]);
    }

    #[test]
    fn test_forest() {
        let statements = vec![
            link("test1", "test2"),
            link("test2", "test3"),
            link("test4", "test3"),
        ];
        let descriptions = ResourceGraph::from_statements(&statements).into_descriptions();
        assert_eq!(descriptions.len(), 2);
        assert!(descriptions.values().all(|d| d.has_properties()));
    }

    #[test]
    fn test_collect_reachable() {
        let statements = vec![
            link("test1", "test2"),
            link("test2", "test3"),
            link("test3", "test1"),
            link("test9", "test1"),
        ];
        let seeds = vec![statements[0].clone()];
        let reached = collect_reachable(&statements, seeds);
        assert_eq!(reached.len(), 3);
        assert!(!reached.contains(&statements[3]));
    }

    #[test]
    fn test_collect_reachable_through_later_seed() {
        // test2 is both a seed subject and the object of the first seed
        let statements = vec![
            link("test1", "test2"),
            link("test2", "test3"),
            Statement::new(res("test2"), res("pred2"), LiteralNode::new("x")).unwrap(),
        ];
        let seeds = vec![statements[0].clone(), statements[1].clone()];
        let reached = collect_reachable(&statements, seeds);
        assert_eq!(reached, statements);
    }
}
