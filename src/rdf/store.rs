//! In-memory RDF model
//!
//! The model owns the statement list, the namespace table and the blank
//! node counter. Statements are kept in insertion order and duplicates are
//! allowed unless the caller asks otherwise; lookups are linear scans.
//! Every mutation validates its input before touching the statement list.

use super::graph::{collect_reachable, ResourceGraph};
use super::namespace::{NamespaceManager, PrefixError};
use super::resource::Description;
use super::types::{BlankNode, LiteralNode, Node, RdfError, Resource, Statement, Subject};
use crate::sparql::{QueryOptions, QueryResults, SparqlEngine, SparqlResult};
use indexmap::IndexMap;
use thiserror::Error;
use tracing::debug;

/// Model errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// Resource has no properties, nothing to add or remove
    #[error("Resource has no properties: {0}")]
    EmptyResource(String),

    /// Operation needs a base namespace
    #[error("No base namespace configured")]
    NoBaseNamespace,

    /// Node error
    #[error(transparent)]
    Rdf(#[from] RdfError),

    /// Namespace table error
    #[error(transparent)]
    Prefix(#[from] PrefixError),
}

pub type ModelResult<T> = Result<T, ModelError>;

/// Model configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelConfig {
    /// Prefix of minted blank node ids
    pub blank_node_prefix: String,
    /// Offset added to the blank node counter
    pub blank_node_seed: u64,
    /// Datatype of literals created without one
    pub default_datatype: String,
    /// Preload rdf, rdfs, xsd, owl, foaf, dc and dcterms
    pub common_prefixes: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            blank_node_prefix: "bNode".to_string(),
            blank_node_seed: 0,
            default_datatype: super::types::DEFAULT_DATATYPE.to_string(),
            common_prefixes: false,
        }
    }
}

/// Something that can be added to or removed from a model
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// Single statement
    Statement(Statement),
    /// Resource with properties, flattened into statements
    Resource(Description),
}

impl From<Statement> for Entry {
    fn from(statement: Statement) -> Self {
        Entry::Statement(statement)
    }
}

impl From<Description> for Entry {
    fn from(desc: Description) -> Self {
        Entry::Resource(desc)
    }
}

/// Result of [`Model::search_resources`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceMatch {
    /// Exactly one root resource
    One(Description),
    /// Several roots, keyed by subject
    Many(IndexMap<String, Description>),
}

impl ResourceMatch {
    /// Number of root resources
    pub fn len(&self) -> usize {
        match self {
            ResourceMatch::One(_) => 1,
            ResourceMatch::Many(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All roots as a list
    pub fn into_vec(self) -> Vec<Description> {
        match self {
            ResourceMatch::One(desc) => vec![desc],
            ResourceMatch::Many(map) => map.into_values().collect(),
        }
    }
}

/// In-memory RDF statement store
#[derive(Debug, Clone)]
pub struct Model {
    statements: Vec<Statement>,
    namespaces: NamespaceManager,
    base_prefix: Option<String>,
    bnode_counter: u64,
    config: ModelConfig,
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl Model {
    /// Create an empty model with the default configuration
    pub fn new() -> Self {
        Self::build(ModelConfig::default())
    }

    /// Create an empty model with a custom configuration
    pub fn with_config(config: ModelConfig) -> ModelResult<Self> {
        // ids must stay valid blank node ids
        BlankNode::new(&format!("{}1", config.blank_node_prefix))?;
        Ok(Self::build(config))
    }

    fn build(config: ModelConfig) -> Self {
        let namespaces = if config.common_prefixes {
            NamespaceManager::with_common_prefixes()
        } else {
            NamespaceManager::new()
        };
        Self {
            statements: Vec::new(),
            namespaces,
            base_prefix: None,
            bnode_counter: 0,
            config,
        }
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Namespaces
    // ------------------------------------------------------------------

    /// Register a prefix
    pub fn add_namespace(&mut self, prefix: &str, namespace: &str) -> ModelResult<()> {
        self.namespaces.add_prefix(prefix, namespace)?;
        Ok(())
    }

    /// Register a prefix and make it the base namespace
    pub fn add_base_namespace(&mut self, prefix: &str, namespace: &str) -> ModelResult<()> {
        self.namespaces.add_prefix(prefix, namespace)?;
        self.base_prefix = Some(prefix.to_string());
        Ok(())
    }

    pub fn get_namespace(&self, prefix: &str) -> Option<&str> {
        self.namespaces.get_iri(prefix).ok()
    }

    pub fn has_namespace(&self, prefix: &str) -> bool {
        self.namespaces.contains(prefix)
    }

    /// Remove a prefix; removing the base prefix clears the base namespace
    pub fn remove_namespace(&mut self, prefix: &str) -> bool {
        let removed = self.namespaces.remove_prefix(prefix);
        if removed && self.base_prefix.as_deref() == Some(prefix) {
            self.base_prefix = None;
        }
        removed
    }

    pub fn namespaces(&self) -> &NamespaceManager {
        &self.namespaces
    }

    pub fn base_prefix(&self) -> Option<&str> {
        self.base_prefix.as_deref()
    }

    pub fn base_namespace(&self) -> Option<&str> {
        self.base_prefix
            .as_deref()
            .and_then(|prefix| self.get_namespace(prefix))
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Add a statement or a resource with properties.
    ///
    /// A resource is flattened into one statement per property; nested
    /// resources are added before the statement that links to them.
    /// With `allow_duplicates = false` statements already present are
    /// skipped. Returns true if at least one statement was stored.
    pub fn add(&mut self, entry: impl Into<Entry>, allow_duplicates: bool) -> ModelResult<bool> {
        let statements = match entry.into() {
            Entry::Statement(statement) => vec![statement],
            Entry::Resource(desc) => {
                if !desc.has_properties() {
                    return Err(ModelError::EmptyResource(desc.subject().to_string()));
                }
                desc.to_statements()
            }
        };

        let mut added = 0;
        for statement in statements {
            if self.add_statement(statement, allow_duplicates) {
                added += 1;
            }
        }
        debug!(added, total = self.statements.len(), "Added statements");
        Ok(added > 0)
    }

    fn add_statement(&mut self, statement: Statement, allow_duplicates: bool) -> bool {
        if !allow_duplicates && self.contains(&statement) {
            return false;
        }
        self.statements.push(statement);
        true
    }

    /// Remove a statement or a resource with its properties.
    ///
    /// Every stored statement equal to a removed one is purged. For a
    /// resource this recurses into nested resources. Returns true if
    /// anything was removed.
    pub fn remove(&mut self, entry: impl Into<Entry>) -> ModelResult<bool> {
        let targets = match entry.into() {
            Entry::Statement(statement) => vec![statement],
            Entry::Resource(desc) => {
                if !desc.has_properties() {
                    return Err(ModelError::EmptyResource(desc.subject().to_string()));
                }
                desc.to_statements()
            }
        };

        let before = self.statements.len();
        self.statements.retain(|s| !targets.contains(s));
        let removed = before - self.statements.len();
        debug!(removed, total = self.statements.len(), "Removed statements");
        Ok(removed > 0)
    }

    /// Replace `old` with `new`; both are validated before anything changes
    pub fn edit(&mut self, old: impl Into<Entry>, new: impl Into<Entry>) -> ModelResult<bool> {
        let old = old.into();
        let new = new.into();
        for entry in [&old, &new] {
            if let Entry::Resource(desc) = entry {
                if !desc.has_properties() {
                    return Err(ModelError::EmptyResource(desc.subject().to_string()));
                }
            }
        }
        self.remove(old)?;
        self.add(new, true)
    }

    /// Remove every statement
    pub fn clear(&mut self) {
        self.statements.clear();
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    /// Statements matching the given positions; `None` is a wildcard
    pub fn search(
        &self,
        subject: Option<&Subject>,
        predicate: Option<&Resource>,
        object: Option<&Node>,
    ) -> Vec<Statement> {
        self.statements
            .iter()
            .filter(|s| subject.map_or(true, |x| s.subject() == x))
            .filter(|s| predicate.map_or(true, |x| s.predicate() == x))
            .filter(|s| object.map_or(true, |x| s.object() == x))
            .cloned()
            .collect()
    }

    /// Check if an equal statement is stored
    pub fn contains(&self, statement: &Statement) -> bool {
        self.statements.iter().any(|s| s == statement)
    }

    /// Search, then rebuild the matching resources with everything
    /// reachable from their objects
    pub fn search_resources(
        &self,
        subject: Option<&Subject>,
        predicate: Option<&Resource>,
        object: Option<&Node>,
    ) -> Option<ResourceMatch> {
        let seeds = self.search(subject, predicate, object);
        if seeds.is_empty() {
            return None;
        }
        let reachable = collect_reachable(&self.statements, seeds);
        let mut resources = self.statement_list_to_resource_list(&reachable);
        match resources.len() {
            0 => None,
            1 => resources.pop().map(|(_, desc)| ResourceMatch::One(desc)),
            _ => Some(ResourceMatch::Many(resources)),
        }
    }

    /// Rebuild the root resources of a statement list, keyed by subject
    pub fn statement_list_to_resource_list(
        &self,
        statements: &[Statement],
    ) -> IndexMap<String, Description> {
        ResourceGraph::from_statements(statements).into_descriptions()
    }

    /// One statement per property of each resource (one level deep)
    pub fn resource_list_to_statement_list(
        &self,
        resources: &[Description],
    ) -> ModelResult<Vec<Statement>> {
        let mut out = Vec::new();
        for desc in resources {
            if !desc.has_properties() {
                return Err(ModelError::EmptyResource(desc.subject().to_string()));
            }
            out.extend(desc.shallow_statements());
        }
        Ok(out)
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Same as [`Model::len`]
    pub fn size(&self) -> usize {
        self.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    // ------------------------------------------------------------------
    // Factories
    // ------------------------------------------------------------------

    /// Mint a blank node with a fresh id
    pub fn new_blank_node(&mut self) -> BlankNode {
        self.bnode_counter += 1;
        let id = format!(
            "{}{}",
            self.config.blank_node_prefix,
            self.config.blank_node_seed + self.bnode_counter
        );
        BlankNode::from_minted(id)
    }

    /// Resource in the base namespace, or a fresh blank node without a name
    pub fn new_resource(&mut self, name: Option<&str>) -> ModelResult<Subject> {
        let namespace = self
            .base_namespace()
            .ok_or(ModelError::NoBaseNamespace)?
            .to_string();
        match name {
            Some(name) if !name.is_empty() => {
                Ok(Resource::from_parts(&namespace, name)?.into())
            }
            _ => Ok(self.new_blank_node().into()),
        }
    }

    /// Literal with the given datatype or the configured default
    pub fn new_literal_node(
        &self,
        literal: &str,
        datatype: Option<&str>,
    ) -> ModelResult<LiteralNode> {
        if self.base_namespace().is_none() {
            return Err(ModelError::NoBaseNamespace);
        }
        let datatype = datatype.unwrap_or(&self.config.default_datatype);
        Ok(LiteralNode::typed(literal, datatype))
    }

    pub fn new_statement(
        &self,
        subject: impl Into<Node>,
        predicate: impl Into<Node>,
        object: impl Into<Node>,
    ) -> ModelResult<Statement> {
        Ok(Statement::new(subject, predicate, object)?)
    }

    // ------------------------------------------------------------------
    // Queries and printing
    // ------------------------------------------------------------------

    /// Run a SPARQL SELECT query with default options
    pub fn query(&self, query: &str) -> SparqlResult<QueryResults> {
        self.query_with(query, QueryOptions::default())
    }

    pub fn query_with(&self, query: &str, options: QueryOptions) -> SparqlResult<QueryResults> {
        SparqlEngine::new(self).with_options(options).query(query)
    }

    /// One `subject predicate object` line per statement
    pub fn to_text(&self) -> String {
        self.statements
            .iter()
            .map(|s| format!("{} {} {}\n", s.subject(), s.predicate(), s.object()))
            .collect()
    }
}
