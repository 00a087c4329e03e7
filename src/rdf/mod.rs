//! RDF data model
//!
//! This module implements the in-memory statement store:
//! - Nodes (resources, blank nodes, literals) and statements
//! - Namespace and prefix table with the IRI grammar
//! - Property-decorated resources and cycle-safe graph reconstruction
//! - N-Triples and Turtle at the format boundary
//!
//! # Example
//!
//! ```rust
//! use erp_rdf::rdf::{Description, LiteralNode, Model, Resource};
//!
//! let mut model = Model::new();
//! model.add_base_namespace("ex", "http://example.org/").unwrap();
//!
//! let alice = model.new_resource(Some("alice")).unwrap();
//! let name = Resource::new("http://xmlns.com/foaf/0.1/name").unwrap();
//!
//! let desc = Description::new(alice.clone()).with_property(name, LiteralNode::new("Alice"));
//! model.add(desc, true).unwrap();
//!
//! let results = model.search(Some(&alice), None, None);
//! assert_eq!(results.len(), 1);
//! ```

mod graph;
mod namespace;
mod resource;
mod serialization;
mod store;
mod types;

pub use types::{
    subject_key, BlankNode, LiteralNode, Node, RdfError, RdfResult, Resource, Statement, Subject,
    DEFAULT_DATATYPE,
};

pub use namespace::{
    is_iri, is_name, is_namespace, is_prefix, namespace_end, split_prefixed_name, Namespace,
    NamespaceManager, PrefixError, PrefixResult, COMMON_PREFIXES, XSD_NAMESPACE,
};

pub use resource::{Description, PropertyValue};

pub use graph::{collect_reachable, index_by_subject, ResourceGraph};

pub use store::{Entry, Model, ModelConfig, ModelError, ModelResult, ResourceMatch};

pub use serialization::{
    JsonFormat, ModelParser, ModelSerializer, NTriplesFormat, RdfFormat, RdfParser, RdfSerializer,
    SerializationError, SerializationResult, TurtleFormat,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rdf_module_exports() {
        let _model: Model = Model::new();
        let _ns_mgr = NamespaceManager::new();
        let _graph = ResourceGraph::default();
    }
}
