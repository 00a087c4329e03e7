//! ERP RDF store
//!
//! An in-memory RDF statement store with resource graph reconstruction and a
//! basic SPARQL SELECT evaluator.
//!
//! # Modules
//!
//! - [`rdf`]: nodes, statements, namespaces, the [`Model`] store, resource
//!   descriptions and N-Triples/Turtle I/O
//! - [`sparql`]: SELECT query parsing and basic graph pattern evaluation
//!
//! ## Example Usage
//!
//! ```rust
//! use erp_rdf::{Description, Model, Resource};
//!
//! let mut model = Model::new();
//! model.add_base_namespace("ex", "http://example.org/").unwrap();
//!
//! let order = model.new_resource(Some("order1")).unwrap();
//! let customer = model.new_resource(Some("customer1")).unwrap();
//! let placed_by = Resource::new("http://example.org/placedBy").unwrap();
//! let name = Resource::new("http://example.org/name").unwrap();
//!
//! let customer_desc = Description::new(customer)
//!     .with_property(name, model.new_literal_node("ACME", None).unwrap());
//! let order_desc = Description::new(order).with_property(placed_by, customer_desc);
//! model.add(order_desc, false).unwrap();
//! assert_eq!(model.len(), 2);
//!
//! let results = model
//!     .query("PREFIX ex: <http://example.org/> SELECT ?o ?n WHERE { ?o ex:placedBy ?c . ?c ex:name ?n }")
//!     .unwrap();
//! assert_eq!(results.strings("?n").unwrap(), vec!["ACME"]);
//! ```

pub mod rdf;
pub mod sparql;

// Re-export main types for convenience
pub use rdf::{
    BlankNode, Description, LiteralNode, Model, ModelConfig, ModelError, Node, PropertyValue,
    RdfError, Resource, ResourceMatch, Statement, Subject,
};
pub use sparql::{OutputMode, QueryOptions, QueryResults, SparqlEngine, SparqlError};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
