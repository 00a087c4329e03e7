use anyhow::Result;
use erp_rdf::rdf::{RdfFormat, RdfSerializer};
use erp_rdf::{Description, Model, QueryOptions, Resource, ResourceMatch};

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    println!("ERP RDF Store v{}", erp_rdf::version());
    println!("==========================================");
    println!();

    let model = demo_model()?;
    demo_resources(&model)?;
    demo_queries(&model)?;
    demo_serialization(&model)?;

    Ok(())
}

fn demo_model() -> Result<Model> {
    println!("=== Demo 1: Model ===");
    let mut model = Model::new();
    model.add_base_namespace("ex", "http://example.org/")?;
    model.add_namespace("foaf", "http://xmlns.com/foaf/0.1/")?;

    let name = Resource::new("http://xmlns.com/foaf/0.1/name")?;
    let works_for = Resource::new("http://example.org/worksFor")?;
    let located_in = Resource::new("http://example.org/locatedIn")?;

    let city = Description::new(model.new_resource(Some("berlin"))?)
        .with_property(name.clone(), model.new_literal_node("Berlin", None)?);
    let company = Description::new(model.new_resource(Some("acme"))?)
        .with_property(name.clone(), model.new_literal_node("ACME", None)?)
        .with_property(located_in, city);

    for person in ["alice", "bob"] {
        let desc = Description::new(model.new_resource(Some(person))?)
            .with_property(name.clone(), model.new_literal_node(person, None)?)
            .with_property(works_for.clone(), company.clone());
        model.add(desc, false)?;
        println!("✓ Added {}", person);
    }

    // anonymous contact
    let contact = model.new_resource(None)?;
    let desc = Description::new(contact)
        .with_property(name, model.new_literal_node("Front desk", None)?);
    model.add(desc, false)?;

    println!("\nModel Statistics:");
    println!("  Total statements: {}", model.len());
    println!("  Namespaces: {}", model.namespaces().len());
    println!();
    Ok(model)
}

fn demo_resources(model: &Model) -> Result<()> {
    println!("=== Demo 2: Resource Graph ===");
    let works_for = Resource::new("http://example.org/worksFor")?;
    match model.search_resources(None, Some(&works_for), None) {
        Some(ResourceMatch::One(desc)) => println!("{}", desc),
        Some(ResourceMatch::Many(resources)) => {
            for (key, desc) in resources {
                println!("{} =>\n{}", key, desc);
            }
        }
        None => println!("No resources found"),
    }
    println!();
    Ok(())
}

fn demo_queries(model: &Model) -> Result<()> {
    println!("=== Demo 3: SPARQL SELECT ===");
    let queries = [
        "PREFIX foaf: <http://xmlns.com/foaf/0.1/> SELECT ?person ?name WHERE { ?person foaf:name ?name }",
        "PREFIX ex: <http://example.org/> PREFIX foaf: <http://xmlns.com/foaf/0.1/> \
         SELECT ?person ?city WHERE { ?person ex:worksFor ?company . ?company ex:locatedIn ?c . ?c foaf:name ?city }",
    ];

    for query in queries {
        println!("Query: {}", query);
        let results = model.query(query)?;
        println!("{}", results.to_tsv());
        println!("  ({} rows in {:?})", results.len(), results.elapsed);
    }

    let results = model.query_with(queries[1], QueryOptions::objects())?;
    println!("{}", serde_json::to_string_pretty(&results.to_json())?);
    println!();
    Ok(())
}

fn demo_serialization(model: &Model) -> Result<()> {
    println!("=== Demo 4: Turtle and RDF/JSON ===");
    let turtle = RdfSerializer::serialize(model, RdfFormat::Turtle)?;
    println!("{}", turtle);
    let json = RdfSerializer::serialize(model, RdfFormat::Json)?;
    println!("{}", json);
    Ok(())
}
