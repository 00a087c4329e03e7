use erp_rdf::rdf::{Description, LiteralNode, Model, Node, Resource, Statement};
use erp_rdf::sparql::{
    parse_query, OutputMode, ParseError, QueryOptions, QueryResults, QueryTable, ResultForm,
    SparqlEngine, SparqlError,
};

const NS: &str = "http://example.org/";
const PREFIX: &str = "PREFIX ex: <http://example.org/> ";

fn res(name: &str) -> Resource {
    Resource::from_parts(NS, name).unwrap()
}

/// test: pred1 "literal1", pred2 "literal2", pred3 test2
/// test2: pred "literal3", pred2 "literal4"
fn model() -> Model {
    let mut model = Model::new();
    model.add_base_namespace("ex", NS).unwrap();

    let test2 = Description::new(res("test2"))
        .with_property(res("pred"), LiteralNode::new("literal3"))
        .with_property(res("pred2"), LiteralNode::new("literal4"));
    let test = Description::new(res("test"))
        .with_property(res("pred1"), LiteralNode::new("literal1"))
        .with_property(res("pred2"), LiteralNode::new("literal2"))
        .with_property(res("pred3"), test2);

    model.add(test, false).unwrap();
    model
}

fn run(where_body: &str, select: &str) -> QueryResults {
    let query = format!("{}SELECT {} WHERE {{ {} }}", PREFIX, select, where_body);
    model().query(&query).unwrap()
}

#[test]
fn test_query_all_statements() {
    let results = run("?x ?y ?z", "?x ?y");
    assert_eq!(results.variables, vec!["?x", "?y"]);
    assert_eq!(results.len(), 5);
    assert!(results.evaluated);
    assert!(results.query.contains("SELECT ?x ?y"));
}

#[test]
fn test_query_fixed_predicate() {
    let results = run("?x ex:pred1 ?y", "?x ?y");
    assert_eq!(results.len(), 1);
    assert_eq!(results.strings("?x").unwrap(), vec!["http://example.org/test"]);
    assert_eq!(results.strings("?y").unwrap(), vec!["literal1"]);

    let results = run("?x ex:pred3 ?y", "?x ?y");
    assert_eq!(results.len(), 1);
    assert_eq!(results.strings("?y").unwrap(), vec!["http://example.org/test2"]);
}

#[test]
fn test_query_nested_pattern() {
    let results = run("?x ex:pred3 ?y . ?y ex:pred2 ?z", "?x ?y");
    assert_eq!(results.len(), 1);
    assert_eq!(results.strings("?x").unwrap(), vec!["http://example.org/test"]);
    assert_eq!(results.strings("?y").unwrap(), vec!["http://example.org/test2"]);
}

#[test]
fn test_query_nested_pattern_two_triples() {
    let results = run("?x ex:pred3 ?y . ?y ex:pred2 ?z1 . ?y ex:pred ?z2", "?x ?y");
    assert_eq!(results.len(), 1);
}

#[test]
fn test_query_typed_literal() {
    let results = run(
        "?x ex:pred3 ?y . ?x ex:pred1 \"literal1\"^^xsd:string . ?y ex:pred2 ?z1 . ?y ex:pred ?z2",
        "?x ?y ?z1",
    );
    assert_eq!(results.variables.len(), 3);
    assert_eq!(results.len(), 1);
    assert_eq!(results.strings("?z1").unwrap(), vec!["literal4"]);

    let results = run("?x ex:pred1 \"literal1\"^^xsd:string", "?x");
    assert_eq!(results.len(), 1);

    let results = run("?x ex:pred1 \"literal1\"^^xsd:string . ?x ex:pred1 ?z", "?x ?z");
    assert_eq!(results.len(), 1);
    assert_eq!(results.strings("?z").unwrap(), vec!["literal1"]);
}

#[test]
fn test_query_literal_datatype_must_match() {
    let results = run("?x ex:pred1 \"literal1\"^^xsd:integer", "?x");
    assert!(results.is_empty());

    let results = run("?x ex:pred1 \"literal1\"@en", "?x");
    assert!(results.is_empty());
}

#[test]
fn test_query_fixed_object() {
    let results = run("?x ex:pred3 ex:test2", "?x");
    assert_eq!(results.len(), 1);

    let results = run("?x ex:pred3 ex:test2 . ?x ex:pred3 ?z", "?x ?z");
    assert_eq!(results.len(), 1);
    assert_eq!(results.strings("?z").unwrap(), vec!["http://example.org/test2"]);

    let results = run("?x ex:pred3 <http://example.org/test2>", "?x");
    assert_eq!(results.len(), 1);
}

#[test]
fn test_query_variable_predicate() {
    let results = run("ex:test ?y ex:test2 . ex:test ?y ?z . ex:test ?y ?z", "?y");
    assert_eq!(results.len(), 1);
    assert_eq!(results.strings("?y").unwrap(), vec!["http://example.org/pred3"]);
}

#[test]
fn test_query_repeated_triples() {
    let results = run("?x ?y ?z . ?x ?y ?z . ?x ?y ?z1 . ?x ?y1 ?z", "?x ?y");
    assert_eq!(results.len(), 5);
}

#[test]
fn test_query_object_as_subject() {
    let results = run("?x ?y ?z . ?z ?a ?b", "?x ?y ?z ?a ?b");
    assert_eq!(results.len(), 2);
    assert!(results
        .strings("?z")
        .unwrap()
        .iter()
        .all(|z| z == "http://example.org/test2"));
}

#[test]
fn test_query_multiple_matches_per_row() {
    let results = run("?x ?y ?z . ?x ?c ?d . ?z ?a ?b", "?x ?y ?z ?a ?b ?c ?d");
    // two bindings for ?z's properties, three properties of ?x each
    assert_eq!(results.len(), 6);

    let results = run("?x ?y ?z . ?x ?y ?c . ?z ?a ?b", "?x ?y ?z ?a ?b ?c");
    assert_eq!(results.len(), 2);
    assert_eq!(
        results.strings("?c").unwrap(),
        vec!["http://example.org/test2", "http://example.org/test2"]
    );
}

#[test]
fn test_query_disconnected_triples_cross_product() {
    let mut model = Model::new();
    model.add_base_namespace("ex", NS).unwrap();
    for (s, o) in [("a", "o1"), ("b", "o2")] {
        model
            .add(Statement::new(res(s), res("p"), res(o)).unwrap(), false)
            .unwrap();
    }
    for (s, o) in [("c", "1"), ("d", "2"), ("e", "3")] {
        model
            .add(Statement::new(res(s), res("q"), LiteralNode::new(o)).unwrap(), false)
            .unwrap();
    }

    let query = format!("{}SELECT ?s ?t ?u WHERE {{ ?s ex:p ?o . ?t ex:q ?u }}", PREFIX);
    let results = model.query(&query).unwrap();
    assert_eq!(results.len(), 6);

    let ex = |names: &[&str]| -> Vec<String> {
        names.iter().map(|n| format!("{}{}", NS, n)).collect()
    };
    assert_eq!(results.strings("?s").unwrap(), ex(&["a", "a", "a", "b", "b", "b"]));
    assert_eq!(results.strings("?t").unwrap(), ex(&["c", "d", "e", "c", "d", "e"]));
    assert_eq!(results.strings("?u").unwrap(), vec!["1", "2", "3", "1", "2", "3"]);

    // a disconnected triple without matches empties the result
    let query = format!("{}SELECT ?s ?t WHERE {{ ?s ex:p ?o . ?t ex:missing ?u }}", PREFIX);
    assert!(model.query(&query).unwrap().is_empty());
}

#[test]
fn test_query_select_variable_outside_where() {
    // ?d occurs in no triple and gets no column
    let results = run("?x ?y ?z . ?x ?y ?c . ?z ?a ?b", "?x ?y ?z ?a ?b ?c ?d");
    assert_eq!(results.len(), 2);
    assert_eq!(results.variables, vec!["?x", "?y", "?z", "?a", "?b", "?c"]);
    assert!(results.column("?d").is_none());
    assert_eq!(results.to_json()["head"]["vars"].as_array().unwrap().len(), 6);

    let results = run("?x ex:pred1 ?y", "?q");
    assert!(results.variables.is_empty());
    assert!(results.is_empty());
}

#[test]
fn test_query_no_match_is_empty() {
    let results = run("?x ex:pred3 ex:doesNotExist", "?x");
    assert!(results.evaluated);
    assert!(results.is_empty());
    assert_eq!(results.variables, vec!["?x"]);

    let results = run("?x ex:pred1 ?y . ?y ex:pred ?z", "?x");
    assert!(results.is_empty());
}

#[test]
fn test_query_columns_follow_select_order() {
    let results = run("?x ex:pred1 ?y", "?y ?x");
    assert_eq!(results.variables, vec!["?y", "?x"]);
    match results.table() {
        QueryTable::Strings(table) => {
            let keys: Vec<&String> = table.keys().collect();
            assert_eq!(keys, vec!["?y", "?x"]);
        }
        other => panic!("Expected strings, got {:?}", other),
    }
}

#[test]
fn test_query_object_output() {
    let model = model();
    let query = format!("{}SELECT ?y WHERE {{ ?x ex:pred1 ?y }}", PREFIX);
    let results = model.query_with(&query, QueryOptions::objects()).unwrap();
    assert_eq!(results.output, OutputMode::Objects);
    assert_eq!(
        results.column("?y").unwrap(),
        &[Node::from(LiteralNode::new("literal1"))]
    );
}

#[test]
fn test_query_blank_nodes() {
    let mut model = model();
    let blank = model.new_blank_node();
    let desc = Description::new(blank).with_property(res("pred"), LiteralNode::new("anon"));
    model.add(desc, false).unwrap();

    let query = format!("{}SELECT ?x WHERE {{ ?x ex:pred \"anon\" }}", PREFIX);
    let results = model.query(&query).unwrap();
    assert_eq!(results.strings("?x").unwrap(), vec!["_:bNode1"]);

    let query = format!("{}SELECT ?y WHERE {{ _:bNode1 ?y ?z }}", PREFIX);
    let results = model.query(&query).unwrap();
    assert_eq!(results.len(), 1);
}

#[test]
fn test_query_unsupported_form() {
    let query = format!(
        "{}ASK ?x ?y WHERE {{ ?x ?y ?z . ?x ?y ?z . ?x ?y ?z1 . ?x ?y1 ?z }}",
        PREFIX
    );
    let err = model().query(&query).unwrap_err();
    assert_eq!(
        err,
        SparqlError::Parse(ParseError::UnsupportedForm(ResultForm::Ask))
    );
}

#[test]
fn test_query_errors() {
    let model = model();
    assert!(matches!(
        model.query("SELECT ?x FROM <http://example.org/g> WHERE { ?x ?y ?z }"),
        Err(SparqlError::Parse(ParseError::UnsupportedClause(_)))
    ));
    assert!(matches!(
        model.query("SELECT ?x WHERE { ?x foaf:name ?y }"),
        Err(SparqlError::Parse(ParseError::MissingNamespace(_)))
    ));
}

#[test]
fn test_engine_reuse() {
    let model = model();
    let engine = SparqlEngine::new(&model).with_options(QueryOptions::default());
    let first = engine.query(&format!("{}SELECT ?x WHERE {{ ?x ex:pred1 ?y }}", PREFIX)).unwrap();
    let second = engine.query(&format!("{}SELECT ?y WHERE {{ ?x ex:pred ?y }}", PREFIX)).unwrap();
    assert_eq!(first.strings("?x").unwrap(), vec!["http://example.org/test"]);
    assert_eq!(second.strings("?y").unwrap(), vec!["literal3"]);
}

#[test]
fn test_parse_then_execute() {
    let model = model();
    let parsed = parse_query(&format!("{}SELECT ?x WHERE {{ ?x ex:pred2 ?y }}", PREFIX)).unwrap();
    assert_eq!(parsed.triple_count(), 1);
    let results = SparqlEngine::new(&model).execute(&parsed).unwrap();
    assert_eq!(results.len(), 2);
}

#[test]
fn test_json_output() {
    let results = run("?x ex:pred1 ?y", "?x ?y");
    let json = results.to_json();
    assert_eq!(json["head"]["vars"][0], "x");
    let binding = &json["results"]["bindings"][0];
    assert_eq!(binding["x"]["value"], "http://example.org/test");
    assert_eq!(binding["y"]["type"], "literal");
    assert_eq!(binding["y"]["value"], "literal1");
}
