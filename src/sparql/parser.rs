//! SPARQL query parser
//!
//! Token based parser for the small supported subset:
//! `PREFIX` declarations, `SELECT ?vars` and a `WHERE { ... }` block of
//! triple patterns separated by `.`. There are no FILTER, OPTIONAL or
//! UNION clauses.

use super::query::{ParsedQuery, QueryTerm, ResultForm, TriplePattern};
use crate::rdf::{
    is_iri, is_namespace, is_prefix, split_prefixed_name, BlankNode, LiteralNode, Node, Resource,
};
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::debug;

static FROM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:^|\s)FROM\s").expect("valid FROM regex"));

static FORM_RES: LazyLock<Vec<(Regex, ResultForm)>> = LazyLock::new(|| {
    ResultForm::KEYWORDS
        .iter()
        .map(|(keyword, form)| {
            let re = Regex::new(&format!(r"(?i)(?:^|\s){}(?:\s|\{{|$)", keyword))
                .expect("valid result form regex");
            (re, *form)
        })
        .collect()
});

static WHERE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:^|\s)WHERE(?:\s|\{|$)").expect("valid WHERE regex"));

static PREFIX_KEYWORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:^|\s)PREFIX\s").expect("valid PREFIX regex"));

static PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)PREFIX\s+(?P<prefix>[A-Za-z0-9]+):\s*<(?P<namespace>[^\s>]+)>")
        .expect("valid prefix declaration regex")
});

static VARIABLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\?[A-Za-z0-9]+").expect("valid variable regex"));

static VARIABLE_TERM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\?[A-Za-z0-9]+$").expect("valid variable term regex"));

static BLANK_TERM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^_:(?P<id>[A-Za-z0-9]+)$").expect("valid blank node regex"));

static LITERAL_TERM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^"(?P<literal>.*)"(?:\^\^(?:xsd:(?P<xsd>[A-Za-z]+)|<(?P<datatype>[^\s>]+)>)|@(?P<language>[A-Za-z]+(?:-[A-Za-z0-9]+)*))?$"#,
    )
    .expect("valid literal regex")
});

/// Parser errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Clause outside the supported subset
    #[error("Unsupported clause: {0}")]
    UnsupportedClause(String),

    /// None of SELECT, ASK, CONSTRUCT or DESCRIBE found
    #[error("The result form of the query could not be determined")]
    UnknownResultForm,

    /// Recognized but not executable result form
    #[error("Unsupported result form: {0}")]
    UnsupportedForm(ResultForm),

    /// SELECT without variables
    #[error("Could not determine variables")]
    NoVariables,

    /// PREFIX present but no usable declaration
    #[error("Could not determine namespaces: {0}")]
    NamespaceExtractionFailed(String),

    /// Prefixed name with an undeclared prefix
    #[error("Namespace is missing for prefix: {0}")]
    MissingNamespace(String),

    /// Term that is no variable, IRI, prefixed name, blank node or literal
    #[error("Could not interpret term: {0}")]
    UnparsableTerm(String),

    /// Triple without exactly three terms
    #[error("Malformed triple pattern: {0}")]
    MalformedTriple(String),

    /// WHERE without a `{ ... }` block
    #[error("WHERE clause without a {{ }} block")]
    MissingWhereBlock,
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Parse a SPARQL query string
pub fn parse_query(input: &str) -> ParseResult<ParsedQuery> {
    if FROM_RE.is_match(input) {
        return Err(ParseError::UnsupportedClause("FROM".to_string()));
    }

    let form = detect_result_form(input)?;
    if form != ResultForm::Select {
        return Err(ParseError::UnsupportedForm(form));
    }

    let mut query = ParsedQuery::new(input, form);
    let where_pos = WHERE_RE.find(input).map(|m| m.start());

    parse_select(input, where_pos, &mut query)?;

    if PREFIX_KEYWORD_RE.is_match(input) {
        parse_namespaces(input, &mut query)?;
    }

    if let Some(pos) = where_pos {
        parse_where(&input[pos..], &mut query)?;
    }

    debug!(
        variables = query.variables.len(),
        triples = query.triple_count(),
        groups = query.where_triples.len(),
        "Parsed SPARQL query"
    );
    Ok(query)
}

/// First result form keyword found, checked in SELECT, ASK, CONSTRUCT, DESCRIBE order
pub fn detect_result_form(input: &str) -> ParseResult<ResultForm> {
    FORM_RES
        .iter()
        .find(|(re, _)| re.is_match(input))
        .map(|(_, form)| *form)
        .ok_or(ParseError::UnknownResultForm)
}

fn parse_select(input: &str, where_pos: Option<usize>, query: &mut ParsedQuery) -> ParseResult<()> {
    let end = where_pos.unwrap_or(input.len());
    let start = FORM_RES
        .iter()
        .find(|(_, form)| *form == ResultForm::Select)
        .and_then(|(re, _)| re.find(&input[..end]))
        .map(|m| m.start())
        .unwrap_or(0);

    for m in VARIABLE_RE.find_iter(&input[start..end]) {
        query.add_variable(m.as_str());
    }
    if query.variables.is_empty() {
        return Err(ParseError::NoVariables);
    }
    Ok(())
}

fn parse_namespaces(input: &str, query: &mut ParsedQuery) -> ParseResult<()> {
    for caps in PREFIX_RE.captures_iter(input) {
        let (Some(prefix), Some(namespace)) = (caps.name("prefix"), caps.name("namespace")) else {
            continue;
        };
        let (prefix, namespace) = (prefix.as_str(), namespace.as_str());
        if !is_prefix(prefix) || !is_namespace(namespace) {
            return Err(ParseError::NamespaceExtractionFailed(format!(
                "{}: <{}>",
                prefix, namespace
            )));
        }
        query
            .namespaces
            .insert(prefix.to_string(), namespace.to_string());
    }
    if query.namespaces.is_empty() {
        return Err(ParseError::NamespaceExtractionFailed(
            "no prefix declaration found".to_string(),
        ));
    }
    Ok(())
}

fn parse_where(clause: &str, query: &mut ParsedQuery) -> ParseResult<()> {
    let open = clause.find('{').ok_or(ParseError::MissingWhereBlock)?;
    let close = clause.rfind('}').ok_or(ParseError::MissingWhereBlock)?;
    if close < open {
        return Err(ParseError::MissingWhereBlock);
    }
    query.has_where = true;

    for triple in split_triples(&clause[open + 1..close]) {
        let terms = split_terms(triple);
        let [subject, predicate, object] = terms.as_slice() else {
            return Err(ParseError::MalformedTriple(triple.to_string()));
        };
        let pattern = TriplePattern::new(
            resolve_term(subject, query)?,
            resolve_term(predicate, query)?,
            resolve_term(object, query)?,
        );
        query.add_triple(subject, pattern);
    }
    Ok(())
}

/// Split a WHERE body on `.` separators.
///
/// A dot only separates when it is outside quotes and `<...>` and is
/// followed by whitespace or the end of the body.
fn split_triples(body: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut in_iri = false;
    let mut prev = '\0';
    let mut chars = body.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        match c {
            '"' if !in_iri && prev != '\\' => in_quotes = !in_quotes,
            '<' if !in_quotes => in_iri = true,
            '>' if !in_quotes => in_iri = false,
            '.' if !in_quotes && !in_iri => {
                let at_boundary = chars.peek().map_or(true, |(_, next)| next.is_whitespace());
                if at_boundary {
                    out.push(&body[start..i]);
                    start = i + 1;
                }
            }
            _ => {}
        }
        prev = c;
    }
    out.push(&body[start..]);

    out.into_iter()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}

/// Split a triple on whitespace outside quotes and `<...>`
fn split_terms(triple: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start: Option<usize> = None;
    let mut in_quotes = false;
    let mut in_iri = false;
    let mut prev = '\0';

    for (i, c) in triple.char_indices() {
        if c.is_whitespace() && !in_quotes && !in_iri {
            if let Some(s) = start.take() {
                out.push(&triple[s..i]);
            }
        } else {
            if start.is_none() {
                start = Some(i);
            }
            match c {
                '"' if !in_iri && prev != '\\' => in_quotes = !in_quotes,
                '<' if !in_quotes => in_iri = true,
                '>' if !in_quotes => in_iri = false,
                _ => {}
            }
        }
        prev = c;
    }
    if let Some(s) = start {
        out.push(&triple[s..]);
    }
    out
}

/// Resolve one token of a triple into a variable or a node
pub fn resolve_term(token: &str, query: &ParsedQuery) -> ParseResult<QueryTerm> {
    if VARIABLE_TERM_RE.is_match(token) {
        return Ok(QueryTerm::Variable(token.to_string()));
    }

    let unparsable = || ParseError::UnparsableTerm(token.to_string());

    if let Some(iri) = token.strip_prefix('<').and_then(|t| t.strip_suffix('>')) {
        let resource = Resource::new(iri).map_err(|_| unparsable())?;
        return Ok(QueryTerm::Node(resource.into()));
    }

    if is_iri(token) {
        let resource = Resource::new(token).map_err(|_| unparsable())?;
        return Ok(QueryTerm::Node(resource.into()));
    }

    if let Some((prefix, name)) = split_prefixed_name(token) {
        let namespace = query
            .namespaces
            .get(prefix)
            .ok_or_else(|| ParseError::MissingNamespace(prefix.to_string()))?;
        let resource = Resource::from_parts(namespace, name).map_err(|_| unparsable())?;
        return Ok(QueryTerm::Node(resource.into()));
    }

    if let Some(caps) = BLANK_TERM_RE.captures(token) {
        let id = caps.name("id").map(|m| m.as_str()).ok_or_else(unparsable)?;
        let blank = BlankNode::new(id).map_err(|_| unparsable())?;
        return Ok(QueryTerm::Node(blank.into()));
    }

    if let Some(caps) = LITERAL_TERM_RE.captures(token) {
        let literal = caps.name("literal").map(|m| m.as_str()).unwrap_or_default();
        let literal = literal.replace("\\\"", "\"");
        let node = if let Some(language) = caps.name("language") {
            LiteralNode::new(literal).with_language(language.as_str())
        } else if let Some(xsd) = caps.name("xsd") {
            LiteralNode::typed(literal, xsd.as_str())
        } else if let Some(datatype) = caps.name("datatype") {
            LiteralNode::typed(literal, LiteralNode::datatype_from_iri(datatype.as_str()))
        } else {
            LiteralNode::new(literal)
        };
        return Ok(QueryTerm::Node(Node::from(node)));
    }

    Err(unparsable())
}
