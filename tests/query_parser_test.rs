//! Integration tests for the query string parser

use halberd::prelude::*;
use halberd::query::{Bound, RangeQuery};

fn parse(text: &str) -> QueryNode {
    QueryParser::new("text").parse(text).unwrap()
}

fn term(text: &str) -> QueryNode {
    QueryNode::term("text", text)
}

fn schema() -> Schema {
    Schema::new()
        .with_field("text", FieldType::Text)
        .unwrap()
        .with_field("name", FieldType::Id)
        .unwrap()
        .with_field("price", FieldType::Numeric)
        .unwrap()
}

#[test]
fn test_andnot_precedence() {
    assert_eq!(
        parse("this ANDNOT that"),
        QueryNode::and_not(term("this"), term("that"))
    );
    assert_eq!(
        parse("foo ANDNOT bar baz"),
        QueryNode::and(vec![
            QueryNode::and_not(term("foo"), term("bar")),
            term("baz"),
        ])
    );
    assert_eq!(
        parse("foo fie ANDNOT bar baz"),
        QueryNode::and(vec![
            term("foo"),
            QueryNode::and_not(term("fie"), term("bar")),
            term("baz"),
        ])
    );
}

#[test]
fn test_explicit_operators() {
    assert_eq!(
        parse("a OR b c"),
        QueryNode::or(vec![term("a"), QueryNode::and(vec![term("b"), term("c")])])
    );
    assert_eq!(
        parse("a AND b AND c"),
        QueryNode::and(vec![term("a"), term("b"), term("c")])
    );
    assert_eq!(
        parse("a NOT b"),
        QueryNode::and(vec![term("a"), QueryNode::not(term("b"))])
    );
    // A keyword without an operand is plain text.
    assert_eq!(parse("a OR"), QueryNode::and(vec![term("a"), term("OR")]));
    // Keywords are case sensitive.
    assert_eq!(parse("a or b"), QueryNode::and(vec![term("a"), term("or"), term("b")]));
}

#[test]
fn test_boosts() {
    let query = parse("this^3 fn:that^0.5 5.67");
    let QueryNode::And(and) = &query else {
        panic!("expected And, got {query:?}");
    };
    assert_eq!(and.children.len(), 3);
    assert_eq!(and.children[0], term("this").with_boost(3.0));
    assert_eq!(and.children[1], QueryNode::term("fn", "that").with_boost(0.5));
    assert_eq!(and.children[2], term("5.67"));
    assert_eq!(and.children[2].boost(), 1.0);
}

#[test]
fn test_group_boost() {
    assert_eq!(
        parse("(a OR b)^2 c"),
        QueryNode::and(vec![
            QueryNode::or(vec![term("a"), term("b")]).with_boost(2.0),
            term("c"),
        ])
    );
}

#[test]
fn test_wildcard_classification() {
    assert_eq!(parse("word*"), QueryNode::prefix("text", "word"));
    assert_eq!(parse("r*"), QueryNode::prefix("text", "r"));
    assert_eq!(parse("*"), QueryNode::prefix("text", ""));
    assert_eq!(parse("*the?e*"), QueryNode::wildcard("text", "*the?e*"));
    assert_eq!(parse("*?"), QueryNode::wildcard("text", "*?"));
    assert_eq!(parse("?"), QueryNode::wildcard("text", "?"));
    assert_eq!(parse("*ending"), QueryNode::wildcard("text", "*ending"));
    assert_eq!(parse("*q"), QueryNode::wildcard("text", "*q"));
    assert_eq!(parse("h?pe"), QueryNode::wildcard("text", "h?pe"));
    assert_eq!(parse("*h?ll*"), QueryNode::wildcard("text", "*h?ll*"));
    assert_eq!(
        parse("*? blah"),
        QueryNode::and(vec![QueryNode::wildcard("text", "*?"), term("blah")])
    );
}

#[test]
fn test_punctuation_in_terms() {
    assert_eq!(parse(".abcd@gmail.com"), term(".abcd@gmail.com"));
    assert_eq!(parse("."), term("."));
    assert_eq!(parse("snake_case"), term("snake_case"));
}

#[test]
fn test_escaping() {
    assert_eq!(parse("big\\small"), term("bigsmall"));
    assert_eq!(parse("big\\\\small"), term("big\\small"));
    assert_eq!(parse("ab\\\\*"), QueryNode::wildcard("text", "ab\\*"));
    assert_eq!(parse("ab*"), QueryNode::prefix("text", "ab"));
    // An escaped star is literal text.
    assert_eq!(parse("ab\\*"), term("ab*"));
    assert_eq!(parse("a\\:b"), term("a:b"));
}

#[test]
fn test_phrases() {
    assert_eq!(
        parse("\"hello world\""),
        QueryNode::phrase("text", ["hello", "world"])
    );
    assert_eq!(parse("\"hello\""), term("hello"));
    assert_eq!(parse("\"\""), QueryNode::Null);

    let query = parse("title:\"hello there world\"~2^3");
    let QueryNode::Phrase(phrase) = &query else {
        panic!("expected Phrase, got {query:?}");
    };
    assert_eq!(phrase.field, "title");
    assert_eq!(phrase.words, vec!["hello", "there", "world"]);
    assert_eq!(phrase.slop, 2);
    assert_eq!(phrase.boost, 3.0);
}

#[test]
fn test_fields() {
    assert_eq!(
        parse("title:(a b)"),
        QueryNode::and(vec![QueryNode::term("title", "a"), QueryNode::term("title", "b")])
    );
    // A colon at the end of a word is not a field prefix.
    assert_eq!(parse("title: a"), QueryNode::and(vec![term("title:"), term("a")]));
    // Only the first prefix names a field.
    assert_eq!(parse("a:b:c"), QueryNode::term("a", "b:c"));
    assert_eq!(
        parse("title:x:y z"),
        QueryNode::and(vec![QueryNode::term("title", "x:y"), term("z")])
    );
}

#[test]
fn test_fuzzy() {
    assert_eq!(parse("roam~"), QueryNode::fuzzy("text", "roam", 1));
    assert_eq!(parse("roam~2"), QueryNode::fuzzy("text", "roam", 2));
}

#[test]
fn test_ranges() {
    assert_eq!(parse("[a TO z]"), QueryNode::term_range("text", Some("a"), Some("z")));
    assert_eq!(
        parse("{a TO z]"),
        QueryNode::term_range_bounds(
            "text",
            Bound::Excluded("a".to_string()),
            Bound::Included("z".to_string())
        )
    );
    assert_eq!(parse("[TO m]"), QueryNode::term_range("text", None, Some("m")));
}

#[test]
fn test_schema_fields() {
    let parser = QueryParser::new("text").with_schema(schema());

    assert_eq!(
        parser.parse("Ind* AND name:[d TO]").unwrap(),
        QueryNode::and(vec![
            QueryNode::prefix("text", "ind"),
            QueryNode::term_range("name", Some("d"), None),
        ])
    );

    // Unknown field names stay in the term text.
    assert_eq!(
        parser.parse("my_name:Green").unwrap(),
        QueryNode::term("text", "my_name:green")
    );

    let parser = QueryParser::new("text")
        .with_schema(schema().with_field("my_name", FieldType::Id).unwrap());
    assert_eq!(
        parser.parse("my_name:Green").unwrap(),
        QueryNode::term("my_name", "Green")
    );
}

#[test]
fn test_numeric_fields() -> Result<()> {
    let parser = QueryParser::new("text").with_schema(schema());

    assert_eq!(
        parser.parse("price:[10 TO 20}")?,
        QueryNode::NumericRange(RangeQuery::new(
            "price",
            Bound::Included(10.0),
            Bound::Excluded(20.0)
        ))
    );
    assert_eq!(
        parser.parse("price:5")?,
        QueryNode::numeric_range("price", Some(5.0), Some(5.0))
    );
    // Numeric-looking text in a text field is a term.
    assert_eq!(parser.parse("5.67")?, term("5.67"));
    Ok(())
}

#[test]
fn test_permissive_input() {
    assert_eq!(parse(""), QueryNode::Null);
    assert_eq!(parse("   "), QueryNode::Null);
    assert_eq!(parse("(a b"), QueryNode::and(vec![term("a"), term("b")]));
    assert_eq!(parse("a b)"), QueryNode::and(vec![term("a"), term("b")]));
}

#[test]
fn test_parse_errors() {
    let parser = QueryParser::new("text");

    match parser.parse("hello \"world") {
        Err(HalberdError::Parse(e)) => assert_eq!(e.span, 6..12),
        other => panic!("expected parse error, got {other:?}"),
    }
    assert!(matches!(parser.parse("[a TO b"), Err(HalberdError::Parse(_))));
}
