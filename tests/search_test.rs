//! Integration tests for evaluating parsed queries against a memory index

use halberd::prelude::*;
use halberd::scoring::{Frequency, TfIdf, WeightingRegistry};
use halberd::sorting::{MissingValues, SortConfig};

fn schema() -> Schema {
    Schema::new()
        .with_field("title", FieldType::Text)
        .unwrap()
        .with_field("body", FieldType::Text)
        .unwrap()
        .with_field("author", FieldType::Id)
        .unwrap()
        .with_field("year", FieldType::Numeric)
        .unwrap()
}

fn library() -> MemoryIndex {
    let mut index = MemoryIndex::new(schema());
    let books = [
        ("Rust in Action", "systems programming with rust", "tim", "2021"),
        ("Programming Rust", "fast safe systems development in rust rust", "jim", "2017"),
        ("The Go Programming Language", "systems programming with go", "alan", "2015"),
        ("Cooking for Engineers", "recipes and kitchen science", "michael", "2010"),
        ("Safe Systems", "formal methods for safe software", "jim", "2019"),
    ];
    for (title, body, author, year) in books {
        index
            .add_document(&[("title", title), ("body", body), ("author", author), ("year", year)])
            .unwrap();
    }
    index
}

fn parse(text: &str) -> QueryNode {
    QueryParser::new("body").with_schema(schema()).parse(text).unwrap()
}

fn doc_ids(hits: &[Hit]) -> Vec<DocId> {
    hits.iter().map(|hit| hit.doc_id).collect()
}

fn sorted_ids(hits: &[Hit]) -> Vec<DocId> {
    let mut ids = doc_ids(hits);
    ids.sort_unstable();
    ids
}

#[test]
fn test_term_search_ranks_by_frequency() -> Result<()> {
    let index = library();
    let searcher = Searcher::new(&index, Box::new(TfIdf));

    let hits = searcher.search(&parse("rust"), 10)?;
    assert_eq!(sorted_ids(&hits), vec![0, 1]);
    // Two occurrences beat one.
    assert_eq!(hits[0].doc_id, 1);
    assert!(hits.iter().all(|hit| hit.score > 0.0));
    Ok(())
}

#[test]
fn test_limit_and_tie_break() -> Result<()> {
    let index = library();
    let searcher = Searcher::new(&index, Box::new(Frequency));

    // Frequency gives every match of a term the same score.
    let hits = searcher.search(&parse("systems"), 10)?;
    assert_eq!(doc_ids(&hits), vec![0, 1, 2]);

    let hits = searcher.search(&parse("systems"), 2)?;
    assert_eq!(doc_ids(&hits), vec![0, 1]);
    Ok(())
}

#[test]
fn test_boolean_queries() -> Result<()> {
    let index = library();
    let searcher = Searcher::new(&index, Box::new(TfIdf));

    assert_eq!(sorted_ids(&searcher.search(&parse("systems rust"), 10)?), vec![0, 1]);
    assert_eq!(sorted_ids(&searcher.search(&parse("go OR recipes"), 10)?), vec![2, 3]);
    assert_eq!(sorted_ids(&searcher.search(&parse("systems ANDNOT rust"), 10)?), vec![2]);
    assert_eq!(sorted_ids(&searcher.search(&parse("systems NOT go"), 10)?), vec![0, 1]);
    assert_eq!(sorted_ids(&searcher.search(&parse("NOT systems"), 10)?), vec![3, 4]);
    assert!(searcher.search(&parse("rust recipes"), 10)?.is_empty());
    assert!(searcher.search(&QueryNode::Null, 10)?.is_empty());
    Ok(())
}

#[test]
fn test_fields_and_boosts() -> Result<()> {
    let index = library();
    let searcher = Searcher::new(&index, Box::new(TfIdf));

    assert_eq!(sorted_ids(&searcher.search(&parse("title:programming"), 10)?), vec![1, 2]);

    // Boosting one branch reorders the union.
    let plain = searcher.search(&parse("title:safe OR title:rust"), 10)?;
    let boosted = searcher.search(&parse("title:safe^10 OR title:rust"), 10)?;
    assert_eq!(sorted_ids(&plain), sorted_ids(&boosted));
    assert_eq!(boosted[0].doc_id, 4);
    Ok(())
}

#[test]
fn test_phrase_search() -> Result<()> {
    let index = library();
    let searcher = Searcher::new(&index, Box::new(TfIdf));

    assert_eq!(doc_ids(&searcher.search(&parse("\"systems programming\""), 10)?), vec![0, 2]);
    assert!(searcher.search(&parse("\"programming systems\""), 10)?.is_empty());
    // "fast safe systems" has one word in between.
    assert!(searcher.search(&parse("\"fast systems\""), 10)?.is_empty());
    assert_eq!(doc_ids(&searcher.search(&parse("\"fast systems\"~1"), 10)?), vec![1]);
    Ok(())
}

#[test]
fn test_patterns_are_expanded() -> Result<()> {
    let index = library();
    let searcher = Searcher::new(&index, Box::new(TfIdf));

    assert_eq!(sorted_ids(&searcher.search(&parse("prog*"), 10)?), vec![0, 2]);
    assert_eq!(sorted_ids(&searcher.search(&parse("s?fe"), 10)?), vec![1, 4]);
    assert_eq!(sorted_ids(&searcher.search(&parse("recipe~"), 10)?), vec![3]);
    assert!(searcher.search(&parse("zebra*"), 10)?.is_empty());
    Ok(())
}

#[test]
fn test_ranges_and_every() -> Result<()> {
    let index = library();
    let searcher = Searcher::new(&index, Box::new(TfIdf));

    assert_eq!(sorted_ids(&searcher.search(&parse("author:[j TO n]"), 10)?), vec![1, 3, 4]);
    assert_eq!(sorted_ids(&searcher.search(&parse("author:[j TO m]"), 10)?), vec![1, 4]);
    assert_eq!(sorted_ids(&searcher.search(&parse("year:[2016 TO 2020]"), 10)?), vec![1, 4]);
    assert_eq!(sorted_ids(&searcher.search(&parse("year:2015"), 10)?), vec![2]);

    let hits = searcher.search(&QueryNode::every(), 10)?;
    assert_eq!(doc_ids(&hits), vec![0, 1, 2, 3, 4]);
    assert!(hits.iter().all(|hit| hit.score == 1.0));
    Ok(())
}

#[test]
fn test_every_with_exclusion() -> Result<()> {
    let schema = Schema::new().with_field("f", FieldType::Text)?;
    let mut index = MemoryIndex::new(schema);
    index.add_document(&[("f", "x")])?;
    index.add_document(&[("f", "y")])?;

    let searcher = Searcher::new(&index, Box::new(TfIdf));
    let query = QueryNode::and(vec![
        QueryNode::every_in("f"),
        QueryNode::not(QueryNode::term("f", "x")),
    ]);
    assert_eq!(doc_ids(&searcher.search(&query, 10)?), vec![1]);

    let parsed = QueryParser::new("f").parse("f:[ TO ] NOT f:x")?;
    assert_eq!(doc_ids(&searcher.search(&parsed, 10)?), vec![1]);
    Ok(())
}

#[test]
fn test_sorted_search() -> Result<()> {
    let index = library();
    let searcher = Searcher::new(&index, Box::new(TfIdf));
    let query = parse("systems OR safe");

    // alan < jim < tim; jim's two books keep document order.
    let hits = searcher.search_sorted(&query, "author", false, 10)?;
    assert_eq!(doc_ids(&hits), vec![2, 1, 4, 0]);

    let hits = searcher.search_sorted(&query, "author", true, 10)?;
    assert_eq!(doc_ids(&hits), vec![0, 1, 4, 2]);

    let hits = searcher.search_sorted(&query, "author", false, 1)?;
    assert_eq!(doc_ids(&hits), vec![2]);
    assert!(hits[0].score > 0.0);

    // The sorter is created once and reused.
    assert!(searcher.sorter("author").is_built());
    assert!(searcher.search_sorted(&query, "publisher", false, 10).is_err());
    Ok(())
}

#[test]
fn test_sorted_search_missing_values() -> Result<()> {
    let mut index = MemoryIndex::new(schema());
    index.add_document(&[("body", "rust"), ("author", "zed")])?;
    index.add_document(&[("body", "rust")])?;
    index.add_document(&[("body", "rust"), ("author", "amy")])?;

    let searcher = Searcher::new(&index, Box::new(TfIdf));
    let hits = searcher.search_sorted(&parse("rust"), "author", false, 10)?;
    assert_eq!(doc_ids(&hits), vec![2, 0, 1]);
    let hits = searcher.search_sorted(&parse("rust"), "author", true, 10)?;
    assert_eq!(doc_ids(&hits), vec![0, 2, 1]);

    let config = SortConfig::default().with_missing(MissingValues::Identity);
    let searcher = Searcher::new(&index, Box::new(TfIdf)).with_sort_config(config);
    let hits = searcher.search_sorted(&parse("rust"), "author", true, 10)?;
    assert_eq!(doc_ids(&hits), vec![0, 1, 2]);
    Ok(())
}

#[test]
fn test_every_registered_model_ranks() -> Result<()> {
    let index = library();
    let registry = WeightingRegistry::new();
    let query = parse("rust systems");

    for name in registry.names() {
        let weighting = WeightingConfig::from_json(&format!(r#"{{"model": "{name}"}}"#))?;
        let searcher = Searcher::new(&index, weighting.build());
        let hits = searcher.search(&query, 10)?;
        assert_eq!(sorted_ids(&hits), vec![0, 1], "{name}");
        assert!(hits.iter().all(|hit| hit.score.is_finite()), "{name}");
    }
    Ok(())
}

#[test]
fn test_closed_index() {
    let index = library();
    let searcher = Searcher::new(&index, Box::new(TfIdf));
    index.close();
    assert!(matches!(
        searcher.search(&parse("rust"), 10),
        Err(HalberdError::Index(_))
    ));
}

#[test]
fn test_results_keep_every_match() -> Result<()> {
    let index = library();
    let searcher = Searcher::new(&index, Box::new(Frequency));

    let results = searcher.search_results(&parse("systems"), 2)?;
    assert_eq!(results.len(), 2);
    assert_eq!(results.total(), 3);
    assert!(results.contains(2));

    let mut merged = searcher.search_results(&parse("title:rust"), 10)?;
    merged.extend(&searcher.search_results(&parse("safe"), 10)?);
    assert_eq!(sorted_ids(merged.hits()), vec![0, 1, 4]);

    let mut filtered = searcher.search_results(&parse("systems"), 10)?;
    filtered.filter(&searcher.search_results(&parse("author:jim"), 10)?);
    assert_eq!(doc_ids(filtered.hits()), vec![1]);
    Ok(())
}

#[test]
fn test_paginated_results() -> Result<()> {
    let index = library();
    let searcher = Searcher::new(&index, Box::new(TfIdf));
    let results = searcher.search_results(&QueryNode::every(), 10)?;

    let paginator = Paginator::new(&results, 2)?;
    assert_eq!(paginator.page_count(), 3);
    assert_eq!(doc_ids(paginator.page(2)), vec![2, 3]);
    assert_eq!(doc_ids(paginator.page(3)), vec![4]);
    Ok(())
}

#[test]
fn test_highlight_parsed_query() {
    let query = parse("rust systems title:safe");
    let highlight = Highlighter::default().highlight(
        &query,
        "body",
        FieldType::Text,
        "fast safe systems development in rust rust",
    );

    assert_eq!(highlight.fragments.len(), 1);
    assert_eq!(
        highlight.combined_text(" ... "),
        "fast safe <mark>systems</mark> development in <mark>rust</mark> <mark>rust</mark>"
    );
    assert_eq!(highlight.fragments[0].score, 6.0);
}
