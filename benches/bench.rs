//! Criterion benchmarks for Halberd.
//!
//! Covers the hot paths of the retrieval core:
//! - Query string parsing
//! - Tree normalization and pattern simplification
//! - Weighting models
//! - End-to-end search over a memory index

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use halberd::prelude::*;
use halberd::scoring::WeightingRegistry;
use std::hint::black_box;

const WORDS: [&str; 32] = [
    "search",
    "engine",
    "full",
    "text",
    "index",
    "query",
    "document",
    "field",
    "term",
    "phrase",
    "boolean",
    "vector",
    "similarity",
    "relevance",
    "score",
    "analysis",
    "tokenization",
    "stemming",
    "normalization",
    "clustering",
    "machine",
    "learning",
    "algorithm",
    "data",
    "structure",
    "performance",
    "optimization",
    "memory",
    "storage",
    "retrieval",
    "ranking",
    "filtering",
];

/// Generate test documents for benchmarking.
fn generate_test_documents(count: usize) -> Vec<String> {
    let mut documents = Vec::with_capacity(count);
    for i in 0..count {
        let doc_length = 50 + (i % 100); // Variable length documents
        let doc_words: Vec<&str> = (0..doc_length)
            .map(|j| WORDS[(i * 7 + j * 13) % WORDS.len()])
            .collect();
        documents.push(doc_words.join(" "));
    }
    documents
}

fn build_index(count: usize) -> MemoryIndex {
    let schema = Schema::new()
        .with_field("body", FieldType::Text)
        .unwrap()
        .with_field("tag", FieldType::Id)
        .unwrap();
    let mut index = MemoryIndex::new(schema);
    for (i, text) in generate_test_documents(count).iter().enumerate() {
        let tag = WORDS[i % WORDS.len()];
        index.add_document(&[("body", text.as_str()), ("tag", tag)]).unwrap();
    }
    index
}

const QUERIES: [&str; 6] = [
    "search engine",
    "title:\"full text\"~2^3 OR body:query*",
    "machine ANDNOT (learning OR data) storage",
    "[alpha TO omega] NOT filtering",
    "rel?vance^2 rank* optimization~",
    "(((a OR b) OR (c OR d)) OR ((e OR f) OR (g OR h)))",
];

/// Benchmark query string parsing.
fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    let parser = QueryParser::new("body");

    group.throughput(Throughput::Elements(QUERIES.len() as u64));
    group.bench_function("parse_mixed_queries", |b| {
        b.iter(|| {
            for text in QUERIES {
                let _ = black_box(parser.parse(black_box(text)));
            }
        })
    });

    group.finish();
}

/// Benchmark tree normalization and simplification.
fn bench_algebra(c: &mut Criterion) {
    let mut group = c.benchmark_group("algebra");
    let parser = QueryParser::new("body");
    let trees: Vec<QueryNode> = QUERIES.iter().map(|text| parser.parse(text).unwrap()).collect();

    group.bench_function("normalize", |b| {
        b.iter(|| {
            for tree in &trees {
                black_box(tree.normalize());
            }
        })
    });

    let index = build_index(1000);
    let pattern = parser.parse("s* rel?vance optimization~2").unwrap();
    group.bench_function("simplify_patterns", |b| {
        b.iter(|| black_box(pattern.simplify(&index)))
    });

    group.finish();
}

/// Benchmark every registered weighting model.
fn bench_weighting(c: &mut Criterion) {
    let mut group = c.benchmark_group("weighting");
    let index = build_index(1000);
    let registry = WeightingRegistry::new();

    group.throughput(Throughput::Elements(1000));
    for name in registry.names() {
        let Some(model) = registry.get(name) else {
            continue;
        };
        group.bench_function(name, |b| {
            b.iter(|| {
                let mut total = 0.0;
                for doc_id in 0..1000 {
                    total += model.score(&index, "body", "search", doc_id, 3.0, 1);
                }
                black_box(total)
            })
        });
    }

    group.finish();
}

/// Benchmark end-to-end searches.
fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    group.sample_size(20);
    let index = build_index(2000);
    let searcher = Searcher::new(&index, WeightingConfig::default().build());
    let parser = QueryParser::new("body");

    let query = parser.parse("search engine OR retrieval").unwrap();
    group.bench_function("ranked_top_10", |b| {
        b.iter(|| black_box(searcher.search(&query, 10)))
    });

    let phrase = parser.parse("\"text index\"~3").unwrap();
    group.bench_function("phrase_top_10", |b| {
        b.iter(|| black_box(searcher.search(&phrase, 10)))
    });

    group.bench_function("sorted_by_tag", |b| {
        b.iter(|| black_box(searcher.search_sorted(&query, "tag", false, 10)))
    });

    group.finish();
}

criterion_group!(benches, bench_parse, bench_algebra, bench_weighting, bench_search);

criterion_main!(benches);
