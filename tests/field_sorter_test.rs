//! Integration tests for the field sort cache

use std::collections::BTreeSet;

use halberd::prelude::*;
use halberd::sorting::{MissingValues, SortConfig};

fn colors_index() -> Result<MemoryIndex> {
    let schema = Schema::new()
        .with_field("color", FieldType::Id)?
        .with_field("body", FieldType::Text)?;
    let mut index = MemoryIndex::new(schema);
    for (color, body) in [
        ("red", "apple cherry"),
        ("green", "lime apple"),
        ("blue", "sky"),
        ("red", "tomato"),
        ("green", "grass"),
        ("blue", "ocean apple"),
    ] {
        index.add_document(&[("color", color), ("body", body)])?;
    }
    Ok(index)
}

#[test]
fn test_orders_cover_every_document() -> Result<()> {
    let index = colors_index()?;
    let sorter = FieldSorter::new(&index, "color");
    let docs: Vec<DocId> = (0..index.doc_count_all()).collect();

    let orders: Vec<(DocId, i64)> = sorter.doc_orders(&docs, false)?.collect();
    assert_eq!(orders.len(), docs.len());
    assert_eq!(orders.iter().map(|(doc, _)| *doc).collect::<Vec<_>>(), docs);

    // Three distinct values give three contiguous orders.
    let distinct: BTreeSet<i64> = orders.iter().map(|(_, order)| *order).collect();
    assert_eq!(distinct, BTreeSet::from([0, 1, 2]));

    // blue < green < red, and the smallest value sorts first.
    assert_eq!(orders, vec![(0, 0), (1, 1), (2, 2), (3, 0), (4, 1), (5, 2)]);
    Ok(())
}

#[test]
fn test_reversed_is_complement() -> Result<()> {
    let index = colors_index()?;
    let sorter = FieldSorter::new(&index, "color");
    let docs = [5, 0, 3, 2];

    let forward: Vec<(DocId, i64)> = sorter.doc_orders(&docs, false)?.collect();
    let backward: Vec<(DocId, i64)> = sorter.doc_orders(&docs, true)?.collect();
    for ((doc, order), (other_doc, reversed)) in forward.iter().zip(&backward) {
        assert_eq!(doc, other_doc);
        assert_eq!(order + reversed, 2);
    }
    Ok(())
}

#[test]
fn test_missing_values() -> Result<()> {
    let schema = Schema::new()
        .with_field("color", FieldType::Id)?
        .with_field("body", FieldType::Text)?;
    let mut index = MemoryIndex::new(schema);
    index.add_document(&[("color", "red")])?;
    index.add_document(&[("body", "colorless")])?;
    index.add_document(&[("color", "blue")])?;

    let sorter = FieldSorter::new(&index, "color");
    assert_eq!(
        sorter.doc_orders(&[0, 1, 2], false)?.collect::<Vec<_>>(),
        vec![(0, 0), (1, -1), (2, 1)]
    );
    assert_eq!(
        sorter.doc_orders(&[0, 1, 2], true)?.collect::<Vec<_>>(),
        vec![(0, 1), (1, -1), (2, 0)]
    );

    let config = SortConfig::default().with_missing(MissingValues::Identity);
    let sorter = FieldSorter::with_config(&index, "color", config);
    assert_eq!(
        sorter.doc_orders(&[1], true)?.collect::<Vec<_>>(),
        vec![(1, 1)]
    );
    Ok(())
}

#[test]
fn test_cache_is_built_once() -> Result<()> {
    let index = colors_index()?;
    let sorter = FieldSorter::new(&index, "color");
    assert!(!sorter.is_built());

    let first: Vec<_> = sorter.doc_orders(&[0, 1], false)?.collect();
    assert!(sorter.is_built());
    let second: Vec<_> = sorter.doc_orders(&[0, 1], false)?.collect();
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_concurrent_first_use() -> Result<()> {
    let index = colors_index()?;
    let sorter = FieldSorter::new(&index, "color");

    let results: Vec<Vec<(DocId, i64)>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| sorter.doc_orders(&[0, 2, 4], false).map(Iterator::collect)))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect::<Result<Vec<_>>>()
    })?;

    for orders in &results {
        assert_eq!(orders, &vec![(0, 0), (2, 2), (4, 1)]);
    }
    Ok(())
}

#[test]
fn test_unknown_field() {
    let index = colors_index().unwrap();
    let sorter = FieldSorter::new(&index, "size");
    assert!(matches!(
        sorter.doc_orders(&[0], false),
        Err(HalberdError::Field(_))
    ));
}
