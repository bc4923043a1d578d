// Unit tests for priority sorting
use indexmap::IndexMap;
use lfs_ext::pipeline::{Extension, sort_extensions};
use lfs_ext::PipelineError;
use std::collections::HashMap;

fn ext(name: &str, priority: i32) -> Extension {
    Extension::new(name, format!("{name}-clean"), format!("{name}-smudge"), priority)
}

fn named(exts: Vec<Extension>) -> IndexMap<String, Extension> {
    exts.into_iter().map(|e| (e.name.clone(), e)).collect()
}

#[test]
fn test_sorts_ascending_by_priority() {
    let map = named(vec![ext("c", 7), ext("a", -1), ext("d", 3), ext("b", 0)]);

    let sorted = sort_extensions(&map).unwrap();
    let priorities: Vec<i32> = sorted.iter().map(|e| e.priority).collect();
    assert_eq!(priorities, vec![-1, 0, 3, 7]);

    // Same elements, nothing dropped or invented
    let mut names: Vec<&str> = sorted.iter().map(|e| e.name.as_str()).collect();
    names.sort();
    assert_eq!(names, vec!["a", "b", "c", "d"]);
}

#[test]
fn test_declaration_order_does_not_matter() {
    // Declared priority 2 first, priority 1 second
    let map = named(vec![ext("second", 2), ext("first", 1)]);

    let sorted = sort_extensions(&map).unwrap();
    assert_eq!(sorted[0].name, "first");
    assert_eq!(sorted[1].name, "second");
}

#[test]
fn test_hash_map_input() {
    let mut map = HashMap::new();
    for (name, priority) in [("x", 5), ("y", 1), ("z", 3)] {
        map.insert(name.to_string(), ext(name, priority));
    }

    let sorted = sort_extensions(&map).unwrap();
    let names: Vec<&str> = sorted.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["y", "z", "x"]);
}

#[test]
fn test_duplicate_priority_is_rejected() {
    let map = named(vec![ext("a", 1), ext("b", 2), ext("c", 1)]);

    let err = sort_extensions(&map).unwrap_err();
    assert!(matches!(err, PipelineError::ConfigurationError(_)));
    assert_eq!(
        err.to_string(),
        "Pipeline configuration error: duplicate priority 1 on a and c"
    );
}

#[test]
fn test_duplicate_priority_message_is_order_independent() {
    let forward = named(vec![ext("alpha", 4), ext("beta", 4)]);
    let backward = named(vec![ext("beta", 4), ext("alpha", 4)]);

    let a = sort_extensions(&forward).unwrap_err().to_string();
    let b = sort_extensions(&backward).unwrap_err().to_string();
    assert_eq!(a, b);
}

#[test]
fn test_every_colliding_pair_is_rejected() {
    let names = ["p", "q", "r", "s"];
    for i in 0..names.len() {
        for j in (i + 1)..names.len() {
            let exts: Vec<Extension> = names
                .iter()
                .enumerate()
                .map(|(k, n)| {
                    let priority = if k == j { i as i32 } else { k as i32 };
                    ext(n, priority)
                })
                .collect();
            let map = named(exts);
            assert!(
                matches!(
                    sort_extensions(&map),
                    Err(PipelineError::ConfigurationError(_))
                ),
                "{} and {} should collide",
                names[i],
                names[j]
            );
        }
    }
}

#[test]
fn test_empty_and_single() {
    let empty: IndexMap<String, Extension> = IndexMap::new();
    assert!(sort_extensions(&empty).unwrap().is_empty());

    let single = named(vec![ext("only", 42)]);
    assert_eq!(sort_extensions(&single).unwrap(), vec![ext("only", 42)]);
}
