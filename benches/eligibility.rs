//! Eligibility and validation over a large synthetic catalog.
//!
//! Every course requires the one before it, every fifth course also has an
//! "any of" clause, and courses are paired into exclusive groups.

#![allow(missing_docs)]

use advisor::{Catalog, Engine};
use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use serde_json::json;

const COURSES: usize = 2_000;

fn code(i: usize) -> String {
    format!("C{i:05}")
}

fn catalog_json() -> String {
    let courses: Vec<_> = (0..COURSES)
        .map(|i| {
            let mut prerequisites = Vec::new();
            if i > 0 {
                prerequisites.push(json!({"type": "all", "courses": [code(i - 1)]}));
            }
            if i >= 10 && i % 5 == 0 {
                prerequisites.push(json!({
                    "type": "any",
                    "courses": [code(i - 10), code(i - 9), code(i - 8)],
                }));
            }
            json!({
                "code": code(i),
                "title": format!("Course {i}"),
                "credits": 3,
                "category": if i % 2 == 0 { "even" } else { "odd" },
                "exclusiveGroup": format!("pair-{}", i / 2),
                "prerequisites": prerequisites,
            })
        })
        .collect();

    let groups: Vec<_> = (0..COURSES / 2)
        .map(|i| json!({"id": format!("pair-{i}"), "title": format!("Pair {i}")}))
        .collect();

    json!({
        "program": {"name": "Synthetic", "catalogYear": 2025, "totalCredits": 120},
        "categories": [{"id": "even", "name": "Even"}, {"id": "odd", "name": "Odd"}],
        "exclusiveGroups": groups,
        "courses": courses,
    })
    .to_string()
}

fn half_completed(catalog: Catalog) -> Engine {
    let mut engine = Engine::new(catalog);
    for i in (0..COURSES / 2).step_by(2) {
        engine.toggle_completion(&code(i), true).unwrap();
    }
    engine
}

fn load_and_validate(c: &mut Criterion) {
    let json = catalog_json();
    c.bench_function("load and validate catalog", |b| {
        b.iter(|| {
            let catalog = Catalog::from_json(&json).unwrap();
            assert!(catalog.validate().is_empty());
        });
    });
}

fn compute_eligibility(c: &mut Criterion) {
    let engine = half_completed(Catalog::from_json(&catalog_json()).unwrap());
    c.bench_function("compute eligibility", |b| {
        b.iter(|| engine.compute_eligibility().len());
    });
}

fn toggle_exclusive(c: &mut Criterion) {
    let catalog = Catalog::from_json(&catalog_json()).unwrap();
    c.bench_function("toggle exclusive pairs", |b| {
        b.iter_batched(
            || Engine::new(catalog.clone()),
            |mut engine| {
                for i in 0..COURSES {
                    engine.toggle_completion(&code(i), true).unwrap();
                }
                engine
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, load_and_validate, compute_eligibility, toggle_exclusive);
criterion_main!(benches);
