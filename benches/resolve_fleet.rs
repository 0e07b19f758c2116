//! This bench compiles a synthetic fleet of platforms, each with several
//! documented trims, against the built-in catalog and brand tables.

#![allow(missing_docs)]

use criterion::{Criterion, criterion_group, criterion_main};
use cardocs::{
    Compiler, Config, PartCatalog, Scope,
    domain::{CountStrategy, DocEntry, FlagSpec, PlatformDescriptor, PlatformParams, resolve},
};

const HARNESSES: [&str; 4] = ["hyundai_a", "hyundai_k", "honda_bosch_a", "subaru_a"];
const BRANDS: [&str; 4] = ["hyundai", "hyundai", "honda", "subaru"];

fn fleet(size: usize) -> Vec<PlatformDescriptor> {
    (0..size)
        .map(|i| {
            let slot = i % HARNESSES.len();
            let docs = (0..4)
                .map(|trim| DocEntry {
                    name: format!("Acme Model{i} 20{:02}-{:02}", 10 + trim, 12 + trim),
                    parts: vec!["comma_3x".to_string(), HARNESSES[slot].to_string()],
                    merged: true,
                    ..DocEntry::default()
                })
                .collect();
            PlatformDescriptor {
                platform: format!("ACME_MODEL_{i}"),
                brand: BRANDS[slot].to_string(),
                flags: FlagSpec::Bits(u64::try_from(i % 16).unwrap()),
                params: Some(PlatformParams {
                    mass: Some(1500.0),
                    wheelbase: Some(2.7),
                    ..PlatformParams::default()
                }),
                docs,
                ..PlatformDescriptor::default()
            }
        })
        .collect()
}

fn resolve_parts(c: &mut Criterion) {
    let catalog = PartCatalog::standard().unwrap();
    let (explicit, _) = resolve::lookup(catalog, &["comma_3x", "canfd_kit", "hyundai_k"]);

    c.bench_function("resolve bill of materials", |b| {
        b.iter(|| resolve::resolve(catalog, &explicit, CountStrategy::Flat).unwrap());
    });
}

fn compile_fleet(c: &mut Criterion) {
    let compiler = Compiler::standard(Config::default()).unwrap();
    let descriptors = fleet(500);

    c.bench_function("compile fleet", |b| {
        b.iter(|| compiler.compile(&descriptors, Scope::Everything).unwrap());
    });
}

criterion_group!(benches, resolve_parts, compile_fleet);
criterion_main!(benches);
