use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use std::fmt::Write;

use animsvg::{parse, Units};

/// Generate a document with `count` animated shapes spread over a grid
fn synthesize_document(count: usize) -> String {
    let mut doc = String::new();
    doc.push_str("<svg width=\"1024\" height=\"1024\" viewBox=\"0 0 1024 1024\">");
    doc.push_str(
        "<defs><linearGradient id=\"g\" x1=\"0\" y1=\"0\" x2=\"1024\" y2=\"0\" \
         gradientUnits=\"userSpaceOnUse\">\
         <stop offset=\"0\" stop-color=\"#204080\"/>\
         <stop offset=\"1\" stop-color=\"#80ff40\" stop-opacity=\"0.5\"/>\
         </linearGradient></defs>",
    );
    for index in 0..count {
        let x = (index % 32) * 32;
        let y = (index / 32) * 32;
        write!(
            doc,
            "<g transform=\"translate({x},{y})\">\
             <rect x=\"2\" y=\"2\" width=\"28\" height=\"28\" rx=\"6\" fill=\"url(#g)\" \
              stroke=\"#102030\" stroke-width=\"1.5\">\
             <animateTransform attributeName=\"transform\" type=\"rotate\" \
              from=\"0 16 16\" to=\"360 16 16\" dur=\"4s\" repeatCount=\"indefinite\"/>\
             </rect>\
             <path d=\"M4 16 C4 8 12 4 16 4 S28 8 28 16 A12 12 0 0 1 4 16 Z\" \
              fill=\"#ff8040\" fill-opacity=\"0.8\"/>\
             </g>"
        )
        .expect("writing to a string");
    }
    doc.push_str("</svg>");
    doc
}

fn parse_benchmark(c: &mut Criterion) {
    let count = 256;
    let doc = synthesize_document(count);

    let mut group = c.benchmark_group("svg");
    group.throughput(Throughput::Elements(count as u64));

    group.bench_function("parse", |b| {
        b.iter_with_large_drop(|| parse(&doc, Units::Px, 96.0).expect("benchmark document"))
    });

    let mut image = parse(&doc, Units::Px, 96.0).expect("benchmark document");
    let mut time_ms = 0i64;
    group.bench_function("animate", |b| {
        b.iter(|| {
            time_ms += 16;
            image.animate(time_ms)
        })
    });
}

criterion_group!(svg, parse_benchmark);
criterion_main!(svg);
