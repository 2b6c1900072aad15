//! Benchmark: deep vs shallow extension filtering of a wide bid request, and the
//! no-op pass over a request without extensions (which returns the input as is).

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use prototree::{filter, FieldDescriptor, Message, MessageDescriptor, ScalarType, Schema, SchemaBuilder, IS_EXTENSION};

fn schema() -> Schema {
    SchemaBuilder::new()
        .message(
            MessageDescriptor::new("Impression")
                .field(FieldDescriptor::scalar("id", 1, ScalarType::String))
                .field(FieldDescriptor::scalar("bidfloor", 2, ScalarType::Double))
                .extension_range(100..=199),
        )
        .message(
            MessageDescriptor::new("BidRequest")
                .field(FieldDescriptor::scalar("id", 1, ScalarType::String))
                .field(FieldDescriptor::message("imp", 2, "Impression").repeated())
                .extension_range(100..=199),
        )
        .extension("Impression", FieldDescriptor::scalar("imp_ext", 100, ScalarType::String))
        .extension("BidRequest", FieldDescriptor::scalar("req_ext", 100, ScalarType::String))
        .build()
        .expect("schema")
}

fn request(schema: &Schema, impressions: usize, with_extensions: bool) -> Message {
    let imp_ext = schema.extension_named("imp_ext").expect("imp_ext");
    let req_ext = schema.extension_named("req_ext").expect("req_ext");
    let mut req = schema.new_builder("BidRequest").expect("request");
    req.set("id", "bench").expect("id");
    for i in 0..impressions {
        let mut imp = schema.new_builder("Impression").expect("impression");
        imp.set("id", i.to_string()).expect("id");
        imp.set("bidfloor", 0.5f64).expect("bidfloor");
        if with_extensions && i % 2 == 0 {
            imp.set_extension(imp_ext, "x").expect("imp_ext");
        }
        req.add("imp", imp).expect("imp");
    }
    if with_extensions {
        req.set_extension(req_ext, "y").expect("req_ext");
    }
    req.build()
}

fn bench_filter_tree(c: &mut Criterion) {
    let schema = schema();
    let with_ext = request(&schema, 256, true);
    let plain = request(&schema, 256, false);

    c.bench_function("filter_deep_256_imp", |b| {
        b.iter(|| filter(black_box(&with_ext), true, IS_EXTENSION))
    });
    c.bench_function("filter_shallow_256_imp", |b| {
        b.iter(|| filter(black_box(&with_ext), false, IS_EXTENSION))
    });
    c.bench_function("filter_noop_256_imp", |b| {
        b.iter(|| filter(black_box(&plain), true, IS_EXTENSION))
    });
}

criterion_group!(benches, bench_filter_tree);
criterion_main!(benches);
