use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use querymodel::{
    clock::FixedClock,
    codec::{decode_key, encode_delete_mutation, encode_key, encode_put_mutation},
    core::store::ModelStore,
    mapping::{Attribute, FieldMapping},
    persist::memory::MemoryTable,
};

fn mapping(i: u64) -> FieldMapping {
    FieldMapping::forward(format!("FIELD_{i}"), format!("MODEL_FIELD_{i}"))
        .with_datatype("csv")
        .with_visibility("PUBLIC")
        .with_index_only(i % 2 == 0)
}

fn bench_encode(c: &mut Criterion) {
    let clock = FixedClock::new(1);
    let mappings: Vec<_> = (0..10_000u64).map(mapping).collect();
    c.bench_function("encode_key_10k", |b| {
        b.iter(|| {
            for m in &mappings {
                let _ = encode_key(m, "MODEL_A", &clock).expect("encode");
            }
        });
    });
    c.bench_function("encode_put_10k", |b| {
        b.iter(|| {
            for m in &mappings {
                let _ = encode_put_mutation(m, "MODEL_A", &clock).expect("encode");
            }
        });
    });
}

fn bench_decode(c: &mut Criterion) {
    let clock = FixedClock::new(1);
    let keys: Vec<_> = (0..10_000u64)
        .map(|i| encode_key(&mapping(i), "MODEL_A", &clock).expect("encode"))
        .collect();
    c.bench_function("decode_key_10k", |b| {
        b.iter(|| {
            for k in &keys {
                let _ = decode_key(k, None).expect("decode");
            }
        });
    });
}

fn bench_delete_kinds(c: &mut Criterion) {
    let mut group = c.benchmark_group("delete_mutation");
    let clock = FixedClock::new(1);
    let kinds = [
        ("forward", FieldMapping::forward("f", "m")),
        ("reverse", FieldMapping::reverse("f", "m")),
        ("strict", FieldMapping::strict("m")),
        ("version", FieldMapping::model_attribute(Attribute::version("1"))),
    ];
    for (name, m) in &kinds {
        group.bench_with_input(BenchmarkId::from_parameter(name), m, |b, m| {
            b.iter(|| encode_delete_mutation(m, "MODEL_A", &clock).expect("encode"));
        });
    }
    group.finish();
}

fn bench_store_load(c: &mut Criterion) {
    let mut store = ModelStore::with_clock(MemoryTable::new(), FixedClock::new(1));
    let mappings: Vec<_> = (0..5_000u64).map(mapping).collect();
    store.put_mappings("MODEL_A", &mappings).expect("put");
    store.put_mappings("MODEL_B", &mappings).expect("put");
    c.bench_function("store_load_model_5k", |b| {
        b.iter(|| store.load_model("MODEL_A").expect("load"));
    });
}

criterion_group!(
    benches,
    bench_encode,
    bench_decode,
    bench_delete_kinds,
    bench_store_load
);
criterion_main!(benches);
