use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ini_doc::{from_str, load, load_sources, to_string, LoadOptions};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone)]
struct Server {
    host: String,
    port: u16,
    tags: Vec<String>,
    database: Database,
}

#[derive(Serialize, Deserialize, Clone)]
struct Database {
    url: String,
    pool: u32,
    timeout: f64,
    replicas: Vec<String>,
}

fn sample_server() -> Server {
    Server {
        host: "localhost".to_string(),
        port: 8080,
        tags: vec!["web".to_string(), "api".to_string()],
        database: Database {
            url: "postgres://db.local/app".to_string(),
            pool: 16,
            timeout: 2.5,
            replicas: vec!["r1".to_string(), "r2".to_string(), "r3".to_string()],
        },
    }
}

fn generate_document(sections: usize, keys: usize) -> String {
    let mut text = String::from("; generated\nAPP = bench\n\n");
    for s in 0..sections {
        text.push_str(&format!("# section {s}\n[section_{s}]\n"));
        for k in 0..keys {
            text.push_str(&format!("key_{k} = value {k} ; note\n"));
        }
        text.push_str("path = /srv/%(key_0)s\n\n");
    }
    text
}

fn benchmark_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    for size in [10, 100, 1000] {
        let text = generate_document(size, 10);
        group.bench_with_input(BenchmarkId::new("sections", size), &text, |b, text| {
            b.iter(|| load(black_box(text.as_bytes())).unwrap())
        });
    }

    let text = generate_document(100, 10);
    let options = LoadOptions::new().with_insensitive(true);
    group.bench_function("insensitive", |b| {
        b.iter(|| load_sources(options.clone(), [black_box(text.as_bytes())]).unwrap())
    });

    group.finish();
}

fn benchmark_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");

    for size in [10, 100, 1000] {
        let doc = load(generate_document(size, 10).as_bytes()).unwrap();
        group.bench_with_input(BenchmarkId::new("sections", size), &doc, |b, doc| {
            b.iter(|| black_box(doc).to_ini_string())
        });
    }

    group.finish();
}

fn benchmark_resolve(c: &mut Criterion) {
    let doc = load(generate_document(100, 10).as_bytes()).unwrap();
    c.bench_function("resolve_expanded_value", |b| {
        b.iter(|| doc.value(black_box("section_50"), black_box("path")).unwrap())
    });
    c.bench_function("typed_int_value", |b| {
        b.iter(|| doc.key(black_box("section_50"), "key_3").unwrap().must_int(0))
    });
}

fn benchmark_mapping(c: &mut Criterion) {
    let server = sample_server();
    let text = to_string(&server).unwrap();

    c.bench_function("reflect_struct", |b| {
        b.iter(|| to_string(black_box(&server)).unwrap())
    });
    c.bench_function("map_struct", |b| {
        b.iter(|| from_str::<Server>(black_box(&text)).unwrap())
    });
}

criterion_group!(
    benches,
    benchmark_parse,
    benchmark_encode,
    benchmark_resolve,
    benchmark_mapping
);
criterion_main!(benches);
