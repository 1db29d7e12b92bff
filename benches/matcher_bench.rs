use criterion::{black_box, criterion_group, criterion_main, Criterion};
use notefind::document::{MemoryBuffer, PlainBufferAdapter};
use notefind::search::{LiteralMatcher, SearchOptions, StringMatcher};
use notefind::{DocumentId, FindConfig, SearchDirection, SearchSession};

fn sample_text() -> String {
    let line = "the quick brown fox jumps over the lazy dog. 猫が座った (cost: $5.00)\n";
    line.repeat(5000)
}

fn benchmark_find_all(c: &mut Criterion) {
    let text = sample_text();
    let matcher = LiteralMatcher::new();
    let options = SearchOptions::default();

    c.bench_function("find_all_common_word", |b| {
        b.iter(|| {
            let spans = matcher
                .find_all(black_box(&text), black_box("the"), &options)
                .unwrap();
            black_box(spans.len());
        });
    });

    c.bench_function("find_all_meta_chars", |b| {
        b.iter(|| {
            let spans = matcher
                .find_all(black_box(&text), black_box("$5."), &options)
                .unwrap();
            black_box(spans.len());
        });
    });
}

fn benchmark_session_search(c: &mut Criterion) {
    let text = sample_text();
    let mut doc = PlainBufferAdapter::new(DocumentId::new(1), MemoryBuffer::from_str(&text));
    let mut session = SearchSession::new(FindConfig::default());
    session.open(&mut doc);

    c.bench_function("session_search_and_step", |b| {
        b.iter(|| {
            session.search(&mut doc, black_box("fox"));
            for _ in 0..10 {
                session.confirm(&mut doc, SearchDirection::Forward);
            }
        });
    });
}

criterion_group!(benches, benchmark_find_all, benchmark_session_search);
criterion_main!(benches);
