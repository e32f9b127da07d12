//! Extraction benchmarks
//!
//! Query extraction over fragment streams and title cleanup.

use briefcraft::search::{clean_title, documents_from_hits, SearchHit};
use briefcraft::QueryExtractor;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// Completion text split into token-sized fragments
fn fragments() -> Vec<String> {
    let text = "Acme Corp overview 2024\nAcme Corp recent news 2024\n\
                Acme Corp financial reports 2024\nAcme Corp industry analysis 2024\n";
    text.as_bytes()
        .chunks(3)
        .map(|c| String::from_utf8_lossy(c).into_owned())
        .collect()
}

fn benchmark_extract(c: &mut Criterion) {
    let fragments = fragments();

    c.bench_function("extract_four_queries", |b| {
        b.iter(|| QueryExtractor::new().extract_from(black_box(&fragments)));
    });

    let runaway: Vec<String> = (0..500).map(|i| format!("query {} text\n", i)).collect();
    c.bench_function("extract_capped_stream", |b| {
        b.iter(|| QueryExtractor::new().extract_from(black_box(&runaway)));
    });
}

fn benchmark_results(c: &mut Criterion) {
    c.bench_function("clean_title", |b| {
        b.iter(|| clean_title(black_box("## **Acme Corp** [Annual Report](https://acme.com) &amp; Outlook")));
    });

    let hits: Vec<SearchHit> = (0..20)
        .map(|i| SearchHit {
            url: Some(format!("https://example.com/{}", i)),
            title: Some(format!("**Result {}**", i)),
            content: Some("Acme builds robots".to_string()),
            score: Some(0.5),
        })
        .collect();
    c.bench_function("documents_from_hits", |b| {
        b.iter(|| documents_from_hits("Acme Corp overview 2024", black_box(hits.clone())));
    });
}

criterion_group!(benches, benchmark_extract, benchmark_results);
criterion_main!(benches);
