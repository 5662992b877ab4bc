//! Benchmarks for structure extraction and ranking.
//!
//! Run with: cargo bench
//!
//! Inputs are synthetic line records and sections, so no PDF backend is involved.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use docsift::parser::{BBox, LineRecord};
use docsift::{HashingEmbedder, Query, RankOptions, RelevanceRanker, Section, StructureExtractor};

/// Lines of a synthetic report: a numbered chapter and two subsections per page.
fn create_lines(page_count: usize) -> Vec<LineRecord> {
    let mut lines = Vec::new();
    for page in 0..page_count {
        let mut top = 60.0;
        let mut push = |text: String, size: f32, bold: bool, gap: f32| {
            lines.push(
                LineRecord::new(text, size, bold)
                    .on_page(page)
                    .with_bbox(BBox::new(72.0, top, 540.0, top + size))
                    .with_gap(gap),
            );
            top += size + gap;
        };

        push(format!("{}. Chapter {}", page + 1, page + 1), 16.0, true, 24.0);
        for sub in 1..=2 {
            push(format!("{}.{} Topic {}", page + 1, sub, sub), 13.0, true, 12.0);
            for body in 0..8 {
                push(
                    format!("Body line {} with several ordinary words in it.", body),
                    11.0,
                    false,
                    2.0,
                );
            }
        }
    }
    lines
}

/// Benchmark PDF version detection.
fn bench_detection(c: &mut Criterion) {
    let pdf_data = b"%PDF-1.7\n%\xE2\xE3\xCF\xD3\n1 0 obj\n<< >>\nendobj\n";
    let non_pdf_data = b"Not a PDF file at all, just random text content";

    c.bench_function("detect_valid_pdf", |b| {
        b.iter(|| docsift::detect_version_from_bytes(black_box(pdf_data)).is_ok());
    });

    c.bench_function("detect_non_pdf", |b| {
        b.iter(|| docsift::detect_version_from_bytes(black_box(non_pdf_data)).is_err());
    });
}

/// Benchmark classification and refinement at various document sizes.
fn bench_outline(c: &mut Criterion) {
    let mut group = c.benchmark_group("outline");
    let extractor = StructureExtractor::default();

    for page_count in [1, 10, 50].iter() {
        let lines = create_lines(*page_count);
        group.bench_function(format!("{}_pages", page_count), |b| {
            b.iter(|| extractor.outline(black_box(&lines)));
        });
    }

    group.finish();
}

/// Benchmark ranking with the hashing embedder.
fn bench_ranking(c: &mut Criterion) {
    let sections: Vec<Section> = (0..100)
        .map(|i| {
            Section::new(
                format!("doc{}.pdf", i % 7),
                (i % 12) as u32 + 1,
                "Coastal marshes host herons and waders. Surveys run weekly. Counts are shared.",
                format!("Section {}", i),
            )
        })
        .collect();
    let query = Query::new("Ecologist", "Plan a weekly bird survey of the marsh");
    let embedder = HashingEmbedder::default();
    let ranker = RelevanceRanker::new(&embedder, RankOptions::default());

    c.bench_function("rank_100_sections", |b| {
        b.iter(|| ranker.rank(black_box(&query), black_box(&sections)));
    });
}

criterion_group!(benches, bench_detection, bench_outline, bench_ranking);
criterion_main!(benches);
