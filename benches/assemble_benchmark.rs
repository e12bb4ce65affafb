//! Benchmarks for docfuse reconstruction performance.
//!
//! Run with: cargo bench
//!
//! These benchmarks use synthetic layout data sized like real extractor
//! output.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use docfuse::{
    assemble, attach_style, normalize, BoundingBox, LayoutBlock, NormalizeOptions,
    OverlayOptions, Page, StyleSpan, TableCell,
};

/// Creates a document with `page_count` letter pages of `per_page` blocks,
/// in the cumulative coordinate scope extractors emit.
fn create_cumulative_blocks(page_count: usize, per_page: usize) -> (Vec<Page>, Vec<LayoutBlock>) {
    let pages: Vec<Page> = (0..page_count).map(|i| Page::letter(i as u32)).collect();
    let mut blocks = Vec::with_capacity(page_count * per_page);
    for (p, page) in pages.iter().enumerate() {
        let offset = p as f32 * page.height;
        for b in 0..per_page {
            let y = offset + 40.0 + b as f32 * 18.0;
            blocks.push(LayoutBlock::new(
                (p * per_page + b) as u32,
                page.id,
                BoundingBox::new(72.0, y, 540.0, y + 14.0),
                format!("Line {b} of page {p} with enough text to be realistic."),
            ));
        }
    }
    (pages, blocks)
}

/// Creates one style span per block, aligned to the block footprint.
fn create_spans(blocks: &[LayoutBlock]) -> Vec<StyleSpan> {
    blocks
        .iter()
        .map(|block| {
            StyleSpan::new(
                block.page_id,
                block.bbox,
                "Helvetica",
                10.5,
                block.text.clone(),
            )
        })
        .collect()
}

/// Creates a cell set for an `rows x cols` table with a spanning header.
fn create_cells(rows: usize, cols: usize) -> Vec<TableCell> {
    let mut cells = Vec::with_capacity(rows * cols);
    cells.push(TableCell::spanning(0, 0, 1, cols, "Consolidated results").header());
    for r in 1..rows {
        for c in 0..cols {
            cells.push(TableCell::new(r, c, format!("{r}.{c}")));
        }
    }
    cells
}

/// Benchmark coordinate normalization at various document sizes.
fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");

    for page_count in [1, 10, 50].iter() {
        let (pages, blocks) = create_cumulative_blocks(*page_count, 40);
        let options = NormalizeOptions::default();

        group.bench_function(format!("{}_pages", page_count), |b| {
            b.iter(|| normalize(black_box(&pages), black_box(&blocks), &options));
        });
    }

    group.finish();
}

/// Benchmark style overlay matching, the quadratic hot path.
fn bench_overlay(c: &mut Criterion) {
    let mut group = c.benchmark_group("overlay");

    for per_page in [20, 100].iter() {
        let (pages, blocks) = create_cumulative_blocks(5, *per_page);
        let options = NormalizeOptions::default();
        let blocks = normalize(&pages, &blocks, &options);
        let spans = create_spans(&blocks);

        group.bench_function(format!("{}_blocks_per_page", per_page), |b| {
            b.iter(|| attach_style(black_box(&blocks), black_box(&spans), &OverlayOptions::default()));
        });
    }

    group.finish();
}

/// Benchmark grid assembly at various table sizes.
fn bench_assemble(c: &mut Criterion) {
    let mut group = c.benchmark_group("assemble");

    for (rows, cols) in [(5, 4), (50, 12), (500, 20)].iter() {
        let cells = create_cells(*rows, *cols);

        group.bench_function(format!("{}x{}", rows, cols), |b| {
            b.iter(|| assemble(black_box(&cells)).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_normalize, bench_overlay, bench_assemble);
criterion_main!(benches);
