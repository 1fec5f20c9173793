//! Benchmarks for doc-compare
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::path::PathBuf;

const SAMPLE_PAGE: &str = "Invoice  No. 2024-118\u{00A0}issued 12 , 5 EUR\n\
    Total amount due: 1,250.00 E U R\r\nPayment within 30 days of receipt. \
    The supplier reserves the right to charge interest on late pay ments.";

fn benchmark_normalize(c: &mut Criterion) {
    use doc_compare::text::normalize;

    let page = SAMPLE_PAGE.repeat(40);

    c.bench_function("normalize_page", |b| {
        b.iter(|| black_box(normalize(black_box(&page))))
    });
}

fn benchmark_diff(c: &mut Criterion) {
    use doc_compare::compare::MAX_DIFF_ITEMS;
    use doc_compare::text::{diff_tokens, normalize};

    let old = normalize(&SAMPLE_PAGE.repeat(40));
    let new = normalize(&SAMPLE_PAGE.replace("30 days", "60 days").repeat(40));

    c.bench_function("diff_tokens", |b| {
        b.iter(|| black_box(diff_tokens(black_box(&old), black_box(&new), MAX_DIFF_ITEMS)))
    });
}

fn benchmark_queue_operations(c: &mut Criterion) {
    use doc_compare::pipeline::{CompareTask, Submission, TaskQueue};

    c.bench_function("queue_submit_recv", |b| {
        let (sender, receiver) = TaskQueue::new(10000).split();
        let mut seq = 0u64;

        b.iter(|| {
            let task = CompareTask::new(PathBuf::from("/old/1000234_invoice.pdf"), seq);
            seq += 1;
            match sender.try_submit(task).unwrap() {
                Submission::Queued => {}
                Submission::Full(task) => {
                    black_box(task);
                }
            }
            black_box(receiver.try_recv());
        })
    });
}

criterion_group!(
    benches,
    benchmark_normalize,
    benchmark_diff,
    benchmark_queue_operations
);
criterion_main!(benches);
