use criterion::{black_box, criterion_group, criterion_main, Criterion};
use opencv::core::{Mat, Point, Scalar, CV_8UC3};
use opencv::imgproc::{circle, FILLED, LINE_8};

use omr_scan::{AnswerExtractor, BubbleDetector};

/// Synthetic 100-bubble sheet, half the bubbles marked
fn synthetic_sheet() -> Mat {
    let mut sheet =
        Mat::new_rows_cols_with_default(480, 480, CV_8UC3, Scalar::new(255.0, 255.0, 255.0, 0.0))
            .unwrap();
    for i in 0..100 {
        let cx = 40 + (i % 10) * 40;
        let cy = 40 + (i / 10) * 40;
        let thickness = if i % 2 == 0 { FILLED } else { 3 };
        circle(
            &mut sheet,
            Point::new(cx, cy),
            14,
            Scalar::new(0.0, 0.0, 0.0, 0.0),
            thickness,
            LINE_8,
            0,
        )
        .unwrap();
    }
    sheet
}

fn benchmark_pipeline(c: &mut Criterion) {
    let sheet = synthetic_sheet();

    let detector = BubbleDetector::default();
    c.bench_function("detect_bubbles", |b| {
        b.iter(|| detector.detect(black_box(&sheet)).unwrap())
    });

    let extractor = AnswerExtractor::default();
    c.bench_function("extract_answers", |b| {
        b.iter(|| extractor.extract(black_box(&sheet)).unwrap())
    });
}

criterion_group!(benches, benchmark_pipeline);
criterion_main!(benches);
