use criterion::{black_box, criterion_group, criterion_main, Criterion};

use antigaspi_core::model::{AnswerOption, Question, QuestionKind, ScoringRange};
use antigaspi_core::scoring::{parse_decimal, score_numeric, total_bounds};

fn numeric_question(range_count: usize) -> Question {
    let mut ranges: Vec<ScoringRange> = (0..range_count)
        .map(|i| ScoringRange {
            min: Some(i as f64 * 10.0),
            max: Some(i as f64 * 10.0 + 9.0),
            score: Some((i % 4) as f64 + 1.0),
            ..Default::default()
        })
        .collect();
    ranges.push(ScoringRange {
        value: Some("aucun".into()),
        score: Some(0.0),
        default_score: Some(2.0),
        ..Default::default()
    });
    Question {
        id: 1,
        text: "bench".into(),
        kind: QuestionKind::Numeric { unit: None, ranges },
    }
}

fn choice_question(id: u32) -> Question {
    Question {
        id,
        text: "bench".into(),
        kind: QuestionKind::MultipleChoice {
            options: (0..4)
                .map(|i| AnswerOption {
                    text: format!("option {i}"),
                    score: i as f64 + 1.0,
                })
                .collect(),
        },
    }
}

fn bench_parse_decimal(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_decimal");

    group.bench_function("integer", |b| b.iter(|| parse_decimal(black_box("42"))));
    group.bench_function("comma", |b| b.iter(|| parse_decimal(black_box(" 12,75"))));
    group.bench_function("suffix", |b| {
        b.iter(|| parse_decimal(black_box("3.5e2 kg")))
    });
    group.bench_function("token", |b| b.iter(|| parse_decimal(black_box("aucun"))));

    group.finish();
}

fn bench_score_numeric(c: &mut Criterion) {
    let mut group = c.benchmark_group("score_numeric");

    let small = numeric_question(4);
    group.bench_function("first_range", |b| {
        b.iter(|| score_numeric(black_box(&small), black_box("3")))
    });
    group.bench_function("token", |b| {
        b.iter(|| score_numeric(black_box(&small), black_box("AUCUN")))
    });

    let large = numeric_question(100);
    group.bench_function("last_of_100", |b| {
        b.iter(|| score_numeric(black_box(&large), black_box("995")))
    });

    group.finish();
}

fn bench_total_bounds(c: &mut Criterion) {
    let mut group = c.benchmark_group("total_bounds");

    let questions: Vec<Question> = (0..50)
        .map(|i| {
            if i % 2 == 0 {
                choice_question(i)
            } else {
                Question {
                    id: i,
                    ..numeric_question(8)
                }
            }
        })
        .collect();
    group.bench_function("50_questions", |b| {
        b.iter(|| total_bounds(black_box(&questions)))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_parse_decimal,
    bench_score_numeric,
    bench_total_bounds
);
criterion_main!(benches);
