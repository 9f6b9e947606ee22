use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};

use docsum::aggregate::RunningAggregator;
use docsum::config::{InputConfig, ValueProfile};
use docsum::filter::{Filter, Party};
use docsum::record::tokenizer::Fields;
use docsum::record::LineParser;

const LINES: usize = 10_000;

fn stock_lines() -> Vec<Vec<u8>> {
    (0..LINES)
        .map(|i| {
            format!(
                "FIDC;{i};2024-01-02;2024-07-01;ACME LTDA;11.222.333/0001-81;BANCO XYZ SA;33.000.167/0001-01;0.00;{}.00;{}.50;{}.25;OPEN;DM;1.5;180;{}\n",
                i % 997,
                i % 613,
                i % 401,
                i / 4
            )
            .into_bytes()
        })
        .collect()
}

fn bench_parse(c: &mut Criterion, name: &str, input: &InputConfig, filter: Filter) {
    let parser = LineParser::new(input, filter);
    let lines = stock_lines();
    let mut group = c.benchmark_group("line_parser");
    group.throughput(Throughput::Elements(LINES as u64));
    group.bench_function(name, |b| {
        let mut fields = Fields::new();
        b.iter(|| {
            for line in &lines {
                let mut buf = line.clone();
                black_box(parser.parse(black_box(&mut buf), &mut fields).ok());
            }
        });
    });
    group.finish();
}

fn bench_stock_no_filter(c: &mut Criterion) {
    bench_parse(c, "stock_no_filter", &InputConfig::default(), Filter::None);
}

fn bench_stock_id_filter(c: &mut Criterion) {
    let filter = Filter::government_id(Party::Seller, "11.222.333/0001-81");
    bench_parse(c, "stock_id_filter", &InputConfig::default(), filter);
}

fn bench_stock_contains_filter(c: &mut Criterion) {
    let filter = Filter::name_contains(Party::Sponsor, "xyz");
    bench_parse(c, "stock_contains_filter", &InputConfig::default(), filter);
}

fn bench_future_profile(c: &mut Criterion) {
    let input = InputConfig {
        values: ValueProfile::Future,
        ..InputConfig::default()
    };
    bench_parse(c, "future_no_filter", &input, Filter::None);
}

fn bench_parse_and_fold(c: &mut Criterion) {
    let parser = LineParser::new(&InputConfig::default(), Filter::None);
    let lines = stock_lines();
    let mut group = c.benchmark_group("line_parser");
    group.throughput(Throughput::Elements(LINES as u64));
    group.bench_function("parse_and_fold", |b| {
        let mut fields = Fields::new();
        b.iter(|| {
            let mut running = RunningAggregator::new();
            let mut partials = 0usize;
            for line in &lines {
                let mut buf = line.clone();
                if let Ok(parsed) = parser.parse(&mut buf, &mut fields) {
                    partials += usize::from(running.push(&parsed.record).is_some());
                }
            }
            black_box((partials, running.finish()));
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_stock_no_filter,
    bench_stock_id_filter,
    bench_stock_contains_filter,
    bench_future_profile,
    bench_parse_and_fold
);
criterion_main!(benches);
