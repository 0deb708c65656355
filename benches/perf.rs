use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};

use fide_trends::aggregate::{Aggregation, FirstYearPolicy};
use fide_trends::calendar::ListMonth;
use fide_trends::record::parse_line;

static SNAPSHOT: &str = include_str!("../tests/fixtures/standard_jan15frl.txt");

fn synthetic_snapshot(players: u32) -> String {
    let mut out = String::new();
    for idx in 0..players {
        let birth = 1990 + (idx % 20) as i32;
        let field = match idx % 4 {
            0 => "IM".to_string(),
            1 => "GM".to_string(),
            2 => "FM".to_string(),
            _ => format!("{}", 2000 + idx % 600),
        };
        out.push_str(&format!(
            "1{idx:07} Player{idx} No{idx} XYZ M {field} 0 0 20 {birth}\n"
        ));
    }
    out
}

fn bench_tokenize_snapshot(c: &mut Criterion) {
    c.bench_function("tokenize_snapshot", |b| {
        b.iter(|| {
            let count = black_box(SNAPSHOT)
                .lines()
                .filter_map(|line| parse_line(line, "XYZ"))
                .count();
            black_box(count);
        })
    });
}

fn bench_aggregate_year(c: &mut Criterion) {
    let snapshots: Vec<(ListMonth, String)> = (1..=12)
        .map(|m| {
            (
                ListMonth::new(2018, m).unwrap(),
                synthetic_snapshot(2_000),
            )
        })
        .collect();

    c.bench_function("aggregate_year", |b| {
        b.iter(|| {
            let mut run = Aggregation::new("xyz", Some(2300), FirstYearPolicy::default());
            for (month, text) in &snapshots {
                run.apply_snapshot(*month, black_box(text)).unwrap();
            }
            let results = run.into_results();
            black_box(results.title_histories.len());
        })
    });
}

criterion_group!(perf, bench_tokenize_snapshot, bench_aggregate_year);
criterion_main!(perf);
