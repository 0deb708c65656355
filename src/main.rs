use std::path::PathBuf;

use anyhow::{Context, Result};

use fide_trends::aggregate::{Aggregation, FirstYearPolicy};
use fide_trends::calendar;
use fide_trends::http_client::http_client;
use fide_trends::report;
use fide_trends::snapshot_store::SnapshotStore;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let federation = match args.first().map(|raw| raw.trim().to_lowercase()) {
        Some(code) if !code.is_empty() => code,
        _ => {
            eprintln!("Usage: fide_trends <federation_code> [rating_threshold]");
            std::process::exit(2);
        }
    };
    let rating_threshold = match args.get(1) {
        Some(raw) => Some(
            raw.trim()
                .parse::<u32>()
                .with_context(|| format!("invalid rating threshold {raw:?}"))?,
        ),
        None => None,
    };

    let start_year = start_year_from_env();
    let dir = data_dir_from_env()
        .or_else(SnapshotStore::default_dir)
        .context("unable to resolve data directory")?;
    let mut store = SnapshotStore::open(dir)?;

    let months = calendar::months_through(start_year, calendar::current_month());
    let client = http_client()?;
    let sync = store.sync(client, &months);
    println!(
        "Snapshots: {} downloaded, {} present, {} missing upstream",
        sync.downloaded, sync.already_present, sync.missing
    );
    if !sync.errors.is_empty() {
        println!("  download errors: {}", sync.errors.len());
        for err in sync.errors.iter().take(6) {
            println!("   - {err}");
        }
    }

    let mut run = Aggregation::new(&federation, rating_threshold, FirstYearPolicy::default());
    let mut processed = 0usize;
    for &month in &months {
        let Some(text) = store.read(month) else {
            continue;
        };
        run.apply_snapshot(month, &text)?;
        processed += 1;
    }
    let results = run.into_results();

    println!(
        "Processed {processed} monthly lists for federation {}",
        federation.to_uppercase()
    );
    println!("Young titled players tracked: {}", results.title_histories.len());
    if let Some(threshold) = rating_threshold {
        println!(
            "Players first reaching {threshold}: {}",
            results.rating_achievers.len()
        );
    }

    let written = report::write_reports(store.dir(), &results)?;
    for path in &written {
        println!("Wrote {}", path.display());
    }

    Ok(())
}

fn start_year_from_env() -> i32 {
    std::env::var("FIDE_TRENDS_START_YEAR")
        .ok()
        .and_then(|val| val.trim().parse::<i32>().ok())
        .unwrap_or(calendar::DEFAULT_START_YEAR)
}

fn data_dir_from_env() -> Option<PathBuf> {
    let raw = std::env::var("FIDE_TRENDS_DIR").ok()?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(PathBuf::from(trimmed))
}
