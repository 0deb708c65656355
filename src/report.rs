use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::aggregate::AggregateResults;

/// Write the report files into `dir` and return their paths. The two
/// rating reports exist only when a threshold was configured.
pub fn write_reports(dir: &Path, results: &AggregateResults) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    let path = dir.join(format!("title_holders_{}.txt", results.federation));
    write_file(&path, &render_title_holders(results))?;
    written.push(path);

    let path = dir.join("statistics.txt");
    write_file(&path, &render_title_statistics(results))?;
    written.push(path);

    if let Some(threshold) = results.rating_threshold {
        let path = dir.join(format!("rating_achievers_{threshold}.txt"));
        write_file(&path, &render_rating_achievers(results))?;
        written.push(path);

        let path = dir.join(format!("rating_achievers_{threshold}_count_per_year.txt"));
        write_file(&path, &render_rating_counts(results, threshold))?;
        written.push(path);
    }

    Ok(written)
}

/// One line per name, names in order:
/// `<name> - <T> at age <a>[; <T> at age <a>]* (first appearance: <year>)`
pub fn render_title_holders(results: &AggregateResults) -> String {
    let mut out = String::new();
    for (name, history) in &results.title_histories {
        let titles = history
            .titles
            .iter()
            .map(|(title, age)| format!("{title} at age {age}"))
            .collect::<Vec<_>>()
            .join("; ");
        out.push_str(&format!(
            "{name} - {titles} (first appearance: {})\n",
            history.first_year
        ));
    }
    out
}

/// One line per year over the union of IM and GM years.
pub fn render_title_statistics(results: &AggregateResults) -> String {
    let years: BTreeSet<i32> = results
        .young_im_counts
        .keys()
        .chain(results.young_gm_counts.keys())
        .copied()
        .collect();
    let mut out = String::new();
    for year in years {
        let im = results.young_im_counts.get(&year).copied().unwrap_or(0);
        let gm = results.young_gm_counts.get(&year).copied().unwrap_or(0);
        out.push_str(&format!(
            "{year}: {im} new young IMs overall, {gm} new young GMs overall\n"
        ));
    }
    out
}

/// One line per achiever, ordered by first year (name order within a year).
pub fn render_rating_achievers(results: &AggregateResults) -> String {
    let mut achievers: Vec<_> = results.rating_achievers.iter().collect();
    achievers.sort_by_key(|(_, info)| info.first_year);
    let mut out = String::new();
    for (name, info) in achievers {
        out.push_str(&format!(
            "{name} achieved a rating of {} for the first time in {}\n",
            info.rating, info.first_year
        ));
    }
    out
}

/// One line per year with the count of first-time threshold crossers.
pub fn render_rating_counts(results: &AggregateResults, threshold: u32) -> String {
    let mut out = String::new();
    for (year, count) in &results.rating_count_per_year {
        out.push_str(&format!(
            "{year}: {count} new players achieved a rating of {threshold} or above for the first time\n"
        ));
    }
    out
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("write report {}", path.display()))
}
