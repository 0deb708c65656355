use std::collections::{BTreeMap, HashSet};

use anyhow::{Result, bail};
use chrono::Datelike;

use crate::calendar::ListMonth;
use crate::record::{PlayerRecord, Title, parse_line};

/// Title logic only tracks young holders: computed ages at or above this
/// cap are ignored, as are non-positive ages (data errors).
pub const YOUNG_AGE_CAP: i32 = 25;

/// What `TitleHistory::first_year` means. The upstream behavior resets it on
/// every title change, so it is the year of the latest change rather than
/// the true first sighting; `FirstAppearance` keeps the year the name first
/// entered the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FirstYearPolicy {
    #[default]
    TitleChange,
    FirstAppearance,
}

/// Per-name sequence of (title, age-at-attainment) pairs, appended to only
/// when the observed title differs from the last recorded one. Consecutive
/// entries therefore never repeat a title, but downgrades are recorded as
/// printed in the source list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleHistory {
    pub first_year: i32,
    pub titles: Vec<(Title, i32)>,
}

/// First year a name's rating met the configured threshold, and the rating
/// it did so with. Immutable once created; later higher ratings never
/// replace it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingAchiever {
    pub first_year: i32,
    pub rating: u32,
}

/// Final tables of one aggregation run. Ordered maps so identical input
/// yields identical iteration order, and with it identical report bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateResults {
    pub federation: String,
    pub rating_threshold: Option<u32>,
    pub title_histories: BTreeMap<String, TitleHistory>,
    pub young_im_counts: BTreeMap<i32, u32>,
    pub young_gm_counts: BTreeMap<i32, u32>,
    pub rating_achievers: BTreeMap<String, RatingAchiever>,
    pub rating_count_per_year: BTreeMap<i32, u32>,
}

/// One aggregation run over a chronological stream of monthly snapshots.
/// Owns every piece of first-occurrence state (seen-IM/seen-GM names,
/// achiever entries), so its lifecycle is exactly one run.
pub struct Aggregation {
    federation: String,
    federation_upper: String,
    rating_threshold: Option<u32>,
    policy: FirstYearPolicy,
    last_applied: Option<ListMonth>,
    title_histories: BTreeMap<String, TitleHistory>,
    seen_ims: HashSet<String>,
    seen_gms: HashSet<String>,
    young_im_counts: BTreeMap<i32, u32>,
    young_gm_counts: BTreeMap<i32, u32>,
    rating_achievers: BTreeMap<String, RatingAchiever>,
    rating_count_per_year: BTreeMap<i32, u32>,
}

impl Aggregation {
    pub fn new(federation: &str, rating_threshold: Option<u32>, policy: FirstYearPolicy) -> Self {
        Self {
            federation: federation.to_string(),
            federation_upper: federation.to_uppercase(),
            rating_threshold,
            policy,
            last_applied: None,
            title_histories: BTreeMap::new(),
            seen_ims: HashSet::new(),
            seen_gms: HashSet::new(),
            young_im_counts: BTreeMap::new(),
            young_gm_counts: BTreeMap::new(),
            rating_achievers: BTreeMap::new(),
            rating_count_per_year: BTreeMap::new(),
        }
    }

    /// Apply one monthly snapshot. Snapshots must arrive in strictly
    /// ascending (year, month) order; every first-occurrence rule depends on
    /// earlier months having been fully applied, so out-of-order input is
    /// rejected before any line is read.
    pub fn apply_snapshot(&mut self, month: ListMonth, text: &str) -> Result<()> {
        if let Some(last) = self.last_applied
            && month <= last
        {
            bail!("snapshot {month} supplied after {last}; snapshots must be strictly chronological");
        }
        for line in text.lines() {
            if let Some(record) = parse_line(line, &self.federation_upper) {
                self.apply_record(month.year, &record);
            }
        }
        self.last_applied = Some(month);
        Ok(())
    }

    /// Apply one already-tokenized record observed in `year`.
    pub fn apply_record(&mut self, year: i32, record: &PlayerRecord) {
        // Threshold tracking is independent of titles and birth dates.
        if let (Some(threshold), Some(rating)) = (self.rating_threshold, record.rating)
            && rating >= threshold
            && !self.rating_achievers.contains_key(&record.name)
        {
            self.rating_achievers.insert(
                record.name.clone(),
                RatingAchiever {
                    first_year: year,
                    rating,
                },
            );
            *self.rating_count_per_year.entry(year).or_insert(0) += 1;
        }

        let Some(title) = record.title else {
            return;
        };
        let Some(birth_date) = record.birth_date else {
            return;
        };
        // Calendar-year subtraction only; downstream counts depend on this
        // definition even where full date arithmetic would differ.
        let age = year - birth_date.year();
        if age >= YOUNG_AGE_CAP || age <= 0 {
            return;
        }

        match self.title_histories.get_mut(&record.name) {
            None => {
                self.title_histories.insert(
                    record.name.clone(),
                    TitleHistory {
                        first_year: year,
                        titles: vec![(title, age)],
                    },
                );
            }
            Some(history) => {
                let last_title = history.titles.last().map(|(t, _)| *t);
                if last_title != Some(title) {
                    history.titles.push((title, age));
                    if self.policy == FirstYearPolicy::TitleChange {
                        history.first_year = year;
                    }
                }
            }
        }

        match title {
            Title::Im => {
                if self.seen_ims.insert(record.name.clone()) {
                    *self.young_im_counts.entry(year).or_insert(0) += 1;
                }
            }
            Title::Gm => {
                if self.seen_gms.insert(record.name.clone()) {
                    *self.young_gm_counts.entry(year).or_insert(0) += 1;
                }
            }
            Title::Fm => {}
        }
    }

    pub fn into_results(self) -> AggregateResults {
        AggregateResults {
            federation: self.federation,
            rating_threshold: self.rating_threshold,
            title_histories: self.title_histories,
            young_im_counts: self.young_im_counts,
            young_gm_counts: self.young_gm_counts,
            rating_achievers: self.rating_achievers,
            rating_count_per_year: self.rating_count_per_year,
        }
    }
}

/// Single-pass convenience over an already-ordered snapshot sequence.
pub fn aggregate<'a, I>(
    snapshots: I,
    federation: &str,
    rating_threshold: Option<u32>,
) -> Result<AggregateResults>
where
    I: IntoIterator<Item = (ListMonth, &'a str)>,
{
    let mut run = Aggregation::new(federation, rating_threshold, FirstYearPolicy::default());
    for (month, text) in snapshots {
        run.apply_snapshot(month, text)?;
    }
    Ok(run.into_results())
}
