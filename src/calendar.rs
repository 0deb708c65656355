use chrono::{Datelike, Local};

pub const DEFAULT_START_YEAR: i32 = 2015;

const MONTH_TOKENS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// One monthly rating-list publication, identified by calendar year and month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListMonth {
    pub year: i32,
    pub month: u32,
}

impl ListMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    /// Lowercase month token used in FIDE archive names, e.g. "jan".
    pub fn token(&self) -> &'static str {
        MONTH_TOKENS[(self.month - 1) as usize]
    }

    /// Name of the downloadable archive, e.g. "standard_jan15frl.zip".
    pub fn archive_name(&self) -> String {
        format!("standard_{}{:02}frl.zip", self.token(), self.year.rem_euclid(100))
    }

    /// Name of the extracted rating list, e.g. "standard_jan15frl.txt".
    pub fn list_name(&self) -> String {
        format!("standard_{}{:02}frl.txt", self.token(), self.year.rem_euclid(100))
    }
}

impl std::fmt::Display for ListMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

/// Every month from January of `start_year` through `end`, ascending.
/// Months after `end` are never produced, so a run never asks for lists
/// that cannot have been published yet.
pub fn months_through(start_year: i32, end: ListMonth) -> Vec<ListMonth> {
    let mut out = Vec::new();
    for year in start_year..=end.year {
        for month in 1..=12u32 {
            if year == end.year && month > end.month {
                break;
            }
            out.push(ListMonth { year, month });
        }
    }
    out
}

pub fn current_month() -> ListMonth {
    let now = Local::now();
    ListMonth {
        year: now.year(),
        month: now.month(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn archive_and_list_names() {
        let month = ListMonth::new(2015, 1).unwrap();
        assert_eq!(month.archive_name(), "standard_jan15frl.zip");
        assert_eq!(month.list_name(), "standard_jan15frl.txt");
        let month = ListMonth::new(2023, 12).unwrap();
        assert_eq!(month.archive_name(), "standard_dec23frl.zip");
    }

    #[test]
    fn rejects_invalid_month() {
        assert!(ListMonth::new(2020, 0).is_none());
        assert!(ListMonth::new(2020, 13).is_none());
    }

    #[test]
    fn months_stop_at_end() {
        let months = months_through(2015, ListMonth::new(2016, 3).unwrap());
        assert_eq!(months.len(), 12 + 3);
        assert_eq!(months.first().copied(), ListMonth::new(2015, 1));
        assert_eq!(months.last().copied(), ListMonth::new(2016, 3));
    }

    #[test]
    fn months_are_strictly_ascending() {
        let months = months_through(2019, ListMonth::new(2021, 7).unwrap());
        assert!(months.windows(2).all(|pair| pair[0] < pair[1]));
    }
}
