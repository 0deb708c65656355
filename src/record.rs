use chrono::NaiveDate;

/// Trailing flag marking a player as inactive in the list.
pub const INACTIVITY_MARKER: char = 'i';

// Positional token indices of the whitespace-split line. The rating list
// puts the surname and first name in adjacent columns, and the same column
// holds either the title code or, when purely numeric, the standard rating.
const NAME_START_IDX: usize = 1;
const TITLE_RATING_IDX: usize = 5;
const BIRTH_DATE_IDX: usize = 9;
const MIN_TOKENS: usize = 10;

const BIRTH_DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y.%m.%d", "%Y/%m/%d", "%d.%m.%Y"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Title {
    Fm,
    Im,
    Gm,
}

impl Title {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "FM" => Some(Self::Fm),
            "IM" => Some(Self::Im),
            "GM" => Some(Self::Gm),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fm => "FM",
            Self::Im => "IM",
            Self::Gm => "GM",
        }
    }
}

impl std::fmt::Display for Title {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parsed line of a rating list. `title` and `rating` are read from the
/// same column and are mutually exclusive in practice: an all-digit token is
/// a rating, anything else is tried as a title code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerRecord {
    pub name: String,
    pub title: Option<Title>,
    pub rating: Option<u32>,
    pub birth_date: Option<NaiveDate>,
}

/// Coarse relevance filter: the uppercased federation code as a raw
/// substring of the whole line, not a column-bound compare. A code embedded
/// in another field would also match; kept in this one predicate so a
/// column-exact check can replace it without touching the aggregator.
pub fn line_matches_federation(line: &str, federation_upper: &str) -> bool {
    line.contains(federation_upper)
}

/// Parse one raw line for the given (already uppercased) federation code.
/// Returns `None` for lines of other federations, inactive players, and
/// lines with too few columns.
pub fn parse_line(line: &str, federation_upper: &str) -> Option<PlayerRecord> {
    if !line_matches_federation(line, federation_upper) {
        return None;
    }
    let trimmed = line.trim();
    if trimmed.ends_with(INACTIVITY_MARKER) {
        return None;
    }
    let tokens: Vec<&str> = trimmed.split_whitespace().collect();
    if tokens.len() < MIN_TOKENS {
        return None;
    }

    let name = format!("{} {}", tokens[NAME_START_IDX], tokens[NAME_START_IDX + 1]);
    let field = tokens[TITLE_RATING_IDX];
    let rating = if field.bytes().all(|b| b.is_ascii_digit()) {
        field.parse::<u32>().ok()
    } else {
        None
    };
    let title = Title::from_token(field);
    let birth_date = parse_birth_date(tokens[BIRTH_DATE_IDX]);

    Some(PlayerRecord {
        name,
        title,
        rating,
        birth_date,
    })
}

/// Permissive birth-date parse: a handful of calendar formats, then a bare
/// four-digit birth year (the common case in the lists). Anything else is
/// treated as no usable birth date.
fn parse_birth_date(token: &str) -> Option<NaiveDate> {
    for format in BIRTH_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(token, format) {
            return Some(date);
        }
    }
    if token.len() == 4 && token.bytes().all(|b| b.is_ascii_digit()) {
        return NaiveDate::from_ymd_opt(token.parse().ok()?, 1, 1);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn titled_line_has_no_rating() {
        let record = parse_line("10500071 Doe John XYZ M IM 0 0 20 1996", "XYZ").unwrap();
        assert_eq!(record.name, "Doe John");
        assert_eq!(record.title, Some(Title::Im));
        assert_eq!(record.rating, None);
        assert_eq!(record.birth_date.map(|d| d.year()), Some(1996));
    }

    #[test]
    fn numeric_field_is_rating_not_title() {
        let record = parse_line("10500072 Roe Anna XYZ F 2250 10 0 20 1999", "XYZ").unwrap();
        assert_eq!(record.title, None);
        assert_eq!(record.rating, Some(2250));
    }

    #[test]
    fn unknown_title_token_is_no_title() {
        let record = parse_line("10500073 Woe Kim XYZ F WIM 0 0 20 2000", "XYZ").unwrap();
        assert_eq!(record.title, None);
        assert_eq!(record.rating, None);
    }

    #[test]
    fn inactive_line_is_discarded() {
        assert!(parse_line("10500075 Zoe Ida XYZ F 2300 0 0 20 1998 wi", "XYZ").is_none());
        assert!(parse_line("10500075 Zoe Ida XYZ F 2300 0 0 20 1998 i", "XYZ").is_none());
    }

    #[test]
    fn other_federation_is_ignored() {
        assert!(parse_line("10500076 Low Sam ABC M IM 0 0 20 1997", "XYZ").is_none());
    }

    #[test]
    fn short_line_is_skipped() {
        assert!(parse_line("10500077 Short XYZ row", "XYZ").is_none());
    }

    #[test]
    fn federation_match_is_raw_substring() {
        // Coarse filter by contract: the code matches anywhere on the line.
        assert!(line_matches_federation("10500078 Vexyzia Bo XYZ M 2400 0 0 20 1995", "XYZ"));
        assert!(line_matches_federation("id XYZGARBLE rest", "XYZ"));
        assert!(!line_matches_federation("10500078 Vexyzia Bo xyz M 2400", "XYZ"));
    }

    #[test]
    fn birth_date_formats() {
        assert_eq!(
            parse_birth_date("1996-03-12"),
            NaiveDate::from_ymd_opt(1996, 3, 12)
        );
        assert_eq!(
            parse_birth_date("1996.03.12"),
            NaiveDate::from_ymd_opt(1996, 3, 12)
        );
        assert_eq!(
            parse_birth_date("12.03.1996"),
            NaiveDate::from_ymd_opt(1996, 3, 12)
        );
        assert_eq!(parse_birth_date("1996"), NaiveDate::from_ymd_opt(1996, 1, 1));
        assert_eq!(parse_birth_date("0000"), NaiveDate::from_ymd_opt(0, 1, 1));
        assert_eq!(parse_birth_date("n/a"), None);
        assert_eq!(parse_birth_date("96"), None);
    }

    #[test]
    fn bad_birth_date_still_yields_record() {
        let record = parse_line("10500079 New Kid XYZ M 2210 0 0 20 unknown", "XYZ").unwrap();
        assert_eq!(record.rating, Some(2210));
        assert_eq!(record.birth_date, None);
    }
}
