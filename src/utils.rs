use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::cmp::Ordering;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Month-level formats, completed to the first of the month before parsing.
const MONTH_FORMATS: &[&str] = &["%Y-%m-%d", "%b %Y-%d", "%B %Y-%d"];

/// Numeric view of a chart value: missing and NaN values count as zero.
pub fn value_or_zero(value: Option<f64>) -> f64 {
    match value {
        Some(v) if !v.is_nan() => v,
        _ => 0.0,
    }
}

/// Parses a chart label as a point in time.
///
/// Accepts RFC 3339 timestamps, ISO dates with optional time, slash dates,
/// month buckets ("2024-03", "Mar 2024", "March 2024") and long-form dates
/// ("Mar 5, 2024"). Bare numbers are never dates.
pub fn parse_label_date(label: &str) -> Option<NaiveDateTime> {
    let label = label.trim();
    if label.is_empty() || label.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(label) {
        return Some(dt.naive_utc());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(label, format) {
            return Some(dt);
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(label, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    let month_start = format!("{}-01", label);
    for format in MONTH_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(&month_start, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    None
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum CharClass {
    Separator,
    Digit,
    Letter,
}

fn char_class(c: char) -> CharClass {
    if c.is_numeric() {
        CharClass::Digit
    } else if c.is_alphabetic() {
        CharClass::Letter
    } else {
        CharClass::Separator
    }
}

fn take_digits(chars: &[char], start: usize) -> (&[char], usize) {
    let end = chars[start..]
        .iter()
        .position(|c| !c.is_ascii_digit())
        .map_or(chars.len(), |offset| start + offset);
    (&chars[start..end], end)
}

fn compare_digit_runs(a: &[char], b: &[char]) -> Ordering {
    let trim = |run: &[char]| -> usize { run.iter().take_while(|&&c| c == '0').count() };
    let a = &a[trim(a)..];
    let b = &b[trim(b)..];
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Lowercases and strips diacritics, so "Éclair" folds to "eclair".
fn fold_label(label: &str) -> Vec<char> {
    label
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

fn compare_folded(a: &[char], b: &[char]) -> Ordering {
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        if a[i].is_ascii_digit() && b[j].is_ascii_digit() {
            let (run_a, next_i) = take_digits(a, i);
            let (run_b, next_j) = take_digits(b, j);
            let ordering = compare_digit_runs(run_a, run_b);
            if ordering != Ordering::Equal {
                return ordering;
            }
            i = next_i;
            j = next_j;
            continue;
        }

        let ordering = char_class(a[i])
            .cmp(&char_class(b[j]))
            .then_with(|| a[i].cmp(&b[j]));
        if ordering != Ordering::Equal {
            return ordering;
        }
        i += 1;
        j += 1;
    }

    (a.len() - i).cmp(&(b.len() - j))
}

/// Alphanumeric comparison that ignores case and accents, and compares runs
/// of digits by numeric value, so "Item 2" sorts before "Item 10".
///
/// Separators sort before digits, digits before letters.
pub fn compare_alphanumeric(a: &str, b: &str) -> Ordering {
    compare_folded(&fold_label(a), &fold_label(b))
}

/// A label parsed once for repeated comparison while sorting.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelKey {
    date: Option<NaiveDateTime>,
    folded: Vec<char>,
}

impl LabelKey {
    pub fn new(label: &str) -> Self {
        Self {
            date: parse_label_date(label),
            folded: fold_label(label),
        }
    }

    /// Chronological when both labels are dates, alphanumeric otherwise.
    pub fn compare(&self, other: &LabelKey) -> Ordering {
        match (self.date, other.date) {
            (Some(date_a), Some(date_b)) => date_a.cmp(&date_b),
            _ => compare_folded(&self.folded, &other.folded),
        }
    }
}

/// Label ordering used by label sorting: chronological when both labels are
/// dates, alphanumeric otherwise.
pub fn compare_labels(a: &str, b: &str) -> Ordering {
    LabelKey::new(a).compare(&LabelKey::new(b))
}

/// Stable merge sort that terminates for any comparator, including ones that
/// are not a total order. `slice::sort_by` may panic on those.
pub fn merge_sort_by<T, F>(items: Vec<T>, compare: &mut F) -> Vec<T>
where
    F: FnMut(&T, &T) -> Ordering,
{
    if items.len() <= 1 {
        return items;
    }

    let mut left = items;
    let right = left.split_off(left.len() / 2);
    let left = merge_sort_by(left, compare);
    let right = merge_sort_by(right, compare);

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();

    loop {
        // Ties take from the left run to keep the sort stable.
        let take_right = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => compare(r, l) == Ordering::Less,
            _ => break,
        };
        if take_right {
            merged.extend(right.next());
        } else {
            merged.extend(left.next());
        }
    }
    merged.extend(left);
    merged.extend(right);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn midnight(year: i32, month: u32, day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_value_or_zero() {
        assert_eq!(value_or_zero(Some(-4.5)), -4.5);
        assert_eq!(value_or_zero(None), 0.0);
        assert_eq!(value_or_zero(Some(f64::NAN)), 0.0);
        assert_eq!(value_or_zero(Some(f64::INFINITY)), f64::INFINITY);
    }

    #[test]
    fn test_parse_label_date_formats() {
        assert_eq!(parse_label_date("2023-02-28"), Some(midnight(2023, 2, 28)));
        assert_eq!(parse_label_date("2023/02/28"), Some(midnight(2023, 2, 28)));
        assert_eq!(parse_label_date("02/28/2023"), Some(midnight(2023, 2, 28)));
        assert_eq!(parse_label_date("2023-02"), Some(midnight(2023, 2, 1)));
        assert_eq!(parse_label_date("Feb 2023"), Some(midnight(2023, 2, 1)));
        assert_eq!(parse_label_date("February 2023"), Some(midnight(2023, 2, 1)));
        assert_eq!(parse_label_date("Feb 5, 2023"), Some(midnight(2023, 2, 5)));
        assert_eq!(
            parse_label_date("2023-02-05 13:30"),
            NaiveDate::from_ymd_opt(2023, 2, 5).unwrap().and_hms_opt(13, 30, 0)
        );
        assert_eq!(
            parse_label_date("2023-02-05T10:00:00+02:00"),
            NaiveDate::from_ymd_opt(2023, 2, 5).unwrap().and_hms_opt(8, 0, 0)
        );
    }

    #[test]
    fn test_parse_label_date_rejects_non_dates() {
        assert_eq!(parse_label_date(""), None);
        assert_eq!(parse_label_date("Groceries"), None);
        assert_eq!(parse_label_date("Item 10"), None);
        assert_eq!(parse_label_date("2023"), None);
        assert_eq!(parse_label_date("42"), None);
        assert_eq!(parse_label_date("2023-13"), None);
    }

    #[test]
    fn test_compare_alphanumeric_numbers() {
        assert_eq!(compare_alphanumeric("Item 2", "Item 10"), Ordering::Less);
        assert_eq!(compare_alphanumeric("Item 10", "Item 2"), Ordering::Greater);
        assert_eq!(compare_alphanumeric("item 007", "Item 7"), Ordering::Equal);
        assert_eq!(compare_alphanumeric("a", "B"), Ordering::Less);
        assert_eq!(compare_alphanumeric("Rent", "rent"), Ordering::Equal);
        assert_eq!(compare_alphanumeric("Tax", "Taxes"), Ordering::Less);
        assert_eq!(compare_alphanumeric("9 lives", "Apple"), Ordering::Less);
        assert_eq!(compare_alphanumeric(" x", "1"), Ordering::Less);
    }

    #[test]
    fn test_compare_alphanumeric_ignores_accents() {
        assert_eq!(compare_alphanumeric("café", "Cafe"), Ordering::Equal);
        assert_eq!(compare_alphanumeric("Éclair", "Zoo"), Ordering::Less);
        assert_eq!(compare_alphanumeric("Éclair", "apple"), Ordering::Greater);
        assert_eq!(compare_alphanumeric("Crème 10", "creme 9"), Ordering::Greater);
    }

    #[test]
    fn test_label_key_dates_then_folded_text() {
        let jan = LabelKey::new("Jan 2024");
        let dec = LabelKey::new("2023-12-01");
        assert_eq!(jan.compare(&dec), Ordering::Greater);

        let accented = LabelKey::new("Épicerie");
        let plain = LabelKey::new("epicerie");
        assert_eq!(accented.compare(&plain), Ordering::Equal);
        assert_eq!(accented.compare(&LabelKey::new("Groceries")), Ordering::Less);
    }

    #[test]
    fn test_compare_labels_prefers_dates() {
        // Alphabetically "Feb" < "Jan", chronologically the reverse.
        assert_eq!(compare_labels("Jan 2024", "Feb 2024"), Ordering::Less);
        assert_eq!(compare_labels("2024-01-31", "2023-12-01"), Ordering::Greater);
        assert_eq!(compare_labels("Jan 2024", "Groceries"), Ordering::Greater);
    }

    #[test]
    fn test_merge_sort_is_stable() {
        let items = vec![(3, 'a'), (1, 'b'), (3, 'c'), (1, 'd'), (2, 'e')];
        let sorted = merge_sort_by(items, &mut |a: &(i32, char), b: &(i32, char)| {
            a.0.cmp(&b.0)
        });
        assert_eq!(
            sorted,
            vec![(1, 'b'), (1, 'd'), (2, 'e'), (3, 'a'), (3, 'c')]
        );
    }

    #[test]
    fn test_merge_sort_tolerates_inconsistent_comparator() {
        let items: Vec<u32> = (0..50).collect();
        let mut flip = false;
        let sorted = merge_sort_by(items, &mut |_: &u32, _: &u32| {
            flip = !flip;
            if flip {
                Ordering::Less
            } else {
                Ordering::Greater
            }
        });
        let mut seen = sorted.clone();
        seen.sort_unstable();
        assert_eq!(seen, (0..50).collect::<Vec<_>>());
    }
}
