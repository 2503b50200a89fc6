//! Ordering rules shared by the node tree sort and the DOM child sort.
//!
//! All functions are stateless and total: every pair resolves to
//! `Less`, `Equal` or `Greater`.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

/// Length of the territory prefix pointer labels start with.
const TERRITORY_PREFIX_LEN: usize = 2;

/// Suffix marking the human-readable form of a pointed-to list.
const PDF_SUFFIX: &str = "pdf";

/// Ordinary ascending string order.
pub fn lexical(a: &str, b: &str) -> Ordering {
    a.cmp(b)
}

/// Descending string order.
pub fn reverse_lexical(a: &str, b: &str) -> Ordering {
    b.cmp(a)
}

/// Order of pointer labels (`"{territory} - {mime type}"`).
///
/// Labels are grouped by their 2-character territory prefix. Inside a
/// group the PDF pointer goes after the XML one, the rest is
/// reverse-lexical. A label too short to carry a prefix is compared as a
/// whole string.
pub fn compare_pointer_labels(a: &str, b: &str) -> Ordering {
    let (Some(prefix_a), Some(prefix_b)) = (a.get(..TERRITORY_PREFIX_LEN), b.get(..TERRITORY_PREFIX_LEN)) else {
        return lexical(a, b);
    };

    match prefix_a.cmp(prefix_b) {
        Ordering::Equal => match (a.ends_with(PDF_SUFFIX), b.ends_with(PDF_SUFFIX)) {
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            _ => reverse_lexical(a, b),
        },
        other => other,
    }
}

/// Order of history entries by status starting time, entries without a time last.
///
/// Two entries without a time are `Equal`; callers use a stable sort so
/// they keep their original relative order.
pub fn compare_status_times(a: Option<&DateTime<Utc>>, b: Option<&DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    #[rstest]
    #[case("AT - application/vnd.etsi.tsl+xml", "BE - application/vnd.etsi.tsl+xml", Ordering::Less)]
    #[case("BE - application/pdf", "AT - application/vnd.etsi.tsl+xml", Ordering::Greater)]
    #[case("AT - application/pdf", "AT - application/vnd.etsi.tsl+xml", Ordering::Greater)]
    #[case("AT - application/vnd.etsi.tsl+xml", "AT - application/pdf", Ordering::Less)]
    #[case("AT - a", "AT - b", Ordering::Greater)]
    #[case("AT - same", "AT - same", Ordering::Equal)]
    fn given_pointer_labels_when_compared_then_follow_territory_and_pdf_rules(
        #[case] a: &str,
        #[case] b: &str,
        #[case] expected: Ordering,
    ) {
        assert_eq!(compare_pointer_labels(a, b), expected);
    }

    #[rstest]
    #[case("A", "AT - x", Ordering::Less)]
    #[case("AT - x", "A", Ordering::Greater)]
    #[case("", "", Ordering::Equal)]
    #[case("B", "A", Ordering::Greater)]
    fn given_short_pointer_label_when_compared_then_falls_back_to_full_string(
        #[case] a: &str,
        #[case] b: &str,
        #[case] expected: Ordering,
    ) {
        assert_eq!(compare_pointer_labels(a, b), expected);
    }

    #[test]
    fn given_multibyte_prefix_when_compared_then_does_not_panic() {
        // '€' is three bytes wide, byte 2 is not a char boundary
        assert_eq!(compare_pointer_labels("€x", "AT"), lexical("€x", "AT"));
    }

    #[test]
    fn given_times_when_compared_then_missing_sorts_last() {
        let early = Utc.with_ymd_and_hms(2016, 6, 30, 22, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(compare_status_times(Some(&early), Some(&late)), Ordering::Less);
        assert_eq!(compare_status_times(Some(&late), None), Ordering::Less);
        assert_eq!(compare_status_times(None, Some(&early)), Ordering::Greater);
        assert_eq!(compare_status_times(None, None), Ordering::Equal);
    }
}
