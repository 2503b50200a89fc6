//! Tests for the duplication tag convention on language lists

use rstest::rstest;

use tslkit::domain::duplicate::{clean_item, determine_highest_counter, duplicate};
use tslkit::domain::{DomainError, MultiLangName};

#[rstest]
#[case(&[], "en", 1)]
#[case(&["en"], "en", 1)]
#[case(&["en", "en_1"], "en", 2)]
#[case(&["en", "en_3", "en_1"], "en", 4)]
#[case(&["de_5", "en"], "en", 1)]
#[case(&["en_2"], "english", 3)]
fn given_items_when_determine_highest_counter_then_next_free(
    #[case] items: &[&str],
    #[case] new_item: &str,
    #[case] expected: u32,
) {
    assert_eq!(determine_highest_counter(items, new_item).unwrap(), expected);
}

#[test]
fn given_tagged_item_with_text_suffix_when_determine_counter_then_error() {
    let result = determine_highest_counter(&["en_x"], "en");

    assert_eq!(
        result,
        Err(DomainError::InvalidDuplicationCounter {
            item: "en_x".into(),
            suffix: "x".into(),
        })
    );
}

#[rstest]
#[case("en", "en")]
#[case("en_2", "en")]
#[case("en_2_3", "en")]
#[case("", "")]
fn given_item_when_cleaned_then_prefix_before_first_delimiter(#[case] item: &str, #[case] expected: &str) {
    assert_eq!(clean_item(item), expected);
}

#[test]
fn given_counter_when_duplicate_then_clean_item_restores_entry() {
    let tagged = duplicate("de", 7);

    assert_eq!(tagged, "de_7");
    assert_eq!(clean_item(&tagged), "de");
}

#[test]
fn given_names_when_duplicated_twice_then_counters_increase() {
    let mut names = vec![MultiLangName::new("en", "Supervisory Body")];

    MultiLangName::duplicate_in(&mut names, "en", "Supervisory Body Austria").unwrap();
    MultiLangName::duplicate_in(&mut names, "en", "Austrian Supervisory Body").unwrap();

    let langs: Vec<&str> = names.iter().map(|n| n.lang.as_str()).collect();
    assert_eq!(langs, vec!["en", "en_1", "en_2"]);
    assert_eq!(MultiLangName::preferred(&names), Some("Supervisory Body"));
}
