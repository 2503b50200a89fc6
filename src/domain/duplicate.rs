//! Duplication tag convention for multi-value string items.
//!
//! A language code (or any short item) that must appear more than once in a
//! list is tagged with a delimiter and a counter, e.g. `en_2`. The tag is
//! stripped again before the value is written to XML.

use tracing::instrument;

use crate::domain::{DomainError, DomainResult};

/// Separates an item from its duplication counter.
pub const DUPLICATION_DELIMITER: char = '_';

/// Length of the prefix that identifies items of the same family.
const PREFIX_LEN: usize = 2;

/// Tag `entry` with `count`, unless it already carries a tag.
pub fn duplicate(entry: &str, count: u32) -> String {
    if entry.contains(DUPLICATION_DELIMITER) {
        return entry.to_string();
    }
    format!("{entry}{DUPLICATION_DELIMITER}{count}")
}

/// Strip the duplication tag, returning everything before the first delimiter.
pub fn clean_item(item: &str) -> &str {
    match item.split_once(DUPLICATION_DELIMITER) {
        Some((head, _)) => head,
        None => item,
    }
}

/// Next free counter for `new_item` among `items`.
///
/// Only items sharing the 2-character prefix of `new_item` and carrying a
/// tag take part. Returns one more than the highest counter found, or 1.
#[instrument(level = "trace", skip(items))]
pub fn determine_highest_counter<S: AsRef<str>>(items: &[S], new_item: &str) -> DomainResult<u32> {
    let prefix = new_item.get(..PREFIX_LEN).unwrap_or(new_item);
    let mut highest = 0;

    for item in items.iter().map(AsRef::as_ref) {
        if !item.starts_with(prefix) {
            continue;
        }
        let Some((_, suffix)) = item.split_once(DUPLICATION_DELIMITER) else {
            continue;
        };
        let counter: u32 = suffix
            .parse()
            .map_err(|_| DomainError::InvalidDuplicationCounter {
                item: item.to_string(),
                suffix: suffix.to_string(),
            })?;
        highest = highest.max(counter);
    }

    Ok(highest + 1)
}
