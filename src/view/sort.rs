//! Sort stage: stable, type-aware ordering

use crate::core::field::{FieldValue, SortKey};
use crate::core::query::{SortDirection, SortSpec};
use crate::core::record::Record;
use std::cmp::Ordering;

/// Return the records ordered by `spec`
///
/// The sort is stable in both directions: records with equal keys keep their
/// input order. Descending reverses the comparison, not the output.
///
/// Records without a key for `spec.key` (missing field, null, boolean, NaN)
/// go last in both directions and keep their input order. When a column
/// mixes text and numbers, text comes first.
pub fn sort<T: Record>(records: &[T], spec: &SortSpec) -> Vec<T> {
    let values: Vec<Option<FieldValue>> = records
        .iter()
        .map(|record| record.field_value(&spec.key))
        .collect();

    let mut keyed: Vec<(Option<SortKey<'_>>, &T)> = values
        .iter()
        .map(|value| value.as_ref().and_then(FieldValue::sort_key))
        .zip(records)
        .collect();

    keyed.sort_by(|(a, _), (b, _)| compare_keys(a.as_ref(), b.as_ref(), spec.direction));

    keyed.into_iter().map(|(_, record)| record.clone()).collect()
}

/// Rank of a key: text, then numbers, then keyless
fn rank(key: Option<&SortKey<'_>>) -> u8 {
    match key {
        Some(SortKey::Text(_)) => 0,
        Some(SortKey::Number(_)) => 1,
        None => 2,
    }
}

fn compare_keys(
    a: Option<&SortKey<'_>>,
    b: Option<&SortKey<'_>>,
    direction: SortDirection,
) -> Ordering {
    let within = match (a, b) {
        (Some(SortKey::Text(a)), Some(SortKey::Text(b))) => compare_text(a, b),
        (Some(SortKey::Number(a)), Some(SortKey::Number(b))) => a.total_cmp(b),
        _ => return rank(a).cmp(&rank(b)),
    };

    match direction {
        SortDirection::Ascending => within,
        SortDirection::Descending => within.reverse(),
    }
}

/// Type-aware comparison of two field values, ascending
///
/// Text compares with [`compare_text`], numbers and dates numerically.
/// This is a total order: values without a sort key come after every
/// value that has one, and text comes before numbers.
pub fn compare_values(a: &FieldValue, b: &FieldValue) -> Ordering {
    compare_keys(
        a.sort_key().as_ref(),
        b.sort_key().as_ref(),
        SortDirection::Ascending,
    )
}

/// Locale-style text collation
///
/// Letters compare without regard to case first ("bob" sorts between
/// "Alice" and "Carol"); the raw strings break ties so that the order is
/// total.
pub fn compare_text(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));

    folded.then_with(|| a.cmp(b))
}
