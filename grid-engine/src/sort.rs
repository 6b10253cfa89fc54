//! FILENAME: grid-engine/src/sort.rs
//! Sort Engine - Multi-key, priority-ordered, stable sorting.
//!
//! Keys are extracted once per row, then rows are ordered key by key: the
//! first mismatching key decides (reversed for descending keys). Rows equal
//! on every key keep their input order. The merge sort below is written out
//! so that stability and termination do not depend on the comparator being
//! a total order.

use std::cmp::Ordering;

use grid_model::{find_column, ColumnSpec, Comparator, Row, Value};
use log::debug;
use smallvec::SmallVec;

use crate::definition::{SortDirection, SortSpec};

/// Extracted sort keys for one row; most sorts use one to three keys.
type SortKeys = SmallVec<[Value; 4]>;

/// One active key with its resolved column metadata.
struct ActiveKey<'c> {
    field: &'c str,
    direction: SortDirection,
    column: Option<&'c ColumnSpec>,
}

impl ActiveKey<'_> {
    fn comparator(&self) -> Option<&Comparator> {
        self.column.and_then(|c| c.comparator.as_ref())
    }

    fn extract(&self, row: &Row) -> Value {
        match self.column {
            Some(column) => column.value_of(row),
            None => row.value(self.field).clone(),
        }
    }
}

/// Sorts rows by the given specs. An empty spec list is the identity.
pub fn apply_sort<'a, I>(rows: I, specs: &[SortSpec], columns: &[ColumnSpec]) -> Vec<&'a Row>
where
    I: IntoIterator<Item = &'a Row>,
{
    if specs.is_empty() {
        return rows.into_iter().collect();
    }

    let mut ordered: Vec<&SortSpec> = specs.iter().collect();
    ordered.sort_by_key(|s| s.priority);

    let keys: Vec<ActiveKey> = ordered
        .iter()
        .map(|spec| ActiveKey {
            field: spec.field.as_str(),
            direction: spec.direction,
            column: find_column(columns, &spec.field),
        })
        .collect();

    let decorated: Vec<(SortKeys, &'a Row)> = rows
        .into_iter()
        .map(|row| (keys.iter().map(|k| k.extract(row)).collect(), row))
        .collect();

    let sorted = merge_sort_by(decorated, |(values_a, _), (values_b, _)| {
        for (i, key) in keys.iter().enumerate() {
            let compare = match key.comparator() {
                Some(comparator) => comparator(&values_a[i], &values_b[i]),
                None => default_compare(&values_a[i], &values_b[i]),
            };
            if compare != Ordering::Equal {
                return match key.direction {
                    SortDirection::Asc => compare,
                    SortDirection::Desc => compare.reverse(),
                };
            }
        }
        Ordering::Equal
    });

    debug!(
        target: "grid::sort",
        "sorted {} rows by {} key(s)",
        sorted.len(),
        keys.len()
    );

    sorted.into_iter().map(|(_, row)| row).collect()
}

/// Stable bottom-up merge sort.
///
/// On a tie the earlier item is taken first, so items comparing `Equal`
/// keep their input order. `compare` does not have to be a total order:
/// mixed-kind string fallbacks and NaN may produce cycles, which only
/// affect the resulting order and never abort the sort.
pub fn merge_sort_by<T, F>(items: Vec<T>, mut compare: F) -> Vec<T>
where
    F: FnMut(&T, &T) -> Ordering,
{
    let len = items.len();
    let mut order: Vec<usize> = (0..len).collect();
    let mut scratch: Vec<usize> = vec![0; len];

    let mut width = 1;
    while width < len {
        let mut start = 0;
        while start < len {
            let mid = start.saturating_add(width).min(len);
            let end = mid.saturating_add(width).min(len);
            let (mut left, mut right, mut out) = (start, mid, start);
            while left < mid && right < end {
                if compare(&items[order[right]], &items[order[left]]) == Ordering::Less {
                    scratch[out] = order[right];
                    right += 1;
                } else {
                    scratch[out] = order[left];
                    left += 1;
                }
                out += 1;
            }
            let rest = mid - left;
            scratch[out..out + rest].copy_from_slice(&order[left..mid]);
            // The unread tail of the right run is already at its final offset.
            scratch[right..end].copy_from_slice(&order[right..end]);
            start = end;
        }
        std::mem::swap(&mut order, &mut scratch);
        width = width.saturating_mul(2);
    }

    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    order.into_iter().filter_map(|i| slots[i].take()).collect()
}

/// Default value ordering.
///
/// Null sorts after every other value. The null placement is decided before
/// the direction is applied, so a descending sort moves nulls to the front.
pub fn default_compare(a: &Value, b: &Value) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }
    match (a, b) {
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        (Value::Date(da), Value::Date(db)) => da.cmp(db),
        // NaN differences are treated as equal.
        (Value::Number(na), Value::Number(nb)) => na.partial_cmp(nb).unwrap_or(Ordering::Equal),
        (Value::Text(ta), Value::Text(tb)) => {
            locale_compare(&ta.to_lowercase(), &tb.to_lowercase())
        }
        (Value::Boolean(ba), Value::Boolean(bb)) => ba.cmp(bb),
        _ => locale_compare(&a.to_display_string(), &b.to_display_string()),
    }
}

/// Approximates locale-aware collation: letters compare case-insensitively
/// first, and on a tie lowercase sorts before uppercase.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    let primary = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    if primary != Ordering::Equal {
        return primary;
    }
    // Lowercase code points are larger than uppercase ones.
    b.cmp(a)
}

// ============================================================================
// SORT MODEL TRANSITIONS
// ============================================================================

/// Computes the next sort model after a header click on `field`.
///
/// Single mode cycles asc -> desc -> none and drops every other key.
/// Multi mode appends new keys at the lowest priority, flips asc to desc in
/// place, and on removal renumbers the remaining priorities from 0.
pub fn toggle_sort(field: &str, current: &[SortSpec], multi: bool) -> Vec<SortSpec> {
    let existing = current.iter().find(|s| s.field == field);

    if !multi {
        return match existing {
            None => vec![SortSpec::asc(field, 0)],
            Some(spec) if spec.direction == SortDirection::Asc => vec![SortSpec::desc(field, 0)],
            Some(_) => Vec::new(),
        };
    }

    match existing {
        None => {
            let mut next = current.to_vec();
            next.push(SortSpec::asc(field, current.len()));
            next
        }
        Some(spec) if spec.direction == SortDirection::Asc => current
            .iter()
            .map(|s| {
                if s.field == field {
                    SortSpec::new(field, SortDirection::Desc, s.priority)
                } else {
                    s.clone()
                }
            })
            .collect(),
        Some(_) => current
            .iter()
            .filter(|s| s.field != field)
            .enumerate()
            .map(|(priority, s)| SortSpec::new(s.field.clone(), s.direction, priority))
            .collect(),
    }
}

pub fn sort_direction(field: &str, specs: &[SortSpec]) -> Option<SortDirection> {
    specs.iter().find(|s| s.field == field).map(|s| s.direction)
}

pub fn sort_priority(field: &str, specs: &[SortSpec]) -> Option<usize> {
    specs.iter().find(|s| s.field == field).map(|s| s.priority)
}
