//! Column sorting for collection views.
//!
//! Only number/number and string/string pairs are ordered. Every other
//! pairing (missing field, null, booleans, mixed types) compares `Equal`.
//! Numbers are sorted among the positions holding numbers and strings among
//! the positions holding strings; every other row keeps its position.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::models::Record;

// =============================================================================
// Sort Configuration
// =============================================================================

/// Sort direction of the active column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    /// Orient an ascending comparison.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }
}

/// The single active sort of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortConfig {
    /// Field name or dotted path.
    pub key: String,
    pub direction: SortDirection,
}

impl SortConfig {
    pub fn ascending(key: impl Into<String>) -> Self {
        Self { key: key.into(), direction: SortDirection::Ascending }
    }

    pub fn descending(key: impl Into<String>) -> Self {
        Self { key: key.into(), direction: SortDirection::Descending }
    }

    /// Header click: same key flips direction, a new key starts ascending.
    pub fn toggle(current: Option<&SortConfig>, key: &str) -> SortConfig {
        match current {
            Some(active) if active.key == key => SortConfig {
                key: active.key.clone(),
                direction: active.direction.flipped(),
            },
            _ => SortConfig::ascending(key),
        }
    }
}

/// Independent sorts for screens hosting several tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableSorts {
    tables: BTreeMap<String, SortConfig>,
}

impl TableSorts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, table: &str) -> Option<&SortConfig> {
        self.tables.get(table)
    }

    /// Toggle `key` on `table` without touching other tables.
    pub fn toggle(&mut self, table: &str, key: &str) -> &SortConfig {
        let next = SortConfig::toggle(self.tables.get(table), key);
        self.tables.insert(table.to_string(), next);
        &self.tables[table]
    }
}

/// Header glyph for a column.
pub fn sort_indicator(current: Option<&SortConfig>, key: &str) -> &'static str {
    match current {
        Some(active) if active.key == key => match active.direction {
            SortDirection::Ascending => " ▲",
            SortDirection::Descending => " ▼",
        },
        _ => " ⇅",
    }
}

// =============================================================================
// Comparator
// =============================================================================

/// Locale-style string order: case-insensitive first, then lowercase before
/// uppercase when the strings differ only by case.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    let primary = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));

    if primary != Ordering::Equal {
        return primary;
    }

    a.chars()
        .zip(b.chars())
        .find(|(x, y)| x != y)
        .map(|(x, _)| if x.is_lowercase() { Ordering::Less } else { Ordering::Greater })
        .unwrap_or(Ordering::Equal)
}

/// Compare two resolved field values. Never panics.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        },
        (Some(Value::String(x)), Some(Value::String(y))) => locale_compare(x, y),
        _ => Ordering::Equal,
    }
}

/// Compare two records on `key`, ascending.
pub fn compare_records(a: &Record, b: &Record, key: &str) -> Ordering {
    compare_values(a.get(key), b.get(key))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SortClass {
    Number,
    Text,
    Unordered,
}

impl SortClass {
    fn of(value: Option<&Value>) -> Self {
        match value {
            Some(Value::Number(_)) => Self::Number,
            Some(Value::String(_)) => Self::Text,
            _ => Self::Unordered,
        }
    }
}

/// Stable in-place sort by `config`.
///
/// Rows only move between positions of the same class, so sorting an
/// already sorted sequence leaves it unchanged.
pub fn sort_records<R: Borrow<Record>>(rows: &mut Vec<R>, config: &SortConfig) {
    let classes: Vec<SortClass> = rows
        .iter()
        .map(|r| SortClass::of(r.borrow().get(&config.key)))
        .collect();
    let mut order: Vec<usize> = (0..rows.len()).collect();

    for class in [SortClass::Number, SortClass::Text] {
        let positions: Vec<usize> = (0..rows.len()).filter(|&i| classes[i] == class).collect();
        let mut sorted = positions.clone();
        stable_sort_by(&mut sorted, |&a, &b| {
            config
                .direction
                .apply(compare_records(rows[a].borrow(), rows[b].borrow(), &config.key))
        });
        for (position, from) in positions.into_iter().zip(sorted) {
            order[position] = from;
        }
    }

    let mut slots: Vec<Option<R>> = rows.drain(..).map(Some).collect();
    rows.extend(order.into_iter().filter_map(|i| slots[i].take()));
}

/// Stable merge sort that tolerates comparators which are not a total order.
pub fn stable_sort_by<T, F>(items: &mut Vec<T>, mut cmp: F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    let mut order: Vec<usize> = (0..items.len()).collect();
    merge_indices(&mut order, &mut |a, b| cmp(&items[a], &items[b]));

    let mut slots: Vec<Option<T>> = items.drain(..).map(Some).collect();
    items.extend(order.into_iter().filter_map(|i| slots[i].take()));
}

fn merge_indices<F>(order: &mut Vec<usize>, cmp: &mut F)
where
    F: FnMut(usize, usize) -> Ordering,
{
    if order.len() <= 1 {
        return;
    }

    let mut right = order.split_off(order.len() / 2);
    merge_indices(order, cmp);
    merge_indices(&mut right, cmp);

    let left = std::mem::take(order);
    order.reserve(left.len() + right.len());
    let (mut l, mut r) = (0, 0);
    while l < left.len() && r < right.len() {
        // Right wins only when strictly less, which keeps the sort stable.
        if cmp(right[r], left[l]) == Ordering::Less {
            order.push(right[r]);
            r += 1;
        } else {
            order.push(left[l]);
            l += 1;
        }
    }
    order.extend_from_slice(&left[l..]);
    order.extend_from_slice(&right[r..]);
}
