use std::collections::{BTreeMap, BTreeSet};

use tracing::trace;

use crate::columns::{CellValue, ColumnRegistry, FilterPredicate};

/// Per-column filter value. An empty text or empty set counts as "no filter"
/// and is never stored in the state map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Text(String),
    Set(BTreeSet<String>),
}

impl FilterValue {
    pub fn is_empty(&self) -> bool {
        match self {
            FilterValue::Text(s) => s.is_empty(),
            FilterValue::Set(s) => s.is_empty(),
        }
    }
}

/// Column key to filter value. Entries compose via logical AND.
pub type FilterState = BTreeMap<String, FilterValue>;

fn matches(predicate: FilterPredicate, value: &CellValue, filter: &FilterValue) -> bool {
    match (predicate, filter) {
        (FilterPredicate::Substring, FilterValue::Text(term)) => value.canonical().contains(term),
        (FilterPredicate::SetMember, FilterValue::Set(set)) => {
            set.is_empty() || set.contains(&value.canonical())
        }
        // Value shape does not fit the column's predicate: ignore the entry
        _ => true,
    }
}

/// Retain the store indices of rows passing every active filter, in store
/// order. Columns without a filter predicate ignore their entry.
pub fn apply<R>(store: &[R], filters: &FilterState, registry: &ColumnRegistry<R>) -> Vec<usize> {
    let active: Vec<_> = filters
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .filter_map(|(key, value)| {
            let column = registry.find(key)?;
            column.filter().map(|predicate| (column, predicate, value))
        })
        .collect();

    if active.is_empty() {
        return (0..store.len()).collect();
    }

    let rows: Vec<usize> = store
        .iter()
        .enumerate()
        .filter(|(_, row)| {
            active
                .iter()
                .all(|(column, predicate, value)| matches(*predicate, &column.value(row), value))
        })
        .map(|(idx, _)| idx)
        .collect();
    trace!("Filter kept {}/{} rows", rows.len(), store.len());
    rows
}
