use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::trace;

use crate::domain::EngineError;

/// Cell payload produced by a column accessor. Rendering and filtering
/// operate on this tagged union, never on the row type directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
    Text(String),
    Int(i64),
    Time(DateTime<Utc>),
}

impl CellValue {
    /// Canonical string form, used as facet key and substring-match target.
    pub fn canonical(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Int(n) => n.to_string(),
            CellValue::Time(t) => t.to_rfc3339(),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            CellValue::Text(_) => 0,
            CellValue::Int(_) => 1,
            CellValue::Time(_) => 2,
        }
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (CellValue::Text(a), CellValue::Text(b)) => a.cmp(b),
            (CellValue::Int(a), CellValue::Int(b)) => a.cmp(b),
            (CellValue::Time(a), CellValue::Time(b)) => a.cmp(b),
            // Mixed-type columns should not happen; order by variant to stay total
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }
}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Ascending ordering on the cell values themselves. Descending is derived
/// by reversing this, never by a second comparator.
pub fn natural_order(a: &CellValue, b: &CellValue) -> Ordering {
    a.cmp(b)
}

/// How a column interprets its filter-state entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterPredicate {
    /// Case-sensitive, byte-exact substring containment on the canonical form.
    Substring,
    /// Canonical form must be an element of the supplied value set.
    /// An empty set means "no filter", not "match nothing".
    SetMember,
}

pub type Accessor<R> = Box<dyn Fn(&R) -> CellValue + Send + Sync>;
pub type Renderer = Box<dyn Fn(&CellValue) -> String + Send + Sync>;
pub type Comparator = fn(&CellValue, &CellValue) -> Ordering;

pub struct ColumnDescriptor<R> {
    key: &'static str,
    label: String,
    accessor: Accessor<R>,
    render: Renderer,
    filter: Option<FilterPredicate>,
    comparator: Option<Comparator>,
    facetable: bool,
}

impl<R> ColumnDescriptor<R> {
    pub fn new(
        key: &'static str,
        label: impl Into<String>,
        accessor: impl Fn(&R) -> CellValue + Send + Sync + 'static,
    ) -> Self {
        ColumnDescriptor {
            key,
            label: label.into(),
            accessor: Box::new(accessor),
            render: Box::new(|v: &CellValue| v.canonical()),
            filter: None,
            comparator: None,
            facetable: false,
        }
    }

    pub fn with_render(mut self, render: impl Fn(&CellValue) -> String + Send + Sync + 'static) -> Self {
        self.render = Box::new(render);
        self
    }

    pub fn with_filter(mut self, predicate: FilterPredicate) -> Self {
        self.filter = Some(predicate);
        self
    }

    pub fn with_comparator(mut self, comparator: Comparator) -> Self {
        self.comparator = Some(comparator);
        self
    }

    /// Sortable with the natural cell-value ordering.
    pub fn sortable(self) -> Self {
        self.with_comparator(natural_order)
    }

    /// Facetable and filterable by value set.
    pub fn faceted(mut self) -> Self {
        self.facetable = true;
        self.with_filter(FilterPredicate::SetMember)
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn value(&self, row: &R) -> CellValue {
        (self.accessor)(row)
    }

    pub fn render(&self, row: &R) -> String {
        (self.render)(&self.value(row))
    }

    pub fn filter(&self) -> Option<FilterPredicate> {
        self.filter
    }

    pub fn comparator(&self) -> Option<Comparator> {
        self.comparator
    }

    pub fn facetable(&self) -> bool {
        self.facetable
    }
}

/// Declarative column list of one table instance. Immutable after
/// construction; keys are unique.
pub struct ColumnRegistry<R> {
    columns: Vec<ColumnDescriptor<R>>,
}

impl<R> ColumnRegistry<R> {
    pub fn new(columns: Vec<ColumnDescriptor<R>>) -> Result<Self, EngineError> {
        let mut seen = HashSet::new();
        for column in columns.iter() {
            if !seen.insert(column.key) {
                return Err(EngineError::DuplicateColumnKey(column.key.to_string()));
            }
        }
        trace!("Registered {} columns", columns.len());
        Ok(ColumnRegistry { columns })
    }

    pub fn column(&self, key: &str) -> Result<&ColumnDescriptor<R>, EngineError> {
        self.find(key)
            .ok_or_else(|| EngineError::UnknownColumn(key.to_string()))
    }

    pub fn find(&self, key: &str) -> Option<&ColumnDescriptor<R>> {
        self.columns.iter().find(|c| c.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnDescriptor<R>> {
        self.columns.iter()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn labels(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.label().to_string()).collect()
    }

    /// Render one row cell by cell, in registry order.
    pub fn render_row(&self, row: &R) -> Vec<String> {
        self.columns.iter().map(|c| c.render(row)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Row = (i64, &'static str);

    fn pair_columns() -> Vec<ColumnDescriptor<Row>> {
        vec![
            ColumnDescriptor::new("num", "Number", |r: &Row| CellValue::Int(r.0)).sortable(),
            ColumnDescriptor::new("name", "Name", |r: &Row| CellValue::Text(r.1.to_string()))
                .with_filter(FilterPredicate::Substring),
        ]
    }

    #[test]
    fn registry_rejects_duplicate_keys() {
        let mut columns = pair_columns();
        columns.push(ColumnDescriptor::new("num", "Number again", |r: &Row| {
            CellValue::Int(r.0)
        }));
        let err = ColumnRegistry::new(columns).err();
        assert_eq!(err, Some(EngineError::DuplicateColumnKey("num".to_string())));
    }

    #[test]
    fn registry_lookup() {
        let registry = ColumnRegistry::new(pair_columns()).unwrap();
        assert_eq!(registry.column("name").unwrap().label(), "Name");
        assert_eq!(
            registry.column("missing").err(),
            Some(EngineError::UnknownColumn("missing".to_string()))
        );
    }

    #[test]
    fn render_row_uses_registry_order() {
        let registry = ColumnRegistry::new(pair_columns()).unwrap();
        assert_eq!(registry.render_row(&(7, "ada")), vec!["7", "ada"]);
    }

    #[test]
    fn cell_value_ordering_is_total() {
        assert!(CellValue::Int(1) < CellValue::Int(2));
        assert!(CellValue::Text("a".into()) < CellValue::Text("b".into()));
        // Cross-variant comparisons stay consistent instead of panicking
        assert!(CellValue::Text("z".into()) < CellValue::Int(0));
    }
}
