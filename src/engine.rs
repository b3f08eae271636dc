use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::columns::ColumnRegistry;
use crate::domain::EngineError;
use crate::facet::{self, FacetValue};
use crate::filter::{self, FilterState, FilterValue};
use crate::pager::{self, PageState};
use crate::sort::{self, SortState};

/// Fully derived view of one table state: the rendered page plus the
/// numbers the surrounding UI needs. Emits data only, no markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableView {
    pub headers: Vec<String>,
    /// Rendered cells of the current page, registry column order.
    pub rows: Vec<Vec<String>>,
    /// Store indices behind `rows`, for row-level actions.
    pub indices: Vec<usize>,
    pub page_count: usize,
    pub page_index: usize,
    pub page_size: usize,
    /// Row count after filtering, before pagination.
    pub filtered: usize,
    pub total: usize,
    pub facets: BTreeMap<String, Vec<FacetValue>>,
    pub sort: Option<SortState>,
    pub has_filters: bool,
}

/// The tabular view engine: an immutable row store plus one explicit state
/// tuple (filters, sort, page). Every action re-derives the complete view
/// through Filter -> Sort -> {Facet, Paginate}; the stages are pure and the
/// recomputation is synchronous, so two derivations of the same state are
/// identical.
pub struct TableEngine<R> {
    registry: ColumnRegistry<R>,
    store: Vec<R>,
    filters: FilterState,
    sort: Option<SortState>,
    page: PageState,
}

impl<R> TableEngine<R> {
    pub fn new(registry: ColumnRegistry<R>, page_size: usize) -> Result<Self, EngineError> {
        if page_size == 0 {
            return Err(EngineError::InvalidPageSize(page_size));
        }
        Ok(TableEngine {
            registry,
            store: Vec::new(),
            filters: FilterState::new(),
            sort: None,
            page: PageState {
                index: 0,
                size: page_size,
            },
        })
    }

    /// Replace the row store wholesale. Filter, sort and page state persist
    /// across replacement; the page index re-clamps during derivation.
    pub fn load(&mut self, rows: Vec<R>) -> Result<TableView, EngineError> {
        debug!("Loading {} rows (replacing {})", rows.len(), self.store.len());
        self.store = rows;
        self.derive()
    }

    /// Set or clear one column's filter. An empty value clears the entry so
    /// "no filter" has a single representation.
    pub fn set_column_filter(
        &mut self,
        key: &str,
        value: FilterValue,
    ) -> Result<TableView, EngineError> {
        self.registry.column(key)?;
        if value.is_empty() {
            self.filters.remove(key);
        } else {
            self.filters.insert(key.to_string(), value);
        }
        self.derive()
    }

    /// Replace the sort state. Rejected up front when the column is unknown
    /// or carries no comparator, leaving the previous state untouched.
    pub fn set_sort(&mut self, sort: Option<SortState>) -> Result<TableView, EngineError> {
        if let Some(state) = sort.as_ref() {
            let column = self.registry.column(&state.key)?;
            if column.comparator().is_none() {
                return Err(EngineError::NotSortable(state.key.clone()));
            }
        }
        self.sort = sort;
        self.derive()
    }

    pub fn set_page(&mut self, index: usize) -> Result<TableView, EngineError> {
        self.page.index = index;
        self.derive()
    }

    pub fn set_page_size(&mut self, size: usize) -> Result<TableView, EngineError> {
        if size == 0 {
            return Err(EngineError::InvalidPageSize(size));
        }
        self.page.size = size;
        self.derive()
    }

    pub fn reset_filters(&mut self) -> Result<TableView, EngineError> {
        self.filters.clear();
        self.derive()
    }

    /// Re-derive the view for the current state without changing it.
    pub fn view(&mut self) -> Result<TableView, EngineError> {
        self.derive()
    }

    pub fn registry(&self) -> &ColumnRegistry<R> {
        &self.registry
    }

    /// The current row collection, read-only. Empty is a valid state.
    pub fn store(&self) -> &[R] {
        &self.store
    }

    /// Current text filter of a column, for prefilling an input line.
    pub fn filter_text(&self, key: &str) -> &str {
        match self.filters.get(key) {
            Some(FilterValue::Text(s)) => s,
            _ => "",
        }
    }

    /// Current value-set filter of a column.
    pub fn filter_set(&self, key: &str) -> Vec<String> {
        match self.filters.get(key) {
            Some(FilterValue::Set(s)) => s.iter().cloned().collect(),
            _ => Vec::new(),
        }
    }

    pub fn sort_state(&self) -> Option<&SortState> {
        self.sort.as_ref()
    }

    fn derive(&mut self) -> Result<TableView, EngineError> {
        let filtered = filter::apply(&self.store, &self.filters, &self.registry);
        let filtered_count = filtered.len();
        let sorted = sort::apply(&self.store, filtered, self.sort.as_ref(), &self.registry)?;
        let slice = pager::slice(&sorted, &self.page)?;
        // A narrowed result set permanently lands on the last valid page
        self.page.index = slice.clamped_index;

        let mut facets = BTreeMap::new();
        for column in self.registry.iter().filter(|c| c.facetable()) {
            let key = column.key();
            facets.insert(
                key.to_string(),
                facet::compute(&self.store, &self.filters, &self.registry, key)?,
            );
        }

        let rows = slice
            .rows
            .iter()
            .map(|&idx| self.registry.render_row(&self.store[idx]))
            .collect();

        trace!(
            "Derived view: {}/{} rows, page {}/{}",
            filtered_count,
            self.store.len(),
            slice.clamped_index + 1,
            slice.page_count
        );

        Ok(TableView {
            headers: self.registry.labels(),
            rows,
            indices: slice.rows,
            page_count: slice.page_count,
            page_index: slice.clamped_index,
            page_size: self.page.size,
            filtered: filtered_count,
            total: self.store.len(),
            facets,
            sort: self.sort.clone(),
            has_filters: !self.filters.is_empty(),
        })
    }
}
