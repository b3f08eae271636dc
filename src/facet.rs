use std::collections::HashMap;

use tracing::trace;

use crate::columns::ColumnRegistry;
use crate::domain::EngineError;
use crate::filter::{self, FilterState};

/// One distinct column value and how often it occurs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetValue {
    pub value: String,
    pub count: usize,
}

/// Distinct-value counts for a facetable column, computed over the rows
/// passing every filter EXCEPT the column's own. A status filter must not
/// hide the other status options that are still selectable.
///
/// Output order is first-seen in store order, which keeps it deterministic.
pub fn compute<R>(
    store: &[R],
    filters: &FilterState,
    registry: &ColumnRegistry<R>,
    key: &str,
) -> Result<Vec<FacetValue>, EngineError> {
    let column = registry.column(key)?;
    if !column.facetable() {
        return Err(EngineError::NotFacetable(key.to_string()));
    }

    let mut others = filters.clone();
    others.remove(key);
    let rows = filter::apply(store, &others, registry);

    let mut facets: Vec<FacetValue> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for &idx in rows.iter() {
        let value = column.value(&store[idx]).canonical();
        match positions.get(&value) {
            Some(&pos) => facets[pos].count += 1,
            None => {
                positions.insert(value.clone(), facets.len());
                facets.push(FacetValue { value, count: 1 });
            }
        }
    }
    trace!("Facet \"{}\": {} distinct values over {} rows", key, facets.len(), rows.len());
    Ok(facets)
}
