use tracing::trace;

use crate::columns::ColumnRegistry;
use crate::domain::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// At most one sort column is active; selecting a new one replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortState {
    pub key: String,
    pub direction: Direction,
}

/// Order the given store indices by the sort column's comparator. Absent
/// sort state returns the input order unchanged. The sort is stable, so
/// ties keep their filter-stage order and pagination stays reproducible.
pub fn apply<R>(
    store: &[R],
    mut rows: Vec<usize>,
    sort: Option<&SortState>,
    registry: &ColumnRegistry<R>,
) -> Result<Vec<usize>, EngineError> {
    let Some(sort) = sort else {
        return Ok(rows);
    };

    let column = registry.column(&sort.key)?;
    let comparator = column
        .comparator()
        .ok_or_else(|| EngineError::NotSortable(sort.key.clone()))?;

    rows.sort_by(|&a, &b| {
        let ordering = comparator(&column.value(&store[a]), &column.value(&store[b]));
        match sort.direction {
            Direction::Ascending => ordering,
            Direction::Descending => ordering.reverse(),
        }
    });
    trace!("Sorted {} rows by \"{}\" {:?}", rows.len(), sort.key, sort.direction);
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::{CellValue, ColumnDescriptor};

    type Row = (&'static str, i64);

    fn registry() -> ColumnRegistry<Row> {
        ColumnRegistry::new(vec![
            ColumnDescriptor::new("name", "Name", |r: &Row| CellValue::Text(r.0.to_string())),
            ColumnDescriptor::new("score", "Score", |r: &Row| CellValue::Int(r.1)).sortable(),
        ])
        .unwrap()
    }

    fn by_score(direction: Direction) -> Option<SortState> {
        Some(SortState {
            key: "score".to_string(),
            direction,
        })
    }

    #[test]
    fn absent_state_keeps_input_order() {
        let store = vec![("c", 3), ("a", 1), ("b", 2)];
        let rows = apply(&store, vec![2, 0, 1], None, &registry()).unwrap();
        assert_eq!(rows, vec![2, 0, 1]);
    }

    #[test]
    fn direction_flips_the_ordering() {
        let store = vec![("a", 10), ("b", 30), ("c", 20)];
        let registry = registry();

        let desc = apply(&store, vec![0, 1, 2], by_score(Direction::Descending).as_ref(), &registry)
            .unwrap();
        assert_eq!(desc, vec![1, 2, 0]);

        let asc = apply(&store, vec![0, 1, 2], by_score(Direction::Ascending).as_ref(), &registry)
            .unwrap();
        assert_eq!(asc, vec![0, 2, 1]);
    }

    #[test]
    fn equal_keys_keep_relative_order() {
        let store = vec![("first", 5), ("second", 5), ("third", 1), ("fourth", 5)];
        let rows = apply(
            &store,
            vec![0, 1, 2, 3],
            by_score(Direction::Ascending).as_ref(),
            &registry(),
        )
        .unwrap();
        assert_eq!(rows, vec![2, 0, 1, 3]);

        let rows = apply(
            &store,
            vec![0, 1, 2, 3],
            by_score(Direction::Descending).as_ref(),
            &registry(),
        )
        .unwrap();
        assert_eq!(rows, vec![0, 1, 3, 2]);
    }

    #[test]
    fn comparator_less_column_is_not_sortable() {
        let store = vec![("a", 1)];
        let sort = SortState {
            key: "name".to_string(),
            direction: Direction::Ascending,
        };
        let err = apply(&store, vec![0], Some(&sort), &registry()).err();
        assert_eq!(err, Some(EngineError::NotSortable("name".to_string())));
    }

    #[test]
    fn unknown_column_is_rejected() {
        let store = vec![("a", 1)];
        let sort = SortState {
            key: "missing".to_string(),
            direction: Direction::Ascending,
        };
        let err = apply(&store, vec![0], Some(&sort), &registry()).err();
        assert_eq!(err, Some(EngineError::UnknownColumn("missing".to_string())));
    }
}
