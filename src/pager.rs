use crate::domain::EngineError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageState {
    pub index: usize,
    pub size: usize,
}

/// One derived page window over the sorted row indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSlice {
    pub rows: Vec<usize>,
    pub page_count: usize,
    pub clamped_index: usize,
}

/// Slice the sorted indices into the requested page. An empty input yields
/// a single empty page; an out-of-range index clamps to the last page.
pub fn slice(rows: &[usize], page: &PageState) -> Result<PageSlice, EngineError> {
    if page.size == 0 {
        return Err(EngineError::InvalidPageSize(page.size));
    }

    let page_count = std::cmp::max(1, rows.len().div_ceil(page.size));
    let clamped_index = std::cmp::min(page.index, page_count - 1);

    let begin = clamped_index * page.size;
    let end = std::cmp::min(begin + page.size, rows.len());
    let rows = if begin < end { rows[begin..end].to_vec() } else { Vec::new() };

    Ok(PageSlice {
        rows,
        page_count,
        clamped_index,
    })
}
