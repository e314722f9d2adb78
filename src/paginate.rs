//! Pagination stage.

/// One page of a sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number after clamping.
    pub page: usize,
    pub total_pages: usize,
    /// Position of the first item within the whole sequence.
    pub offset: usize,
}

/// Never less than one, so an empty set still has "Page 1 of 1".
pub fn total_pages(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 1;
    }
    len.div_ceil(page_size).max(1)
}

pub fn clamp_page(page: usize, len: usize, page_size: usize) -> usize {
    page.clamp(1, total_pages(len, page_size))
}

/// Slice `[(page-1)*size, page*size)` out of `items`, clamping `page` first.
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Page<T> {
    let total = total_pages(items.len(), page_size);
    let page = page.clamp(1, total);
    let offset = (page - 1).saturating_mul(page_size).min(items.len());
    let end = offset.saturating_add(page_size).min(items.len());
    Page {
        items: items[offset..end].to_vec(),
        page,
        total_pages: total,
        offset,
    }
}
