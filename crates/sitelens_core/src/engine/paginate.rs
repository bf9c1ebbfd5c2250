//! Paginator: fixed-size, 1-indexed views over an ordered sequence.
//!
//! # Invariants
//! - Pages never reorder or deduplicate; concatenating pages
//!   `1..=total_pages` reproduces the input exactly.
//! - Out-of-range pages (including page 0) are empty, with correct totals.
//! - `page_size == 0` is treated as 1.

use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// One page plus the metadata a pager widget needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_items: usize,
    pub total_pages: usize,
    pub page_number: usize,
    pub page_size: usize,
    pub has_previous: bool,
    pub has_next: bool,
}

impl<T> Page<T> {
    /// Converts the items while keeping page metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total_items: self.total_items,
            total_pages: self.total_pages,
            page_number: self.page_number,
            page_size: self.page_size,
            has_previous: self.has_previous,
            has_next: self.has_next,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

pub fn paginate<T: Clone>(ordered: &[T], page_size: usize, page_number: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total_items = ordered.len();
    let total_pages = total_items.div_ceil(page_size);

    let items = if page_number == 0 || page_number > total_pages {
        Vec::new()
    } else {
        let start = (page_number - 1) * page_size;
        let end = (start + page_size).min(total_items);
        ordered[start..end].to_vec()
    };

    Page {
        items,
        total_items,
        total_pages,
        page_number,
        page_size,
        has_previous: page_number > 1,
        has_next: page_number < total_pages,
    }
}
