//! Pagination arithmetic and pager button layout.

use serde::Serialize;
use std::ops::Range;

use crate::config::{ELLIPSIS_THRESHOLD, PAGE_BUTTON_WINDOW, PAGE_SIZE};

// =============================================================================
// Page State
// =============================================================================

/// Current page of a collection view (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    current_page: usize,
    page_size: usize,
}

impl Default for PageState {
    fn default() -> Self {
        Self::new(PAGE_SIZE)
    }
}

impl PageState {
    /// A zero page size is bumped to 1.
    pub fn new(page_size: usize) -> Self {
        Self {
            current_page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn current(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Jump to `page`, clamped to `[1, max(1, total_pages)]`.
    pub fn set_page(&mut self, page: usize, row_count: usize) {
        let last = total_pages(row_count, self.page_size).max(1);
        self.current_page = page.clamp(1, last);
    }

    /// Re-apply the clamp after the row count changed.
    pub fn clamp_to(&mut self, row_count: usize) {
        self.set_page(self.current_page, row_count);
    }

    pub fn next(&mut self, row_count: usize) {
        self.set_page(self.current_page + 1, row_count);
    }

    pub fn previous(&mut self, row_count: usize) {
        self.set_page(self.current_page.saturating_sub(1), row_count);
    }

    pub fn reset(&mut self) {
        self.current_page = 1;
    }
}

// =============================================================================
// Page Math
// =============================================================================

/// `ceil(row_count / page_size)`; zero rows means zero pages.
pub fn total_pages(row_count: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    row_count.div_ceil(page_size)
}

/// Row range and "showing X-Y" numbers for one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageBounds {
    pub total_pages: usize,
    /// 1-based first row shown, 0 when the page is empty.
    pub start_row: usize,
    /// 1-based last row shown, 0 when the page is empty.
    pub end_row: usize,
    #[serde(skip)]
    pub range: Range<usize>,
}

pub fn page_bounds(row_count: usize, page: usize, page_size: usize) -> PageBounds {
    let page = page.max(1);
    let start = (page - 1).saturating_mul(page_size).min(row_count);
    let end = page.saturating_mul(page_size).min(row_count);

    let (start_row, end_row) = if start < end { (start + 1, end) } else { (0, 0) };

    PageBounds {
        total_pages: total_pages(row_count, page_size),
        start_row,
        end_row,
        range: start..end,
    }
}

/// The rows of one page.
pub fn paginate<T>(rows: &[T], page: usize, page_size: usize) -> &[T] {
    let bounds = page_bounds(rows.len(), page, page_size);
    &rows[bounds.range]
}

// =============================================================================
// Pager Buttons
// =============================================================================

/// Numbered buttons centred on `current`: `min(5, total_pages)` of them.
///
/// Empty when there are no pages.
pub fn page_window(total_pages: usize, current: usize) -> Vec<usize> {
    if total_pages == 0 {
        return Vec::new();
    }

    let current = current.clamp(1, total_pages);
    let max_start = total_pages.saturating_sub(PAGE_BUTTON_WINDOW);
    let start = current.saturating_sub(PAGE_BUTTON_WINDOW / 2 + 1).min(max_start);
    let end = (start + PAGE_BUTTON_WINDOW).min(total_pages);

    (start + 1..=end).collect()
}

/// One entry of the collapsing pager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "page", rename_all = "lowercase")]
pub enum PageItem {
    Page(usize),
    Ellipsis,
}

/// First page, ellipsis, up to three pages around `current`, ellipsis, last page.
///
/// With seven pages or fewer every page is listed.
pub fn page_items(total_pages: usize, current: usize) -> Vec<PageItem> {
    if total_pages == 0 {
        return Vec::new();
    }
    if total_pages <= ELLIPSIS_THRESHOLD {
        return (1..=total_pages).map(PageItem::Page).collect();
    }

    let current = current.clamp(1, total_pages);
    let mut items = vec![PageItem::Page(1)];

    if current > 3 {
        items.push(PageItem::Ellipsis);
    }

    let low = current.saturating_sub(1).max(2);
    let high = (current + 1).min(total_pages - 1);
    items.extend((low..=high).map(PageItem::Page));

    if current < total_pages - 2 {
        items.push(PageItem::Ellipsis);
    }
    items.push(PageItem::Page(total_pages));

    items
}
