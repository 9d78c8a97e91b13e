//! Sortable, filterable, paginated collection views.
//!
//! Every claims table runs the same pipeline:
//!
//! ```text
//! rows ──▶ filter (search term) ──▶ sort (key, direction) ──▶ paginate (page, 10)
//! ```
//!
//! [`render_view`] is the stateless form of the pipeline. [`ViewState`] keeps
//! the search term, the active sort and the current page for one table and
//! resets to page 1 whenever the search or sort changes.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut state = ViewState::new("name");
//! state.set_search("jane");
//! state.toggle_sort("amount");
//! let page = state.render(&rows);
//! println!("{}-{} of {}", page.start_row, page.end_row, page.filtered_count);
//! ```

pub mod filter;
pub mod paginate;
pub mod path;
pub mod sort;

use serde::Serialize;

use crate::config::PAGE_SIZE;
use crate::models::Record;

pub use filter::SearchFilter;
pub use paginate::{page_bounds, page_items, page_window, total_pages, PageBounds, PageItem, PageState};
pub use sort::{compare_records, compare_values, sort_indicator, sort_records, SortConfig, SortDirection, TableSorts};

// =============================================================================
// Stateless Pipeline
// =============================================================================

/// Inputs of one render.
#[derive(Debug, Clone, Copy)]
pub struct ViewQuery<'q> {
    pub search: &'q str,
    pub sort: Option<&'q SortConfig>,
    pub page: usize,
    pub page_size: usize,
}

impl Default for ViewQuery<'_> {
    fn default() -> Self {
        Self { search: "", sort: None, page: 1, page_size: PAGE_SIZE }
    }
}

/// One rendered page of a collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewPage<'a> {
    pub rows: Vec<&'a Record>,
    pub page: usize,
    pub total_pages: usize,
    pub start_row: usize,
    pub end_row: usize,
    pub filtered_count: usize,
}

impl ViewPage<'_> {
    /// Up to five numbered buttons around the current page.
    pub fn page_window(&self) -> Vec<usize> {
        page_window(self.total_pages, self.page)
    }

    /// Collapsing pager with ellipses.
    pub fn page_items(&self) -> Vec<PageItem> {
        page_items(self.total_pages, self.page)
    }
}

/// Filter, sort and slice `rows`.
pub fn render_view<'a>(rows: &'a [Record], filter: &SearchFilter, query: &ViewQuery<'_>) -> ViewPage<'a> {
    let mut matched = filter.apply(rows, query.search);

    if let Some(config) = query.sort {
        sort_records(&mut matched, config);
    }

    let bounds = page_bounds(matched.len(), query.page, query.page_size);
    let filtered_count = matched.len();

    ViewPage {
        rows: matched[bounds.range.clone()].to_vec(),
        page: query.page.max(1),
        total_pages: bounds.total_pages,
        start_row: bounds.start_row,
        end_row: bounds.end_row,
        filtered_count,
    }
}

// =============================================================================
// Row Interaction
// =============================================================================

/// Pointer events on a rendered row, indexed within the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowEvent {
    /// Click anywhere on the row.
    RowClicked(usize),
    /// Click on the row's actions menu glyph; never selects the row.
    ActionsClicked(usize),
}

/// Row handed to the caller's selection callback.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub record: Record,
    pub open_detail: bool,
}

// =============================================================================
// Stateful View
// =============================================================================

/// Search, sort and page state of one table.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    filter: SearchFilter,
    search: String,
    sort: Option<SortConfig>,
    page: PageState,
}

impl ViewState {
    pub fn new(display_field: impl Into<String>) -> Self {
        Self::with_page_size(display_field, PAGE_SIZE)
    }

    pub fn with_page_size(display_field: impl Into<String>, page_size: usize) -> Self {
        Self {
            filter: SearchFilter::on(display_field),
            search: String::new(),
            sort: None,
            page: PageState::new(page_size),
        }
    }

    /// Start sorted on `config`.
    pub fn sorted_by(mut self, config: SortConfig) -> Self {
        self.sort = Some(config);
        self
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn sort(&self) -> Option<&SortConfig> {
        self.sort.as_ref()
    }

    pub fn current_page(&self) -> usize {
        self.page.current()
    }

    /// New search term; the view returns to page 1.
    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
        self.page.reset();
    }

    /// Header click; the view returns to page 1.
    pub fn toggle_sort(&mut self, key: &str) -> &SortConfig {
        self.page.reset();
        self.sort.insert(SortConfig::toggle(self.sort.as_ref(), key))
    }

    /// Jump to `page` within the filtered rows.
    pub fn go_to(&mut self, page: usize, rows: &[Record]) {
        let count = self.filtered_count(rows);
        self.page.set_page(page, count);
    }

    pub fn next_page(&mut self, rows: &[Record]) {
        let count = self.filtered_count(rows);
        self.page.next(count);
    }

    pub fn previous_page(&mut self, rows: &[Record]) {
        let count = self.filtered_count(rows);
        self.page.previous(count);
    }

    /// Re-clamp the current page after `rows` changed underneath the view.
    pub fn sync(&mut self, rows: &[Record]) {
        let count = self.filtered_count(rows);
        self.page.clamp_to(count);
    }

    pub fn render<'a>(&self, rows: &'a [Record]) -> ViewPage<'a> {
        let query = ViewQuery {
            search: &self.search,
            sort: self.sort.as_ref(),
            page: self.page.current(),
            page_size: self.page.page_size(),
        };
        render_view(rows, &self.filter, &query)
    }

    /// Resolve a row event against the rendered page.
    pub fn handle(&self, event: RowEvent, page: &ViewPage<'_>) -> Option<Selection> {
        match event {
            RowEvent::RowClicked(index) => page.rows.get(index).map(|record| Selection {
                record: (*record).clone(),
                open_detail: true,
            }),
            RowEvent::ActionsClicked(_) => None,
        }
    }

    fn filtered_count(&self, rows: &[Record]) -> usize {
        rows.iter().filter(|r| self.filter.matches(r, &self.search)).count()
    }
}
