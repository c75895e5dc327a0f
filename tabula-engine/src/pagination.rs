//! Pagination window over the derived view.

use std::ops::Range;

/// Page bookkeeping for a view of `view_len` rows.
///
/// Invariant: `1 <= current_page <= total_pages`, with
/// `total_pages = max(1, ceil(view_len / page_size))`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationWindow {
    page_size: usize,
    current_page: usize,
    total_pages: usize,
    view_len: usize,
}

impl PaginationWindow {
    /// A zero page size is treated as 1.
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            current_page: 1,
            total_pages: 1,
            view_len: 0,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    pub fn view_len(&self) -> usize {
        self.view_len
    }

    pub fn is_last_page(&self) -> bool {
        self.current_page == self.total_pages
    }

    /// Recount pages for a new view length and clamp the current page.
    pub fn recompute(&mut self, view_len: usize) {
        self.view_len = view_len;
        self.total_pages = view_len.div_ceil(self.page_size).max(1);
        self.current_page = self.current_page.clamp(1, self.total_pages);
    }

    /// Indexes into the view covered by the current page.
    pub fn range(&self) -> Range<usize> {
        let start = ((self.current_page - 1) * self.page_size).min(self.view_len);
        let end = (start + self.page_size).min(self.view_len);
        start..end
    }

    /// Move to page `n`, clamped into range. Returns whether the page changed.
    pub fn goto(&mut self, n: usize) -> bool {
        let target = n.clamp(1, self.total_pages);
        let changed = target != self.current_page;
        self.current_page = target;
        changed
    }

    pub fn next(&mut self) -> bool {
        self.goto(self.current_page + 1)
    }

    pub fn prev(&mut self) -> bool {
        self.goto(self.current_page.saturating_sub(1))
    }

    /// Change rows per page. Zero is ignored. Returns whether anything changed.
    pub fn set_page_size(&mut self, page_size: usize) -> bool {
        if page_size == 0 || page_size == self.page_size {
            return false;
        }
        self.page_size = page_size;
        self.recompute(self.view_len);
        true
    }
}
