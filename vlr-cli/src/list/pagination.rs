use serde::Serialize;

/// Pagination controls derived from the server's paging counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PaginationView {
    /// Everything fits on one page: controls hidden, a count message instead
    Hidden { message: String },
    Pages {
        current: u32,
        pages: Vec<u32>,
        show_previous: bool,
        show_next: bool,
    },
}

impl PaginationView {
    /// `message` renders the single-page count line, e.g. "Showing all 5 users"
    pub fn build(
        current: u32,
        total_pages: u32,
        total_count: u64,
        page_size: u32,
        message: impl FnOnce(u64) -> String,
    ) -> Self {
        if total_count <= page_size as u64 {
            return PaginationView::Hidden {
                message: message(total_count),
            };
        }

        let total_pages = total_pages.max(1);
        let current = current.clamp(1, total_pages);
        PaginationView::Pages {
            current,
            pages: (1..=total_pages).collect(),
            show_previous: current > 1,
            show_next: current < total_pages,
        }
    }

    pub fn is_hidden(&self) -> bool {
        matches!(self, PaginationView::Hidden { .. })
    }
}
