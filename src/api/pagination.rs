use serde::{Deserialize, Serialize};

/// Page selection sent as `limit` + `offset`; `offset` is the 1-based
/// page number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    pub fn first(limit: u32) -> Self {
        Self::new(1, limit)
    }
}

/// Pagination envelope returned with list responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Pagination {
    pub count: u64,
    pub total_count: u64,
    #[serde(default)]
    pub next_available: bool,
}

/// One page of a list response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paged<T> {
    #[serde(rename = "Data", alias = "data", alias = "Items", default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(rename = "Pagination", alias = "pagination", default)]
    pub pagination: Option<Pagination>,
}

impl<T> Paged<T> {
    /// Page window for this response; falls back to the item count when the
    /// server sent no envelope.
    pub fn window(&self, request: PageRequest) -> PageWindow {
        let total = self
            .pagination
            .map(|p| p.total_count)
            .unwrap_or(self.items.len() as u64);
        PageWindow::new(request.page, request.limit, total)
    }
}

pub const MAX_PAGE_LINKS: u32 = 5;

/// Page-link arithmetic for a list view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    pub page: u32,
    pub limit: u32,
    pub total_count: u64,
    pub total_pages: u32,
    pub has_previous: bool,
    pub has_next: bool,
    pub pages: Vec<u32>,
}

impl PageWindow {
    pub fn new(page: u32, limit: u32, total_count: u64) -> Self {
        let limit = limit.max(1);
        let total_pages = u32::try_from(total_count.div_ceil(u64::from(limit)))
            .unwrap_or(u32::MAX)
            .max(1);
        let page = page.clamp(1, total_pages);

        // Up to MAX_PAGE_LINKS links, centred on the current page
        let span = MAX_PAGE_LINKS.min(total_pages);
        let start = page
            .saturating_sub(span / 2)
            .max(1)
            .min(total_pages - span + 1);
        let pages = (start..=start + (span - 1)).collect();

        Self {
            page,
            limit,
            total_count,
            total_pages,
            has_previous: page > 1,
            has_next: page < total_pages,
            pages,
        }
    }
}
