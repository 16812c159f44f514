//! Page-number pagination over ordered sequences.

use serde::{Deserialize, Serialize};

/// Default page size when the client does not override it.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Maximum page size a client may request.
pub const MAX_PAGE_SIZE: u64 = 100;

/// Page parameters accepted by list endpoints.
///
/// Embedded into request bodies with `#[serde(flatten)]`.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    /// 1-based page number.
    #[serde(default = "default_page")]
    pub page: u64,
    /// Page size (default 10, capped at 100).
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

const fn default_page() -> u64 {
    1
}

const fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

impl PageParams {
    /// Effective page size, clamped to `1..=MAX_PAGE_SIZE`.
    #[must_use]
    pub const fn limit(&self) -> u64 {
        let size = self.page_size;
        if size == 0 {
            1
        } else if size > MAX_PAGE_SIZE {
            MAX_PAGE_SIZE
        } else {
            size
        }
    }

    /// Row offset for the requested page.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        let page = if self.page == 0 { 1 } else { self.page };
        (page - 1) * self.limit()
    }
}

/// One page of an ordered sequence, with a total and a next indicator.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T: Serialize> {
    pub items: Vec<T>,
    /// Total items across all pages.
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    /// Whether a further page exists.
    pub has_next: bool,
}

impl<T: Serialize> Paginated<T> {
    /// Assemble a page from its items, the sequence total and the request
    /// parameters.
    #[must_use]
    pub fn new(items: Vec<T>, total: u64, params: PageParams) -> Self {
        let has_next = params.offset() + (items.len() as u64) < total;
        Self {
            items,
            total,
            page: if params.page == 0 { 1 } else { params.page },
            page_size: params.limit(),
            has_next,
        }
    }
}
