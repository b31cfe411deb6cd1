use serde::{Deserialize, Serialize};

/// Pagination parameters shared by every list endpoint. `limit` is clamped to
/// `[1, max_items_per_kind]` and `page` to `>= 1` by the dispatcher before a
/// manager ever sees these values (spec.md §4.11, §8).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaginationParams {
    pub page: u32,
    pub limit: u32,
}

impl PaginationParams {
    /// Clamp raw, caller-supplied `page`/`limit` values per spec.md §4.11.
    pub fn clamp(page: Option<u32>, limit: Option<u32>, max_items_per_kind: u32) -> Self {
        let page = page.unwrap_or(1).max(1);
        let limit = limit.unwrap_or(max_items_per_kind).clamp(1, max_items_per_kind);
        Self { page, limit }
    }

    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }
}

/// A page of results plus enough metadata for a caller to page further.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

impl<T> PaginatedResult<T> {
    pub fn new(items: Vec<T>, total: u64, params: PaginationParams) -> Self {
        let total_pages = ((total as f64) / (params.limit as f64)).ceil().max(1.0) as u32;
        Self { items, total, page: params.page, limit: params.limit, total_pages }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_defaults_limit_to_max_when_absent() {
        let params = PaginationParams::clamp(None, None, 100);
        assert_eq!(params.page, 1);
        assert_eq!(params.limit, 100);
    }

    #[test]
    fn clamp_caps_limit_above_max() {
        let params = PaginationParams::clamp(Some(1), Some(500), 100);
        assert_eq!(params.limit, 100);
    }

    #[test]
    fn clamp_floors_limit_at_one() {
        let params = PaginationParams::clamp(Some(1), Some(0), 100);
        assert_eq!(params.limit, 1);
    }

    #[test]
    fn clamp_floors_page_at_one() {
        let params = PaginationParams::clamp(Some(0), Some(10), 100);
        assert_eq!(params.page, 1);
    }
}
