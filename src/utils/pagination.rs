use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Page/page-size query parameters shared by every listing endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl PageParams {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.page_size())
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page() - 1) * self.limit()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: i64,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: i64, params: &PageParams) -> Self {
        let page_size = params.page_size();
        let total_pages = if total > 0 {
            (total + i64::from(page_size) - 1) / i64::from(page_size)
        } else {
            0
        };

        Self {
            items,
            total,
            page: params.page(),
            page_size,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: Option<u32>, page_size: Option<u32>) -> PageParams {
        PageParams { page, page_size }
    }

    #[test]
    fn test_defaults() {
        let p = params(None, None);
        assert_eq!(p.page(), 1);
        assert_eq!(p.page_size(), 20);
        assert_eq!(p.limit(), 20);
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn test_offset_for_later_pages() {
        let p = params(Some(3), Some(10));
        assert_eq!(p.offset(), 20);
    }

    #[test]
    fn test_page_zero_clamped() {
        let p = params(Some(0), None);
        assert_eq!(p.page(), 1);
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn test_page_size_capped() {
        let p = params(None, Some(500));
        assert_eq!(p.page_size(), 100);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let p = params(None, Some(20));
        let out: Paginated<u8> = Paginated::new(vec![], 41, &p);
        assert_eq!(out.total_pages, 3);
    }

    #[test]
    fn test_total_pages_zero_when_empty() {
        let p = params(None, None);
        let out: Paginated<u8> = Paginated::new(vec![], 0, &p);
        assert_eq!(out.total_pages, 0);
    }
}
