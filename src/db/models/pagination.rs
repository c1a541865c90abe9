use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
}

impl PageQuery {
    pub fn page(&self) -> i64 {
        self.page.filter(|p| *p > 0).unwrap_or(1)
    }

    pub fn limit(&self) -> i64 {
        self.limit
            .filter(|l| *l > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .min(MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }

    /// Blank search terms are treated as no search.
    pub fn search(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, total: i64, query: &PageQuery) -> Self {
        let limit = query.limit();
        Self {
            data,
            total,
            page: query.page(),
            limit,
            total_pages: (total + limit - 1) / limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_first_page_of_ten() {
        let query = PageQuery::default();
        assert_eq!((query.page(), query.limit(), query.offset()), (1, 10, 0));
    }

    #[test]
    fn offset_follows_page_and_limit() {
        let query = PageQuery {
            page: Some(3),
            limit: Some(25),
            search: None,
        };
        assert_eq!(query.offset(), 50);
    }

    #[test]
    fn limit_is_capped() {
        let query = PageQuery {
            limit: Some(10_000),
            ..Default::default()
        };
        assert_eq!(query.limit(), MAX_PAGE_SIZE);
    }

    #[test]
    fn total_pages_rounds_up() {
        let query = PageQuery::default();
        let page = Page::new(vec![1, 2, 3], 21, &query);
        assert_eq!(page.total_pages, 3);
        assert_eq!(Page::<i32>::new(vec![], 0, &query).total_pages, 0);
    }

    #[test]
    fn blank_search_is_ignored() {
        let query = PageQuery {
            search: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(query.search(), None);
    }
}
