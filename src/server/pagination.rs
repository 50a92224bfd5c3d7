use std::collections::HashMap;

const DEFAULT_LIMIT: i64 = 10;
const DEFAULT_PAGE: i64 = 1;

/// `limit` and `page` query parameters. Pages start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: i64,
    pub page: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            page: DEFAULT_PAGE,
        }
    }
}

impl Pagination {
    /// A parameter that is absent or not an integer keeps its default.
    pub fn from_query(params: &HashMap<String, String>) -> Self {
        let int_param = |key: &str, default: i64| {
            params
                .get(key)
                .and_then(|value| value.trim().parse::<i64>().ok())
                .unwrap_or(default)
        };
        Self {
            limit: int_param("limit", DEFAULT_LIMIT),
            page: int_param("page", DEFAULT_PAGE),
        }
    }

    /// `(limit, offset)` for the query, or `None` when the page can hold no rows.
    pub fn window(&self) -> Option<(i64, i64)> {
        if self.page < 1 || self.limit < 0 {
            return None;
        }
        let offset = (self.page - 1).checked_mul(self.limit)?;
        Some((self.limit, offset))
    }
}
