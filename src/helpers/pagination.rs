use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;

/// Raw `?page=&limit=` query. Kept as strings so that junk values fall back
/// to the defaults instead of rejecting the request.
#[derive(Deserialize, Default, Debug)]
pub struct PageParams {
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

/// Reads the leading digits of a query value, so `"2abc"` is page 2. Values
/// with no leading digits, or below 1, give `default`.
fn positive_or(raw: Option<&str>, default: i64) -> i64 {
    raw.map(|v| {
        let v = v.trim_start();
        let v = v.strip_prefix('+').unwrap_or(v);
        let end = v.find(|c: char| !c.is_ascii_digit()).unwrap_or(v.len());
        &v[..end]
    })
    .and_then(|digits| digits.parse::<i64>().ok())
    .filter(|v| *v >= 1)
    .unwrap_or(default)
}

impl PageRequest {
    pub fn new(page: i64, limit: i64) -> Self {
        PageRequest {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    pub fn from_params(params: &PageParams) -> Self {
        PageRequest::new(
            positive_or(params.page.as_deref(), DEFAULT_PAGE),
            positive_or(params.limit.as_deref(), DEFAULT_LIMIT),
        )
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest::new(DEFAULT_PAGE, DEFAULT_LIMIT)
    }
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: i64,
    pub total_pages: i64,
    pub total_items: i64,
    pub items_per_page: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    pub fn new(request: PageRequest, total_items: i64) -> Self {
        let total_items = total_items.max(0);
        // ceil(total / limit) without floats or overflow on huge limits
        let total_pages = if total_items == 0 {
            0
        } else {
            (total_items - 1) / request.limit + 1
        };

        Pagination {
            current_page: request.page,
            total_pages,
            total_items,
            items_per_page: request.limit,
            has_next: request.page < total_pages,
            has_prev: request.page > 1,
        }
    }
}
