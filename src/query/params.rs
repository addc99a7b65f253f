use std::collections::BTreeMap;
use std::convert::Infallible;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use url::form_urlencoded;

use crate::config;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }

    fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("asc") {
            SortOrder::Asc
        } else {
            SortOrder::Desc
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pagination {
    pub limit: i64,
    pub offset: i64,
}

impl Pagination {
    pub fn page(&self) -> i64 {
        self.offset / self.limit.max(1) + 1
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: config::config().pagination.default_limit,
            offset: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sort {
    pub attribute: String,
    pub order: SortOrder,
}

impl Default for Sort {
    fn default() -> Self {
        Self {
            attribute: "updatedAt".to_string(),
            order: SortOrder::Desc,
        }
    }
}

/// Everything a list endpoint needs from the query string, normalized.
///
/// Parsing never fails: malformed numeric input falls back to the default,
/// limit is clamped to at least 1, and a `page` parameter overrides `offset`
/// as `(page - 1) * limit`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListParams {
    pub pagination: Pagination,
    pub sort: Sort,
    pub search: String,
    pub filter: BTreeMap<String, String>,
}

impl ListParams {
    pub fn parse(query: &str) -> Self {
        let cfg = &config::config().pagination;

        let mut limit = cfg.default_limit;
        let mut offset = 0i64;
        let mut page: Option<i64> = None;
        let mut sort = Sort::default();
        let mut search = String::new();
        let mut filter = BTreeMap::new();

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "limit" => {
                    if let Ok(n) = value.parse::<i64>() {
                        limit = n;
                    }
                }
                "offset" => {
                    if let Ok(n) = value.parse::<i64>() {
                        offset = n;
                    }
                }
                "page" => {
                    if let Ok(n) = value.parse::<i64>() {
                        page = Some(n);
                    }
                }
                "@sort" => {
                    if !value.is_empty() {
                        sort.attribute = value.into_owned();
                    }
                }
                "@order" => sort.order = SortOrder::parse(&value),
                "@search" => search = value.into_owned(),
                key if key.starts_with('@') => {} // unknown meta parameters are ignored
                key => {
                    if super::is_identifier(key) {
                        filter.insert(key.to_string(), value.into_owned());
                    }
                }
            }
        }

        if limit < 1 {
            limit = 1;
        }
        if let Some(max) = cfg.max_limit {
            if limit > max {
                tracing::debug!("limit {} exceeds max {}, capping", limit, max);
                limit = max;
            }
        }
        if offset < 0 {
            offset = 0;
        }
        if let Some(p) = page {
            // page takes precedence over offset when both are supplied
            offset = (p.max(1) - 1) * limit;
        }

        Self {
            pagination: Pagination { limit, offset },
            sort,
            search,
            filter,
        }
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for ListParams {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::parse(parts.uri.query().unwrap_or("")))
    }
}
