use serde::Serialize;
use url::form_urlencoded;

/// Pagination block of the response envelope's `meta`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaginationMeta {
    pub limit: i64,
    pub offset: i64,
    pub page: i64,
    pub pages: i64,
    #[serde(rename = "pageSize")]
    pub page_size: i64,
    pub total: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
}

/// Compute the pagination metadata for an applied window.
///
/// `next` is present iff another full-or-partial page exists past the window;
/// `previous` iff a whole page fits before it. Links reuse the request's
/// query string with only `offset` rewritten.
pub fn build(total: i64, limit: i64, offset: i64, path: &str, query: &str) -> PaginationMeta {
    let limit = limit.max(1);
    let offset = offset.max(0);
    let total = total.max(0);

    let page = offset / limit + 1;
    let pages = if total == 0 { 0 } else { (total + limit - 1) / limit };

    let next = (offset + limit < total).then(|| page_url(path, query, offset + limit));
    let prev_offset = offset - limit;
    let previous = (prev_offset > -1).then(|| page_url(path, query, prev_offset));

    PaginationMeta {
        limit,
        offset,
        page,
        pages,
        page_size: limit,
        total,
        next,
        previous,
    }
}

/// Re-serialize the query string with `offset` overwritten. A `page`
/// parameter is dropped since it would override the emitted offset on the
/// next request; everything else passes through verbatim.
fn page_url(path: &str, query: &str, offset: i64) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    let mut wrote_offset = false;
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            "offset" => {
                if !wrote_offset {
                    serializer.append_pair("offset", &offset.to_string());
                    wrote_offset = true;
                }
            }
            "page" => {}
            _ => {
                serializer.append_pair(&key, &value);
            }
        }
    }
    if !wrote_offset {
        serializer.append_pair("offset", &offset.to_string());
    }
    format!("{}?{}", path, serializer.finish())
}
