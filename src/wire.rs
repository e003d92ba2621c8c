//! Helpers for transports that speak a GraphQL connection envelope:
//!
//! ```text
//! {"data": {"yak": {"comments": {"edges": [{"node": {..}}, ..],
//!                                "pageInfo": {"endCursor": "..", "hasNextPage": true}}}}}
//! ```
//!
//! A `null` on the way to the connection (e.g. `"yak": null`) means the parent
//! resource does not exist and maps to `TransportError::NotFound`.

use crate::error::TransportError;
use crate::transport::{Endpoint, PageRequest, PageResult};
use anyhow::anyhow;
use serde_json::{json, Value};

/// Field path from `data` to the connection object for an endpoint.
pub fn connection_path(endpoint: &Endpoint) -> &'static [&'static str] {
    match endpoint {
        Endpoint::Feed { .. } => &["feed"],
        Endpoint::Comments { .. } => &["yak", "comments"],
    }
}

/// Query variables for a page request.
pub fn variables(request: &PageRequest) -> Value {
    match &request.endpoint {
        Endpoint::Feed { feed_type, order } => json!({
            "cursor": request.cursor,
            "feedOrder": order.as_str(),
            "feedType": feed_type.as_str(),
            "pageLimit": request.limit,
        }),
        Endpoint::Comments { post_id } => json!({
            "cursor": request.cursor,
            "id": post_id,
            "pageLimit": request.limit,
        }),
    }
}

/// Extract one page from a response body, walking `data.<path..>`.
pub fn connection_page(body: &Value, path: &[&str]) -> Result<PageResult, TransportError> {
    let mut cur = match body.get("data") {
        Some(v) if !v.is_null() => v,
        _ => {
            let errors = body.get("errors").map(|e| e.to_string()).unwrap_or_else(|| "none".into());
            return Err(anyhow!("response has no data (errors: {errors})").into());
        }
    };

    for (depth, seg) in path.iter().enumerate() {
        let last = depth + 1 == path.len();
        match cur.get(*seg) {
            Some(v) if !v.is_null() => cur = v,
            _ if !last => {
                return Err(TransportError::NotFound { resource: path[..=depth].join(".") });
            }
            _ => return Err(anyhow!("response is missing connection `{}`", path.join(".")).into()),
        }
    }

    let edges = cur
        .get("edges")
        .and_then(Value::as_array)
        .ok_or_else(|| anyhow!("connection `{}` has no edges array", path.join(".")))?;
    // Leave a missing node as null so the codec reports it against the item.
    let items = edges.iter().map(|e| e.get("node").cloned().unwrap_or(Value::Null)).collect();

    let page_info = cur
        .get("pageInfo")
        .ok_or_else(|| anyhow!("connection `{}` has no pageInfo", path.join(".")))?;
    let has_more = page_info
        .get("hasNextPage")
        .and_then(Value::as_bool)
        .ok_or_else(|| anyhow!("pageInfo.hasNextPage is missing or not a boolean"))?;
    let next_cursor = page_info.get("endCursor").and_then(Value::as_str).map(str::to_string);

    Ok(PageResult { items, next_cursor, has_more })
}
