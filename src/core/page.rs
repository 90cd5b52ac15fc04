//! Purpose: Aggregate paged list responses into one combined object.
//! Exports: `PageQuery`, `fetch_all_pages`.
//! Role: Drives a paged fetch closure until the server-reported total is covered.
//! Invariants: At least one page is always fetched.
//! Invariants: Paging continues until the cumulative fetched count covers the
//! reported total; no cap is enforced, so a huge `rows` keeps fetching.

use crate::core::decode::Decoded;
use crate::core::error::{ApiResult, Error, ErrorKind};
use serde_json::{Map, Value};

#[derive(Clone, Copy, Debug)]
pub struct PageQuery {
    pub offset: u64,
    pub per_page: u64,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            offset: 1,
            per_page: 1000,
        }
    }
}

/// Repeatedly call `fetch(offset, per_page)` and concatenate the
/// `collection` array across pages. Passthrough keys are copied from the
/// first page when present and truthy.
pub fn fetch_all_pages<F>(
    collection: &str,
    passthrough: &[&str],
    query: PageQuery,
    mut fetch: F,
) -> ApiResult<Decoded>
where
    F: FnMut(u64, u64) -> ApiResult<Decoded>,
{
    let PageQuery {
        mut offset,
        per_page,
    } = query;

    let first = fetch(offset, per_page)?;
    let mut items = first
        .array(collection)
        .cloned()
        .ok_or_else(|| missing_collection(collection))?;

    let mut combined = Map::new();
    for key in passthrough {
        if let Some(value) = first.get(key) {
            if is_truthy(value) {
                combined.insert((*key).to_string(), value.clone());
            }
        }
    }

    let rows = first.u64_field("rows").unwrap_or(0);
    // The page at `offset` covers items up to `offset - 1 + per_page`;
    // fetch again while the reported total exceeds that.
    while rows >= offset + per_page {
        offset += per_page;
        let page = fetch(offset, per_page)?;
        let more = page
            .array(collection)
            .ok_or_else(|| missing_collection(collection))?;
        items.extend(more.iter().cloned());
    }

    combined.insert(collection.to_string(), Value::Array(items));
    Ok(Decoded::from_object(combined))
}

fn missing_collection(collection: &str) -> Error {
    Error::new(ErrorKind::Internal)
        .with_message(format!("response missing {collection} list"))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64() != Some(0.0),
        Value::String(raw) => !raw.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(object) => !object.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::{PageQuery, fetch_all_pages};
    use crate::core::decode::Decoded;
    use crate::core::error::ErrorKind;
    use serde_json::json;

    fn page(items: &[u64], rows: u64) -> Decoded {
        let object = json!({"segments": items, "rows": rows});
        Decoded::from_object(object.as_object().expect("object").clone())
    }

    #[test]
    fn covers_reported_total_in_three_calls() {
        let mut calls = Vec::new();
        let combined = fetch_all_pages(
            "segments",
            &[],
            PageQuery::default(),
            |offset, per_page| {
                calls.push((offset, per_page));
                let base = offset - 1;
                Ok(page(&[base, base + 1], 2500))
            },
        )
        .expect("combined");

        assert_eq!(calls, vec![(1, 1000), (1001, 1000), (2001, 1000)]);
        let items = combined.array("segments").expect("segments");
        assert_eq!(items.len(), 6);
        assert_eq!(items[0], json!(0));
        assert_eq!(items[2], json!(1000));
        assert_eq!(items[4], json!(2000));
    }

    #[test]
    fn single_page_when_total_fits() {
        let mut calls = 0;
        let combined = fetch_all_pages("segments", &[], PageQuery::default(), |_, _| {
            calls += 1;
            Ok(page(&[1, 2, 3], 3))
        })
        .expect("combined");
        assert_eq!(calls, 1);
        assert_eq!(combined.array("segments").expect("segments").len(), 3);
    }

    #[test]
    fn missing_rows_means_one_page() {
        let mut calls = 0;
        fetch_all_pages("segments", &[], PageQuery::default(), |_, _| {
            calls += 1;
            let object = json!({"segments": [1]});
            Ok(Decoded::from_object(object.as_object().expect("object").clone()))
        })
        .expect("combined");
        assert_eq!(calls, 1);
    }

    #[test]
    fn stops_once_total_is_exactly_covered() {
        let mut calls = Vec::new();
        fetch_all_pages("segments", &[], PageQuery::default(), |offset, per_page| {
            calls.push((offset, per_page));
            Ok(page(&[offset], 2000))
        })
        .expect("combined");
        assert_eq!(calls, vec![(1, 1000), (1001, 1000)]);
    }

    #[test]
    fn one_row_past_a_page_boundary_fetches_another_page() {
        let mut calls = Vec::new();
        fetch_all_pages("segments", &[], PageQuery::default(), |offset, per_page| {
            calls.push((offset, per_page));
            Ok(page(&[offset], 2001))
        })
        .expect("combined");
        assert_eq!(calls, vec![(1, 1000), (1001, 1000), (2001, 1000)]);
    }

    #[test]
    fn per_page_override_changes_loop_bound() {
        let mut calls = Vec::new();
        fetch_all_pages(
            "segments",
            &[],
            PageQuery {
                offset: 1,
                per_page: 10,
            },
            |offset, per_page| {
                calls.push((offset, per_page));
                Ok(page(&[offset], 25))
            },
        )
        .expect("combined");
        assert_eq!(calls, vec![(1, 10), (11, 10), (21, 10)]);
    }

    #[test]
    fn passthrough_copies_truthy_first_page_keys() {
        let combined = fetch_all_pages(
            "segments",
            &["pixels", "empty", "flag"],
            PageQuery::default(),
            |_, _| {
                let object = json!({
                    "segments": [1],
                    "rows": 1,
                    "pixels": ["p1"],
                    "empty": [],
                    "flag": false,
                });
                Ok(Decoded::from_object(object.as_object().expect("object").clone()))
            },
        )
        .expect("combined");
        assert_eq!(combined.array("pixels").expect("pixels").len(), 1);
        assert!(combined.get("empty").is_none());
        assert!(combined.get("flag").is_none());
    }

    #[test]
    fn missing_collection_is_internal_error() {
        let err = fetch_all_pages("segments", &[], PageQuery::default(), |_, _| {
            let object = json!({"rows": 1});
            Ok(Decoded::from_object(object.as_object().expect("object").clone()))
        })
        .expect_err("err");
        assert_eq!(err.kind(), ErrorKind::Internal);
    }
}
