//! Pagination link handling and page merging.
//!
//! JSON:API servers emit `next`/`prev`/`last` links either as bare URL
//! strings or as `{ "href": ... }` objects; both are normalized here.
//! Merging is deliberately narrow: it understands exactly the collection
//! document shape (`data` array + `links` object) and nothing else.

use serde_json::Value;

/// Normalize a single link value to its href string.
pub fn link_href(link: &Value) -> Option<&str> {
    match link {
        Value::String(url) if !url.is_empty() => Some(url),
        Value::Object(map) => match map.get("href") {
            Some(Value::String(url)) if !url.is_empty() => Some(url),
            _ => None,
        },
        _ => None,
    }
}

/// The document's normalized `next` link, if it has one.
pub fn next_link(document: &Value) -> Option<&str> {
    document
        .get("links")
        .and_then(|links| links.get("next"))
        .and_then(link_href)
}

/// Whether a cached collection still has unfetched pages.
///
/// True iff a normalizable `next` link exists and points somewhere other
/// than the current page (a server at the final page may emit
/// `next == self`).
pub fn has_more_pages(document: &Value) -> bool {
    match next_link(document) {
        Some(next) => !is_self_link(document, next),
        None => false,
    }
}

fn is_self_link(document: &Value, url: &str) -> bool {
    document
        .get("links")
        .and_then(|links| links.get("self"))
        .and_then(link_href)
        .is_some_and(|own| own == url)
}

/// Merge a freshly fetched page into the accumulated collection.
///
/// `data` arrays concatenate in fetch order; `links` is replaced by the
/// new page's links so the loop always follows the latest `next`. Other
/// top-level members keep the accumulated value.
pub fn merge_page(into: &mut Value, page: &Value) {
    if let Some(new_items) = page.get("data").and_then(Value::as_array) {
        match into.get_mut("data").and_then(Value::as_array_mut) {
            Some(items) => items.extend(new_items.iter().cloned()),
            None => into["data"] = Value::Array(new_items.clone()),
        }
    }
    if let Some(links) = page.get("links") {
        into["links"] = links.clone();
    }
    if let Some(new_included) = page.get("included").and_then(Value::as_array) {
        match into.get_mut("included").and_then(Value::as_array_mut) {
            Some(included) => included.extend(new_included.iter().cloned()),
            None => into["included"] = Value::Array(new_included.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn link_href_accepts_both_forms() {
        assert_eq!(link_href(&json!("https://x.test/p2")), Some("https://x.test/p2"));
        assert_eq!(
            link_href(&json!({"href": "https://x.test/p2"})),
            Some("https://x.test/p2")
        );
        assert_eq!(link_href(&json!("")), None);
        assert_eq!(link_href(&json!({"href": 7})), None);
        assert_eq!(link_href(&json!(null)), None);
    }

    #[test]
    fn next_link_absent_means_done() {
        let doc = json!({"data": [], "links": {"self": "https://x.test/p4"}});
        assert_eq!(next_link(&doc), None);
        assert!(!has_more_pages(&doc));
    }

    #[test]
    fn next_present_without_last_means_more() {
        let doc = json!({"data": [], "links": {"next": "https://x.test/p2"}});
        assert!(has_more_pages(&doc));
    }

    #[test]
    fn next_pointing_at_self_and_last_means_done() {
        let doc = json!({
            "data": [],
            "links": {
                "self": "https://x.test/p4",
                "next": "https://x.test/p4",
                "last": "https://x.test/p4"
            }
        });
        assert!(!has_more_pages(&doc));
    }

    #[test]
    fn merge_concatenates_data_and_replaces_links() {
        let mut acc = json!({
            "data": [{"id": "1"}, {"id": "2"}],
            "links": {"next": "https://x.test/p2"}
        });
        let page = json!({
            "data": [{"id": "3"}],
            "links": {"next": "https://x.test/p3"}
        });
        merge_page(&mut acc, &page);

        assert_eq!(acc["data"].as_array().unwrap().len(), 3);
        assert_eq!(acc["data"][2]["id"], "3");
        assert_eq!(acc["links"]["next"], "https://x.test/p3");
    }

    #[test]
    fn merge_concatenates_included() {
        let mut acc = json!({"data": [], "included": [{"id": "a"}], "links": {}});
        let page = json!({"data": [], "included": [{"id": "b"}], "links": {}});
        merge_page(&mut acc, &page);
        assert_eq!(acc["included"].as_array().unwrap().len(), 2);
    }
}
