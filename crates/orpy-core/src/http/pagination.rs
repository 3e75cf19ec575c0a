//! Following paginated list responses
//!
//! List endpoints return `{"content": [...], "links": [{"rel", "href"}, ...]}`.
//! While a page advertises `self`, `next` and `last` links and `self` differs
//! from `last`, the next page is fetched and its `content` appended.

use std::collections::HashSet;

use serde_json::Value;

use crate::error::PaginationFailure;
use crate::{Error, Result};

/// Default ceiling on the number of pages fetched for one call
pub const DEFAULT_MAX_PAGES: usize = 1000;

/// The `self`, `next` and `last` links of a page
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageLinks {
    pub current: Option<String>,
    pub next: Option<String>,
    pub last: Option<String>,
}

impl PageLinks {
    /// Read the links of a page body; later duplicates of a `rel` win
    pub fn from_body(body: Option<&Value>) -> Self {
        let mut links = PageLinks::default();

        let entries = body
            .and_then(|b| b.get("links"))
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        for entry in entries {
            let (Some(rel), Some(href)) = (
                entry.get("rel").and_then(Value::as_str),
                entry.get("href").and_then(Value::as_str),
            ) else {
                continue;
            };
            let slot = match rel {
                "self" => &mut links.current,
                "next" => &mut links.next,
                "last" => &mut links.last,
                _ => continue,
            };
            *slot = Some(href.to_string());
        }

        links
    }

    /// The `next` href, when the page says there is more to fetch
    pub fn continuation(&self) -> Option<&str> {
        match (&self.current, &self.next, &self.last) {
            (Some(current), Some(next), Some(last)) if current != last => Some(next),
            _ => None,
        }
    }
}

/// The `content` array of a page, empty when absent
pub fn page_content(body: Option<&Value>) -> Vec<Value> {
    body.and_then(|b| b.get("content"))
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

/// Accumulates the content of successive pages and decides when to stop
#[derive(Debug)]
pub struct PaginationFollower {
    max_pages: Option<usize>,
    pages: usize,
    seen: HashSet<String>,
    content: Vec<Value>,
}

impl PaginationFollower {
    /// Start from the content of the first page
    pub fn new(first_content: Vec<Value>, max_pages: Option<usize>) -> Self {
        Self {
            max_pages,
            pages: 1,
            seen: HashSet::new(),
            content: first_content,
        }
    }

    /// Href of the page to fetch after the page whose body is `body`.
    ///
    /// Fails when the page's `self` link was already visited or when the
    /// next fetch would exceed the page ceiling.
    pub fn next_page(&mut self, body: Option<&Value>) -> Result<Option<String>> {
        let links = PageLinks::from_body(body);
        let Some(next) = links.continuation() else {
            return Ok(None);
        };

        if let Some(current) = &links.current {
            if !self.seen.insert(current.clone()) {
                return Err(Error::Pagination {
                    kind: PaginationFailure::Cycle,
                    url: current.clone(),
                    pages: self.pages,
                });
            }
        }

        if let Some(max) = self.max_pages {
            if self.pages >= max {
                return Err(Error::Pagination {
                    kind: PaginationFailure::PageLimit,
                    url: next.to_string(),
                    pages: self.pages,
                });
            }
        }

        Ok(Some(next.to_string()))
    }

    /// Append a fetched page
    pub fn push_page(&mut self, body: Option<&Value>) {
        self.pages += 1;
        self.content.extend(page_content(body));
    }

    /// Pages seen so far, the first one included
    pub fn pages(&self) -> usize {
        self.pages
    }

    /// Concatenated content
    pub fn into_content(self) -> Vec<Value> {
        self.content
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page(current: &str, next: Option<&str>, last: &str, items: Value) -> Value {
        let mut links = vec![json!({"rel": "self", "href": current})];
        if let Some(next) = next {
            links.push(json!({"rel": "next", "href": next}));
        }
        links.push(json!({"rel": "last", "href": last}));
        json!({"content": items, "links": links})
    }

    #[test]
    fn test_links() {
        let body = page("p0", Some("p1"), "p2", json!([]));
        let links = PageLinks::from_body(Some(&body));
        assert_eq!(links.current.as_deref(), Some("p0"));
        assert_eq!(links.continuation(), Some("p1"));

        let body = page("p2", None, "p2", json!([]));
        assert_eq!(PageLinks::from_body(Some(&body)).continuation(), None);

        // a next link alone is not enough
        let body = json!({"links": [{"rel": "next", "href": "p1"}]});
        assert_eq!(PageLinks::from_body(Some(&body)).continuation(), None);

        assert_eq!(PageLinks::from_body(None), PageLinks::default());
    }

    #[test]
    fn test_self_equal_last_stops() {
        let body = page("p1", Some("p2"), "p1", json!([1]));
        let mut follower = PaginationFollower::new(vec![json!(1)], None);
        assert_eq!(follower.next_page(Some(&body)).unwrap(), None);
    }

    #[test]
    fn test_three_pages() {
        let p0 = page("p0", Some("p1"), "p2", json!([1, 2]));
        let p1 = page("p1", Some("p2"), "p2", json!([3]));
        let p2 = page("p2", None, "p2", json!([4]));

        let mut follower = PaginationFollower::new(page_content(Some(&p0)), Some(10));
        assert_eq!(follower.next_page(Some(&p0)).unwrap().as_deref(), Some("p1"));
        follower.push_page(Some(&p1));
        assert_eq!(follower.next_page(Some(&p1)).unwrap().as_deref(), Some("p2"));
        follower.push_page(Some(&p2));
        assert_eq!(follower.next_page(Some(&p2)).unwrap(), None);

        assert_eq!(follower.pages(), 3);
        assert_eq!(follower.into_content(), vec![json!(1), json!(2), json!(3), json!(4)]);
    }

    #[test]
    fn test_page_without_content() {
        let mut follower = PaginationFollower::new(vec![json!("a")], None);
        follower.push_page(Some(&json!({"links": []})));
        follower.push_page(None);
        assert_eq!(follower.into_content(), vec![json!("a")]);
    }

    #[test]
    fn test_page_limit() {
        let p0 = page("p0", Some("p1"), "p9", json!([]));
        let mut follower = PaginationFollower::new(vec![], Some(1));
        match follower.next_page(Some(&p0)) {
            Err(Error::Pagination { kind, url, pages }) => {
                assert_eq!(kind, PaginationFailure::PageLimit);
                assert_eq!(url, "p1");
                assert_eq!(pages, 1);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_cycle_detection() {
        let p0 = page("p0", Some("p1"), "p9", json!([]));
        let p1 = page("p0", Some("p1"), "p9", json!([]));

        let mut follower = PaginationFollower::new(vec![], None);
        assert!(follower.next_page(Some(&p0)).unwrap().is_some());
        follower.push_page(Some(&p1));
        assert!(matches!(
            follower.next_page(Some(&p1)),
            Err(Error::Pagination { kind: PaginationFailure::Cycle, .. })
        ));
    }
}
