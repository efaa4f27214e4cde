// src/models/pagination.rs
// DOCUMENTATION: Page-number pagination shared by every list endpoint
// PURPOSE: Compute offsets, reject out-of-range pages, build next/previous links

use crate::errors::YamdbError;
use serde::Serialize;

const PAGE_PARAM: &str = "page";

/// Requested page (1-based) and page size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub number: i64,
    pub size: i64,
}

impl PageRequest {
    /// Build from the `page` query parameter
    /// Page numbers below 1 are rejected the same way as pages past the end
    pub fn new(page: Option<i64>, size: i64) -> Result<Self, YamdbError> {
        let number = page.unwrap_or(1);
        let size = size.max(1);
        let offset = number
            .checked_sub(1)
            .and_then(|n| n.checked_mul(size))
            .filter(|offset| *offset >= 0);
        if number < 1 || offset.is_none() {
            return Err(YamdbError::NotFound("Invalid page.".to_string()));
        }

        Ok(Self { number, size })
    }

    pub fn limit(&self) -> i64 {
        self.size
    }

    pub fn offset(&self) -> i64 {
        (self.number - 1) * self.size
    }

    /// Total number of pages for `count` items (at least one)
    pub fn num_pages(&self, count: i64) -> i64 {
        ((count + self.size - 1) / self.size).max(1)
    }
}

/// Paginated list response
/// DOCUMENTATION: `{count, next, previous, results}` envelope
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Wrap a page of results
    /// `request_url` is the absolute URL of the current request, query included
    pub fn new(
        results: Vec<T>,
        count: i64,
        request: PageRequest,
        request_url: &str,
    ) -> Result<Self, YamdbError> {
        let num_pages = request.num_pages(count);
        if request.number > num_pages {
            return Err(YamdbError::NotFound("Invalid page.".to_string()));
        }

        let next = (request.number < num_pages)
            .then(|| replace_page_param(request_url, Some(request.number + 1)));

        let previous = match request.number {
            1 => None,
            2 => Some(replace_page_param(request_url, None)),
            n => Some(replace_page_param(request_url, Some(n - 1))),
        };

        Ok(Self {
            count,
            next,
            previous,
            results,
        })
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            count: self.count,
            next: self.next,
            previous: self.previous,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}

/// Rewrite the `page` query parameter, keeping every other parameter in order
/// `None` drops the parameter (first page)
fn replace_page_param(url: &str, page: Option<i64>) -> String {
    let (base, query) = match url.split_once('?') {
        Some((base, query)) => (base, query),
        None => (url, ""),
    };

    let mut params: Vec<String> = query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| pair.split('=').next() != Some(PAGE_PARAM))
        .map(str::to_string)
        .collect();

    if let Some(page) = page {
        params.push(format!("{}={}", PAGE_PARAM, page));
    }

    if params.is_empty() {
        base.to_string()
    } else {
        format!("{}?{}", base, params.join("&"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "http://localhost/api/v1/titles/";

    #[test]
    fn test_offsets() {
        let req = PageRequest::new(Some(3), 10).unwrap();
        assert_eq!(req.offset(), 20);
        assert_eq!(req.limit(), 10);
        assert_eq!(req.num_pages(0), 1);
        assert_eq!(req.num_pages(21), 3);
    }

    #[test]
    fn test_invalid_page_numbers() {
        assert!(PageRequest::new(Some(0), 10).is_err());
        assert!(PageRequest::new(Some(-2), 10).is_err());
        assert!(PageRequest::new(Some(i64::MIN), 10).is_err());

        let req = PageRequest::new(Some(4), 10).unwrap();
        let page = Page::new(Vec::<i32>::new(), 30, req, URL);
        assert!(matches!(page, Err(YamdbError::NotFound(_))));
    }

    #[test]
    fn test_huge_page_number_is_not_found() {
        assert!(matches!(
            PageRequest::new(Some(i64::MAX), 10),
            Err(YamdbError::NotFound(_))
        ));

        let last = i64::MAX / 10 + 1;
        let req = PageRequest::new(Some(last), 10).unwrap();
        assert_eq!(req.offset(), (last - 1) * 10);
        assert!(PageRequest::new(Some(last + 1), 10).is_err());
    }

    #[test]
    fn test_first_page_of_empty_list_is_valid() {
        let req = PageRequest::new(None, 10).unwrap();
        let page = Page::new(Vec::<i32>::new(), 0, req, URL).unwrap();
        assert_eq!(page.count, 0);
        assert!(page.next.is_none());
        assert!(page.previous.is_none());
    }

    #[test]
    fn test_links_keep_filters() {
        let url = "http://localhost/api/v1/titles/?genre=drama&page=2&year=1994";
        let req = PageRequest::new(Some(2), 10).unwrap();
        let page = Page::new(vec![1, 2, 3], 25, req, url).unwrap();

        assert_eq!(
            page.next.as_deref(),
            Some("http://localhost/api/v1/titles/?genre=drama&year=1994&page=3")
        );
        assert_eq!(
            page.previous.as_deref(),
            Some("http://localhost/api/v1/titles/?genre=drama&year=1994")
        );
    }

    #[test]
    fn test_map_preserves_links() {
        let req = PageRequest::new(None, 2).unwrap();
        let page = Page::new(vec![1, 2], 5, req, URL).unwrap().map(|n| n * 10);
        assert_eq!(page.results, vec![10, 20]);
        assert_eq!(page.next.as_deref(), Some("http://localhost/api/v1/titles/?page=2"));
    }
}
