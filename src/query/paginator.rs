//! Paginate stage: page/per validation, slicing and navigation links

use crate::core::error::{PipelineError, QueryBuilderError};
use crate::core::params::RequestParams;
use crate::core::scope::Scope;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PER: u64 = 10;

/// Slices a scope into one page and computes the RFC 5988 `Link` header
/// value with up to four navigation relations (`first`, `prev`, `next`,
/// `last`).
///
/// Construction validates `page` and `per` (strictly digits); the slice and
/// the links are computed from the scope as received, so a pipeline that
/// filters after paginating links against the pre-filter count, as the
/// canonical stage order dictates.
#[derive(Debug)]
pub struct Paginator<'a> {
    scope: Scope,
    params: &'a RequestParams,
    url: String,
    page: u64,
    per: u64,
}

impl<'a> Paginator<'a> {
    pub fn new(
        scope: Scope,
        params: &'a RequestParams,
        url: impl Into<String>,
    ) -> Result<Self, QueryBuilderError> {
        // page=0 passes the digit check and is served as page 1; normalize
        // here so the links agree with the slice
        let page = validated_param(params, "page", DEFAULT_PAGE)?.max(1);
        let per = validated_param(params, "per", DEFAULT_PER)?;
        Ok(Self {
            scope,
            params,
            url: url.into(),
            page,
            per,
        })
    }

    /// The scope narrowed to the requested page
    pub fn paginate(&self) -> Scope {
        self.scope.slice(self.page, self.per)
    }

    /// The `Link` header value; empty when no relation applies
    pub async fn links(&self) -> Result<String, PipelineError> {
        let total = self.scope.count().await?;
        let total_pages = total_pages(total, self.per);

        let links: Vec<String> = self
            .pages(total_pages)
            .into_iter()
            .map(|(rel, page)| format!("<{}?{}>; rel=\"{}\"", self.url, self.query_string(page), rel))
            .collect();
        Ok(links.join(", "))
    }

    /// Which relations apply, in `first, prev, next, last` order
    ///
    /// A page beyond the last yields no `prev`/`next` but still links
    /// `first` and `last` relative to the total page count.
    fn pages(&self, total_pages: u64) -> Vec<(&'static str, u64)> {
        let out_of_range = self.page > total_pages;
        let mut pages = Vec::new();
        if self.page != 1 {
            pages.push(("first", 1));
        }
        if self.page > 1 && !out_of_range {
            pages.push(("prev", self.page - 1));
        }
        if self.page < total_pages {
            pages.push(("next", self.page + 1));
        }
        if self.page != total_pages {
            pages.push(("last", total_pages));
        }
        pages
    }

    /// Query string for a link target: the request's other parameters merged
    /// with the target page, keys sorted for determinism
    fn query_string(&self, page: u64) -> String {
        let mut merged: BTreeMap<String, String> = self
            .params
            .entries()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        for (key, value) in self.params.filters() {
            merged.insert(format!("q[{key}]"), value.clone());
        }
        merged.insert("page".to_string(), page.to_string());
        merged.insert("per".to_string(), self.per.to_string());

        merged
            .into_iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Total page count, floored at one so no `page=0` link is ever emitted
fn total_pages(total: u64, per: u64) -> u64 {
    if total == 0 {
        1
    } else {
        total.div_ceil(per.max(1))
    }
}

fn validated_param(
    params: &RequestParams,
    name: &str,
    default: u64,
) -> Result<u64, QueryBuilderError> {
    static DIGITS: OnceLock<Regex> = OnceLock::new();
    let digits = DIGITS.get_or_init(|| Regex::new(r"^\d+$").unwrap());

    match params.get(name) {
        None => Ok(default),
        Some(raw) => {
            if digits.is_match(raw) {
                // Absurdly long digit strings overflow u64; same rejection
                raw.parse::<u64>()
                    .map_err(|_| pagination_error(name, raw))
            } else {
                Err(pagination_error(name, raw))
            }
        }
    }
}

fn pagination_error(name: &str, raw: &str) -> QueryBuilderError {
    QueryBuilderError::new(
        format!("{name}={raw}"),
        r#"Invalid Pagination params. Only numbers are supported for "page" and "per"."#,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::descriptor::ResourceDescriptor;
    use crate::core::record::Record;
    use crate::core::scope::Slice;
    use crate::storage::InMemoryDataSource;
    use std::sync::Arc;

    fn scope_with_books(count: i64) -> Scope {
        let source = InMemoryDataSource::new();
        for id in 1..=count {
            source.insert(Record::new("book").with("id", id).with("title", format!("Book {id}")));
        }
        let descriptor = Arc::new(
            ResourceDescriptor::builder("book")
                .exposable(["id", "title"])
                .build(),
        );
        Scope::new(Arc::new(source), descriptor)
    }

    fn params(page: &str, per: &str) -> RequestParams {
        RequestParams::new().with("page", page).with("per", per)
    }

    #[test]
    fn test_defaults() {
        let scope = scope_with_books(3);
        let params = RequestParams::new();
        let paginator = Paginator::new(scope, &params, "url").unwrap();
        assert_eq!(
            paginator.paginate().constraints().slice,
            Some(Slice { offset: 0, limit: 10 })
        );
    }

    #[test]
    fn test_slice_for_second_page() {
        let scope = scope_with_books(3);
        let params = params("2", "2");
        let paginator = Paginator::new(scope, &params, "url").unwrap();
        assert_eq!(
            paginator.paginate().constraints().slice,
            Some(Slice { offset: 2, limit: 2 })
        );
    }

    #[test]
    fn test_rejects_non_numeric_page() {
        let scope = scope_with_books(3);
        let params = params("abc", "10");
        let err = Paginator::new(scope, &params, "url").unwrap_err();
        assert_eq!(err.invalid_params, "page=abc");
        assert!(err.message.contains("Invalid Pagination params"));
    }

    #[test]
    fn test_rejects_negative_per() {
        let scope = scope_with_books(3);
        let params = params("1", "-5");
        let err = Paginator::new(scope, &params, "url").unwrap_err();
        assert_eq!(err.invalid_params, "per=-5");
    }

    #[tokio::test]
    async fn test_links_on_first_page() {
        let scope = scope_with_books(3);
        let params = params("1", "1");
        let paginator = Paginator::new(scope, &params, "url").unwrap();
        assert_eq!(
            paginator.links().await.unwrap(),
            "<url?page=2&per=1>; rel=\"next\", <url?page=3&per=1>; rel=\"last\""
        );
    }

    #[tokio::test]
    async fn test_links_on_middle_page() {
        let scope = scope_with_books(3);
        let params = params("2", "1");
        let paginator = Paginator::new(scope, &params, "url").unwrap();
        assert_eq!(
            paginator.links().await.unwrap(),
            "<url?page=1&per=1>; rel=\"first\", <url?page=1&per=1>; rel=\"prev\", \
             <url?page=3&per=1>; rel=\"next\", <url?page=3&per=1>; rel=\"last\""
        );
    }

    #[tokio::test]
    async fn test_links_on_last_page() {
        let scope = scope_with_books(3);
        let params = params("3", "1");
        let paginator = Paginator::new(scope, &params, "url").unwrap();
        assert_eq!(
            paginator.links().await.unwrap(),
            "<url?page=1&per=1>; rel=\"first\", <url?page=2&per=1>; rel=\"prev\""
        );
    }

    #[tokio::test]
    async fn test_links_out_of_range() {
        let scope = scope_with_books(3);
        let params = params("7", "1");
        let paginator = Paginator::new(scope, &params, "url").unwrap();
        assert_eq!(
            paginator.links().await.unwrap(),
            "<url?page=1&per=1>; rel=\"first\", <url?page=3&per=1>; rel=\"last\""
        );
    }

    #[tokio::test]
    async fn test_page_zero_is_served_as_first_page() {
        let scope = scope_with_books(3);
        let params = params("0", "1");
        let paginator = Paginator::new(scope, &params, "url").unwrap();
        assert_eq!(
            paginator.paginate().constraints().slice,
            Some(Slice { offset: 0, limit: 1 })
        );
        // Same links as page 1: no first/prev pointing at itself
        assert_eq!(
            paginator.links().await.unwrap(),
            "<url?page=2&per=1>; rel=\"next\", <url?page=3&per=1>; rel=\"last\""
        );
    }

    #[tokio::test]
    async fn test_links_single_page_is_empty() {
        let scope = scope_with_books(3);
        let params = params("1", "10");
        let paginator = Paginator::new(scope, &params, "url").unwrap();
        assert_eq!(paginator.links().await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_links_preserve_other_params_sorted() {
        let scope = scope_with_books(3);
        let params = RequestParams::new()
            .with("page", "1")
            .with("per", "1")
            .with("sort", "title")
            .with("dir", "desc");
        let paginator = Paginator::new(scope, &params, "url").unwrap();
        let links = paginator.links().await.unwrap();
        assert!(links.contains("<url?dir=desc&page=2&per=1&sort=title>; rel=\"next\""));
    }

    #[test]
    fn test_total_pages_floor() {
        assert_eq!(total_pages(0, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(5, 0), 5);
    }
}
