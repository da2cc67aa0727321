//! Deterministic construction of [`HttpRequest`] values.
//!
//! # Design
//! `RequestBuilder` owns the base URL and User-Agent of a client and turns
//! (method, path segments, query, optional form body) into a fully resolved
//! request. Caller-supplied segments are percent-encoded one at a time so a
//! `/` or `?` inside an author name or search query stays part of that
//! segment. Building is total: any string input produces a request.

use std::borrow::Cow;

use crate::http::{HttpMethod, HttpRequest};
use crate::query::QueryParams;

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Percent-encode a single path segment.
///
/// RFC 3986 unreserved characters pass through; every other byte of the
/// UTF-8 encoding becomes `%XX`.
pub fn encode_segment(segment: &str) -> Cow<'_, str> {
    urlencoding::encode(segment)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestBuilder {
    base_url: String,
    user_agent: String,
}

impl RequestBuilder {
    pub fn new(base_url: &str, user_agent: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            user_agent: user_agent.to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Build a request. `segments` are raw values; each is encoded here.
    pub fn build<S: AsRef<str>>(
        &self,
        method: HttpMethod,
        segments: &[S],
        query: &QueryParams,
        form: Option<&QueryParams>,
    ) -> HttpRequest {
        let encoded: Vec<Cow<'_, str>> = segments
            .iter()
            .map(|s| encode_segment(s.as_ref()))
            .collect();
        self.assemble(method, &encoded[..], query, form)
    }

    /// Build from segments that are already in their on-the-wire form.
    pub(crate) fn assemble<S: AsRef<str>>(
        &self,
        method: HttpMethod,
        encoded_segments: &[S],
        query: &QueryParams,
        form: Option<&QueryParams>,
    ) -> HttpRequest {
        let mut url = self.base_url.clone();
        for segment in encoded_segments {
            url.push('/');
            url.push_str(segment.as_ref());
        }
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query.encode());
        }

        let mut headers = vec![("User-Agent".to_string(), self.user_agent.clone())];
        let body = form.map(|params| {
            headers.push(("Content-Type".to_string(), FORM_CONTENT_TYPE.to_string()));
            params.encode().into_bytes()
        });

        HttpRequest {
            method,
            url,
            headers,
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> RequestBuilder {
        RequestBuilder::new("https://api.spiget.org/v2", "test-agent")
    }

    #[test]
    fn build_without_query_has_no_question_mark() {
        let req = builder().build(HttpMethod::Get, &["authors"], &QueryParams::new(), None);
        assert_eq!(req.url, "https://api.spiget.org/v2/authors");
        assert!(!req.url.contains('?'));
        assert!(req.body.is_none());
        assert_eq!(
            req.headers,
            vec![("User-Agent".to_string(), "test-agent".to_string())]
        );
    }

    #[test]
    fn build_appends_query_in_insertion_order() {
        let query = QueryParams::new().with("size", 5).with("page", 2);
        let req = builder().build(HttpMethod::Get, &["resources"], &query, None);
        assert_eq!(req.url, "https://api.spiget.org/v2/resources?size=5&page=2");
    }

    #[test]
    fn segments_are_encoded_independently() {
        let req = builder().build(
            HttpMethod::Get,
            &["search", "resources", "world edit/2?x#y"],
            &QueryParams::new(),
            None,
        );
        assert_eq!(
            req.url,
            "https://api.spiget.org/v2/search/resources/world%20edit%2F2%3Fx%23y"
        );
    }

    #[test]
    fn unicode_and_empty_segments_encode() {
        assert_eq!(encode_segment("über"), "%C3%BCber");
        assert_eq!(encode_segment(""), "");
        assert_eq!(encode_segment("a-b_c.d~e"), "a-b_c.d~e");
        assert_eq!(encode_segment("100%"), "100%25");
    }

    #[test]
    fn form_body_sets_content_type() {
        let form = QueryParams::new()
            .with("callbackUrl", "https://x")
            .with("types", "resource");
        let req = builder().build(
            HttpMethod::Post,
            &["webhook", "register"],
            &QueryParams::new(),
            Some(&form),
        );
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.header("content-type"), Some(FORM_CONTENT_TYPE));
        assert_eq!(
            req.body.as_deref(),
            Some(&b"callbackUrl=https%3A%2F%2Fx&types=resource"[..])
        );
    }

    #[test]
    fn trailing_slash_on_base_is_stripped() {
        let b = RequestBuilder::new("http://localhost:3000/v2/", "ua");
        let req = b.build(HttpMethod::Get, &["status"], &QueryParams::new(), None);
        assert_eq!(req.url, "http://localhost:3000/v2/status");
    }

    #[test]
    fn identical_inputs_build_identical_requests() {
        let query = QueryParams::new().with("sort", "-id");
        let a = builder().build(HttpMethod::Delete, &["webhook", "delete", "1", "s"], &query, None);
        let b = builder().build(HttpMethod::Delete, &["webhook", "delete", "1", "s"], &query, None);
        assert_eq!(a, b);
    }
}
