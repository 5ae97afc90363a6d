//! Per-request context: URL parts and the response header sink

use axum::http::header::{HeaderMap, HeaderValue, LINK};

/// Request context handed to the orchestrator
///
/// Carries the base URL and path used to build pagination links, and a
/// header map the paginate stage writes the `Link` header into. One context
/// exists per request; nothing here is shared across requests.
#[derive(Debug, Clone)]
pub struct RequestContext {
    base_url: String,
    path: String,
    headers: HeaderMap,
}

impl RequestContext {
    pub fn new(base_url: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            path: path.into(),
            headers: HeaderMap::new(),
        }
    }

    /// The absolute URL of the current request, without query string
    pub fn current_url(&self) -> String {
        format!("{}{}", self.base_url, self.path)
    }

    /// Response headers accumulated by the pipeline
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Set the `Link` header value
    ///
    /// Values that are not valid header text are dropped with a warning
    /// rather than failing the request.
    pub fn set_link_header(&mut self, value: &str) {
        match HeaderValue::from_str(value) {
            Ok(header) => {
                self.headers.insert(LINK, header);
            }
            Err(_) => {
                tracing::warn!(value, "discarding unencodable Link header value");
            }
        }
    }

    /// The `Link` header value, if set
    pub fn link_header(&self) -> Option<&str> {
        self.headers.get(LINK).and_then(|v| v.to_str().ok())
    }
}
