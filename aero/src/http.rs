//! Request and response carriers.
//!
//! Plain data: the pipeline reads the request path, method and headers, and
//! controllers write the response status, headers and body.

use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri, header};
use std::borrow::Cow;

/// An incoming request.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl Request {
    /// Create a request without headers or body.
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            method,
            uri,
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    /// A `GET` request for `uri`.
    pub fn get(uri: &str) -> Result<Self, http::uri::InvalidUri> {
        Ok(Self::new(Method::GET, uri.parse()?))
    }

    /// Add a header.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Set the body.
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// The request method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The request URI.
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// The raw URI path.
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// The query string, if any.
    pub fn query(&self) -> Option<&str> {
        self.uri.query()
    }

    /// The path routes are matched against.
    ///
    /// Runs of `/` collapse to one and a trailing `/` is dropped. The root is `/`.
    pub fn path_info(&self) -> Cow<'_, str> {
        let path = self.uri.path();
        if !path.contains("//") && (path == "/" || !path.ends_with('/')) && path.starts_with('/') {
            return Cow::Borrowed(path);
        }

        let mut info = String::with_capacity(path.len() + 1);
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            info.push('/');
            info.push_str(segment);
        }
        if info.is_empty() {
            info.push('/');
        }
        Cow::Owned(info)
    }

    /// All headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// A header as text. `None` if absent or not visible ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// The request body.
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

impl From<http::Request<Vec<u8>>> for Request {
    fn from(request: http::Request<Vec<u8>>) -> Self {
        let (parts, body) = request.into_parts();
        Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
        }
    }
}

/// An outgoing response.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl Default for Response {
    fn default() -> Self {
        Self::new(StatusCode::OK)
    }
}

impl Response {
    /// An empty response with `status`.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    /// An empty `200 OK`.
    pub fn ok() -> Self {
        Self::default()
    }

    /// A `text/plain` response.
    pub fn text(status: StatusCode, body: impl Into<String>) -> Self {
        Self::new(status)
            .with_header(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; charset=utf-8"),
            )
            .with_body(body.into())
    }

    /// A JSON response.
    pub fn json(status: StatusCode, value: &serde_json::Value) -> Result<Self, serde_json::Error> {
        Ok(Self::new(status)
            .with_header(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .with_body(serde_json::to_vec(value)?))
    }

    /// Add a header.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Set the body.
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// The status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Change the status code.
    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    /// All headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// All headers, mutably.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// A header as text.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// The body bytes.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The body as text, invalid UTF-8 replaced.
    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

impl From<Response> for http::Response<Vec<u8>> {
    fn from(response: Response) -> Self {
        let mut out = http::Response::new(response.body);
        *out.status_mut() = response.status;
        *out.headers_mut() = response.headers;
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_info(uri: &str) -> String {
        Request::get(uri).unwrap().path_info().into_owned()
    }

    #[test]
    fn test_path_info_normalization() {
        assert_eq!(path_info("/"), "/");
        assert_eq!(path_info("/user/42"), "/user/42");
        assert_eq!(path_info("/user//42/"), "/user/42");
        assert_eq!(path_info("//"), "/");
        assert_eq!(path_info("/blog/?page=2"), "/blog");
    }

    #[test]
    fn test_request_from_http() {
        let request: Request = http::Request::builder()
            .method(Method::POST)
            .uri("/submit?x=1")
            .header("x-token", "abc")
            .body(b"payload".to_vec())
            .unwrap()
            .into();

        assert_eq!(request.method(), Method::POST);
        assert_eq!(request.path(), "/submit");
        assert_eq!(request.query(), Some("x=1"));
        assert_eq!(request.header("x-token"), Some("abc"));
        assert_eq!(request.body(), b"payload");
    }

    #[test]
    fn test_response_conversion() {
        let response = Response::text(StatusCode::CREATED, "made");
        assert_eq!(response.body_text(), "made");
        assert_eq!(response.header("content-type"), Some("text/plain; charset=utf-8"));

        let raw: http::Response<Vec<u8>> = response.into();
        assert_eq!(raw.status(), StatusCode::CREATED);
        assert_eq!(raw.body(), b"made");
    }
}
