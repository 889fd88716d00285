//! Dispatch outcomes.

use std::collections::HashMap;

/// Body of the canonical not-found response.
pub const NOT_FOUND_BODY: &str = "404 Not Found";

/// Body of the canonical access-denied response.
pub const NOT_ALLOWED_BODY: &str = "403 Not Allowed";

/// The outcome of dispatching one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HashMap<String, String>,
    /// Response body.
    pub body: Vec<u8>,
}

impl Response {
    /// Creates an empty response with the given status.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    /// Creates an empty 200 response.
    pub fn ok() -> Self {
        Self::new(200)
    }

    /// Creates a 200 response with HTML content.
    pub fn html(body: impl Into<String>) -> Self {
        Self::ok()
            .header("Content-Type", "text/html")
            .body(body.into())
    }

    /// Creates a 302 redirect to `location`.
    pub fn redirect(location: impl Into<String>) -> Self {
        Self::new(302).header("Location", location)
    }

    /// Creates the canonical 403 response for denied access.
    pub fn not_allowed() -> Self {
        Self::new(403)
            .header("Content-Type", "text/plain")
            .body(NOT_ALLOWED_BODY)
    }

    /// Creates the canonical 404 response.
    pub fn not_found() -> Self {
        Self::new(404)
            .header("Content-Type", "text/html")
            .body(NOT_FOUND_BODY)
    }

    /// Sets a header.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Gets a header value, ignoring the case of the name.
    pub fn get_header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(key))
            .map(|(_, value)| value.as_str())
    }

    /// Returns the body as text, if it is valid UTF-8.
    pub fn body_string(&self) -> Option<String> {
        std::str::from_utf8(&self.body).ok().map(str::to_string)
    }

    /// Returns the reason phrase for the status code.
    ///
    /// Denials use `Not Allowed` rather than the registered `Forbidden`.
    pub const fn reason_phrase(&self) -> &'static str {
        match self.status {
            200 => "OK",
            201 => "Created",
            204 => "No Content",
            301 => "Moved Permanently",
            302 => "Found",
            303 => "See Other",
            400 => "Bad Request",
            401 => "Unauthorized",
            403 => "Not Allowed",
            404 => "Not Found",
            500 => "Internal Server Error",
            _ => "Unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_html() {
        let res = Response::html("<h1>Hello</h1>");
        assert_eq!(res.status, 200);
        assert_eq!(res.get_header("content-type"), Some("text/html"));
        assert_eq!(res.body_string().as_deref(), Some("<h1>Hello</h1>"));
    }

    #[test]
    fn test_response_redirect() {
        let res = Response::redirect("/login");
        assert_eq!(res.status, 302);
        assert_eq!(res.reason_phrase(), "Found");
        assert_eq!(res.get_header("location"), Some("/login"));
        assert!(res.body.is_empty());
    }

    #[test]
    fn test_canonical_responses() {
        let res = Response::not_found();
        assert_eq!((res.status, res.reason_phrase()), (404, "Not Found"));
        assert_eq!(res.body_string().as_deref(), Some(NOT_FOUND_BODY));
        assert_eq!(res.get_header("Content-Type"), Some("text/html"));

        let res = Response::not_allowed();
        assert_eq!((res.status, res.reason_phrase()), (403, "Not Allowed"));
        assert_eq!(res.body_string().as_deref(), Some("403 Not Allowed"));
    }

    #[test]
    fn test_non_utf8_body() {
        let res = Response::ok().body(vec![0xff, 0xfe]);
        assert_eq!(res.body_string(), None);
    }
}
