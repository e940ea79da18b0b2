pub const CONTENT_JSON: &str = "application/json";
pub const CONTENT_HTML: &str = "text/html; charset=utf-8";
pub const CONTENT_TEXT: &str = "text/plain; charset=utf-8";

/// Reason phrase for the status line. Unlisted codes fall back by class.
pub fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        100..=199 => "Informational",
        200..=299 => "Success",
        300..=399 => "Redirection",
        400..=499 => "Client Error",
        _ => "Server Error",
    }
}

/// A complete, non-streamed HTTP response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub headers: Vec<(&'static str, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, content_type: &'static str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            content_type,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn json(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self::new(status, CONTENT_JSON, body)
    }

    pub fn text(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self::new(status, CONTENT_TEXT, body)
    }

    pub fn with_header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    /// Serializes status line, headers and body into one buffer.
    pub fn wrap_response(&self) -> Box<[u8]> {
        let mut head = status_head(self.status, self.content_type);
        head.push_str(&format!("Content-Length: {}\r\n", self.body.len()));
        for (name, value) in &self.headers {
            head.push_str(&format!("{}: {}\r\n", name, value));
        }
        head.push_str("\r\n");

        let mut response = Vec::with_capacity(head.len() + self.body.len());
        response.extend_from_slice(head.as_bytes());
        response.extend_from_slice(&self.body);
        response.into_boxed_slice()
    }
}

/// Head for a response whose body is written incrementally and ends when the
/// connection closes.
pub fn streaming_head(status: u16, content_type: &str) -> Box<[u8]> {
    let mut head = status_head(status, content_type);
    head.push_str("Cache-Control: no-store\r\n\r\n");
    head.into_bytes().into_boxed_slice()
}

fn status_head(status: u16, content_type: &str) -> String {
    format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nConnection: close\r\n",
        status,
        reason_phrase(status),
        content_type
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_json_response() {
        let response = HttpResponse::json(403, r#"{"message":"invalid key"}"#);
        let bytes = response.wrap_response();
        let text = std::str::from_utf8(&bytes).unwrap();

        assert!(text.starts_with("HTTP/1.1 403 Forbidden\r\n"));
        assert!(text.contains("Content-Type: application/json\r\n"));
        assert!(text.contains("Content-Length: 25\r\n"));
        assert!(text.contains("Connection: close\r\n"));
        assert!(text.ends_with("\r\n\r\n{\"message\":\"invalid key\"}"));
    }

    #[test]
    fn test_extra_headers_are_written() {
        let response = HttpResponse::text(405, "nope").with_header("Allow", "GET");
        let bytes = response.wrap_response();
        let text = std::str::from_utf8(&bytes).unwrap();
        assert!(text.contains("Allow: GET\r\n"));
    }

    #[test]
    fn test_streaming_head_has_no_length() {
        let bytes = streaming_head(200, CONTENT_HTML);
        let text = std::str::from_utf8(&bytes).unwrap();
        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(!text.contains("Content-Length"));
        assert!(text.ends_with("\r\n\r\n"));
    }

    #[test]
    fn test_reason_phrase_fallbacks() {
        assert_eq!(reason_phrase(418), "Client Error");
        assert_eq!(reason_phrase(599), "Server Error");
        assert_eq!(reason_phrase(503), "Service Unavailable");
    }
}
