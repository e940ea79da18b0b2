use std::fmt::Display;

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::utils::errors::{RequestError, ServerError};

/// Largest request head the server will buffer.
pub const MAX_HEAD_BYTES: usize = 8 * 1024;

/// Request methods the router distinguishes between. Only GET is routed.
#[derive(Debug, Clone, PartialEq)]
pub enum Method {
    Get,
    Other(String),
}

impl Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let str = match self {
            Method::Get => "GET",
            Method::Other(name) => name,
        };

        write!(f, "{}", str)
    }
}

impl From<&str> for Method {
    fn from(value: &str) -> Self {
        match value {
            "GET" => Method::Get,
            other => Method::Other(other.to_string()),
        }
    }
}

/// The parts of an HTTP/1.x request head the server acts on.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    /// Path without the query string.
    pub path: String,
    /// Raw query string without the leading `?`; empty when absent.
    pub query: String,
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    /// Parses a request head (request line plus header lines).
    ///
    /// # Arguments
    /// - `head`: bytes up to, and optionally including, the blank line ending the head.
    ///
    /// # Returns
    /// - `Ok(HttpRequest)`: if the request line is well formed.
    /// - `Err(RequestError)`: if the head is empty, not UTF-8, or the request line is malformed.
    pub fn parse(head: &[u8]) -> Result<Self, RequestError> {
        let text = std::str::from_utf8(head).map_err(|_| RequestError::InvalidEncoding)?;
        let mut lines = text.split("\r\n");

        let request_line = lines.next().map(str::trim).unwrap_or_default();
        if request_line.is_empty() {
            return Err(RequestError::Empty);
        }

        let mut parts = request_line.split_whitespace();
        let (method, target, version) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(method), Some(target), Some(version), None) => (method, target, version),
            _ => return Err(RequestError::MalformedRequestLine(request_line.to_string())),
        };

        if !version.starts_with("HTTP/1.") || !target.starts_with('/') {
            return Err(RequestError::MalformedRequestLine(request_line.to_string()));
        }

        let (path, query) = target.split_once('?').unwrap_or((target, ""));

        let headers = lines
            .take_while(|line| !line.is_empty())
            .filter_map(|line| line.split_once(':'))
            .map(|(name, value)| (name.trim().to_ascii_lowercase(), value.trim().to_string()))
            .collect();

        Ok(Self {
            method: Method::from(method),
            path: path.to_string(),
            query: query.to_string(),
            headers,
        })
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.headers
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Reads from `reader` until the blank line that ends a request head.
///
/// Bytes after the head are dropped; the server only serves body-less requests.
pub async fn read_head<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Vec<u8>, ServerError> {
    let mut head = Vec::with_capacity(1024);
    let mut buffer = [0; 1024];

    loop {
        let bytes_read = reader.read(&mut buffer).await?;
        if bytes_read == 0 {
            if head.is_empty() {
                return Err(RequestError::Empty.into());
            }
            return Ok(head);
        }

        head.extend_from_slice(&buffer[..bytes_read]);

        if let Some(end) = find_head_end(&head) {
            head.truncate(end);
            return Ok(head);
        }

        if head.len() > MAX_HEAD_BYTES {
            return Err(RequestError::TooLarge(MAX_HEAD_BYTES).into());
        }
    }
}

fn find_head_end(bytes: &[u8]) -> Option<usize> {
    bytes.windows(4).position(|w| w == b"\r\n\r\n")
}
