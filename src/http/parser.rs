use crate::http::request::{Method, Request};
use std::collections::HashMap;

/// Largest accepted header section, request line included.
pub const MAX_HEADER_BYTES: usize = 16 * 1024;
/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Debug, PartialEq, Eq)]
pub enum ParseError {
    InvalidRequest,
    InvalidMethod,
    InvalidHeader,
    InvalidContentLength,
    UnsupportedTransferEncoding,
    HeadersTooLarge,
    BodyTooLarge,
    Incomplete,
}

/// Parses one request from the front of `buf`.
///
/// Returns the request and the number of bytes it occupied, or
/// `ParseError::Incomplete` when more data is needed.
pub fn parse_http_request(buf: &[u8]) -> Result<(Request, usize), ParseError> {
    // Look for header/body separator
    let headers_end = match find_headers_end(buf) {
        Some(end) if end > MAX_HEADER_BYTES => return Err(ParseError::HeadersTooLarge),
        Some(end) => end,
        None if buf.len() > MAX_HEADER_BYTES => return Err(ParseError::HeadersTooLarge),
        None => return Err(ParseError::Incomplete),
    };
    let header_bytes = &buf[..headers_end];
    let body_bytes = &buf[headers_end + 4..];

    let headers_str =
        std::str::from_utf8(header_bytes).map_err(|_| ParseError::InvalidRequest)?;

    let mut lines = headers_str.split("\r\n");

    // Request line
    let request_line = lines.next().ok_or(ParseError::InvalidRequest)?;
    let mut parts = request_line.split_whitespace();

    let method_str = parts.next().ok_or(ParseError::InvalidRequest)?;
    let path = parts.next().ok_or(ParseError::InvalidRequest)?;
    let version = parts.next().ok_or(ParseError::InvalidRequest)?;

    if parts.next().is_some() || !version.starts_with("HTTP/1.") || !path.starts_with('/') {
        return Err(ParseError::InvalidRequest);
    }

    let method = Method::from_str(method_str).ok_or(ParseError::InvalidMethod)?;

    // Headers
    let mut headers = HashMap::new();
    let mut content_length: Option<usize> = None;

    for line in lines {
        if line.is_empty() {
            continue;
        }

        let (key, value) = line.split_once(':').ok_or(ParseError::InvalidHeader)?;
        let key = key.trim();
        let value = value.trim();
        if key.is_empty() {
            return Err(ParseError::InvalidHeader);
        }

        // Bodies are framed by Content-Length only. Every copy of the
        // header must agree, whatever its case.
        if key.eq_ignore_ascii_case("Transfer-Encoding") {
            return Err(ParseError::UnsupportedTransferEncoding);
        }
        if key.eq_ignore_ascii_case("Content-Length") {
            let len = value
                .parse::<usize>()
                .map_err(|_| ParseError::InvalidContentLength)?;
            match content_length {
                Some(seen) if seen != len => return Err(ParseError::InvalidContentLength),
                _ => content_length = Some(len),
            }
        }

        headers.insert(key.to_string(), value.to_string());
    }

    // Body
    let content_length = content_length.unwrap_or(0);

    if content_length > MAX_BODY_BYTES {
        return Err(ParseError::BodyTooLarge);
    }

    if body_bytes.len() < content_length {
        return Err(ParseError::Incomplete);
    }

    let body = body_bytes[..content_length].to_vec();

    let request = Request {
        method,
        path: path.to_string(),
        version: version.to_string(),
        headers,
        body,
    };

    let total_consumed = headers_end + 4 + content_length;
    Ok((request, total_consumed))
}

fn find_headers_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

/// Incremental search for the blank line ending a header section.
///
/// Each call only looks at bytes appended since the previous call, so a
/// request arriving in many small reads is scanned once.
#[derive(Debug, Default)]
pub struct HeaderScan {
    scanned: usize,
    end: Option<usize>,
}

impl HeaderScan {
    /// Offset of the terminating `\r\n\r\n` in `buf`, if it has arrived.
    pub fn find(&mut self, buf: &[u8]) -> Option<usize> {
        if self.end.is_none() && buf.len() > self.scanned {
            // Back up three bytes in case the terminator straddles two reads.
            let from = self.scanned.saturating_sub(3);
            self.end = find_headers_end(&buf[from..]).map(|pos| from + pos);
            self.scanned = buf.len();
        }
        self.end
    }

    /// Forgets progress once a request has been consumed from the buffer.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
