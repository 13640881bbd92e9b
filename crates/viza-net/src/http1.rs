//! HTTP/1.1 Framing
//!
//! Request serialization and response parsing. The client always sends
//! `Connection: close`, so a response is parsed from the complete byte
//! stream the server wrote before closing.

use std::io::{self, BufRead, Read};

use crate::{Request, Response};

/// HTTP version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HttpVersion {
    Http10,
    #[default]
    Http11,
}

impl std::fmt::Display for HttpVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpVersion::Http10 => write!(f, "HTTP/1.0"),
            HttpVersion::Http11 => write!(f, "HTTP/1.1"),
        }
    }
}

/// HTTP/1.1 request on the wire
#[derive(Debug, Clone)]
pub struct Http1Request {
    pub method: String,
    /// Origin-form target, e.g. "/api/status?setor=1"
    pub target: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl Http1Request {
    pub fn new(method: &str, target: &str) -> Self {
        Self {
            method: method.to_uppercase(),
            target: target.to_string(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Frame a [`Request`], passing its method, headers and body through
    pub fn from_request(request: &Request) -> Self {
        let url = &request.url;
        let mut target = url.path().to_string();
        if let Some(query) = url.query() {
            target.push('?');
            target.push_str(query);
        }

        let mut req = Self::new(request.method.as_str(), &target);
        req.headers = request.headers.clone();
        req.body = request.body.clone();
        req
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Add a header unless the caller already supplied one with that name
    pub fn default_header(mut self, name: &str, value: &str) -> Self {
        if !self.has_header(name) {
            self.headers.push((name.to_string(), value.to_string()));
        }
        self
    }

    pub fn has_header(&self, name: &str) -> bool {
        self.headers.iter().any(|(n, _)| n.eq_ignore_ascii_case(name))
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(
            format!("{} {} {}\r\n", self.method, self.target, HttpVersion::Http11).as_bytes(),
        );

        for (name, value) in &self.headers {
            buf.extend_from_slice(format!("{}: {}\r\n", name, value).as_bytes());
        }

        if let Some(body) = &self.body {
            if !self.has_header("content-length") {
                buf.extend_from_slice(format!("Content-Length: {}\r\n", body.len()).as_bytes());
            }
        }

        buf.extend_from_slice(b"\r\n");

        if let Some(body) = &self.body {
            buf.extend_from_slice(body);
        }

        buf
    }
}

/// Parsed HTTP/1.x response
#[derive(Debug, Clone)]
pub struct Http1Response {
    pub version: HttpVersion,
    pub status: u16,
    pub reason: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Http1Response {
    /// Get header value (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self.status, 301 | 302 | 303 | 307 | 308)
    }

    pub fn redirect_location(&self) -> Option<&str> {
        self.header("location")
    }
}

impl From<Http1Response> for Response {
    fn from(resp: Http1Response) -> Self {
        Response {
            status: resp.status,
            status_text: resp.reason,
            headers: resp.headers,
            body: resp.body,
        }
    }
}

/// HTTP/1.x response parser
pub struct Http1Parser;

impl Http1Parser {
    /// Parse a full response from a reader positioned at the status line
    pub fn parse<R: BufRead>(reader: &mut R) -> io::Result<Http1Response> {
        let mut line = String::new();
        reader.read_line(&mut line)?;
        let (version, status, reason) = Self::parse_status_line(&line)?;

        let mut headers = Vec::new();
        loop {
            line.clear();
            if reader.read_line(&mut line)? == 0 || line == "\r\n" || line == "\n" {
                break;
            }
            if let Some((name, value)) = line.trim_end().split_once(':') {
                headers.push((name.trim().to_string(), value.trim().to_string()));
            }
        }

        let find = |name: &str| {
            headers.iter()
                .find(|(n, _)| n.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.clone())
        };
        let chunked = find("transfer-encoding")
            .map(|v| v.eq_ignore_ascii_case("chunked"))
            .unwrap_or(false);
        let content_length = find("content-length").and_then(|v| v.parse::<u64>().ok());

        let mut body = Vec::new();
        if status == 204 || status == 304 {
            // no body by definition
        } else if chunked {
            Self::read_chunked_body(reader, &mut body)?;
        } else if let Some(len) = content_length {
            Self::read_sized(reader, len, &mut body)?;
        } else {
            reader.read_to_end(&mut body)?;
        }

        Ok(Http1Response { version, status, reason, headers, body })
    }

    fn parse_status_line(line: &str) -> io::Result<(HttpVersion, u16, String)> {
        let invalid = |msg: &str| io::Error::new(io::ErrorKind::InvalidData, msg.to_string());
        let mut parts = line.trim_end().splitn(3, ' ');

        let version = match parts.next() {
            Some("HTTP/1.0") => HttpVersion::Http10,
            Some("HTTP/1.1") => HttpVersion::Http11,
            Some(_) => return Err(invalid("Invalid HTTP version")),
            None => return Err(invalid("Missing HTTP version")),
        };

        let status = parts.next()
            .ok_or_else(|| invalid("Missing status code"))?
            .parse()
            .map_err(|_| invalid("Invalid status code"))?;

        let reason = parts.next().unwrap_or("").to_string();
        Ok((version, status, reason))
    }

    /// Append exactly `len` bytes. Declared lengths are never trusted for
    /// allocation; a short stream is an error.
    fn read_sized<R: BufRead>(reader: &mut R, len: u64, body: &mut Vec<u8>) -> io::Result<()> {
        let read = reader.by_ref().take(len).read_to_end(body)?;
        if (read as u64) < len {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("body truncated: {} of {} bytes", read, len),
            ));
        }
        Ok(())
    }

    fn read_chunked_body<R: BufRead>(reader: &mut R, body: &mut Vec<u8>) -> io::Result<()> {
        let mut line = String::new();
        loop {
            line.clear();
            reader.read_line(&mut line)?;

            // chunk extensions after ';' are ignored
            let size_str = line.trim().split(';').next().unwrap_or("");
            let size = u64::from_str_radix(size_str, 16)
                .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "Invalid chunk size"))?;

            if size == 0 {
                line.clear();
                reader.read_line(&mut line)?;
                return Ok(());
            }

            Self::read_sized(reader, size, body)?;

            line.clear();
            reader.read_line(&mut line)?;
        }
    }
}
