//! Minimal HTTP/1.1 GET exchange with the proxy.

use brotli::Decompressor;
use flate2::read::DeflateDecoder;
use flate2::read::GzDecoder;
use flate2::read::ZlibDecoder;
use pp_core::LocatorError;
use pp_core::LocatorResult;
use std::io::BufRead;
use std::io::BufReader;
use std::io::Cursor;
use std::io::Read;
use std::io::Write;

const MAX_HEAD_BYTES: usize = 64 * 1024;
const MAX_CHUNK_LINE_BYTES: usize = 4 * 1024;
/// Upper bound for a response body, before and after content decoding.
const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

/// Single HTTP header with validated wire-safe name/value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    pub fn new(name: &str, value: &str) -> LocatorResult<Self> {
        if !is_valid_header_name(name) {
            return Err(LocatorError::fetch(
                "fetch.http.bad_header",
                format!("invalid HTTP header name `{name}`"),
            ));
        }

        if value.bytes().any(|byte| matches!(byte, b'\r' | b'\n' | 0)) {
            return Err(LocatorError::fetch(
                "fetch.http.bad_header",
                format!("invalid characters found in HTTP header `{name}`"),
            ));
        }

        Ok(Self {
            name: name.to_owned(),
            value: value.to_owned(),
        })
    }
}

/// Outgoing GET request against the proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetRequest {
    /// Origin-form target, e.g. `/proxy?url=...`.
    pub target: String,
    pub headers: Vec<Header>,
}

impl GetRequest {
    pub fn new(target: impl Into<String>, authority: &str) -> LocatorResult<Self> {
        let target = target.into();
        if !target.starts_with('/') || target.bytes().any(|byte| byte.is_ascii_whitespace()) {
            return Err(LocatorError::fetch(
                "fetch.http.bad_target",
                format!("invalid request target `{target}`"),
            ));
        }

        Ok(Self {
            target,
            headers: vec![
                Header::new("Host", authority)?,
                Header::new("User-Agent", concat!("pinpoint/", env!("CARGO_PKG_VERSION")))?,
                Header::new("Accept", "text/html,application/xhtml+xml,*/*;q=0.8")?,
                Header::new("Accept-Encoding", "gzip, deflate, br")?,
                Header::new("Connection", "close")?,
            ],
        })
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// Response as read off the wire, body already content-decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<Header>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

pub(crate) fn write_request(stream: &mut dyn Write, request: &GetRequest) -> LocatorResult<()> {
    let mut wire = format!("GET {} HTTP/1.1\r\n", request.target);
    for header in &request.headers {
        wire.push_str(&header.name);
        wire.push_str(": ");
        wire.push_str(&header.value);
        wire.push_str("\r\n");
    }
    wire.push_str("\r\n");

    stream
        .write_all(wire.as_bytes())
        .and_then(|()| stream.flush())
        .map_err(|error| {
            LocatorError::fetch(
                "fetch.http.send_failed",
                format!("could not send request to proxy: {error}"),
            )
        })
}

pub(crate) fn read_response(stream: &mut dyn Read) -> LocatorResult<HttpResponse> {
    let (head, leftover) = read_head(stream)?;
    let (status, headers) = parse_head(&head)?;
    if !status_has_body(status) {
        return Ok(HttpResponse {
            status,
            headers,
            body: Vec::new(),
        });
    }

    // Bytes read past the head belong to the body.
    let mut body_source = BufReader::new(Cursor::new(leftover).chain(stream));
    let raw_body = match body_framing(&headers)? {
        BodyFraming::Chunked => read_chunked(&mut body_source)?,
        BodyFraming::Length(len) => {
            if len > MAX_BODY_BYTES {
                return Err(body_too_large());
            }
            let mut body = Vec::new();
            read_at_most(&mut body_source, len, &mut body)?;
            if body.len() < len {
                return Err(LocatorError::fetch(
                    "fetch.http.truncated",
                    format!("response body ended after {} of {len} bytes", body.len()),
                ));
            }
            body
        }
        BodyFraming::UntilClose => {
            let mut body = Vec::new();
            read_at_most(&mut body_source, MAX_BODY_BYTES + 1, &mut body)?;
            if body.len() > MAX_BODY_BYTES {
                return Err(body_too_large());
            }
            body
        }
    };

    Ok(HttpResponse {
        status,
        body: decode_content_encoding(&headers, &raw_body)?,
        headers,
    })
}

enum BodyFraming {
    Chunked,
    Length(usize),
    /// We always send `Connection: close`, so EOF delimits the body.
    UntilClose,
}

fn body_framing(headers: &[Header]) -> LocatorResult<BodyFraming> {
    if let Some(coding) = find_header(headers, "transfer-encoding") {
        let last = coding.rsplit(',').next().unwrap_or_default().trim();
        if !last.eq_ignore_ascii_case("chunked") {
            return Err(LocatorError::fetch(
                "fetch.http.transfer_coding",
                format!("cannot read body with transfer coding `{coding}`"),
            ));
        }
        return Ok(BodyFraming::Chunked);
    }

    let mut lengths = headers
        .iter()
        .filter(|header| header.name.eq_ignore_ascii_case("content-length"))
        .map(|header| {
            header.value.trim().parse::<usize>().map_err(|_| {
                LocatorError::fetch(
                    "fetch.http.bad_length",
                    format!("proxy sent unusable Content-Length `{}`", header.value),
                )
            })
        })
        .collect::<LocatorResult<Vec<_>>>()?;
    lengths.dedup();
    match lengths.as_slice() {
        [] => Ok(BodyFraming::UntilClose),
        [len] => Ok(BodyFraming::Length(*len)),
        _ => Err(LocatorError::fetch(
            "fetch.http.bad_length",
            "proxy sent disagreeing Content-Length values",
        )),
    }
}

/// Reads up to and including the blank line; returns the head and any
/// bytes that arrived after it.
fn read_head(stream: &mut dyn Read) -> LocatorResult<(String, Vec<u8>)> {
    let mut received = Vec::with_capacity(1024);
    let mut scratch = [0_u8; 2048];
    let mut scanned = 0;
    loop {
        if let Some(offset) = received[scanned..]
            .windows(4)
            .position(|window| window == b"\r\n\r\n")
        {
            let split = scanned + offset + 4;
            let leftover = received.split_off(split);
            let head = String::from_utf8(received).map_err(|_| {
                LocatorError::fetch(
                    "fetch.http.bad_head",
                    "proxy response head is not UTF-8",
                )
            })?;
            return Ok((head, leftover));
        }
        scanned = received.len().saturating_sub(3);

        if received.len() > MAX_HEAD_BYTES {
            return Err(LocatorError::fetch(
                "fetch.http.head_too_long",
                format!("proxy response head is longer than {MAX_HEAD_BYTES} bytes"),
            ));
        }
        match stream.read(&mut scratch) {
            Ok(0) => {
                return Err(LocatorError::fetch(
                    "fetch.http.truncated",
                    "proxy closed the connection before the response head ended",
                ));
            }
            Ok(read) => received.extend_from_slice(&scratch[..read]),
            Err(error) => return Err(body_error("could not read response head", error)),
        }
    }
}

fn parse_head(head: &str) -> LocatorResult<(u16, Vec<Header>)> {
    let mut lines = head.split("\r\n").filter(|line| !line.is_empty());
    let status = parse_status_line(lines.next().unwrap_or_default())?;
    let headers = lines
        .map(|line| match line.split_once(':') {
            Some((name, value)) => Header::new(name.trim(), value.trim()),
            None => Err(LocatorError::fetch(
                "fetch.http.bad_head",
                format!("malformed header line `{line}`"),
            )),
        })
        .collect::<LocatorResult<Vec<_>>>()?;
    Ok((status, headers))
}

fn parse_status_line(line: &str) -> LocatorResult<u16> {
    let bad_status = || {
        LocatorError::fetch(
            "fetch.http.bad_status_line",
            format!("cannot understand status line `{line}`"),
        )
    };

    let mut fields = line.split(' ');
    if !matches!(fields.next(), Some("HTTP/1.1" | "HTTP/1.0")) {
        return Err(bad_status());
    }
    fields
        .next()
        .and_then(|code| code.parse::<u16>().ok())
        .filter(|code| (100..600).contains(code))
        .ok_or_else(bad_status)
}

fn read_chunked(source: &mut impl BufRead) -> LocatorResult<Vec<u8>> {
    let mut body = Vec::new();
    loop {
        let size_line = read_line(source)?;
        let digits = size_line.split(';').next().unwrap_or_default().trim();
        if digits.is_empty() {
            continue;
        }
        let size = usize::from_str_radix(digits, 16).map_err(|_| {
            LocatorError::fetch(
                "fetch.http.bad_chunk",
                format!("chunk size `{digits}` is not hexadecimal"),
            )
        })?;
        if size == 0 {
            // Skip trailers up to the final blank line.
            while !read_line(source)?.is_empty() {}
            return Ok(body);
        }

        let end = body.len().checked_add(size).ok_or_else(|| {
            LocatorError::fetch(
                "fetch.http.bad_chunk",
                format!("chunk size `{digits}` overflows the body length"),
            )
        })?;
        if end > MAX_BODY_BYTES {
            return Err(body_too_large());
        }
        read_at_most(source, size, &mut body)?;
        if body.len() < end {
            return Err(LocatorError::fetch(
                "fetch.http.truncated",
                "chunk ended early",
            ));
        }
        if !read_line(source)?.is_empty() {
            return Err(LocatorError::fetch(
                "fetch.http.bad_chunk",
                "chunk data is not followed by CRLF",
            ));
        }
    }
}

/// One CRLF-terminated line of chunk framing, terminator stripped.
fn read_line(source: &mut impl BufRead) -> LocatorResult<String> {
    let mut line = Vec::new();
    source
        .by_ref()
        .take(MAX_CHUNK_LINE_BYTES as u64)
        .read_until(b'\n', &mut line)
        .map_err(|error| body_error("could not read chunk framing", error))?;
    if !line.ends_with(b"\r\n") {
        return Err(LocatorError::fetch(
            "fetch.http.bad_chunk",
            "chunk framing line is unterminated or too long",
        ));
    }
    line.truncate(line.len() - 2);
    Ok(String::from_utf8_lossy(&line).into_owned())
}

/// Appends up to `limit` bytes from `source` without allocating ahead of
/// what actually arrives.
fn read_at_most(source: &mut impl Read, limit: usize, out: &mut Vec<u8>) -> LocatorResult<()> {
    let limit = u64::try_from(limit).unwrap_or(u64::MAX);
    source
        .take(limit)
        .read_to_end(out)
        .map(|_| ())
        .map_err(|error| body_error("could not read response body", error))
}

fn body_too_large() -> LocatorError {
    LocatorError::fetch(
        "fetch.http.body_too_large",
        format!("response body exceeds {MAX_BODY_BYTES} bytes"),
    )
}

fn body_error(context: &str, error: std::io::Error) -> LocatorError {
    LocatorError::fetch("fetch.http.read_failed", format!("{context}: {error}"))
}

/// 1xx, 204 and 304 responses never carry a body.
fn status_has_body(status: u16) -> bool {
    !matches!(status, 100..=199 | 204 | 304)
}

fn find_header<'a>(headers: &'a [Header], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .rev()
        .find_map(|header| header.name.eq_ignore_ascii_case(name).then_some(header.value.as_str()))
}

fn decode_content_encoding(headers: &[Header], body: &[u8]) -> LocatorResult<Vec<u8>> {
    let encodings = headers
        .iter()
        .filter(|header| header.name.eq_ignore_ascii_case("content-encoding"))
        .flat_map(|header| header.value.split(','))
        .map(|token| token.trim().to_ascii_lowercase())
        .filter(|token| !token.is_empty())
        .collect::<Vec<_>>();

    let mut decoded = body.to_vec();
    for encoding in encodings.iter().rev() {
        decoded = match encoding.as_str() {
            "identity" => decoded,
            "gzip" | "x-gzip" => read_all(GzDecoder::new(Cursor::new(&decoded)), "gzip")?,
            "deflate" => decode_deflate(&decoded)?,
            "br" => read_all(Decompressor::new(Cursor::new(&decoded), 4096), "brotli")?,
            _ => {
                return Err(LocatorError::fetch(
                    "fetch.http.content_coding",
                    format!("unsupported content encoding `{encoding}`"),
                ));
            }
        };
    }

    Ok(decoded)
}

fn decode_deflate(body: &[u8]) -> LocatorResult<Vec<u8>> {
    // Servers disagree on whether "deflate" means zlib-wrapped or raw.
    match read_all(ZlibDecoder::new(Cursor::new(body)), "deflate") {
        Ok(decoded) => return Ok(decoded),
        Err(error) if error.code == "fetch.http.body_too_large" => return Err(error),
        Err(_) => {}
    }
    read_all(DeflateDecoder::new(Cursor::new(body)), "deflate")
}

fn read_all(decoder: impl Read, label: &str) -> LocatorResult<Vec<u8>> {
    let mut decoded = Vec::new();
    decoder
        .take(MAX_BODY_BYTES as u64 + 1)
        .read_to_end(&mut decoded)
        .map_err(|error| {
            LocatorError::fetch(
                "fetch.http.decode_failed",
                format!("{label} decode failed: {error}"),
            )
        })?;
    if decoded.len() > MAX_BODY_BYTES {
        return Err(body_too_large());
    }
    Ok(decoded)
}

fn is_valid_header_name(name: &str) -> bool {
    !name.is_empty()
        && name.bytes().all(|byte| {
            byte.is_ascii_alphanumeric()
                || matches!(
                    byte,
                    b'!' | b'#'
                        | b'$'
                        | b'%'
                        | b'&'
                        | b'\''
                        | b'*'
                        | b'+'
                        | b'-'
                        | b'.'
                        | b'^'
                        | b'_'
                        | b'`'
                        | b'|'
                        | b'~'
                )
        })
}
