//! Captured request parser.
//!
//! Input is the raw text of an HTTP request as exported by a proxy or browser:
//!
//! ```text
//! METHOD path PROTOCOL
//! Header-Name: value
//! Cookie: name1=val1; name2=val2
//!
//! optional body lines...
//! ```
//!
//! Everything up to the first blank line is a header. Everything after it is
//! body, concatenated line by line without re-inserting line breaks.

use std::path::Path;

use url::Url;

use crate::errors::{Error, MalformedRequestError, Result};
use crate::request::{CapturedRequest, CookieSet, Headers, Scheme};

/// Reads and parses a captured request file, using `scheme` for hosts without one.
pub fn load_request_file(path: &Path, scheme: Scheme) -> Result<CapturedRequest> {
    let raw = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(parse_request_with_scheme(&raw, scheme)?)
}

/// Parses a captured request, assuming `https` when `Host` has no scheme.
pub fn parse_request(raw: &str) -> Result<CapturedRequest, MalformedRequestError> {
    parse_request_with_scheme(raw, Scheme::Https)
}

pub fn parse_request_with_scheme(raw: &str, scheme: Scheme) -> Result<CapturedRequest, MalformedRequestError> {
    let mut lines = raw.lines();

    let request_line = lines.next().ok_or(MalformedRequestError::Empty)?;
    let mut tokens = request_line.split_whitespace();
    let (method, path, protocol) = match (tokens.next(), tokens.next(), tokens.next()) {
        (Some(m), Some(p), Some(v)) => (m.to_string(), p.to_string(), v.to_string()),
        _ => return Err(MalformedRequestError::InvalidRequestLine(request_line.to_string())),
    };

    let mut headers = Headers::new();
    let mut body = String::new();
    let mut in_headers = true;

    // Line numbers are 1-based and count the request line
    for (idx, line) in lines.enumerate() {
        if in_headers && line.trim().is_empty() {
            in_headers = false;
            continue;
        }

        if in_headers {
            let Some((name, value)) = line.split_once(':') else {
                return Err(MalformedRequestError::InvalidHeader {
                    line_no: idx + 2,
                    line: line.to_string(),
                });
            };
            headers.insert(name.trim(), value.trim());
        } else if !line.is_empty() {
            body.push_str(line);
        }
    }

    let url = build_url(&headers, &path, scheme)?;
    let cookies = CookieSet::parse_header(headers.get("Cookie").unwrap_or(""));

    log::debug!(
        "Parsed {} {} with {} headers, {} cookies and {} body bytes",
        method,
        url,
        headers.len(),
        cookies.len(),
        body.len()
    );

    Ok(CapturedRequest {
        method,
        url,
        path,
        protocol,
        headers,
        body,
        cookies,
    })
}

fn build_url(headers: &Headers, path: &str, scheme: Scheme) -> Result<Url, MalformedRequestError> {
    let host = headers
        .get("Host")
        .filter(|h| !h.is_empty())
        .ok_or(MalformedRequestError::MissingHost)?;

    // Absolute-form targets (proxy captures) already name the full URL
    let raw = if has_scheme(path) {
        path.to_string()
    } else if has_scheme(host) {
        format!("{host}{path}")
    } else {
        format!("{scheme}://{host}{path}")
    };

    Url::parse(&raw).map_err(|source| MalformedRequestError::InvalidUrl { url: raw, source })
}

fn has_scheme(s: &str) -> bool {
    let lower = s.get(..8).unwrap_or(s).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
