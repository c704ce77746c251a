//! Replayable request model.
//!
//! A [`CapturedRequest`] is built once from a captured request file and is
//! never mutated afterwards. Every replay (baseline or ablation) borrows it and
//! only derives a fresh cookie subset through [`CookieSet::without`].

mod cookies;
mod parser;

pub use cookies::CookieSet;
pub use parser::{load_request_file, parse_request, parse_request_with_scheme};

use std::fmt;
use std::str::FromStr;

use crate::errors::ConfigError;

/// Scheme prepended to the `Host` header when the host carries none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scheme {
    Http,
    #[default]
    Https,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scheme {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("http") {
            Ok(Scheme::Http)
        } else if s.eq_ignore_ascii_case("https") {
            Ok(Scheme::Https)
        } else {
            Err(ConfigError::UnsupportedScheme(s.to_string()))
        }
    }
}

/// Header map that keeps the order in which headers appeared in the capture.
///
/// Names are matched ASCII case-insensitively. Setting a header that already
/// exists replaces its value but keeps its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(&name)) {
            Some(existing) => existing.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All headers in capture order, including `Cookie`.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Headers minus the given names. Used to strip `Cookie` before sending.
    pub fn iter_except<'a>(&'a self, skip: &'a [&'a str]) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.iter()
            .filter(move |(n, _)| !skip.iter().any(|s| s.eq_ignore_ascii_case(n)))
    }
}

/// A captured HTTP request, ready to be replayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedRequest {
    /// Method token, verbatim from the request line.
    pub method: String,

    /// Fully qualified target built from `Host` and the request path.
    pub url: url::Url,

    /// Request-line path, unchanged.
    pub path: String,

    /// Protocol token from the request line (e.g. `HTTP/1.1`). Informational only.
    pub protocol: String,

    /// Headers in capture order. Still contains `Cookie`.
    pub headers: Headers,

    /// Body lines concatenated without separators.
    pub body: String,

    /// Cookies from the `Cookie` header. Baseline set and ablation candidates.
    pub cookies: CookieSet,
}

impl CapturedRequest {
    /// Rebuilds the request line (`METHOD path PROTOCOL`).
    pub fn request_line(&self) -> String {
        format!("{} {} {}", self.method, self.path, self.protocol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_keep_order_and_replace_in_place() {
        let mut h = Headers::new();
        h.insert("Host", "a.example");
        h.insert("Accept", "*/*");
        h.insert("host", "b.example");

        let all: Vec<_> = h.iter().collect();
        assert_eq!(all, vec![("Host", "b.example"), ("Accept", "*/*")]);
        assert_eq!(h.get("HOST"), Some("b.example"));
        assert_eq!(h.len(), 2);
    }

    #[test]
    fn iter_except_skips_cookie_case_insensitively() {
        let mut h = Headers::new();
        h.insert("Host", "a.example");
        h.insert("cookie", "a=1");
        h.insert("Accept", "*/*");

        let sent: Vec<_> = h.iter_except(&["Cookie"]).map(|(n, _)| n).collect();
        assert_eq!(sent, vec!["Host", "Accept"]);
        // The model itself still holds the cookie header
        assert!(h.contains("Cookie"));
    }

    #[test]
    fn scheme_from_str() {
        assert_eq!("https".parse::<Scheme>().unwrap(), Scheme::Https);
        assert_eq!("HTTP".parse::<Scheme>().unwrap(), Scheme::Http);
        assert_eq!(
            "ftp".parse::<Scheme>().unwrap_err(),
            ConfigError::UnsupportedScheme("ftp".into())
        );
        assert_eq!(Scheme::default().to_string(), "https");
    }
}
