//! Ordered cookie set parsed from a `Cookie` request header.
//!
//! Parsing follows the usual cookie-header rules:
//! - pairs are separated by `;` and trimmed,
//! - a value wrapped in double quotes is unquoted,
//! - a later cookie with the same name overwrites the earlier value but keeps
//!   the earlier position,
//! - segments without `=`, with an illegal name, or naming a cookie attribute
//!   (`Path`, `Expires`, ...) are skipped instead of failing the whole header.

/// Names that are cookie attributes, never cookies.
const RESERVED_ATTRIBUTES: &[&str] = &[
    "expires", "path", "comment", "domain", "max-age", "secure", "httponly", "version", "samesite",
];

/// Cookies in declaration order with unique names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieSet {
    entries: Vec<(String, String)>,
}

impl CookieSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a raw `Cookie` header value. Never fails; bad segments are dropped.
    pub fn parse_header(raw: &str) -> Self {
        let mut set = CookieSet::new();

        for segment in raw.split(';') {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }

            let Some((name, value)) = segment.split_once('=') else {
                log::warn!("Skipping cookie segment without '=': {segment:?}");
                continue;
            };

            let name = name.trim();
            if !is_valid_name(name) {
                log::warn!("Skipping cookie with invalid name: {name:?}");
                continue;
            }
            if RESERVED_ATTRIBUTES.iter().any(|a| a.eq_ignore_ascii_case(name)) {
                log::debug!("Ignoring cookie attribute {name:?} in Cookie header");
                continue;
            }

            set.insert(name, unquote(value.trim()));
        }

        set
    }

    /// Inserts a cookie. An existing cookie with that name keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(existing) => existing.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
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

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Cookie names in declaration order.
    pub fn names(&self) -> impl DoubleEndedIterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// A fresh copy of this set minus the cookie `name`. `self` is untouched.
    pub fn without(&self, name: &str) -> CookieSet {
        CookieSet {
            entries: self.entries.iter().filter(|(n, _)| n != name).cloned().collect(),
        }
    }

    /// Serializes the set back into a `Cookie` header value.
    pub fn to_header(&self) -> String {
        self.entries
            .iter()
            .map(|(n, v)| format!("{n}={v}"))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('$')
        && name
            .chars()
            .all(|c| c.is_ascii_graphic() && !matches!(c, '"' | ',' | ';' | '=' | '\\'))
}

fn unquote(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}
