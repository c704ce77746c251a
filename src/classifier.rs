//! Response classification.
//!
//! A response is reduced to a [`ResponseSignature`]: its status code and body
//! length. Two responses are considered equivalent iff their signatures are
//! equal. Responses that differ only in content of the same length cannot be
//! told apart; that is a known limitation, not a bug.

use serde::Serialize;
use std::fmt;

/// Width of the label column in rendered lines.
pub const LABEL_WIDTH: usize = 70;
/// Width of the content-length column in rendered lines.
pub const LENGTH_WIDTH: usize = 6;

const RESET: &str = "\x1b[0m";

/// Comparison key of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ResponseSignature {
    pub status: u16,
    pub body_length: u64,
}

impl ResponseSignature {
    pub fn status_class(&self) -> StatusClass {
        StatusClass::of(self.status)
    }
}

impl fmt::Display for ResponseSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} bytes)", self.status, self.body_length)
    }
}

/// Reduces a response to its signature.
pub fn classify(status: u16, body_length: u64) -> ResponseSignature {
    ResponseSignature { status, body_length }
}

/// What counts as "the server behaved differently".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonMode {
    /// Status code or body length differ.
    #[default]
    StatusAndLength,
    /// Only the status code differs. For targets with dynamic body sizes.
    StatusOnly,
}

impl ComparisonMode {
    /// True when `candidate` must be treated as a different response than `baseline`.
    pub fn differs(&self, baseline: &ResponseSignature, candidate: &ResponseSignature) -> bool {
        match self {
            ComparisonMode::StatusAndLength => baseline != candidate,
            ComparisonMode::StatusOnly => baseline.status != candidate.status,
        }
    }
}

/// Status code class, used for display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Success,
    Redirection,
    ClientError,
    ServerError,
    Other,
}

impl StatusClass {
    pub fn of(status: u16) -> Self {
        match status {
            200..=299 => StatusClass::Success,
            300..=399 => StatusClass::Redirection,
            400..=499 => StatusClass::ClientError,
            500..=599 => StatusClass::ServerError,
            _ => StatusClass::Other,
        }
    }

    /// ANSI color escape for this class, `None` when the class is left uncolored.
    pub fn ansi_color(&self) -> Option<&'static str> {
        match self {
            StatusClass::Success => Some("\x1b[92m"),
            StatusClass::Redirection => Some("\x1b[93m"),
            StatusClass::ClientError => Some("\x1b[91m"),
            StatusClass::ServerError => Some("\x1b[94m"),
            StatusClass::Other => None,
        }
    }
}

/// Renders the status code, colored by class when `color` is set.
pub fn render_status(status: u16, color: bool) -> String {
    match StatusClass::of(status).ansi_color() {
        Some(code) if color => format!("{code}{status}{RESET}"),
        _ => status.to_string(),
    }
}

/// Renders one report line: `label [cl=length] [status]`, with fixed-width
/// label and length columns.
pub fn render(signature: &ResponseSignature, label: &str, color: bool) -> String {
    format!(
        "{:<label_w$} [cl={:>len_w$}] [{}]",
        label,
        signature.body_length,
        render_status(signature.status, color),
        label_w = LABEL_WIDTH,
        len_w = LENGTH_WIDTH,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_equality() {
        assert_eq!(classify(200, 534), classify(200, 534));
        assert_ne!(classify(200, 534), classify(200, 535));
        assert_ne!(classify(200, 534), classify(302, 534));
    }

    #[test]
    fn comparison_modes() {
        let base = classify(200, 1000);
        assert!(!ComparisonMode::StatusAndLength.differs(&base, &classify(200, 1000)));
        assert!(ComparisonMode::StatusAndLength.differs(&base, &classify(200, 999)));
        assert!(ComparisonMode::StatusAndLength.differs(&base, &classify(302, 1000)));

        assert!(!ComparisonMode::StatusOnly.differs(&base, &classify(200, 999)));
        assert!(ComparisonMode::StatusOnly.differs(&base, &classify(403, 1000)));
    }

    #[test]
    fn status_classes() {
        assert_eq!(StatusClass::of(204), StatusClass::Success);
        assert_eq!(StatusClass::of(302), StatusClass::Redirection);
        assert_eq!(StatusClass::of(403), StatusClass::ClientError);
        assert_eq!(StatusClass::of(503), StatusClass::ServerError);
        assert_eq!(StatusClass::of(101), StatusClass::Other);
        assert_eq!(StatusClass::of(101).ansi_color(), None);
    }

    #[test]
    fn plain_render_has_fixed_columns() {
        let line = render(&classify(200, 1000), "[Baseline] Server Response", false);
        let expected = format!("{:<70} [cl=  1000] [200]", "[Baseline] Server Response");
        assert_eq!(line, expected);
        assert_eq!(line.find("[cl=").unwrap(), LABEL_WIDTH + 1);
    }

    #[test]
    fn long_labels_are_not_truncated() {
        let label = "x".repeat(80);
        let line = render(&classify(404, 12), &label, false);
        assert!(line.starts_with(&label));
        assert!(line.ends_with("[cl=    12] [404]"));
    }

    #[test]
    fn colored_render_wraps_status_only() {
        let line = render(&classify(302, 0), "Removing cookie: session", true);
        assert!(line.ends_with("[cl=     0] [\x1b[93m302\x1b[0m]"));

        assert_eq!(render_status(101, true), "101");
        assert_eq!(render_status(500, true), "\x1b[94m500\x1b[0m");
    }
}
