use std::io::Write;

use crate::classifier::{render, ResponseSignature, LABEL_WIDTH};
use crate::engine::{AblationOutcome, Verdict};
use crate::errors::TransportError;
use crate::report::Reporter;
use crate::request::CookieSet;

const RULE: &str = "===================================";

/// Human-readable reporter writing to any [`Write`] sink (usually stdout).
///
/// Write failures are logged and otherwise ignored: a closed pipe must not
/// abort a run halfway through.
pub struct TextReporter<W: Write> {
    out: W,
    color: bool,
}

impl<W: Write> TextReporter<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: &str) {
        let res = writeln!(self.out, "{text}").and_then(|_| self.out.flush());
        if let Err(e) = res {
            log::warn!("Cannot write report output: {e}");
        }
    }

    fn heading(&mut self, title: &str) {
        self.line(&format!("\n\n {title}"));
        self.line(RULE);
    }
}

impl<W: Write> Reporter for TextReporter<W> {
    fn cookies_found(&mut self, cookies: &CookieSet) {
        self.line("\n Cookies Found in Request");
        self.line(&format!("{RULE}\n"));

        if cookies.is_empty() {
            self.line("  (none)");
            return;
        }

        let width = cookies.len().to_string().len();
        for (idx, name) in cookies.names().enumerate() {
            self.line(&format!("{:>width$}. {name}", idx + 1));
        }
    }

    fn baseline_started(&mut self) {
        self.heading("Sending Baseline Request...");
    }

    fn baseline(&mut self, signature: &ResponseSignature) {
        let line = render(signature, "[Baseline] Server Response", self.color);
        self.line(&line);
        self.line("\n");
    }

    fn ablation(&mut self, cookie: &str, signature: &ResponseSignature, _verdict: Verdict) {
        let line = render(signature, &format!("Removing cookie: {cookie}"), self.color);
        self.line(&line);
    }

    fn ablation_failed(&mut self, cookie: &str, error: &TransportError) {
        let label = format!("Removing cookie: {cookie}");
        self.line(&format!("{label:<width$} [error: {error}]", width = LABEL_WIDTH));
    }

    fn finished(&mut self, outcome: &AblationOutcome) {
        self.heading("Mandatory (Must-have) Cookies");
        self.line("");

        let mandatory = outcome.mandatory();
        if mandatory.is_empty() {
            self.line("  (None) No individual cookie affected the response.\n");
            self.line("  This may indicate that the endpoint is publicly accessible,");
            self.line("  or that session validation occurs elsewhere.\n");
        } else {
            for name in mandatory {
                self.line(&format!("+ {name}"));
            }
        }

        let indeterminate = outcome.indeterminate();
        if !indeterminate.is_empty() {
            self.heading("Indeterminate Cookies (request failed)");
            self.line("");
            for name in indeterminate {
                self.line(&format!("? {name}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::classify;
    use crate::config::ComparisonMode;
    use crate::engine::CookieVerdict;

    fn output(f: impl FnOnce(&mut TextReporter<Vec<u8>>)) -> String {
        let mut reporter = TextReporter::new(Vec::new(), false);
        f(&mut reporter);
        String::from_utf8(reporter.into_inner()).unwrap()
    }

    fn outcome(results: Vec<CookieVerdict>) -> AblationOutcome {
        AblationOutcome {
            method: "GET".into(),
            url: "https://a.example/".into(),
            comparison: ComparisonMode::StatusAndLength,
            baseline: classify(200, 10),
            results,
        }
    }

    fn verdict(name: &str, verdict: Verdict) -> CookieVerdict {
        CookieVerdict {
            name: name.into(),
            verdict,
            signature: None,
            error: None,
        }
    }

    #[test]
    fn cookie_list_index_is_right_justified() {
        let header = (1..=10).map(|i| format!("c{i}=v")).collect::<Vec<_>>().join("; ");
        let cookies = CookieSet::parse_header(&header);

        let out = output(|r| r.cookies_found(&cookies));
        assert!(out.contains("\n 1. c1\n"));
        assert!(out.contains("\n 9. c9\n"));
        assert!(out.contains("\n10. c10\n"));
    }

    #[test]
    fn cookie_list_single_digit_has_no_padding() {
        let cookies = CookieSet::parse_header("a=1; b=2");
        let out = output(|r| r.cookies_found(&cookies));
        assert!(out.contains("\n1. a\n2. b\n"));
    }

    #[test]
    fn response_lines_use_the_render_format() {
        let out = output(|r| {
            r.baseline_started();
            r.baseline(&classify(200, 1000));
            r.ablation("session", &classify(302, 0), Verdict::Mandatory);
        });

        assert!(out.contains("Sending Baseline Request..."));
        assert!(out.contains(&format!("{:<70} [cl=  1000] [200]\n", "[Baseline] Server Response")));
        assert!(out.contains(&format!("{:<70} [cl=     0] [302]\n", "Removing cookie: session")));
        assert!(!out.contains('\x1b'));
    }

    #[test]
    fn failed_ablation_line() {
        let err = TransportError::Timeout { url: "https://a.example/".into() };
        let out = output(|r| r.ablation_failed("sid", &err));
        assert!(out.starts_with("Removing cookie: sid"));
        assert!(out.contains("[error: timed out waiting for https://a.example/]"));
    }

    #[test]
    fn mandatory_list_is_prefixed() {
        let o = outcome(vec![
            verdict("session", Verdict::Mandatory),
            verdict("theme", Verdict::Optional),
            verdict("csrf", Verdict::Mandatory),
        ]);
        let out = output(|r| r.finished(&o));

        assert!(out.contains("Mandatory (Must-have) Cookies"));
        assert!(out.contains("+ session\n+ csrf\n"));
        assert!(!out.contains("theme"));
        assert!(!out.contains("(None)"));
        assert!(!out.contains("Indeterminate"));
    }

    #[test]
    fn empty_mandatory_list_explains_itself() {
        let o = outcome(vec![verdict("a", Verdict::Optional)]);
        let out = output(|r| r.finished(&o));
        assert!(out.contains("(None) No individual cookie affected the response."));
        assert!(out.contains("publicly accessible"));
    }

    #[test]
    fn indeterminate_cookies_get_their_own_section() {
        let o = outcome(vec![verdict("a", Verdict::Indeterminate), verdict("b", Verdict::Mandatory)]);
        let out = output(|r| r.finished(&o));
        assert!(out.contains("+ b\n"));
        assert!(out.contains("Indeterminate Cookies (request failed)"));
        assert!(out.contains("? a\n"));
    }
}
