use std::io::Write;

use serde::Serialize;

use crate::engine::AblationOutcome;
use crate::report::Reporter;

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    outcome: &'a AblationOutcome,
    mandatory: Vec<&'a str>,
    indeterminate: Vec<&'a str>,
}

/// Machine-readable reporter. Writes a single pretty-printed JSON document
/// once the run is finished.
pub struct JsonReporter<W: Write> {
    out: W,
}

impl<W: Write> JsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Reporter for JsonReporter<W> {
    fn finished(&mut self, outcome: &AblationOutcome) {
        let report = JsonReport {
            outcome,
            mandatory: outcome.mandatory(),
            indeterminate: outcome.indeterminate(),
        };

        let res = serde_json::to_writer_pretty(&mut self.out, &report)
            .map_err(std::io::Error::from)
            .and_then(|_| writeln!(self.out))
            .and_then(|_| self.out.flush());
        if let Err(e) = res {
            log::error!("Cannot write JSON report: {e}");
        }
    }
}
