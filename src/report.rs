//! Reporting: how a run is shown to the user.
//!
//! The engine calls a [`Reporter`] in strict test order, right after each
//! request completes, so output streams while the run is in progress.
//! - [`TextReporter`] prints the human-readable, column-aligned format.
//! - [`JsonReporter`] stays silent until the run ends and then writes one JSON
//!   document describing the whole outcome.

mod json;
mod text;

pub use json::JsonReporter;
pub use text::TextReporter;

use crate::classifier::ResponseSignature;
use crate::engine::{AblationOutcome, Verdict};
use crate::errors::TransportError;
use crate::request::CookieSet;

/// Receives progress events from the ablation engine.
///
/// All hooks default to doing nothing so implementations only pick the events
/// they care about.
pub trait Reporter {
    /// Cookies parsed from the captured request, in declaration order.
    fn cookies_found(&mut self, _cookies: &CookieSet) {}

    /// Called right before the baseline request is sent.
    fn baseline_started(&mut self) {}

    fn baseline(&mut self, _signature: &ResponseSignature) {}

    /// Result of the request sent without `cookie`.
    fn ablation(&mut self, _cookie: &str, _signature: &ResponseSignature, _verdict: Verdict) {}

    /// The request sent without `cookie` failed.
    fn ablation_failed(&mut self, _cookie: &str, _error: &TransportError) {}

    fn finished(&mut self, _outcome: &AblationOutcome) {}
}
