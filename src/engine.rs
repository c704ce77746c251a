//! Ablation test engine.
//!
//! The engine replays a [`CapturedRequest`] once with every cookie (the
//! baseline) and then once per cookie with exactly that cookie withheld. A
//! cookie is mandatory when withholding it changes the response signature.
//!
//! Requests are strictly sequential. Each ablation derives its own subset
//! from the original cookie set, so no call can observe another call's
//! removal. Cookies are tested in reverse declaration order: session tokens
//! tend to be declared last, so they show up early in the live output.

use serde::Serialize;

use crate::classifier::{classify, ResponseSignature};
use crate::config::{AblationConfig, ComparisonMode};
use crate::errors::{Error, Result, TransportError};
use crate::report::Reporter;
use crate::request::{CapturedRequest, CookieSet};
use crate::transport::{OutgoingRequest, Transport};

/// Classification of a single cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Withholding the cookie changed the response.
    Mandatory,
    /// Withholding the cookie made no observable difference.
    Optional,
    /// The ablation request failed; nothing can be said about this cookie.
    Indeterminate,
}

/// Result of one ablation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CookieVerdict {
    pub name: String,
    pub verdict: Verdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<ResponseSignature>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Everything a run produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AblationOutcome {
    pub method: String,
    pub url: String,
    pub comparison: ComparisonMode,
    pub baseline: ResponseSignature,
    /// Per-cookie results, in testing order.
    pub results: Vec<CookieVerdict>,
}

impl AblationOutcome {
    /// Mandatory cookie names, in testing order.
    pub fn mandatory(&self) -> Vec<&str> {
        self.names_with(Verdict::Mandatory)
    }

    /// Cookies whose ablation call failed.
    pub fn indeterminate(&self) -> Vec<&str> {
        self.names_with(Verdict::Indeterminate)
    }

    fn names_with(&self, verdict: Verdict) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| r.verdict == verdict)
            .map(|r| r.name.as_str())
            .collect()
    }
}

pub struct AblationEngine<T> {
    transport: T,
    config: AblationConfig,
}

impl<T: Transport> AblationEngine<T> {
    pub fn new(transport: T, config: AblationConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &AblationConfig {
        &self.config
    }

    /// Runs the baseline and one ablation per cookie, reporting as it goes.
    ///
    /// Fails only when the baseline call fails. A failed ablation call marks
    /// its cookie [`Verdict::Indeterminate`] and the run continues.
    pub async fn run(&self, request: &CapturedRequest, reporter: &mut dyn Reporter) -> Result<AblationOutcome> {
        let cookies = &request.cookies;
        reporter.cookies_found(cookies);

        reporter.baseline_started();
        let baseline = self.replay(request, cookies).await.map_err(Error::Baseline)?;
        reporter.baseline(&baseline);
        log::info!("Baseline for {} {}: {}", request.method, request.url, baseline);

        if !cookies.is_empty() && !self.config.baseline_delay.is_zero() {
            tokio::time::sleep(self.config.baseline_delay).await;
        }

        let mut results = Vec::with_capacity(cookies.len());
        for (idx, name) in cookies.names().rev().enumerate() {
            if idx > 0 && !self.config.ablation_delay.is_zero() {
                tokio::time::sleep(self.config.ablation_delay).await;
            }

            let subset = cookies.without(name);
            let result = match self.replay(request, &subset).await {
                Ok(signature) => {
                    let verdict = if self.config.comparison.differs(&baseline, &signature) {
                        Verdict::Mandatory
                    } else {
                        Verdict::Optional
                    };
                    log::debug!("Without {name:?}: {signature} -> {verdict:?}");
                    reporter.ablation(name, &signature, verdict);
                    CookieVerdict {
                        name: name.to_string(),
                        verdict,
                        signature: Some(signature),
                        error: None,
                    }
                }
                Err(e) => {
                    log::warn!("Request without cookie {name:?} failed: {e}");
                    reporter.ablation_failed(name, &e);
                    CookieVerdict {
                        name: name.to_string(),
                        verdict: Verdict::Indeterminate,
                        signature: None,
                        error: Some(e.to_string()),
                    }
                }
            };
            results.push(result);
        }

        let outcome = AblationOutcome {
            method: request.method.clone(),
            url: request.url.to_string(),
            comparison: self.config.comparison,
            baseline,
            results,
        };
        reporter.finished(&outcome);

        Ok(outcome)
    }

    async fn replay(&self, request: &CapturedRequest, cookies: &CookieSet) -> Result<ResponseSignature, TransportError> {
        let res = self
            .transport
            .send(OutgoingRequest {
                method: &request.method,
                url: &request.url,
                headers: request.headers.iter_except(&["Cookie"]).collect(),
                cookies,
                body: &request.body,
            })
            .await?;

        Ok(classify(res.status, res.body_length))
    }
}
