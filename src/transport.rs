//! HTTP transport.
//!
//! The engine only needs one capability: send a request with a given cookie
//! subset and get back the status code and body length. [`Transport`] is that
//! seam; [`HttpTransport`] is the `reqwest` implementation used by the CLI.

use std::error::Error as StdError;
use std::future::Future;
use std::sync::Arc;

use http::{HeaderName, HeaderValue};
use reqwest::cookie::Jar;
use reqwest::redirect::Policy;
use url::Url;

use crate::config::TransportConfig;
use crate::errors::TransportError;
use crate::request::CookieSet;

/// Headers never forwarded from the capture.
///
/// Cookies travel through the cookie jar and the length is recomputed from the
/// reconstructed body.
const SKIPPED_HEADERS: &[&str] = &["cookie", "content-length"];

/// One request to put on the wire.
#[derive(Debug, Clone)]
pub struct OutgoingRequest<'a> {
    pub method: &'a str,
    pub url: &'a Url,
    /// Captured headers, `Cookie` already removed.
    pub headers: Vec<(&'a str, &'a str)>,
    pub cookies: &'a CookieSet,
    pub body: &'a str,
}

/// What the engine keeps from a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    /// Length of the body as received, after content decoding.
    pub body_length: u64,
}

/// Sends requests for the ablation engine.
///
/// Implementations must treat every call the same way (redirects, decoding)
/// so that responses are comparable, and must not carry cookies from one call
/// into the next.
pub trait Transport {
    fn send(
        &self,
        request: OutgoingRequest<'_>,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>> + Send;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(
        &self,
        request: OutgoingRequest<'_>,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>> + Send {
        (**self).send(request)
    }
}

/// `reqwest` based transport.
///
/// A fresh client with a fresh cookie jar is built for every call: cookies set
/// by the server during one call (for instance on a redirect) must never show
/// up in the next one.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    config: TransportConfig,
}

impl HttpTransport {
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    fn client_for(&self, url: &Url, cookies: &CookieSet) -> Result<reqwest::Client, TransportError> {
        let jar = Jar::default();
        for (name, value) in cookies.iter() {
            jar.add_cookie_str(&format!("{name}={value}; Path=/"), url);
        }

        let policy = if self.config.follow_redirects {
            Policy::limited(self.config.max_redirects)
        } else {
            Policy::none()
        };

        reqwest::Client::builder()
            .cookie_provider(Arc::new(jar))
            .redirect(policy)
            .timeout(self.config.timeout)
            .danger_accept_invalid_certs(self.config.accept_invalid_certs)
            .build()
            .map_err(|e| map_error(url, e))
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: OutgoingRequest<'_>) -> Result<TransportResponse, TransportError> {
        let url = request.url;
        let client = self.client_for(url, request.cookies)?;

        let method = reqwest::Method::from_bytes(request.method.as_bytes()).map_err(|e| {
            TransportError::Request {
                url: url.to_string(),
                message: format!("invalid method {:?}: {e}", request.method),
            }
        })?;

        let mut builder = client.request(method, url.clone());
        for (name, value) in request.headers {
            if SKIPPED_HEADERS.iter().any(|s| s.eq_ignore_ascii_case(name)) {
                continue;
            }
            let (Ok(name), Ok(value)) = (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value))
            else {
                log::warn!("Skipping header that cannot be sent: {name:?}");
                continue;
            };
            builder = builder.header(name, value);
        }
        if !request.body.is_empty() {
            builder = builder.body(request.body.to_string());
        }

        log::debug!("{} {} ({} cookies)", request.method, url, request.cookies.len());

        let res = builder.send().await.map_err(|e| map_error(url, e))?;
        let status = res.status().as_u16();
        let final_url = res.url().clone();

        // Fully buffered, no streaming
        let body = res.bytes().await.map_err(|e| map_error(url, e))?;

        if final_url != *url {
            log::debug!("Redirected to {final_url}");
        }

        Ok(TransportResponse {
            status,
            body_length: body.len() as u64,
        })
    }
}

fn map_error(url: &Url, e: reqwest::Error) -> TransportError {
    let url = url.to_string();
    let message = error_chain(&e);
    if e.is_timeout() {
        TransportError::Timeout { url }
    } else if e.is_connect() {
        TransportError::Connect { url, message }
    } else {
        TransportError::Request { url, message }
    }
}

// reqwest's own Display hides the interesting part (DNS, TLS) in the sources
fn error_chain(e: &dyn StdError) -> String {
    let mut out = e.to_string();
    let mut source = e.source();
    while let Some(s) = source {
        out.push_str(": ");
        out.push_str(&s.to_string());
        source = s.source();
    }
    out
}
