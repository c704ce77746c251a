//! Finds out which cookies of a captured HTTP request the server actually
//! depends on.
//!
//! The request is replayed once with all cookies (the baseline) and then once
//! per cookie with only that cookie withheld. A cookie whose absence changes
//! the response signature (status code and body length) is mandatory.
//!
//! ```rust,no_run
//! use std::path::Path;
//! use musthave_cookies::config::{AblationConfig, TransportConfig};
//! use musthave_cookies::report::TextReporter;
//! use musthave_cookies::request::{load_request_file, Scheme};
//! use musthave_cookies::transport::HttpTransport;
//! use musthave_cookies::AblationEngine;
//!
//! # async fn demo() -> Result<(), musthave_cookies::Error> {
//! let request = load_request_file(Path::new("request.txt"), Scheme::Https)?;
//! let engine = AblationEngine::new(HttpTransport::new(TransportConfig::default()), AblationConfig::default());
//! let mut reporter = TextReporter::new(std::io::stdout(), true);
//! let outcome = engine.run(&request, &mut reporter).await?;
//! println!("{:?}", outcome.mandatory());
//! # Ok(()) }
//! ```

pub mod classifier;
pub mod config;
pub mod engine;
pub mod errors;
pub mod report;
pub mod request;
pub mod transport;

pub use engine::{AblationEngine, AblationOutcome, CookieVerdict, Verdict};
pub use errors::Error;
