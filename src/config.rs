//! Run configuration.
//!
//! [`AblationConfig`] controls pacing and the comparison policy of a run,
//! [`TransportConfig`] controls how requests hit the wire. Both come with
//! defaults and a validating builder.
//!
//! ```rust
//! use std::time::Duration;
//! use musthave_cookies::config::{AblationConfig, ComparisonMode};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = AblationConfig::builder()
//!     .baseline_delay(Duration::from_millis(500))
//!     .comparison(ComparisonMode::StatusOnly)
//!     .build()?;
//! assert_eq!(cfg.concurrency, 1);
//! # Ok(()) }
//! ```

use std::time::Duration;

pub use crate::classifier::ComparisonMode;
use crate::errors::ConfigError;

const DEFAULT_BASELINE_DELAY: Duration = Duration::from_secs(2);
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Same hop limit as common scripting HTTP clients.
pub const DEFAULT_MAX_REDIRECTS: usize = 30;

#[derive(Debug, Clone)]
pub struct AblationConfig {
    /// Pause after the baseline call before ablation starts.
    pub baseline_delay: Duration,
    /// Pause between consecutive ablation calls.
    pub ablation_delay: Duration,
    pub comparison: ComparisonMode,
    /// Requests in flight. Only 1 is supported.
    pub concurrency: usize,
    allow_zero_delay: bool,
}

impl Default for AblationConfig {
    fn default() -> Self {
        Self {
            baseline_delay: DEFAULT_BASELINE_DELAY,
            ablation_delay: Duration::ZERO,
            comparison: ComparisonMode::default(),
            concurrency: 1,
            allow_zero_delay: false,
        }
    }
}

impl AblationConfig {
    pub fn builder() -> AblationConfigBuilder {
        AblationConfigBuilder::default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct AblationConfigBuilder {
    inner: AblationConfig,
}

impl AblationConfigBuilder {
    #[inline]
    fn map(mut self, f: impl FnOnce(&mut AblationConfig)) -> Self {
        f(&mut self.inner);
        self
    }

    pub fn baseline_delay(self, d: Duration) -> Self { self.map(|c| c.baseline_delay = d) }
    pub fn ablation_delay(self, d: Duration) -> Self { self.map(|c| c.ablation_delay = d) }
    pub fn comparison(self, mode: ComparisonMode) -> Self { self.map(|c| c.comparison = mode) }
    pub fn concurrency(self, n: usize) -> Self { self.map(|c| c.concurrency = n) }

    /// Accept a zero baseline delay. Meant for local targets and tests.
    pub fn allow_zero_delay(self, on: bool) -> Self { self.map(|c| c.allow_zero_delay = on) }

    /// Validate and build the final config.
    pub fn build(self) -> Result<AblationConfig, ConfigError> {
        let c = &self.inner;
        if c.baseline_delay.is_zero() && !c.allow_zero_delay {
            return Err(ConfigError::ZeroBaselineDelay);
        }
        if c.concurrency != 1 {
            return Err(ConfigError::ConcurrencyUnsupported(c.concurrency));
        }
        Ok(self.inner)
    }
}

#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
    pub follow_redirects: bool,
    pub max_redirects: usize,
    pub accept_invalid_certs: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            follow_redirects: true,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            accept_invalid_certs: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = AblationConfig::default();
        assert_eq!(cfg.baseline_delay, Duration::from_secs(2));
        assert_eq!(cfg.ablation_delay, Duration::ZERO);
        assert_eq!(cfg.comparison, ComparisonMode::StatusAndLength);
        assert_eq!(cfg.concurrency, 1);

        let t = TransportConfig::default();
        assert!(t.follow_redirects);
        assert_eq!(t.max_redirects, 30);
        assert!(!t.accept_invalid_certs);
    }

    #[test]
    fn builder_sets_values() {
        let cfg = AblationConfig::builder()
            .baseline_delay(Duration::from_millis(250))
            .ablation_delay(Duration::from_millis(100))
            .comparison(ComparisonMode::StatusOnly)
            .build()
            .unwrap();
        assert_eq!(cfg.baseline_delay, Duration::from_millis(250));
        assert_eq!(cfg.ablation_delay, Duration::from_millis(100));
        assert_eq!(cfg.comparison, ComparisonMode::StatusOnly);
    }

    #[test]
    fn zero_delay_needs_opt_in() {
        let err = AblationConfig::builder().baseline_delay(Duration::ZERO).build().unwrap_err();
        assert_eq!(err, ConfigError::ZeroBaselineDelay);

        let cfg = AblationConfig::builder()
            .baseline_delay(Duration::ZERO)
            .allow_zero_delay(true)
            .build()
            .unwrap();
        assert!(cfg.baseline_delay.is_zero());
    }

    #[test]
    fn concurrency_other_than_one_is_rejected() {
        let err = AblationConfig::builder().concurrency(4).build().unwrap_err();
        assert_eq!(err, ConfigError::ConcurrencyUnsupported(4));
        assert!(AblationConfig::builder().concurrency(0).build().is_err());
    }
}
