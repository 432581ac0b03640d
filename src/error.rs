//! Errors that abort a scan run.
//!
//! Connection-level probe failures are not represented here: the prober
//! folds them into [`ProbeResult::NotOpen`](crate::scanner::ProbeResult).
use thiserror::Error;

/// Every failure that terminates a rangescan invocation.
#[derive(Error, Debug)]
pub enum ScanError {
    /// Input is neither an IPv4 literal nor something we can look up.
    #[error("invalid address '{0}': expected an IPv4 address or a host name")]
    InvalidAddress(String),

    /// Port range does not match `<start>-<end>` or holds unusable values.
    #[error("invalid port range '{range}': {reason}")]
    InvalidPortRange { range: String, reason: String },

    /// Host name lookup produced no IPv4 address.
    #[error("could not resolve host '{host}': {reason}")]
    Resolution { host: String, reason: String },

    /// The OS ran out of sockets, buffers or local ports.
    #[error("resource exhaustion while probing port {port}: {source}. Reduce the batch size (e.g. -b 2500) or raise the ulimit")]
    ResourceExhaustion {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file exists but could not be parsed.
    #[error("found {0} in configuration file")]
    Config(String),
}

impl ScanError {
    pub(crate) fn port_range(range: &str, reason: impl Into<String>) -> Self {
        Self::InvalidPortRange {
            range: range.to_owned(),
            reason: reason.into(),
        }
    }

    pub(crate) fn resolution(host: &str, reason: impl ToString) -> Self {
        Self::Resolution {
            host: host.to_owned(),
            reason: reason.to_string(),
        }
    }
}
