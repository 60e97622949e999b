//! Optional observability helpers for the gate.
//!
//! # Feature Flags
//!
//! - Enable `tracing` (on by default) to emit the `oauth2_gate.acquire` span around every
//!   acquisition sequence plus events for token responses, retries, and exhausted attempts.
//! - Enable `metrics` to increment the `oauth2_gate_acquisition_total` counter, labeled by
//!   `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Outcome labels recorded by the gate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AcquisitionOutcome {
	/// The cache already held a token; no acquisition happened.
	CacheHit,
	/// A single call to the token source.
	Attempt,
	/// A token was acquired and cached.
	Success,
	/// Acquisition gave up and the error reached the caller.
	Failure,
}
impl AcquisitionOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			AcquisitionOutcome::CacheHit => "cache_hit",
			AcquisitionOutcome::Attempt => "attempt",
			AcquisitionOutcome::Success => "success",
			AcquisitionOutcome::Failure => "failure",
		}
	}
}
impl Display for AcquisitionOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
