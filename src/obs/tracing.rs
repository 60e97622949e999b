// self
use crate::_prelude::*;

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedAcquire<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedAcquire<F> = F;

/// Span wrapping one acquisition sequence (first attempt plus retries).
#[derive(Clone, Debug)]
pub struct AcquireSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl AcquireSpan {
	/// Creates a span tagged with the cache key and the retry budget.
	pub fn new(cache_key: &str, retries: u32) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("oauth2_gate.acquire", cache_key, retries);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (cache_key, retries);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedAcquire<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Logs the status line of a token endpoint response.
pub fn log_token_response(status: u16, reason: &str) {
	#[cfg(feature = "tracing")]
	tracing::info!(status, reason, "Token retrieval completed.");
	#[cfg(not(feature = "tracing"))]
	let _ = (status, reason);
}

/// Logs a fault raised while calling the token endpoint.
pub fn log_token_fault(error: &dyn StdError) {
	#[cfg(feature = "tracing")]
	tracing::error!(error = %error, "Token retrieval threw an error.");
	#[cfg(not(feature = "tracing"))]
	let _ = error;
}

/// Logs a token endpoint body that could not be parsed.
pub fn log_unparsable_body(path: &str, error: &serde_json::Error) {
	#[cfg(feature = "tracing")]
	tracing::debug!(path, error = %error, "Token endpoint body is not a token payload.");
	#[cfg(not(feature = "tracing"))]
	let _ = (path, error);
}

/// Logs the start of a re-authentication attempt.
pub fn log_retry(attempt: u32, reason: &dyn Display) {
	#[cfg(feature = "tracing")]
	tracing::warn!(attempt, reason = %reason, "Starting attempt #{attempt} at re-authenticating.");
	#[cfg(not(feature = "tracing"))]
	let _ = (attempt, reason);
}

/// Logs an acquisition sequence that ran out of attempts.
pub fn log_exhausted(attempts: u32, error: &dyn StdError) {
	#[cfg(feature = "tracing")]
	tracing::error!(attempts, error = %error, "Token acquisition failed after every attempt.");
	#[cfg(not(feature = "tracing"))]
	let _ = (attempts, error);
}
