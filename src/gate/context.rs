//! Request context seen by the gate while intercepting a call.

// std
use std::sync::atomic::{AtomicU16, Ordering};
// crates.io
use tokio_util::sync::CancellationToken;

/// Host-pipeline state the gate reads before forwarding a call.
pub trait RequestContext
where
	Self: Send + Sync,
{
	/// Response status currently recorded on the in-flight request.
	fn response_status(&self) -> u16;

	/// Cancellation signal tied to the request (for example, a client abort).
	fn cancellation(&self) -> CancellationToken {
		CancellationToken::new()
	}
}

/// Ready-made [`RequestContext`] for hosts without a context type of their own.
#[derive(Debug)]
pub struct GateContext {
	response_status: AtomicU16,
	cancel: CancellationToken,
}
impl GateContext {
	/// Status a fresh response starts with.
	pub const DEFAULT_STATUS: u16 = 200;

	/// Creates a context with a `200` status and a fresh cancellation token.
	pub fn new() -> Self {
		Self { response_status: AtomicU16::new(Self::DEFAULT_STATUS), cancel: Default::default() }
	}

	/// Overrides the initial response status.
	pub fn with_status(self, status: u16) -> Self {
		self.set_response_status(status);

		self
	}

	/// Ties the context to an existing cancellation token.
	pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
		self.cancel = cancel;

		self
	}

	/// Records a new response status (usually done by the handler).
	pub fn set_response_status(&self, status: u16) {
		self.response_status.store(status, Ordering::Release);
	}

	/// Cancels the request.
	pub fn cancel(&self) {
		self.cancel.cancel();
	}
}
impl Default for GateContext {
	fn default() -> Self {
		Self::new()
	}
}
impl RequestContext for GateContext {
	fn response_status(&self) -> u16 {
		self.response_status.load(Ordering::Acquire)
	}

	fn cancellation(&self) -> CancellationToken {
		self.cancel.clone()
	}
}
