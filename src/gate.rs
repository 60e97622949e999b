//! The authentication gate: make sure a token is cached, then forward the call.
//!
//! [`AuthGate::intercept`] runs once per intercepted request:
//!
//! 1. If the cache already holds a non-empty entry under the configured key, the call is
//!    forwarded immediately.
//! 2. Otherwise the token source is called under a [`RetryPolicy`]. Errors and missing or blank
//!    tokens are retried up to `retries` times with a fixed delay; a valid token is serialized and
//!    cached for `lifetime_minutes`.
//! 3. If every attempt fails, the last error is returned unchanged and `next` is never invoked.
//! 4. Otherwise `next` runs exactly once and its output is returned untouched.
//!
//! # Status-based retries
//!
//! Historically the retry loop also judged each successful attempt by the request's *current*
//! response status, treating 401/403/407 as an authentication failure. That status belongs to
//! the downstream response, not to the token exchange, so a request that arrives already carrying
//! such a status re-acquires a token on every remaining attempt even though each acquisition
//! succeeds. [`StatusRetryPolicy::Legacy`] keeps that behavior for compatibility and is the
//! default; [`StatusRetryPolicy::Disabled`] judges attempts by the acquisition outcome only.
//!
//! Concurrent cache misses are not coalesced: each may acquire and write a token, and the last
//! write wins.

pub mod context;
pub mod retry;

pub use context::*;
pub use retry::*;

// crates.io
use tokio_util::sync::CancellationToken;
// self
use crate::{
	_prelude::*,
	cache::{CacheEntryOptions, CacheGate},
	client::TokenSource,
	config::AuthOptions,
	error::AcquisitionError,
	obs::{self, AcquireSpan, AcquisitionOutcome},
	token::Token,
};
#[cfg(feature = "reqwest")] use crate::{cache::DistributedCache, client::TokenClient};

/// How the retry loop treats the request's response status after a successful acquisition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StatusRetryPolicy {
	/// Retry while the request status is 401, 403, or 407.
	#[default]
	Legacy,
	/// Ignore the request status; only acquisition failures are retried.
	Disabled,
}
impl StatusRetryPolicy {
	/// Returns true when `status` should trigger another acquisition attempt.
	pub fn is_authentication_failure(self, status: u16) -> bool {
		match self {
			Self::Legacy => matches!(status, 401 | 403 | 407),
			Self::Disabled => false,
		}
	}
}

/// Callback invoked before every retry of the acquisition loop.
pub trait RetryObserver
where
	Self: Send + Sync,
{
	/// Called with the 1-based retry number and the reason for retrying.
	fn on_retry(&self, attempt: u32, reason: &RetryReason<'_>);
}

/// Intercepting middleware that guarantees a cached token before forwarding a call.
#[derive(Clone)]
pub struct AuthGate {
	token_source: Arc<dyn TokenSource>,
	cache: CacheGate,
	options: Arc<AuthOptions>,
	status_retry: StatusRetryPolicy,
	observer: Option<Arc<dyn RetryObserver>>,
}
impl AuthGate {
	/// Creates a gate over the provided token source and cache.
	///
	/// The options are validated again here so a gate can never run with out-of-range settings.
	pub fn new(
		token_source: Arc<dyn TokenSource>,
		cache: CacheGate,
		options: Arc<AuthOptions>,
	) -> Result<Self> {
		options.validate()?;

		Ok(Self {
			token_source,
			cache,
			options,
			status_retry: StatusRetryPolicy::default(),
			observer: None,
		})
	}

	/// Creates a gate with the crate's HTTPS [`TokenClient`] over `backend`.
	#[cfg(feature = "reqwest")]
	pub fn from_options(
		options: Arc<AuthOptions>,
		backend: Arc<dyn DistributedCache>,
	) -> Result<Self> {
		let client = TokenClient::new(options.clone())?;

		Self::new(Arc::new(client), CacheGate::new(backend), options)
	}

	/// Selects how response statuses feed the retry decision.
	pub fn with_status_retry(mut self, policy: StatusRetryPolicy) -> Self {
		self.status_retry = policy;

		self
	}

	/// Installs a hook that observes every retry.
	pub fn with_observer(mut self, observer: Arc<dyn RetryObserver>) -> Self {
		self.observer = Some(observer);

		self
	}

	/// Options the gate runs with.
	pub fn options(&self) -> &AuthOptions {
		&self.options
	}

	/// Ensures a token is cached, then runs `next` exactly once and returns its output.
	///
	/// When acquisition fails for good, the error is returned and `next` is dropped unused.
	pub async fn intercept<C, F, Fut, T>(&self, ctx: &C, next: F) -> Result<T>
	where
		C: ?Sized + RequestContext,
		F: FnOnce() -> Fut,
		Fut: Future<Output = T>,
	{
		self.ensure_token(ctx).await?;

		Ok(next().await)
	}

	/// Runs the check/acquire/store part of [`intercept`](Self::intercept) on its own.
	pub async fn ensure_token<C>(&self, ctx: &C) -> Result<()>
	where
		C: ?Sized + RequestContext,
	{
		if self.cache.has(&self.options.cache_key).await? {
			obs::record_acquisition(AcquisitionOutcome::CacheHit);

			return Ok(());
		}

		let span = AcquireSpan::new(&self.options.cache_key, self.options.retries);
		let result = span.instrument(self.acquire_with_retry(ctx)).await;

		match &result {
			Ok(()) => obs::record_acquisition(AcquisitionOutcome::Success),
			Err(_) => obs::record_acquisition(AcquisitionOutcome::Failure),
		}

		result
	}

	/// Returns the cached token, if one is present.
	pub async fn bearer_token(&self) -> Result<Option<Token>> {
		Ok(self.cache.get_json(&self.options.cache_key).await?)
	}

	async fn acquire_with_retry<C>(&self, ctx: &C) -> Result<()>
	where
		C: ?Sized + RequestContext,
	{
		let cancel = ctx.cancellation();
		let cancel = &cancel;
		let status_retry = self.status_retry;

		RetryPolicy::from_options(&self.options)
			.execute(
				cancel,
				move || self.acquire_once(ctx, cancel),
				|status| status_retry.is_authentication_failure(status),
				|attempt, reason| {
					if let Some(observer) = &self.observer {
						observer.on_retry(attempt, reason);
					}
				},
			)
			.await
			.map(|_| ())
	}

	async fn acquire_once<C>(&self, ctx: &C, cancel: &CancellationToken) -> Result<u16>
	where
		C: ?Sized + RequestContext,
	{
		obs::record_acquisition(AcquisitionOutcome::Attempt);

		let token = self
			.token_source
			.get_token(cancel)
			.await?
			.filter(Token::is_valid)
			.ok_or(AcquisitionError::InvalidToken)?;
		let entry = CacheEntryOptions::expires_after(self.options.lifetime());

		self.cache.set(&self.options.cache_key, &token, &entry).await?;

		Ok(ctx.response_status())
	}
}
impl Debug for AuthGate {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthGate")
			.field("options", &self.options)
			.field("status_retry", &self.status_retry)
			.field("observer_set", &self.observer.is_some())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn legacy_policy_flags_auth_statuses_only() {
		for status in [401, 403, 407] {
			assert!(StatusRetryPolicy::Legacy.is_authentication_failure(status));
			assert!(!StatusRetryPolicy::Disabled.is_authentication_failure(status));
		}
		for status in [200, 204, 400, 404, 500] {
			assert!(!StatusRetryPolicy::Legacy.is_authentication_failure(status));
		}
	}

	#[test]
	fn gate_is_shareable_across_tasks() {
		fn assert_send_sync<T: Send + Sync + Clone>() {}

		assert_send_sync::<AuthGate>();
	}
}
