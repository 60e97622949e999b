//! Bounded retry loop used for token acquisition.

// std
use std::time::Duration as StdDuration;
// crates.io
use tokio_util::sync::CancellationToken;
// self
use crate::{_prelude::*, config::AuthOptions, obs};

/// Why an attempt is about to be retried.
#[derive(Debug)]
pub enum RetryReason<'a> {
	/// The attempt failed with a retryable error.
	Fault(&'a Error),
	/// The attempt succeeded but its result status looks like an authentication failure.
	AuthenticationStatus(u16),
}
impl Display for RetryReason<'_> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Fault(e) => write!(f, "{e}"),
			Self::AuthenticationStatus(status) => write!(f, "result status {status}"),
		}
	}
}

/// Fixed-delay retry policy: one initial attempt plus `retries` more.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
	/// Additional attempts after the first one.
	pub retries: u32,
	/// Delay between attempts; zero skips the delay.
	pub sleep: StdDuration,
}
impl RetryPolicy {
	/// Derives the policy from validated options.
	pub fn from_options(options: &AuthOptions) -> Self {
		Self {
			retries: options.retries,
			sleep: StdDuration::from_secs(u64::from(options.retry_sleep_seconds)),
		}
	}

	/// Runs `op` until it yields a status that `is_failure` accepts, a non-retryable error, or the
	/// attempt budget runs out.
	///
	/// When the budget runs out, the last outcome is returned unchanged: the final error for
	/// faults, or the final status when only the status predicate kept firing. Cancellation is
	/// honored before each attempt and during the delay.
	pub async fn execute<Op, Fut, P, R>(
		&self,
		cancel: &CancellationToken,
		mut op: Op,
		is_failure: P,
		mut on_retry: R,
	) -> Result<u16>
	where
		Op: FnMut() -> Fut,
		Fut: Future<Output = Result<u16>>,
		P: Fn(u16) -> bool,
		R: FnMut(u32, &RetryReason<'_>),
	{
		let mut retry = 0;

		loop {
			if cancel.is_cancelled() {
				return Err(Error::Cancelled);
			}

			let outcome = op().await;
			let reason = match &outcome {
				Err(e) if e.is_retryable() => RetryReason::Fault(e),
				Ok(status) if is_failure(*status) => RetryReason::AuthenticationStatus(*status),
				_ => return outcome,
			};

			if retry >= self.retries {
				if let Err(e) = &outcome {
					obs::log_exhausted(retry + 1, e);
				}

				return outcome;
			}

			retry += 1;

			obs::log_retry(retry, &reason);
			on_retry(retry, &reason);

			self.pause(cancel).await?;
		}
	}

	async fn pause(&self, cancel: &CancellationToken) -> Result<()> {
		if self.sleep.is_zero() {
			return Ok(());
		}

		tokio::select! {
			biased;
			_ = cancel.cancelled() => Err(Error::Cancelled),
			_ = tokio::time::sleep(self.sleep) => Ok(()),
		}
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicU32, Ordering};
	// self
	use super::*;
	use crate::error::{AcquisitionError, ConfigError};

	fn policy(retries: u32) -> RetryPolicy {
		RetryPolicy { retries, sleep: StdDuration::ZERO }
	}

	#[tokio::test]
	async fn succeeds_after_transient_failures() {
		let calls = &AtomicU32::new(0);
		let mut retried = Vec::new();
		let result = policy(2)
			.execute(
				&CancellationToken::new(),
				move || async move {
					if calls.fetch_add(1, Ordering::SeqCst) < 2 {
						Err(Error::from(AcquisitionError::InvalidToken))
					} else {
						Ok(200)
					}
				},
				|_| false,
				|attempt, _| retried.push(attempt),
			)
			.await;

		assert_eq!(result.expect("Third attempt should succeed."), 200);
		assert_eq!(calls.load(Ordering::SeqCst), 3);
		assert_eq!(retried, vec![1, 2]);
	}

	#[tokio::test]
	async fn returns_last_error_when_exhausted() {
		let calls = &AtomicU32::new(0);
		let result = policy(1)
			.execute(
				&CancellationToken::new(),
				move || async move {
					calls.fetch_add(1, Ordering::SeqCst);

					Err(Error::from(AcquisitionError::InvalidToken))
				},
				|_| false,
				|_, _| {},
			)
			.await;

		assert!(matches!(result, Err(Error::Acquisition(AcquisitionError::InvalidToken))));
		assert_eq!(calls.load(Ordering::SeqCst), 2);
	}

	#[tokio::test]
	async fn non_retryable_errors_stop_immediately() {
		let calls = &AtomicU32::new(0);
		let result = policy(5)
			.execute(
				&CancellationToken::new(),
				move || async move {
					calls.fetch_add(1, Ordering::SeqCst);

					Err(Error::from(ConfigError::InsecureEndpoint { url: "http://x".into() }))
				},
				|_| false,
				|_, _| {},
			)
			.await;

		assert!(matches!(result, Err(Error::Config(_))));
		assert_eq!(calls.load(Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn failing_status_is_retried_then_returned() {
		let calls = &AtomicU32::new(0);
		let result = policy(2)
			.execute(
				&CancellationToken::new(),
				move || async move {
					calls.fetch_add(1, Ordering::SeqCst);

					Ok(401)
				},
				|status| status == 401,
				|_, _| {},
			)
			.await;

		assert_eq!(result.expect("Status outcomes are not errors."), 401);
		assert_eq!(calls.load(Ordering::SeqCst), 3);
	}

	#[tokio::test]
	async fn cancellation_interrupts_the_delay() {
		let cancel = CancellationToken::new();
		let policy = RetryPolicy { retries: 3, sleep: StdDuration::from_secs(300) };
		let calls = &AtomicU32::new(0);
		let result = policy
			.execute(
				&cancel,
				move || async move {
					calls.fetch_add(1, Ordering::SeqCst);

					Err(Error::from(AcquisitionError::InvalidToken))
				},
				|_| false,
				|_, _| cancel.cancel(),
			)
			.await;

		assert!(matches!(result, Err(Error::Cancelled)));
		assert_eq!(calls.load(Ordering::SeqCst), 1);
	}
}
