//! Builder that collects every option violation before producing validated [`AuthOptions`].

// self
use crate::{
	_prelude::*,
	config::AuthOptions,
	error::{ConfigError, ValidationErrors},
};

/// Builder for validated [`AuthOptions`] values.
#[derive(Debug, Default)]
pub struct AuthOptionsBuilder {
	options: AuthOptions,
	binding_errors: ValidationErrors,
}
impl AuthOptionsBuilder {
	/// Sets the Basic-auth user.
	pub fn user(mut self, user: impl Into<String>) -> Self {
		self.options.user = user.into();

		self
	}

	/// Sets the Basic-auth password.
	pub fn password(mut self, password: impl Into<String>) -> Self {
		self.options.password = password.into();

		self
	}

	/// Sets the token endpoint.
	pub fn token_endpoint(mut self, url: impl Into<String>) -> Self {
		self.options.token_endpoint = url.into();

		self
	}

	/// Sets the cache key.
	pub fn cache_key(mut self, key: impl Into<String>) -> Self {
		self.options.cache_key = key.into();

		self
	}

	/// Sets the `grant_type` form value.
	pub fn grant_type(mut self, grant: impl Into<String>) -> Self {
		self.options.grant_type = grant.into();

		self
	}

	/// Sets the `scope` form value.
	pub fn scope(mut self, scope: impl Into<String>) -> Self {
		self.options.scope = scope.into();

		self
	}

	/// Overrides the retry count.
	pub fn retries(mut self, retries: u32) -> Self {
		self.options.retries = retries;

		self
	}

	/// Overrides the delay between attempts.
	pub fn retry_sleep_seconds(mut self, seconds: u32) -> Self {
		self.options.retry_sleep_seconds = seconds;

		self
	}

	/// Overrides the cached-token lifetime.
	pub fn lifetime_minutes(mut self, minutes: u32) -> Self {
		self.options.lifetime_minutes = minutes;

		self
	}

	/// Consumes the builder and validates the resulting options.
	pub fn build(self) -> Result<AuthOptions, ConfigError> {
		let Self { options, mut binding_errors } = self;

		options.collect_violations(&mut binding_errors);

		if binding_errors.is_empty() { Ok(options) } else { Err(binding_errors.into()) }
	}

	/// Like [`build`](Self::build) but wraps the result in an [`Arc`] for sharing.
	pub fn build_shared(self) -> Result<Arc<AuthOptions>, ConfigError> {
		self.build().map(Arc::new)
	}

	pub(crate) fn binding_error(&mut self, field: &'static str, message: impl Into<String>) {
		self.binding_errors.push(field, message);
	}
}
