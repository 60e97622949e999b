//! Gate options, their validation contract, and configuration binding.
//!
//! [`AuthOptions`] is built once (through [`AuthOptionsBuilder`] or
//! [`AuthOptions::from_section`]), validated eagerly, and then shared read-only behind an
//! [`Arc`] by the token client and the gate. Validation reports every violated rule at once so
//! operators can fix a broken deployment in a single pass.

pub mod binding;
pub mod builder;

pub use binding::*;
pub use builder::*;

// self
use crate::{
	_prelude::*,
	error::{ConfigError, ValidationErrors},
};

/// Upper bound for [`AuthOptions::retries`].
pub const MAX_RETRIES: u32 = 10;
/// Upper bound for [`AuthOptions::retry_sleep_seconds`].
pub const MAX_RETRY_SLEEP_SECONDS: u32 = 300;
/// Lower bound for [`AuthOptions::lifetime_minutes`].
pub const MIN_LIFETIME_MINUTES: u32 = 1;
/// Upper bound for [`AuthOptions::lifetime_minutes`].
pub const MAX_LIFETIME_MINUTES: u32 = 1_440;

/// Client-credentials and caching settings consumed by the token client and the gate.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthOptions {
	/// Client identifier sent as the Basic-auth user.
	#[serde(alias = "USER", alias = "OAUTHUSER")]
	pub user: String,
	/// Client secret sent as the Basic-auth password.
	#[serde(alias = "PASSWORD", alias = "OAUTHPASSWORD")]
	pub password: String,
	/// Absolute HTTPS URL of the token endpoint.
	#[serde(alias = "URL", alias = "OAUTHURL", alias = "AUTHURL")]
	pub token_endpoint: String,
	/// Cache key under which the serialized token is stored.
	#[serde(alias = "KEY", alias = "OAUTHKEY", alias = "AUTHKEY")]
	pub cache_key: String,
	/// Value of the `grant_type` form field.
	#[serde(alias = "GRANT", alias = "GRANTTYPE")]
	pub grant_type: String,
	/// Value of the `scope` form field.
	#[serde(alias = "SCOPE")]
	pub scope: String,
	/// Additional acquisition attempts after the first one.
	#[serde(alias = "RETRIES")]
	pub retries: u32,
	/// Delay between acquisition attempts; zero disables the delay.
	#[serde(alias = "SLEEP", alias = "RETRYSLEEP")]
	pub retry_sleep_seconds: u32,
	/// Time-to-live of the cached token.
	#[serde(alias = "LIFETIME", alias = "TOKENLIFETIME")]
	pub lifetime_minutes: u32,
}
impl AuthOptions {
	/// Default number of retries.
	pub const DEFAULT_RETRIES: u32 = 2;
	/// Default retry delay in seconds.
	pub const DEFAULT_RETRY_SLEEP_SECONDS: u32 = 1;
	/// Default token lifetime in minutes.
	pub const DEFAULT_LIFETIME_MINUTES: u32 = 30;

	/// Starts a builder seeded with the defaults.
	pub fn builder() -> AuthOptionsBuilder {
		AuthOptionsBuilder::default()
	}

	/// Checks every rule and reports all violations together.
	pub fn validate(&self) -> Result<(), ConfigError> {
		let mut errors = ValidationErrors::default();

		self.collect_violations(&mut errors);

		if errors.is_empty() { Ok(()) } else { Err(errors.into()) }
	}

	/// Returns the parsed token endpoint, rejecting anything but an absolute HTTPS URL.
	pub fn token_endpoint_url(&self) -> Result<Url, ConfigError> {
		parse_https_endpoint(&self.token_endpoint)
	}

	/// Retry delay as a [`Duration`].
	pub fn retry_sleep(&self) -> Duration {
		Duration::seconds(i64::from(self.retry_sleep_seconds))
	}

	/// Cached-token lifetime as a [`Duration`].
	pub fn lifetime(&self) -> Duration {
		Duration::minutes(i64::from(self.lifetime_minutes))
	}

	pub(crate) fn collect_violations(&self, errors: &mut ValidationErrors) {
		for (field, value) in [
			("USER", &self.user),
			("PASSWORD", &self.password),
			("OAUTHURL", &self.token_endpoint),
			("OAUTHKEY", &self.cache_key),
			("GRANT", &self.grant_type),
			("SCOPE", &self.scope),
		] {
			if value.trim().is_empty() {
				errors.push(field, "must be provided");
			}
		}

		if !self.token_endpoint.trim().is_empty() && self.token_endpoint_url().is_err() {
			errors.push("OAUTHURL", "must be an absolute HTTPS URL");
		}
		if self.retries > MAX_RETRIES {
			errors.push("RETRIES", format!("must be between 0 and {MAX_RETRIES}"));
		}
		if self.retry_sleep_seconds > MAX_RETRY_SLEEP_SECONDS {
			errors.push("SLEEP", format!("must be between 0 and {MAX_RETRY_SLEEP_SECONDS}"));
		}
		if !(MIN_LIFETIME_MINUTES..=MAX_LIFETIME_MINUTES).contains(&self.lifetime_minutes) {
			errors.push(
				"LIFETIME",
				format!("must be between {MIN_LIFETIME_MINUTES} and {MAX_LIFETIME_MINUTES}"),
			);
		}
	}
}
impl Default for AuthOptions {
	fn default() -> Self {
		Self {
			user: String::new(),
			password: String::new(),
			token_endpoint: String::new(),
			cache_key: String::new(),
			grant_type: String::new(),
			scope: String::new(),
			retries: Self::DEFAULT_RETRIES,
			retry_sleep_seconds: Self::DEFAULT_RETRY_SLEEP_SECONDS,
			lifetime_minutes: Self::DEFAULT_LIFETIME_MINUTES,
		}
	}
}
impl Debug for AuthOptions {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthOptions")
			.field("user", &self.user)
			.field("password", &"<redacted>")
			.field("token_endpoint", &self.token_endpoint)
			.field("cache_key", &self.cache_key)
			.field("grant_type", &self.grant_type)
			.field("scope", &self.scope)
			.field("retries", &self.retries)
			.field("retry_sleep_seconds", &self.retry_sleep_seconds)
			.field("lifetime_minutes", &self.lifetime_minutes)
			.finish()
	}
}

/// Parses `raw` and rejects anything but an absolute HTTPS URL.
pub fn parse_https_endpoint(raw: &str) -> Result<Url, ConfigError> {
	let url = Url::parse(raw.trim())
		.map_err(|source| ConfigError::InvalidEndpoint { url: raw.to_owned(), source })?;

	if url.scheme() != "https" || url.cannot_be_a_base() || url.host_str().is_none() {
		return Err(ConfigError::InsecureEndpoint { url: raw.to_owned() });
	}

	Ok(url)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn valid() -> AuthOptions {
		AuthOptions {
			user: "svc-user".into(),
			password: "svc-password".into(),
			token_endpoint: "https://idp.example.com/oauth2/v1/token".into(),
			cache_key: "gate-token".into(),
			grant_type: "client_credentials".into(),
			scope: "api.read".into(),
			..Default::default()
		}
	}

	#[test]
	fn valid_options_pass() {
		valid().validate().expect("Fixture options should validate.");
	}

	#[test]
	fn defaults_match_documented_values() {
		let options = AuthOptions::default();

		assert_eq!(options.retries, 2);
		assert_eq!(options.retry_sleep_seconds, 1);
		assert_eq!(options.lifetime_minutes, 30);
	}

	#[test]
	fn every_violation_is_reported() {
		let options = AuthOptions {
			user: " ".into(),
			token_endpoint: "http://idp.example.com/token".into(),
			retries: 11,
			retry_sleep_seconds: 301,
			lifetime_minutes: 0,
			..valid()
		};
		let err = options.validate().expect_err("Broken options should fail validation.");
		let ConfigError::Validation(errors) = err else {
			panic!("Expected a validation error, got {err:?}.");
		};

		for field in ["USER", "OAUTHURL", "RETRIES", "SLEEP", "LIFETIME"] {
			assert!(errors.contains(field), "Missing violation for {field}.");
		}
		assert_eq!(errors.0.len(), 5);
	}

	#[test]
	fn boundaries_are_inclusive() {
		let options = AuthOptions {
			retries: MAX_RETRIES,
			retry_sleep_seconds: MAX_RETRY_SLEEP_SECONDS,
			lifetime_minutes: MAX_LIFETIME_MINUTES,
			..valid()
		};

		options.validate().expect("Upper bounds should be accepted.");

		let options =
			AuthOptions { retries: 0, retry_sleep_seconds: 0, lifetime_minutes: 1, ..valid() };

		options.validate().expect("Lower bounds should be accepted.");
	}

	#[test]
	fn endpoint_parser_rejects_relative_and_plaintext_urls() {
		assert!(matches!(
			parse_https_endpoint("/oauth2/token"),
			Err(ConfigError::InvalidEndpoint { .. })
		));
		assert!(matches!(
			parse_https_endpoint("http://idp.example.com/token"),
			Err(ConfigError::InsecureEndpoint { .. })
		));
		assert!(parse_https_endpoint("https://idp.example.com/token").is_ok());
	}

	#[test]
	fn debug_redacts_password() {
		let rendered = format!("{:?}", valid());

		assert!(rendered.contains("<redacted>"));
		assert!(!rendered.contains("svc-password"));
	}

	#[test]
	fn options_deserialize_from_legacy_keys() {
		let options: AuthOptions = serde_json::from_str(
			r#"{"USER":"u","PASSWORD":"p","OAUTHURL":"https://idp.example.com/token","AUTHKEY":"k","GRANT":"client_credentials","SCOPE":"s","RETRIES":3,"SLEEP":0,"LIFETIME":15}"#,
		)
		.expect("Legacy option keys should deserialize.");

		assert_eq!(options.cache_key, "k");
		assert_eq!(options.retries, 3);
		assert_eq!(options.lifetime_minutes, 15);
		options.validate().expect("Deserialized options should validate.");
	}
}
