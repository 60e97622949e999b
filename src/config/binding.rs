//! Binds [`AuthOptions`] from flat key/value configuration sources.
//!
//! Keys take the form `<section>:<KEY>` or `<section>__<KEY>` (the latter is what environment
//! variables usually carry). Section and key names match case-insensitively, and the historical
//! key aliases (`OAUTHURL`/`AUTHURL`, `OAUTHKEY`/`AUTHKEY`, `GRANTTYPE`, ...) are all accepted.

// self
use crate::{
	_prelude::*,
	config::{AuthOptions, AuthOptionsBuilder},
	error::ConfigError,
};

/// Section name used when callers do not pick one.
pub const DEFAULT_SECTION: &str = "OAuth";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum OptionKey {
	User,
	Password,
	Url,
	CacheKey,
	Grant,
	Scope,
	Retries,
	Sleep,
	Lifetime,
}
impl OptionKey {
	fn parse(raw: &str) -> Option<Self> {
		let key = match raw.to_ascii_uppercase().as_str() {
			"USER" | "OAUTHUSER" => Self::User,
			"PASSWORD" | "OAUTHPASSWORD" => Self::Password,
			"URL" | "OAUTHURL" | "AUTHURL" => Self::Url,
			"KEY" | "OAUTHKEY" | "AUTHKEY" => Self::CacheKey,
			"GRANT" | "GRANTTYPE" => Self::Grant,
			"SCOPE" => Self::Scope,
			"RETRIES" => Self::Retries,
			"SLEEP" | "RETRYSLEEP" => Self::Sleep,
			"LIFETIME" | "TOKENLIFETIME" => Self::Lifetime,
			_ => return None,
		};

		Some(key)
	}
}

impl AuthOptions {
	/// Binds and validates options from the `section` of a key/value source.
	///
	/// Unknown keys inside the section are ignored. Numeric values that fail to parse are
	/// reported alongside every other validation failure.
	pub fn from_section<I, K, V>(source: I, section: &str) -> Result<Self, ConfigError>
	where
		I: IntoIterator<Item = (K, V)>,
		K: AsRef<str>,
		V: Into<String>,
	{
		let mut builder = AuthOptions::builder();
		let mut found = false;

		for (key, value) in source {
			let Some(name) = section_key(key.as_ref(), section) else {
				continue;
			};

			found = true;

			if let Some(option) = OptionKey::parse(name) {
				builder = apply(builder, option, value.into());
			}
		}

		if !found {
			return Err(ConfigError::MissingSection { section: section.to_owned() });
		}

		builder.build()
	}

	/// Binds options from process environment variables such as `OAUTH__USER`.
	pub fn from_env(section: &str) -> Result<Self, ConfigError> {
		Self::from_section(std::env::vars(), section)
	}
}

fn section_key<'a>(key: &'a str, section: &str) -> Option<&'a str> {
	let head = key.get(..section.len())?;

	if !head.eq_ignore_ascii_case(section) {
		return None;
	}

	let rest = &key[section.len()..];

	rest.strip_prefix(':').or_else(|| rest.strip_prefix("__")).filter(|name| !name.is_empty())
}

fn apply(builder: AuthOptionsBuilder, key: OptionKey, value: String) -> AuthOptionsBuilder {
	match key {
		OptionKey::User => builder.user(value),
		OptionKey::Password => builder.password(value),
		OptionKey::Url => builder.token_endpoint(value),
		OptionKey::CacheKey => builder.cache_key(value),
		OptionKey::Grant => builder.grant_type(value),
		OptionKey::Scope => builder.scope(value),
		OptionKey::Retries => match parse_number(&value) {
			Some(n) => builder.retries(n),
			None => with_error(builder, "RETRIES", &value),
		},
		OptionKey::Sleep => match parse_number(&value) {
			Some(n) => builder.retry_sleep_seconds(n),
			None => with_error(builder, "SLEEP", &value),
		},
		OptionKey::Lifetime => match parse_number(&value) {
			Some(n) => builder.lifetime_minutes(n),
			None => with_error(builder, "LIFETIME", &value),
		},
	}
}

fn parse_number(value: &str) -> Option<u32> {
	value.trim().parse().ok()
}

fn with_error(
	mut builder: AuthOptionsBuilder,
	field: &'static str,
	value: &str,
) -> AuthOptionsBuilder {
	builder.binding_error(field, format!("`{value}` is not a non-negative integer"));

	builder
}
