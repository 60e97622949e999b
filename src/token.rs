//! Token model returned by the token endpoint and stored in the cache.

pub mod secret;

pub use secret::*;

// crates.io
use serde::Deserializer;
use serde_json::Value;
// self
use crate::{_prelude::*, obs};

/// Bearer token issued by a client-credentials exchange.
///
/// Serialization always uses the snake_case wire names. Deserialization also accepts the
/// PascalCase names (`AccessToken`, `TokenType`, ...) written by older cache producers, and
/// tolerates numeric `expires_in` values as well as missing or `null` fields.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Token {
	/// Opaque bearer credential.
	#[serde(alias = "AccessToken", deserialize_with = "lenient_secret")]
	pub access_token: AccessToken,
	/// Token type reported by the endpoint, usually `Bearer`.
	#[serde(alias = "TokenType", deserialize_with = "lenient_string")]
	pub token_type: String,
	/// Lifetime hint reported by the endpoint, kept verbatim.
	#[serde(alias = "ExpiresIn", deserialize_with = "lenient_string")]
	pub expires_in: String,
	/// Scope granted by the endpoint.
	#[serde(alias = "Scope", deserialize_with = "lenient_string")]
	pub scope: String,
}
impl Token {
	/// Creates a token with the provided access token and empty metadata.
	pub fn new(access_token: impl Into<String>) -> Self {
		Self { access_token: AccessToken::new(access_token), ..Default::default() }
	}

	/// Sets the token type.
	pub fn with_token_type(mut self, token_type: impl Into<String>) -> Self {
		self.token_type = token_type.into();

		self
	}

	/// Sets the lifetime hint.
	pub fn with_expires_in(mut self, expires_in: impl Into<String>) -> Self {
		self.expires_in = expires_in.into();

		self
	}

	/// Sets the granted scope.
	pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
		self.scope = scope.into();

		self
	}

	/// A token is usable only when its access token carries non-whitespace content.
	pub fn is_valid(&self) -> bool {
		!self.access_token.is_blank()
	}

	/// Renders the `Authorization` header value for downstream calls.
	pub fn bearer_header(&self) -> String {
		format!("Bearer {}", self.access_token.expose())
	}

	/// Parses a token endpoint body.
	///
	/// Empty, whitespace-only, `null`, or malformed bodies yield `None`; they mean "no token
	/// available" rather than an error.
	pub fn from_json(body: &str) -> Option<Self> {
		if body.trim().is_empty() {
			return None;
		}

		let mut de = serde_json::Deserializer::from_str(body);
		let token = match serde_path_to_error::deserialize::<_, Option<Self>>(&mut de) {
			Ok(token) => token,
			Err(e) => {
				obs::log_unparsable_body(&e.path().to_string(), e.inner());

				return None;
			},
		};

		// Trailing content makes the whole body malformed.
		if let Err(e) = de.end() {
			obs::log_unparsable_body("", &e);

			return None;
		}

		token
	}

	/// Serializes the token into its cached JSON form.
	pub fn to_json(&self) -> Result<String, serde_json::Error> {
		serde_json::to_string(self)
	}
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
	D: Deserializer<'de>,
{
	match Option::<Value>::deserialize(deserializer)? {
		None | Some(Value::Null) => Ok(String::new()),
		Some(Value::String(s)) => Ok(s),
		Some(Value::Number(n)) => Ok(n.to_string()),
		Some(Value::Bool(b)) => Ok(b.to_string()),
		Some(other) => Err(serde::de::Error::custom(format!(
			"expected a string or number, found {}",
			kind_of(&other)
		))),
	}
}

fn lenient_secret<'de, D>(deserializer: D) -> Result<AccessToken, D::Error>
where
	D: Deserializer<'de>,
{
	lenient_string(deserializer).map(AccessToken::new)
}

fn kind_of(value: &Value) -> &'static str {
	match value {
		Value::Array(_) => "an array",
		Value::Object(_) => "an object",
		_ => "a scalar",
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn parses_snake_case_endpoint_payload() {
		let token = Token::from_json(
			r#"{"access_token":"abc123","token_type":"Bearer","expires_in":1800,"scope":"openid profile"}"#,
		)
		.expect("Endpoint payload should parse.");

		assert_eq!(token.access_token.expose(), "abc123");
		assert_eq!(token.token_type, "Bearer");
		assert_eq!(token.expires_in, "1800");
		assert_eq!(token.scope, "openid profile");
		assert!(token.is_valid());
	}

	#[test]
	fn parses_legacy_pascal_case_payload() {
		let token = Token::from_json(
			r#"{"AccessToken":"legacy","TokenType":"Bearer","ExpiresIn":"3600","Scope":"api"}"#,
		)
		.expect("Legacy payload should parse.");

		assert_eq!(token.access_token.expose(), "legacy");
		assert_eq!(token.expires_in, "3600");
	}

	#[test]
	fn blank_and_malformed_bodies_yield_none() {
		for body in [
			"",
			"   \n\t",
			"null",
			"not-json",
			"{\"access_token\":",
			"42",
			"{\"access_token\":\"abc\"} trailing-garbage",
			"{\"access_token\":\"abc\"}{\"access_token\":\"def\"}",
		] {
			assert!(Token::from_json(body).is_none(), "Body {body:?} should yield no token.");
		}
	}

	#[test]
	fn trailing_whitespace_is_not_malformed() {
		let token = Token::from_json("{\"access_token\":\"abc\"}\r\n")
			.expect("Whitespace after the payload should be accepted.");

		assert_eq!(token.access_token.expose(), "abc");
	}

	#[test]
	fn missing_or_null_access_token_is_invalid() {
		let token = Token::from_json(r#"{"token_type":"Bearer"}"#)
			.expect("Partial payload should still parse.");

		assert!(!token.is_valid());

		let token = Token::from_json(r#"{"access_token":null}"#)
			.expect("Null access token should still parse.");

		assert!(!token.is_valid());
	}

	#[test]
	fn serializes_with_snake_case_names() {
		let json = Token::new("mocked_token")
			.with_token_type("Bearer")
			.with_expires_in("1800")
			.with_scope("api")
			.to_json()
			.expect("Token should serialize.");

		assert!(json.contains("\"access_token\":\"mocked_token\""));
		assert!(json.contains("\"expires_in\":\"1800\""));
	}

	#[test]
	fn bearer_header_uses_raw_token() {
		assert_eq!(Token::new("abc").bearer_header(), "Bearer abc");
	}
}
