//! Gate-level error types shared across the token client, cache gate, and middleware.

// self
use crate::_prelude::*;

/// Gate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem; never retried.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, timeout) while calling the token endpoint.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Token acquisition produced no usable token.
	#[error(transparent)]
	Acquisition(#[from] AcquisitionError),
	/// Cache gate or backing store failure.
	#[error("{0}")]
	Cache(
		#[from]
		#[source]
		crate::cache::CacheError,
	),
	/// The caller cancelled the operation.
	#[error("Operation was cancelled by the caller.")]
	Cancelled,
}
impl Error {
	/// Returns true when the acquisition loop may retry after this error.
	pub fn is_retryable(&self) -> bool {
		matches!(self, Self::Transport(_) | Self::Acquisition(_))
	}
}

/// Configuration and validation failures raised before any token traffic.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Options violated one or more validation rules.
	#[error(transparent)]
	Validation(#[from] ValidationErrors),
	/// Token endpoint is not an absolute HTTPS URL.
	#[error("Token endpoint must be an absolute HTTPS URL: {url}.")]
	InsecureEndpoint {
		/// Endpoint that failed validation.
		url: String,
	},
	/// Token endpoint could not be parsed.
	#[error("Token endpoint is not a valid absolute URL: {url}.")]
	InvalidEndpoint {
		/// Endpoint that failed to parse.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Configuration source does not contain the requested section.
	#[error(
		"Configuration section `{section}` not found; load configuration providers before building the gate."
	)]
	MissingSection {
		/// Section name that was requested.
		section: String,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}

/// Single violated option rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationError {
	/// Configuration key of the offending field.
	pub field: &'static str,
	/// Human-readable description of the rule.
	pub message: String,
}
impl Display for ValidationError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{}: {}", self.field, self.message)
	}
}

/// Every rule violated by a set of options, in field order.
#[derive(Clone, Debug, Default, PartialEq, Eq, ThisError)]
#[error("Options failed validation: {}.", self.summary())]
pub struct ValidationErrors(pub Vec<ValidationError>);
impl ValidationErrors {
	/// Records a violation for `field`.
	pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
		self.0.push(ValidationError { field, message: message.into() });
	}

	/// Returns true when no rule was violated.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Iterates over the recorded violations.
	pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
		self.0.iter()
	}

	/// Returns true when `field` has at least one violation.
	pub fn contains(&self, field: &str) -> bool {
		self.0.iter().any(|e| e.field == field)
	}

	fn summary(&self) -> String {
		self.0.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the token endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the token endpoint.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Acquisition attempts that completed without a usable token.
#[derive(Debug, ThisError)]
pub enum AcquisitionError {
	/// The token endpoint returned no token or a token with an empty access token.
	#[error("Failed to acquire a token from the token endpoint.")]
	InvalidToken,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn validation_errors_list_every_violation() {
		let mut errors = ValidationErrors::default();

		errors.push("USER", "must be provided");
		errors.push("RETRIES", "must be between 0 and 10");

		let rendered = Error::from(ConfigError::from(errors)).to_string();

		assert!(rendered.contains("USER: must be provided"));
		assert!(rendered.contains("RETRIES: must be between 0 and 10"));
	}

	#[test]
	fn only_transport_and_acquisition_failures_are_retryable() {
		assert!(Error::from(AcquisitionError::InvalidToken).is_retryable());
		assert!(
			Error::from(TransportError::Io(std::io::Error::other("connection reset")))
				.is_retryable()
		);
		assert!(!Error::Cancelled.is_retryable());
		assert!(
			!Error::from(ConfigError::InsecureEndpoint { url: "http://example.com".into() })
				.is_retryable()
		);
	}
}
