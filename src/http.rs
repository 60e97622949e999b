//! Transport primitives for token exchanges.
//!
//! [`ReqwestHttpClient`] is the only place the crate touches an HTTP stack. It posts a
//! form-encoded body and hands back the raw response text together with a small
//! [`ResponseMetadata`] record, leaving status interpretation to the caller.

// std
use std::{ops::Deref, time::Duration as StdDuration};
// crates.io
use reqwest::{
	header::{ACCEPT, AUTHORIZATION, HeaderValue},
	redirect::Policy,
};
// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError},
};

/// Status line captured from the most recent token endpoint response.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseMetadata {
	/// HTTP status code.
	pub status: u16,
	/// Canonical reason phrase for the status, when one exists.
	pub reason: Option<&'static str>,
}

/// Raw token endpoint response: status line plus the body read as text.
#[derive(Clone, Debug)]
pub struct FormResponse {
	/// Status line metadata.
	pub metadata: ResponseMetadata,
	/// Response body, read regardless of status.
	pub body: String,
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Token endpoints answer directly, so the client built by [`ReqwestHttpClient::new`] does not
/// follow redirects. Apply the same policy to any client passed to
/// [`ReqwestHttpClient::with_client`]. Compressed (`gzip`, `deflate`) responses are decoded before
/// the body is read.
#[derive(Clone, Debug)]
pub struct ReqwestHttpClient(pub ReqwestClient);
impl ReqwestHttpClient {
	/// Default request timeout.
	pub const DEFAULT_TIMEOUT: StdDuration = StdDuration::from_secs(30);

	/// Builds a client with redirects disabled, gzip/deflate response decoding, and the default
	/// timeout.
	pub fn new() -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder()
			.redirect(Policy::none())
			.gzip(true)
			.deflate(true)
			.timeout(Self::DEFAULT_TIMEOUT)
			.build()
			.map_err(ConfigError::http_client_build)?;

		Ok(Self(client))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Posts `form` to `url` with the provided `Authorization` value and `Accept: application/json`.
	pub async fn post_form(
		&self,
		url: Url,
		authorization: HeaderValue,
		form: &[(&str, &str)],
	) -> Result<FormResponse, TransportError> {
		let response = self
			.0
			.post(url)
			.header(AUTHORIZATION, authorization)
			.header(ACCEPT, HeaderValue::from_static("application/json"))
			.form(form)
			.send()
			.await?;
		let status = response.status();
		let metadata =
			ResponseMetadata { status: status.as_u16(), reason: status.canonical_reason() };
		let body = response.text().await?;

		Ok(FormResponse { metadata, body })
	}
}
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
