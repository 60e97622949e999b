//! Client-credentials token acquisition.
//!
//! [`TokenSource`] is the capability the gate depends on; [`TokenClient`] is the HTTPS
//! implementation that posts `grant_type` and `scope` with Basic client authentication. The
//! client neither caches nor retries; both belong to [`AuthGate`](crate::gate::AuthGate).

// crates.io
use base64::{Engine, engine::general_purpose::STANDARD};
use tokio_util::sync::CancellationToken;
#[cfg(feature = "reqwest")] use reqwest::header::HeaderValue;
// self
use crate::{_prelude::*, token::Token};
#[cfg(feature = "reqwest")]
use crate::{
	config::{AuthOptions, parse_https_endpoint},
	error::ConfigError,
	http::ReqwestHttpClient,
	obs,
};

/// Boxed future returned by [`TokenSource::get_token`].
pub type TokenFuture<'a> = Pin<Box<dyn Future<Output = Result<Option<Token>>> + 'a + Send>>;

/// Anything able to produce a fresh token on demand.
pub trait TokenSource
where
	Self: Send + Sync,
{
	/// Requests a token.
	///
	/// `Ok(None)` means the source answered without a usable payload. Faults (network,
	/// cancellation) are returned as errors and never swallowed.
	fn get_token<'a>(&'a self, cancel: &'a CancellationToken) -> TokenFuture<'a>;
}

/// Encodes `user:password` for the `Basic` authorization scheme.
pub fn basic_credential(user: &str, password: &str) -> String {
	STANDARD.encode(format!("{user}:{password}"))
}

/// HTTPS token client for the client-credentials grant.
#[cfg(feature = "reqwest")]
#[derive(Clone)]
pub struct TokenClient {
	options: Arc<AuthOptions>,
	endpoint: Url,
	authorization: HeaderValue,
	http_client: ReqwestHttpClient,
}
#[cfg(feature = "reqwest")]
impl TokenClient {
	/// Creates a client with the crate's default reqwest transport.
	pub fn new(options: Arc<AuthOptions>) -> Result<Self> {
		Self::with_http_client(options, ReqwestHttpClient::new()?)
	}

	/// Creates a client over a caller-provided transport.
	///
	/// The endpoint is checked here, independently of options validation, so a client can never
	/// send credentials to anything but an absolute HTTPS URL.
	pub fn with_http_client(
		options: Arc<AuthOptions>,
		http_client: ReqwestHttpClient,
	) -> Result<Self> {
		let endpoint = parse_https_endpoint(&options.token_endpoint)?;
		let mut authorization = HeaderValue::from_str(&format!(
			"Basic {}",
			basic_credential(&options.user, &options.password)
		))
		.map_err(ConfigError::http_client_build)?;

		authorization.set_sensitive(true);

		Ok(Self { options, endpoint, authorization, http_client })
	}

	/// Token endpoint this client posts to.
	pub fn endpoint(&self) -> &Url {
		&self.endpoint
	}

	async fn request_token(&self, cancel: &CancellationToken) -> Result<Option<Token>> {
		let form = [
			("grant_type", self.options.grant_type.as_str()),
			("scope", self.options.scope.as_str()),
		];
		let call =
			self.http_client.post_form(self.endpoint.clone(), self.authorization.clone(), &form);
		let response = tokio::select! {
			biased;
			_ = cancel.cancelled() => return Err(Error::Cancelled),
			response = call => response,
		};

		match response {
			Ok(response) => {
				obs::log_token_response(
					response.metadata.status,
					response.metadata.reason.unwrap_or_default(),
				);

				Ok(Token::from_json(&response.body))
			},
			Err(e) => {
				obs::log_token_fault(&e);

				Err(e.into())
			},
		}
	}
}
#[cfg(feature = "reqwest")]
impl TokenSource for TokenClient {
	fn get_token<'a>(&'a self, cancel: &'a CancellationToken) -> TokenFuture<'a> {
		Box::pin(self.request_token(cancel))
	}
}
#[cfg(feature = "reqwest")]
impl Debug for TokenClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenClient")
			.field("endpoint", &self.endpoint.as_str())
			.field("user", &self.options.user)
			.finish()
	}
}
