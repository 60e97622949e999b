//! Request signing contracts that attach cached tokens to downstream requests.

// self
use crate::token::Token;

/// Describes how to attach a [`Token`] to an outbound request without constraining the HTTP
/// client type.
pub trait RequestSigner<Request, Error>
where
	Self: Send + Sync,
{
	/// Consumes the provided request and injects authorization derived from `token`.
	fn attach_token(&self, request: Request, token: &Token) -> Result<Request, Error>;
}

/// Signs reqwest requests with `Authorization: Bearer <token>`.
#[cfg(feature = "reqwest")]
#[derive(Clone, Copy, Debug, Default)]
pub struct BearerSigner;
#[cfg(feature = "reqwest")]
impl RequestSigner<reqwest::RequestBuilder, crate::error::Error> for BearerSigner {
	fn attach_token(
		&self,
		request: reqwest::RequestBuilder,
		token: &Token,
	) -> Result<reqwest::RequestBuilder, crate::error::Error> {
		if !token.is_valid() {
			return Err(crate::error::AcquisitionError::InvalidToken.into());
		}

		Ok(request.bearer_auth(token.access_token.expose()))
	}
}

#[cfg(all(test, feature = "reqwest"))]
mod tests {
	// self
	use super::*;

	#[test]
	fn bearer_signer_sets_authorization_header() {
		let client = reqwest::Client::new();
		let request = BearerSigner
			.attach_token(client.get("https://api.example.com/orders"), &Token::new("abc"))
			.expect("Valid tokens should sign requests.")
			.build()
			.expect("Signed request should build.");
		let header = request
			.headers()
			.get(reqwest::header::AUTHORIZATION)
			.expect("Authorization header should be present.");

		assert_eq!(header.to_str().expect("Header should be ASCII."), "Bearer abc");
	}

	#[test]
	fn bearer_signer_rejects_blank_tokens() {
		let client = reqwest::Client::new();

		assert!(BearerSigner.attach_token(client.get("https://api.example.com"), &Token::new(" ")).is_err());
	}
}
