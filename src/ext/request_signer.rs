//! Request signing contracts that attach signed tokens to arbitrary HTTP clients.

// self
use crate::auth::TokenSecret;
#[cfg(feature = "reqwest")] use crate::_prelude::*;

/// Describes how to attach a [`TokenSecret`] to an outbound request without constraining the
/// HTTP client type.
pub trait RequestSignerExt<Request, Error>
where
	Self: Send + Sync,
{
	/// Consumes the provided request and injects authorization state derived from `token`.
	fn attach_token(&self, request: Request, token: &TokenSecret) -> Result<Request, Error>;
}

/// Attaches tokens as `Authorization: Bearer <token>`.
#[derive(Clone, Copy, Debug, Default)]
pub struct BearerSigner;
#[cfg(feature = "reqwest")]
impl RequestSignerExt<reqwest::RequestBuilder, Error> for BearerSigner {
	fn attach_token(
		&self,
		request: reqwest::RequestBuilder,
		token: &TokenSecret,
	) -> Result<reqwest::RequestBuilder> {
		Ok(request.bearer_auth(token.expose()))
	}
}
