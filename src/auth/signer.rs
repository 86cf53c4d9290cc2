//! Signing contract that turns token requests into bearer tokens.
//!
//! Cryptography lives outside this crate: callers plug in a [`TokenSigner`] backed by the
//! primitive their credentials require (RSA, ECDSA, HMAC, a KMS call, ...). The crate ships
//! [`UnsecuredSigner`] for the `none` algorithm, which is useful against emulators and tests.

// self
use crate::{
	_prelude::*,
	auth::{KeyMaterial, TokenRequest, TokenSecret},
};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failures raised while signing a token request.
#[derive(Debug, ThisError)]
pub enum SignError {
	/// Signer does not implement the requested algorithm.
	#[error("Signature algorithm `{algorithm}` is not supported by this signer.")]
	UnsupportedAlgorithm {
		/// Requested algorithm identifier.
		algorithm: String,
	},
	/// Header or claims could not be encoded.
	#[error("Token request could not be encoded.")]
	Encode(#[from] serde_json::Error),
	/// Signing backend failed.
	#[error("Signing backend failed.")]
	Backend {
		/// Backend-specific failure.
		#[source]
		source: BoxError,
	},
}
impl SignError {
	/// Wraps a backend failure inside [`SignError`].
	pub fn backend(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Backend { source: Box::new(src) }
	}
}

/// Produces an opaque signed token from a request and key material.
pub trait TokenSigner
where
	Self: Send + Sync,
{
	/// Signs `request` with `key`.
	fn sign(&self, request: &TokenRequest, key: &KeyMaterial) -> Result<TokenSecret, SignError>;
}

/// Signer for the `none` algorithm: emits the signing input followed by an empty signature.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnsecuredSigner;
impl UnsecuredSigner {
	/// Algorithm identifier accepted by this signer.
	pub const ALGORITHM: &'static str = "none";
}
impl TokenSigner for UnsecuredSigner {
	fn sign(&self, request: &TokenRequest, _key: &KeyMaterial) -> Result<TokenSecret, SignError> {
		if request.header.algorithm != Self::ALGORITHM {
			return Err(SignError::UnsupportedAlgorithm {
				algorithm: request.header.algorithm.clone(),
			});
		}

		Ok(TokenSecret::new(format!("{}.", request.signing_input()?)))
	}
}
