//! End-to-end assertion flow: resolve scopes, build claims, sign.

// self
use crate::{
	_prelude::*,
	auth::{AssertionBuilder, CallSite, CredentialsSupplier, TokenRequest, TokenSecret, TokenSigner},
	obs::{FlowKind, FlowOutcome, FlowRecorder, FlowSpan},
};

/// Token request paired with the signed token produced from it.
#[derive(Clone, Debug)]
pub struct SignedAssertion {
	/// Unsigned request the token was produced from.
	pub request: TokenRequest,
	/// Signed token; redacted in logs.
	pub token: TokenSecret,
}

/// Issues signed assertions for call sites.
///
/// Credentials are fetched from the supplier on every call so rotated keys take effect without
/// rebuilding the authenticator.
pub struct Authenticator<S>
where
	S: ?Sized + TokenSigner,
{
	builder: AssertionBuilder,
	credentials: Arc<dyn CredentialsSupplier>,
	signer: Arc<S>,
}
impl<S> Authenticator<S>
where
	S: ?Sized + TokenSigner,
{
	/// Creates an authenticator from its three collaborators.
	pub fn new(
		builder: AssertionBuilder,
		credentials: Arc<dyn CredentialsSupplier>,
		signer: impl Into<Arc<S>>,
	) -> Self {
		Self { builder, credentials, signer: signer.into() }
	}

	/// Assertion builder backing this authenticator.
	pub fn builder(&self) -> &AssertionBuilder {
		&self.builder
	}

	/// Builds and signs an assertion for `call_site`.
	pub fn authenticate(&self, call_site: &CallSite) -> Result<SignedAssertion> {
		let span = FlowSpan::new(FlowKind::Assertion, "authenticate").with_subject(call_site);
		let _guard = span.enter();
		let recorder = FlowRecorder::start(span.kind());
		let result = self.sign_for(call_site);

		match &result {
			Ok(_) => recorder.finish(FlowOutcome::Success),
			Err(_e) => {
				#[cfg(feature = "tracing")]
				tracing::warn!(error = %_e, "Assertion flow failed.");

				recorder.finish(FlowOutcome::Failure);
			},
		}

		result
	}

	fn sign_for(&self, call_site: &CallSite) -> Result<SignedAssertion> {
		let credentials = self.credentials.credentials()?;
		let request = self.builder.build(call_site, &credentials)?;
		let token = self.signer.sign(&request, &credentials.key)?;

		#[cfg(feature = "tracing")]
		tracing::debug!(iat = ?request.issued_at(), "Assertion signed.");

		Ok(SignedAssertion { request, token })
	}
}
impl<S> Clone for Authenticator<S>
where
	S: ?Sized + TokenSigner,
{
	fn clone(&self) -> Self {
		Self {
			builder: self.builder.clone(),
			credentials: Arc::clone(&self.credentials),
			signer: Arc::clone(&self.signer),
		}
	}
}
impl<S> Debug for Authenticator<S>
where
	S: ?Sized + TokenSigner,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Authenticator").field("builder", &self.builder).finish_non_exhaustive()
	}
}
