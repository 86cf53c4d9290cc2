//! Assembles token requests from call sites, credentials, and configuration.

// self
use crate::{
	_prelude::*,
	auth::{
		AUDIENCE, CallSite, ClaimSet, Credentials, EXPIRATION_TIME, Header, ISSUED_AT, ISSUER,
		SCOPE, ScopeResolver, ScopeTable, TokenRequest,
	},
	clock::{Clock, SystemClock},
	config::AssertionConfig,
};

/// Builds deterministic [`TokenRequest`] values.
///
/// The builder reads the clock once per request; `iat` is that reading and `exp` is
/// `iat + token_duration_seconds`. Claims are emitted as `iss`, `scope`, `aud`, `exp`, `iat`,
/// followed by the configured additional claims, which replace built-ins on collision. Given the
/// same inputs and clock reading the output is identical, ordering included.
#[derive(Clone)]
pub struct AssertionBuilder {
	config: AssertionConfig,
	resolver: ScopeResolver,
	clock: Arc<dyn Clock>,
}
impl AssertionBuilder {
	/// Creates a builder over `config` and the declared `scopes`, reading the system clock.
	pub fn new(config: AssertionConfig, scopes: impl Into<Arc<ScopeTable>>) -> Self {
		let resolver = ScopeResolver::new(scopes, config.global_default_scope.clone());

		Self { config, resolver, clock: Arc::new(SystemClock) }
	}

	/// Replaces the clock, typically with a fixed one in tests.
	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = clock;

		self
	}

	/// Configuration the builder was created with.
	pub fn config(&self) -> &AssertionConfig {
		&self.config
	}

	/// Scope resolver backing the `scope` claim.
	pub fn resolver(&self) -> &ScopeResolver {
		&self.resolver
	}

	/// Builds the unsigned token request for `call_site` on behalf of `credentials`.
	///
	/// Fails with [`ConfigError::MissingScopeConfiguration`](crate::error::ConfigError) when no
	/// scope can be resolved; nothing else is validated here.
	pub fn build(&self, call_site: &CallSite, credentials: &Credentials) -> Result<TokenRequest> {
		let now = self.clock.now_seconds();
		let header = Header::jwt(self.config.signature_algorithm.as_str());
		let scope = self.resolver.resolve(call_site)?;
		let expires_at = now.saturating_add(i64::from(self.config.token_duration_seconds));
		let claims = ClaimSet::from_pairs([
			(ISSUER, Value::from(credentials.identity.as_ref())),
			(SCOPE, Value::from(scope)),
			(AUDIENCE, Value::from(self.config.audience.as_str())),
			(EXPIRATION_TIME, Value::from(expires_at)),
			(ISSUED_AT, Value::from(now)),
		])
		.overlay(
			self.config.additional_claims.iter().map(|(name, value)| (name.as_str(), value.clone())),
		);

		Ok(TokenRequest::new(header, claims))
	}
}
impl Debug for AssertionBuilder {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AssertionBuilder")
			.field("config", &self.config)
			.field("resolver", &self.resolver)
			.finish_non_exhaustive()
	}
}
