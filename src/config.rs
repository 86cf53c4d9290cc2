//! Assertion configuration consumed by the builder.
//!
//! [`AssertionConfig`] carries the audience, signature algorithm, token lifetime, global default
//! scope, and caller-supplied claims. Values are validated once, either through
//! [`AssertionConfigBuilder::build`] or when deserializing, so the builder never re-checks them.

/// Builder API for assembling assertion configuration.
pub mod builder;

pub use builder::*;

// self
use crate::_prelude::*;

/// Signature algorithm used when none is configured.
pub const DEFAULT_SIGNATURE_ALGORITHM: &str = "RS256";
/// Token lifetime used when none is configured.
pub const DEFAULT_TOKEN_DURATION_SECONDS: u32 = 3_600;
/// Audience of Google's OAuth 2.0 token endpoint.
pub const GOOGLE_TOKEN_AUDIENCE: &str = "https://accounts.google.com/o/oauth2/token";

/// Validated configuration surface for token assertions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AssertionConfigBuilder", into = "AssertionConfigBuilder")]
pub struct AssertionConfig {
	/// Value of the `aud` claim.
	pub audience: String,
	/// Value of the header's `alg` field, passed through to the signer.
	pub signature_algorithm: String,
	/// Lifetime of each assertion; `exp = iat + token_duration_seconds`.
	pub token_duration_seconds: u32,
	/// Scope used when neither the method nor its owner declares one.
	pub global_default_scope: Option<String>,
	/// Claims overlaid after the built-in ones, in insertion order; they win on key collisions.
	pub additional_claims: JsonMap<String, Value>,
}
impl AssertionConfig {
	/// Creates a new builder targeting `audience`.
	pub fn builder(audience: impl Into<String>) -> AssertionConfigBuilder {
		AssertionConfigBuilder::new(audience)
	}
}
impl TryFrom<AssertionConfigBuilder> for AssertionConfig {
	type Error = AssertionConfigError;

	fn try_from(builder: AssertionConfigBuilder) -> Result<Self, Self::Error> {
		builder.build()
	}
}
impl From<AssertionConfig> for AssertionConfigBuilder {
	fn from(config: AssertionConfig) -> Self {
		Self {
			audience: config.audience,
			signature_algorithm: config.signature_algorithm,
			token_duration_seconds: config.token_duration_seconds,
			global_default_scope: config.global_default_scope,
			additional_claims: config.additional_claims,
		}
	}
}
