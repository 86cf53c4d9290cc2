// self
use crate::{
	_prelude::*,
	config::{AssertionConfig, DEFAULT_SIGNATURE_ALGORITHM, DEFAULT_TOKEN_DURATION_SECONDS},
};

/// Errors raised while constructing or validating assertion configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum AssertionConfigError {
	/// The audience is required.
	#[error("Missing assertion audience.")]
	MissingAudience,
	/// The signature algorithm is required.
	#[error("Missing signature algorithm.")]
	MissingSignatureAlgorithm,
	/// Tokens must live for at least one second.
	#[error("Token duration must be at least one second.")]
	NonPositiveTokenDuration,
}

/// Builder for [`AssertionConfig`] values; also the serde shape of the configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssertionConfigBuilder {
	/// Value of the `aud` claim.
	pub audience: String,
	/// Header `alg` value.
	#[serde(default = "default_signature_algorithm")]
	pub signature_algorithm: String,
	/// Assertion lifetime in seconds.
	#[serde(default = "default_token_duration_seconds")]
	pub token_duration_seconds: u32,
	/// Scope used when no declaration matches a call site.
	#[serde(default)]
	pub global_default_scope: Option<String>,
	/// Claims overlaid after the built-in ones.
	#[serde(default)]
	pub additional_claims: JsonMap<String, Value>,
}
impl AssertionConfigBuilder {
	/// Creates a new builder seeded with the audience and default algorithm/duration.
	pub fn new(audience: impl Into<String>) -> Self {
		Self {
			audience: audience.into(),
			signature_algorithm: default_signature_algorithm(),
			token_duration_seconds: DEFAULT_TOKEN_DURATION_SECONDS,
			global_default_scope: None,
			additional_claims: JsonMap::new(),
		}
	}

	/// Overrides the signature algorithm identifier.
	pub fn signature_algorithm(mut self, algorithm: impl Into<String>) -> Self {
		self.signature_algorithm = algorithm.into();

		self
	}

	/// Overrides the token lifetime.
	pub fn token_duration_seconds(mut self, seconds: u32) -> Self {
		self.token_duration_seconds = seconds;

		self
	}

	/// Sets the global default scope.
	pub fn global_default_scope(mut self, scope: impl Into<String>) -> Self {
		self.global_default_scope = Some(scope.into());

		self
	}

	/// Adds (or replaces) one additional claim.
	pub fn additional_claim(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
		self.additional_claims.insert(name.into(), value.into());

		self
	}

	/// Adds (or replaces) several additional claims.
	pub fn additional_claims<I, K, V>(mut self, claims: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<Value>,
	{
		for (name, value) in claims {
			self.additional_claims.insert(name.into(), value.into());
		}

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<AssertionConfig, AssertionConfigError> {
		if self.audience.trim().is_empty() {
			return Err(AssertionConfigError::MissingAudience);
		}
		if self.signature_algorithm.trim().is_empty() {
			return Err(AssertionConfigError::MissingSignatureAlgorithm);
		}
		if self.token_duration_seconds == 0 {
			return Err(AssertionConfigError::NonPositiveTokenDuration);
		}

		Ok(AssertionConfig {
			audience: self.audience,
			signature_algorithm: self.signature_algorithm,
			token_duration_seconds: self.token_duration_seconds,
			global_default_scope: self.global_default_scope,
			additional_claims: self.additional_claims,
		})
	}
}

fn default_signature_algorithm() -> String {
	DEFAULT_SIGNATURE_ALGORITHM.into()
}

fn default_token_duration_seconds() -> u32 {
	DEFAULT_TOKEN_DURATION_SECONDS
}
