//! Crate-level error types shared by the assertion and operation layers.

// self
use crate::{_prelude::*, auth::SignError, operation::OperationStatus};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem; never retried.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Provider violated the operation contract; never retried.
	#[error(transparent)]
	Protocol(#[from] ProtocolError),
	/// Temporary upstream failure; retry with backoff.
	#[error(transparent)]
	Transient(#[from] TransientError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Signer could not produce a token.
	#[error(transparent)]
	Signing(#[from] SignError),
	/// Status endpoint refused the bearer token (401) or its scopes (403); never retried.
	#[error("Operation status endpoint refused access (HTTP {status}): {reason}.")]
	Unauthorized {
		/// HTTP status code.
		status: u16,
		/// Provider- or client-supplied reason string.
		reason: String,
	},
	/// Operation is unknown to the provider (404 or 410); never retried.
	#[error("Operation `{operation}` was not found.")]
	OperationNotFound {
		/// Operation identifier.
		operation: String,
	},
	/// Status endpoint rejected the request for a reason retrying cannot fix.
	#[error("Operation status endpoint rejected the request (HTTP {status}): {reason}.")]
	Rejected {
		/// HTTP status code.
		status: u16,
		/// Provider- or client-supplied reason string.
		reason: String,
	},
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// No scope could be resolved for a call site.
	#[error(
		"No OAuth scopes are declared for `{owner}::{method}`. Declare scopes for the method or its owner, or configure a global default scope."
	)]
	MissingScopeConfiguration {
		/// Owning API type of the call site.
		owner: String,
		/// Method name of the call site.
		method: String,
	},
	/// Scope declaration was rejected.
	#[error("Declared scopes are invalid.")]
	InvalidScope(#[from] crate::auth::ScopeValidationError),
	/// Identifier failed validation.
	#[error(transparent)]
	InvalidIdentifier(#[from] crate::auth::IdentifierError),
	/// Assertion configuration failed validation.
	#[error(transparent)]
	InvalidAssertionConfig(#[from] crate::config::AssertionConfigError),
	/// Credentials supplier could not produce credentials.
	#[error("Credentials are unavailable.")]
	CredentialsUnavailable {
		/// Supplier-specific failure.
		#[source]
		source: BoxError,
	},
	/// Endpoint base URL cannot carry path segments.
	#[error("Base URL `{url}` cannot be used as a base for operation paths.")]
	InvalidBaseUrl {
		/// Offending URL.
		url: String,
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
	/// Wraps a credentials supplier failure inside [`ConfigError`].
	pub fn credentials_unavailable(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::CredentialsUnavailable { source: Box::new(src) }
	}

	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Violations of the provider's operation contract.
#[derive(Debug, ThisError)]
pub enum ProtocolError {
	/// Status value outside `PENDING`, `RUNNING`, `DONE`.
	#[error("Operation `{operation}` reported an unrecognized status `{status}`.")]
	UnrecognizedStatus {
		/// Operation identifier.
		operation: String,
		/// Raw status string returned by the provider.
		status: String,
	},
	/// Status moved backwards in the lifecycle.
	#[error("Operation `{operation}` regressed from {from} to {to}.")]
	StatusRegression {
		/// Operation identifier.
		operation: String,
		/// Previously observed status.
		from: OperationStatus,
		/// Newly observed status.
		to: OperationStatus,
	},
	/// Operation resource omitted a field the client relies on.
	#[error("Operation `{operation}` is missing the `{field}` field.")]
	MissingField {
		/// Operation identifier.
		operation: String,
		/// Missing field name.
		field: &'static str,
	},
	/// Operation resource carried a malformed location or identifier.
	#[error("Operation `{operation}` has a malformed `{field}` field: {value}.")]
	MalformedField {
		/// Operation identifier.
		operation: String,
		/// Field name.
		field: &'static str,
		/// Offending value.
		value: String,
	},
}

/// Temporary failure variants (safe to retry).
#[derive(Debug, ThisError)]
pub enum TransientError {
	/// Status endpoint answered with 408, 429 or a 5xx status.
	#[error("Operation status endpoint returned HTTP {status}: {message}.")]
	StatusEndpoint {
		/// Short description of the failure.
		message: String,
		/// HTTP status code.
		status: u16,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// Status endpoint responded with JSON that could not be decoded.
	#[error("Operation status endpoint returned malformed JSON.")]
	OperationParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the operation status endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the operation status endpoint.")]
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
