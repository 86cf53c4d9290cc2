//! Status endpoints that fetch the current state of an operation.

// self
use crate::{
	_prelude::*,
	auth::ProjectId,
	error::ConfigError,
	operation::{Operation, OperationHandle},
};
#[cfg(feature = "reqwest")]
use crate::{
	auth::TokenSecret,
	error::{TransientError, TransportError},
	ext::{BearerSigner, RequestSignerExt},
	http::{ReqwestHttpClient, parse_retry_after},
};

/// Boxed future returned by [`OperationStatusEndpoint::fetch`].
pub type OperationFuture<'a> = Pin<Box<dyn Future<Output = Result<Operation>> + 'a + Send>>;

/// Fetches an operation resource from the provider.
///
/// Implementations pick the URL shape from [`OperationHandle::scope`]. Transport failures must
/// surface as [`Error::Transport`] or [`Error::Transient`]; the poller never retries them.
pub trait OperationStatusEndpoint
where
	Self: Send + Sync,
{
	/// Fetches the current resource for `handle`.
	fn fetch<'a>(&'a self, handle: &'a OperationHandle) -> OperationFuture<'a>;
}
impl<T> OperationStatusEndpoint for Arc<T>
where
	T: ?Sized + OperationStatusEndpoint,
{
	fn fetch<'a>(&'a self, handle: &'a OperationHandle) -> OperationFuture<'a> {
		(**self).fetch(handle)
	}
}

/// Builds `{base}/projects/{project}/{scope...}/operations/{id}`.
///
/// `base` is the API root, e.g. `https://compute.googleapis.com/compute/v1/`; a trailing slash
/// is optional.
pub fn operation_url(base: &Url, project: &ProjectId, handle: &OperationHandle) -> Result<Url> {
	let mut url = base.clone();

	{
		let mut segments = url
			.path_segments_mut()
			.map_err(|_| ConfigError::InvalidBaseUrl { url: base.to_string() })?;

		segments.pop_if_empty().extend(["projects", project.as_ref()]);
		segments.extend(handle.scope().path_segments());
		segments.extend(["operations", handle.id().as_ref()]);
	}

	Ok(url)
}

/// Status endpoint backed by reqwest.
///
/// The bearer token sits behind a lock so a shared endpoint can pick up rotated tokens.
#[cfg(feature = "reqwest")]
#[derive(Debug)]
pub struct ReqwestOperationEndpoint {
	http_client: ReqwestHttpClient,
	base_url: Url,
	project: ProjectId,
	bearer: RwLock<Option<TokenSecret>>,
}
#[cfg(feature = "reqwest")]
impl ReqwestOperationEndpoint {
	/// Creates an endpoint for `project` rooted at `base_url`.
	pub fn new(http_client: ReqwestHttpClient, base_url: Url, project: ProjectId) -> Result<Self> {
		if base_url.cannot_be_a_base() {
			return Err(ConfigError::InvalidBaseUrl { url: base_url.to_string() }.into());
		}

		Ok(Self { http_client, base_url, project, bearer: RwLock::new(None) })
	}

	/// Sets the initial bearer token.
	pub fn with_bearer_token(self, token: TokenSecret) -> Self {
		self.set_bearer_token(token);

		self
	}

	/// Replaces the bearer token used for subsequent fetches.
	pub fn set_bearer_token(&self, token: TokenSecret) {
		*self.bearer.write() = Some(token);
	}

	/// Project whose operations this endpoint reads.
	pub fn project(&self) -> &ProjectId {
		&self.project
	}

	/// Status URL for `handle`.
	pub fn url_for(&self, handle: &OperationHandle) -> Result<Url> {
		operation_url(&self.base_url, &self.project, handle)
	}

	async fn fetch_operation(&self, handle: &OperationHandle) -> Result<Operation> {
		let url = self.url_for(handle)?;
		let mut request = self.http_client.get(url);
		let bearer = self.bearer.read().clone();

		if let Some(token) = bearer {
			request = BearerSigner.attach_token(request, &token)?;
		}

		let response = request.send().await.map_err(TransportError::from)?;
		let status = response.status();
		let retry_after = parse_retry_after(response.headers());
		let body = response.bytes().await.map_err(TransportError::from)?;

		if !status.is_success() {
			let reason = status.canonical_reason().unwrap_or("unexpected status").to_owned();
			let status = status.as_u16();

			return Err(match StatusClass::of(status) {
				StatusClass::Transient =>
					TransientError::StatusEndpoint { message: reason, status, retry_after }.into(),
				StatusClass::Unauthorized => Error::Unauthorized { status, reason },
				StatusClass::NotFound =>
					Error::OperationNotFound { operation: handle.id().to_string() },
				StatusClass::Rejected => Error::Rejected { status, reason },
			});
		}

		Ok(Operation::from_slice(&body, Some(status.as_u16()))?)
	}
}

/// Retry class of a non-success status returned by the status endpoint.
#[cfg(feature = "reqwest")]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StatusClass {
	Transient,
	Unauthorized,
	NotFound,
	Rejected,
}
#[cfg(feature = "reqwest")]
impl StatusClass {
	fn of(status: u16) -> Self {
		match status {
			408 | 429 => Self::Transient,
			401 | 403 => Self::Unauthorized,
			404 | 410 => Self::NotFound,
			code if code >= 500 => Self::Transient,
			_ => Self::Rejected,
		}
	}
}
#[cfg(feature = "reqwest")]
impl OperationStatusEndpoint for ReqwestOperationEndpoint {
	fn fetch<'a>(&'a self, handle: &'a OperationHandle) -> OperationFuture<'a> {
		Box::pin(self.fetch_operation(handle))
	}
}
