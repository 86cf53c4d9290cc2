//! Service-account credentials and the supplier contract.

// self
use crate::{
	_prelude::*,
	auth::{KeyMaterial, ServiceAccountId},
};

/// Identity plus signing key for a service account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
	/// Issuer identity written into the `iss` claim.
	pub identity: ServiceAccountId,
	/// Key material handed to the signer; never read by the assertion builder.
	pub key: KeyMaterial,
}
impl Credentials {
	/// Creates credentials for `identity` signed with `key`.
	pub fn new(identity: ServiceAccountId, key: KeyMaterial) -> Self {
		Self { identity, key }
	}
}

/// Produces credentials on demand.
///
/// Suppliers are consulted once per assertion so implementations can rotate keys without
/// coordinating with the builder.
pub trait CredentialsSupplier
where
	Self: Send + Sync,
{
	/// Returns the current credentials.
	fn credentials(&self) -> Result<Credentials>;
}
impl CredentialsSupplier for Credentials {
	fn credentials(&self) -> Result<Credentials> {
		Ok(self.clone())
	}
}
