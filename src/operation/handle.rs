//! Immutable handles to long-running operations.

// self
use crate::{
	_prelude::*,
	auth::{OperationId, RegionName, ZoneName},
	error::ProtocolError,
	operation::Operation,
};

/// Location an operation lives in; selects the status endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum OperationScope {
	/// Project-wide operation (networks, images, firewalls, ...).
	Global,
	/// Zonal operation (disks, instances, ...).
	Zone(ZoneName),
	/// Regional operation (addresses, subnetworks, ...).
	Region(RegionName),
}
impl OperationScope {
	/// Collection path segments preceding `operations`, e.g. `["zones", "us-central1-a"]`.
	pub fn path_segments(&self) -> Vec<&str> {
		match self {
			OperationScope::Global => vec!["global"],
			OperationScope::Zone(zone) => vec!["zones", zone.as_ref()],
			OperationScope::Region(region) => vec!["regions", region.as_ref()],
		}
	}
}
impl Display for OperationScope {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			OperationScope::Global => f.write_str("global"),
			OperationScope::Zone(zone) => write!(f, "zone:{zone}"),
			OperationScope::Region(region) => write!(f, "region:{region}"),
		}
	}
}

/// Handle returned by a mutating call; fixed for the lifetime of the operation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperationHandle {
	id: OperationId,
	scope: OperationScope,
	self_link: Url,
}
impl OperationHandle {
	/// Creates a handle.
	pub fn new(id: OperationId, scope: OperationScope, self_link: Url) -> Self {
		Self { id, scope, self_link }
	}

	/// Derives a handle from an operation resource.
	///
	/// The scope comes from the last path segment of `zone` or `region`; operations carrying
	/// neither are global.
	pub fn from_operation(operation: &Operation) -> Result<Self, ProtocolError> {
		let malformed = |field: &'static str, value: &str| ProtocolError::MalformedField {
			operation: operation.name.clone(),
			field,
			value: value.to_owned(),
		};
		let id = OperationId::new(&operation.name).map_err(|_| malformed("name", &operation.name))?;
		let scope = match (operation.zone.as_deref(), operation.region.as_deref()) {
			(Some(zone), _) => OperationScope::Zone(
				ZoneName::new(last_segment(zone)).map_err(|_| malformed("zone", zone))?,
			),
			(None, Some(region)) => OperationScope::Region(
				RegionName::new(last_segment(region)).map_err(|_| malformed("region", region))?,
			),
			(None, None) => OperationScope::Global,
		};
		let self_link = operation.self_link.clone().ok_or_else(|| ProtocolError::MissingField {
			operation: operation.name.clone(),
			field: "selfLink",
		})?;

		Ok(Self { id, scope, self_link })
	}

	/// Operation identifier.
	pub fn id(&self) -> &OperationId {
		&self.id
	}

	/// Operation scope.
	pub fn scope(&self) -> &OperationScope {
		&self.scope
	}

	/// Canonical URL of the operation resource.
	pub fn self_link(&self) -> &Url {
		&self.self_link
	}
}
impl TryFrom<&Operation> for OperationHandle {
	type Error = ProtocolError;

	fn try_from(operation: &Operation) -> Result<Self, Self::Error> {
		Self::from_operation(operation)
	}
}

fn last_segment(location: &str) -> &str {
	location.trim_end_matches('/').rsplit('/').next().unwrap_or(location)
}
