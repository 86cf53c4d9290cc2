//! Wire model of an operation resource and its lifecycle states.

// self
use crate::{_prelude::*, error::{ProtocolError, TransientError}};

/// Provider-side lifecycle states of an operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationStatus {
	/// Accepted but not started.
	Pending,
	/// In progress.
	Running,
	/// Terminal; inspect the error payload for the result.
	Done,
}
impl OperationStatus {
	/// Returns the wire label.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationStatus::Pending => "PENDING",
			OperationStatus::Running => "RUNNING",
			OperationStatus::Done => "DONE",
		}
	}

	/// Parses a wire label; unknown labels yield `None`.
	pub fn parse(raw: &str) -> Option<Self> {
		match raw {
			"PENDING" => Some(Self::Pending),
			"RUNNING" => Some(Self::Running),
			"DONE" => Some(Self::Done),
			_ => None,
		}
	}

	/// True for `DONE`.
	pub fn is_terminal(self) -> bool {
		matches!(self, Self::Done)
	}
}
impl Display for OperationStatus {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// One entry of an operation's error payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationErrorDetail {
	/// Provider error code, e.g. `RESOURCE_ALREADY_EXISTS`.
	pub code: String,
	/// Field or resource the error refers to.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub location: Option<String>,
	/// Human-readable message.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub message: Option<String>,
}

/// Structured error payload attached to a failed operation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationError {
	/// Individual errors reported by the provider.
	#[serde(default)]
	pub errors: Vec<OperationErrorDetail>,
}
impl OperationError {
	/// True when the provider reported no errors.
	pub fn is_empty(&self) -> bool {
		self.errors.is_empty()
	}
}
impl Display for OperationError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		for (idx, detail) in self.errors.iter().enumerate() {
			if idx > 0 {
				f.write_str("; ")?;
			}

			f.write_str(&detail.code)?;

			if let Some(message) = detail.message.as_deref() {
				write!(f, ": {message}")?;
			}
		}

		Ok(())
	}
}

/// Operation resource as returned by mutating calls and the status endpoint.
///
/// `status` stays a raw string so that unknown states can be reported as protocol violations
/// instead of decode failures. Fields the client does not use are ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
	/// Operation name; unique within its scope.
	pub name: String,
	/// Numeric identifier assigned by the provider.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id: Option<String>,
	/// Raw lifecycle status.
	pub status: String,
	/// Zone URL for zonal operations.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub zone: Option<String>,
	/// Region URL for regional operations.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub region: Option<String>,
	/// Canonical URL of the operation resource.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub self_link: Option<Url>,
	/// URL of the resource being mutated.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub target_link: Option<String>,
	/// Kind of mutation, e.g. `insert` or `delete`.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub operation_type: Option<String>,
	/// Provider-estimated progress in percent.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub progress: Option<u8>,
	/// Error payload; present only when the mutation failed.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error: Option<OperationError>,
	/// HTTP status the mutation would have returned synchronously.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub http_error_status_code: Option<u16>,
	/// HTTP message accompanying `http_error_status_code`.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub http_error_message: Option<String>,
}
impl Operation {
	/// Decodes a resource from JSON, reporting the failing path on error.
	pub fn from_slice(bytes: &[u8], status: Option<u16>) -> Result<Self, TransientError> {
		let mut deserializer = serde_json::Deserializer::from_slice(bytes);

		serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| TransientError::OperationParse { source, status })
	}

	/// Parses the lifecycle status, rejecting values outside the modeled set.
	pub fn parsed_status(&self) -> Result<OperationStatus, ProtocolError> {
		OperationStatus::parse(&self.status).ok_or_else(|| ProtocolError::UnrecognizedStatus {
			operation: self.name.clone(),
			status: self.status.clone(),
		})
	}

	/// Non-empty error payload, if any.
	pub fn failure(&self) -> Option<&OperationError> {
		self.error.as_ref().filter(|error| !error.is_empty())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	const FAILED_INSERT: &str = r#"{
		"kind": "compute#operation",
		"id": "8121637365928281234",
		"name": "operation-1700000000000-disk-create",
		"zone": "https://compute.example.com/compute/v1/projects/demo/zones/us-central1-a",
		"operationType": "insert",
		"targetLink": "https://compute.example.com/compute/v1/projects/demo/zones/us-central1-a/disks/data",
		"status": "DONE",
		"progress": 100,
		"selfLink": "https://compute.example.com/compute/v1/projects/demo/zones/us-central1-a/operations/operation-1700000000000-disk-create",
		"httpErrorStatusCode": 409,
		"httpErrorMessage": "CONFLICT",
		"error": {
			"errors": [
				{ "code": "RESOURCE_ALREADY_EXISTS", "message": "The resource 'data' already exists" }
			]
		}
	}"#;

	#[test]
	fn decodes_failed_operation() {
		let operation =
			Operation::from_slice(FAILED_INSERT.as_bytes(), Some(200)).expect("Fixture should decode.");

		assert_eq!(operation.parsed_status().expect("DONE is a known status."), OperationStatus::Done);
		assert_eq!(operation.progress, Some(100));
		assert_eq!(operation.http_error_status_code, Some(409));

		let failure = operation.failure().expect("Fixture carries an error payload.");

		assert_eq!(failure.errors[0].code, "RESOURCE_ALREADY_EXISTS");
		assert_eq!(failure.to_string(), "RESOURCE_ALREADY_EXISTS: The resource 'data' already exists");
	}

	#[test]
	fn empty_error_payload_is_not_a_failure() {
		let operation = Operation {
			name: "op".into(),
			status: "DONE".into(),
			error: Some(OperationError::default()),
			..Default::default()
		};

		assert!(operation.failure().is_none());
	}

	#[test]
	fn unknown_status_is_a_protocol_error() {
		let operation =
			Operation { name: "op".into(), status: "CANCELLED".into(), ..Default::default() };

		assert!(matches!(
			operation.parsed_status(),
			Err(ProtocolError::UnrecognizedStatus { ref status, .. }) if status == "CANCELLED"
		));
	}

	#[test]
	fn decode_errors_report_the_path() {
		let err = Operation::from_slice(br#"{"name":"op","status":7}"#, Some(200))
			.expect_err("Numeric status must fail to decode.");

		match err {
			TransientError::OperationParse { source, status } => {
				assert_eq!(source.path().to_string(), "status");
				assert_eq!(status, Some(200));
			},
			other => panic!("Unexpected error: {other:?}."),
		}
	}
}
