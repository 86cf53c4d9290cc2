//! Optional observability helpers for assertion and operation flows.
//!
//! # Feature Flags
//!
//! - `tracing`: spans named `gce_auth_ops.flow` with `flow`, `stage` and `subject` fields, plus
//!   per-fetch `debug` events from the operation poller.
//! - `metrics`: the `gce_auth_ops_flow_total` counter and the
//!   `gce_auth_ops_flow_duration_seconds` histogram, both labeled by `flow` and `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Flow kinds observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Building and signing a token assertion.
	Assertion,
	/// Waiting on a long-running operation.
	OperationPoll,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::Assertion => "assertion",
			FlowKind::OperationPoll => "operation_poll",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a flow.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller, or an operation that finished with errors.
	Failure,
	/// Operation wait budget ran out.
	TimedOut,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
			FlowOutcome::TimedOut => "timed_out",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
