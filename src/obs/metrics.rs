// std
use std::time::Instant;
// self
use crate::obs::{FlowKind, FlowOutcome};

/// Increments `gce_auth_ops_flow_total{flow, outcome}` when the `metrics` feature is on.
pub fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	metrics::counter!(
		"gce_auth_ops_flow_total",
		"flow" => kind.as_str(),
		"outcome" => outcome.as_str()
	)
	.increment(1);
	#[cfg(not(feature = "metrics"))]
	let _ = (kind, outcome);
}

/// Records one flow from attempt to outcome.
///
/// [`FlowRecorder::start`] counts the attempt; [`FlowRecorder::finish`] counts the outcome and
/// observes the wall-clock duration in `gce_auth_ops_flow_duration_seconds{flow, outcome}`.
#[derive(Debug)]
pub struct FlowRecorder {
	kind: FlowKind,
	started: Instant,
}
impl FlowRecorder {
	/// Counts an attempt and starts the timer.
	pub fn start(kind: FlowKind) -> Self {
		record_flow_outcome(kind, FlowOutcome::Attempt);

		Self { kind, started: Instant::now() }
	}

	/// Counts `outcome` and records the elapsed time.
	pub fn finish(self, outcome: FlowOutcome) {
		record_flow_outcome(self.kind, outcome);

		#[cfg(feature = "metrics")]
		metrics::histogram!(
			"gce_auth_ops_flow_duration_seconds",
			"flow" => self.kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.record(self.started.elapsed().as_secs_f64());
		#[cfg(not(feature = "metrics"))]
		let _ = self.started;
	}
}
