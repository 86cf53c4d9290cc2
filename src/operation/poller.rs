//! Bounded polling of long-running operations.
//!
//! The poller fetches the operation, sleeps according to its [`PollPolicy`], and repeats until
//! the provider reports `DONE` or the wait budget runs out. Waiting is measured from the first
//! fetch with tokio's monotonic clock. Consecutive fetches are never closer than
//! [`MIN_POLL_INTERVAL`]; when the budget ends inside the next interval the final fetch happens
//! exactly at the deadline, and if even that is too soon the poller waits out the budget and
//! reports [`PollOutcome::TimedOut`] without fetching again.

// crates.io
use tokio::time::{self, Instant};
// self
use crate::{
	_prelude::*,
	error::ProtocolError,
	obs::{FlowKind, FlowOutcome, FlowRecorder, FlowSpan},
	operation::{Operation, OperationError, OperationHandle, OperationStatus, OperationStatusEndpoint},
};

/// Smallest gap allowed between two status fetches.
pub const MIN_POLL_INTERVAL: Duration = Duration::SECOND;

/// Capped exponential poll schedule.
///
/// The n-th wait is `initial_interval * multiplier^(n-1)`, capped at `max_interval`. Intervals
/// below [`MIN_POLL_INTERVAL`] are raised to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollPolicy {
	/// Wait after the first fetch.
	pub initial_interval: Duration,
	/// Upper bound for any single wait.
	pub max_interval: Duration,
	/// Growth factor between consecutive waits; `1` yields a fixed schedule.
	pub multiplier: u16,
}
impl PollPolicy {
	const DEFAULT_INITIAL_INTERVAL: Duration = Duration::SECOND;
	const DEFAULT_MAX_INTERVAL: Duration = Duration::seconds(10);
	const DEFAULT_MULTIPLIER: u16 = 2;

	/// Creates a policy, clamping intervals to [`MIN_POLL_INTERVAL`] and the multiplier to `1`.
	pub fn new(initial_interval: Duration, max_interval: Duration, multiplier: u16) -> Self {
		let initial_interval = initial_interval.max(MIN_POLL_INTERVAL);
		let max_interval = max_interval.max(initial_interval);

		Self { initial_interval, max_interval, multiplier: multiplier.max(1) }
	}

	/// Fixed schedule polling every `interval`.
	pub fn fixed(interval: Duration) -> Self {
		Self::new(interval, interval, 1)
	}

	/// Wait that follows the `fetches`-th fetch (1-based).
	pub fn delay_after(&self, fetches: u64) -> Duration {
		let floor = self.initial_interval.max(MIN_POLL_INTERVAL);
		let cap = self.max_interval.max(floor);
		let mut delay = floor;

		if self.multiplier > 1 {
			for _ in 1..fetches {
				match delay.checked_mul(i32::from(self.multiplier)) {
					Some(next) if next < cap => delay = next,
					_ => return cap,
				}
			}
		}

		delay
	}

	/// Upper bound on fetches within `max_wait`.
	pub fn max_fetches(&self, max_wait: Duration) -> u64 {
		let budget = u64::try_from(max_wait.whole_seconds()).unwrap_or(0);
		let step = u64::try_from(MIN_POLL_INTERVAL.whole_seconds()).unwrap_or(1).max(1);

		budget / step + 1
	}
}
impl Default for PollPolicy {
	fn default() -> Self {
		Self::new(
			Self::DEFAULT_INITIAL_INTERVAL,
			Self::DEFAULT_MAX_INTERVAL,
			Self::DEFAULT_MULTIPLIER,
		)
	}
}

/// Terminal result of waiting on an operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PollOutcome {
	/// Operation finished without errors.
	Completed,
	/// Operation finished but the provider reported a failure.
	CompletedWithError(OperationError),
	/// Wait budget ran out; the operation may still finish later.
	TimedOut {
		/// Status observed by the last fetch.
		last_status: OperationStatus,
	},
}
impl PollOutcome {
	/// True only for [`PollOutcome::Completed`].
	pub fn is_success(&self) -> bool {
		matches!(self, Self::Completed)
	}

	fn from_done(operation: &Operation) -> Self {
		match operation.failure() {
			Some(error) => Self::CompletedWithError(error.clone()),
			None => Self::Completed,
		}
	}

	fn flow_outcome(&self) -> FlowOutcome {
		match self {
			Self::Completed => FlowOutcome::Success,
			Self::CompletedWithError(_) => FlowOutcome::Failure,
			Self::TimedOut { .. } => FlowOutcome::TimedOut,
		}
	}
}

/// Waits for operations to reach a terminal state.
pub struct OperationPoller<E>
where
	E: ?Sized + OperationStatusEndpoint,
{
	endpoint: Arc<E>,
	policy: PollPolicy,
}
impl<E> OperationPoller<E>
where
	E: ?Sized + OperationStatusEndpoint,
{
	/// Creates a poller with the default [`PollPolicy`].
	pub fn new(endpoint: impl Into<Arc<E>>) -> Self {
		Self { endpoint: endpoint.into(), policy: PollPolicy::default() }
	}

	/// Overrides the poll schedule.
	pub fn with_policy(mut self, policy: PollPolicy) -> Self {
		self.policy = policy;

		self
	}

	/// Active poll schedule.
	pub fn policy(&self) -> &PollPolicy {
		&self.policy
	}

	/// Waits for the operation returned by a mutating call.
	///
	/// Resources that are already `DONE` resolve without a fetch.
	pub async fn complete(&self, operation: &Operation, max_wait: Duration) -> Result<PollOutcome> {
		if operation.parsed_status()?.is_terminal() {
			return Ok(PollOutcome::from_done(operation));
		}

		let handle = OperationHandle::from_operation(operation)?;

		self.await_completion(&handle, max_wait).await
	}

	/// Polls `handle` until it is `DONE` or `max_wait` elapses.
	///
	/// Fails with [`ProtocolError`] when the provider reports an unknown status or a status that
	/// moves backwards; endpoint failures propagate unchanged.
	pub async fn await_completion(
		&self,
		handle: &OperationHandle,
		max_wait: Duration,
	) -> Result<PollOutcome> {
		let span =
			FlowSpan::new(FlowKind::OperationPoll, "await_completion").with_subject(handle.id());
		let recorder = FlowRecorder::start(span.kind());
		let result = span.instrument(self.poll(handle, max_wait)).await;

		recorder.finish(match &result {
			Ok(outcome) => outcome.flow_outcome(),
			Err(_) => FlowOutcome::Failure,
		});

		result
	}

	async fn poll(&self, handle: &OperationHandle, max_wait: Duration) -> Result<PollOutcome> {
		let budget = max_wait.max(Duration::ZERO);
		let max_fetches = self.policy.max_fetches(budget);
		let min_interval = MIN_POLL_INTERVAL.unsigned_abs();
		// Budgets past the timer's range never expire; the schedule alone paces the loop.
		let deadline = Instant::now().checked_add(budget.unsigned_abs());
		let mut previous: Option<OperationStatus> = None;
		let mut fetches = 0_u64;

		loop {
			let operation = self.endpoint.fetch(handle).await?;

			fetches += 1;

			let status = operation.parsed_status()?;

			#[cfg(feature = "tracing")]
			tracing::debug!(scope = %handle.scope(), %status, fetches, "Fetched operation status.");

			match previous {
				Some(from) if status < from => {
					return Err(ProtocolError::StatusRegression {
						operation: handle.id().to_string(),
						from,
						to: status,
					}
					.into());
				},
				_ => previous = Some(status),
			}

			if status.is_terminal() {
				return Ok(PollOutcome::from_done(&operation));
			}

			let Some(deadline) = deadline else {
				time::sleep(self.policy.delay_after(fetches).unsigned_abs()).await;

				continue;
			};
			let now = Instant::now();

			if now >= deadline {
				return Ok(PollOutcome::TimedOut { last_status: status });
			}

			let remaining = deadline - now;

			if remaining < min_interval || fetches >= max_fetches {
				time::sleep_until(deadline).await;

				return Ok(PollOutcome::TimedOut { last_status: status });
			}

			let delay = self.policy.delay_after(fetches).unsigned_abs().min(remaining);

			time::sleep(delay).await;
		}
	}
}
impl<E> Clone for OperationPoller<E>
where
	E: ?Sized + OperationStatusEndpoint,
{
	fn clone(&self) -> Self {
		Self { endpoint: self.endpoint.clone(), policy: self.policy }
	}
}
impl<E> Debug for OperationPoller<E>
where
	E: ?Sized + OperationStatusEndpoint,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OperationPoller").field("policy", &self.policy).finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		_preludet::{ScriptedEndpoint, operation_with_status},
		error::TransportError,
		operation::{OperationErrorDetail, OperationFuture},
	};

	fn handle() -> OperationHandle {
		OperationHandle::from_operation(&operation_with_status("PENDING"))
			.expect("Fixture should convert into a handle.")
	}

	fn assert_elapsed(started: Instant, expected_ms: u64) {
		let elapsed = started.elapsed().as_millis();
		let expected = u128::from(expected_ms);

		assert!(
			(expected..expected + 5).contains(&elapsed),
			"Expected ~{expected}ms of virtual time, observed {elapsed}ms."
		);
	}

	fn poller(endpoint: &Arc<ScriptedEndpoint>) -> OperationPoller<ScriptedEndpoint> {
		OperationPoller::new(endpoint.clone())
	}

	#[test]
	fn default_schedule_doubles_up_to_the_cap() {
		let policy = PollPolicy::default();
		let delays = (1..=6).map(|n| policy.delay_after(n).whole_seconds()).collect::<Vec<_>>();

		assert_eq!(delays, vec![1, 2, 4, 8, 10, 10]);
	}

	#[test]
	fn schedules_never_undercut_the_minimum_interval() {
		let policy = PollPolicy::new(Duration::milliseconds(10), Duration::milliseconds(20), 0);

		assert_eq!(policy.initial_interval, MIN_POLL_INTERVAL);
		assert_eq!(policy.max_interval, MIN_POLL_INTERVAL);
		assert_eq!(policy.multiplier, 1);
		assert_eq!(policy.delay_after(5), MIN_POLL_INTERVAL);
		assert_eq!(PollPolicy::fixed(Duration::seconds(3)).delay_after(9), Duration::seconds(3));
	}

	#[test]
	fn fetch_budget_is_bounded() {
		let policy = PollPolicy::default();

		assert_eq!(policy.max_fetches(Duration::ZERO), 1);
		assert_eq!(policy.max_fetches(Duration::seconds(30)), 31);
		assert_eq!(policy.max_fetches(Duration::seconds(-5)), 1);
	}

	#[tokio::test(start_paused = true)]
	async fn pending_running_done_completes() {
		let endpoint = Arc::new(ScriptedEndpoint::from_statuses(["PENDING", "RUNNING", "RUNNING", "DONE"]));
		let started = Instant::now();
		let outcome = poller(&endpoint)
			.await_completion(&handle(), Duration::seconds(60))
			.await
			.expect("Polling should succeed.");

		assert_eq!(outcome, PollOutcome::Completed);
		assert_eq!(endpoint.fetch_count(), 4);
		// Waits of 1s, 2s, and 4s separate the four fetches.
		assert_elapsed(started, 7_000);
	}

	#[tokio::test(start_paused = true)]
	async fn running_forever_times_out_at_the_deadline() {
		let endpoint = Arc::new(ScriptedEndpoint::from_statuses(["RUNNING"]));
		let started = Instant::now();
		let outcome = poller(&endpoint)
			.await_completion(&handle(), Duration::seconds(30))
			.await
			.expect("Polling should succeed.");

		assert_eq!(outcome, PollOutcome::TimedOut { last_status: OperationStatus::Running });
		// Fetches at 0, 1, 3, 7, 15, 25, and finally at the 30s deadline.
		assert_eq!(endpoint.fetch_count(), 7);
		assert_elapsed(started, 30_000);
	}

	#[tokio::test(start_paused = true)]
	async fn zero_budget_fetches_once() {
		let endpoint = Arc::new(ScriptedEndpoint::from_statuses(["RUNNING", "DONE"]));
		let outcome = poller(&endpoint)
			.await_completion(&handle(), Duration::ZERO)
			.await
			.expect("Polling should succeed.");

		assert_eq!(outcome, PollOutcome::TimedOut { last_status: OperationStatus::Running });
		assert_eq!(endpoint.fetch_count(), 1);
	}

	#[tokio::test(start_paused = true)]
	async fn unbounded_budget_polls_until_done() {
		let endpoint = Arc::new(ScriptedEndpoint::from_statuses(["RUNNING", "RUNNING", "DONE"]));
		let started = Instant::now();
		let outcome = poller(&endpoint)
			.await_completion(&handle(), Duration::MAX)
			.await
			.expect("An effectively infinite budget should not overflow the timer.");

		assert_eq!(outcome, PollOutcome::Completed);
		assert_eq!(endpoint.fetch_count(), 3);
		assert_elapsed(started, 3_000);
	}

	#[tokio::test(start_paused = true)]
	async fn budget_shorter_than_minimum_interval_waits_it_out() {
		let endpoint = Arc::new(ScriptedEndpoint::from_statuses(["PENDING", "DONE"]));
		let started = Instant::now();
		let outcome = poller(&endpoint)
			.await_completion(&handle(), Duration::milliseconds(500))
			.await
			.expect("Polling should succeed.");

		assert_eq!(outcome, PollOutcome::TimedOut { last_status: OperationStatus::Pending });
		assert_eq!(endpoint.fetch_count(), 1);
		assert_elapsed(started, 500);
	}

	#[tokio::test(start_paused = true)]
	async fn done_with_errors_carries_the_payload() {
		let mut failed = operation_with_status("DONE");
		let error = OperationError {
			errors: vec![OperationErrorDetail {
				code: "QUOTA_EXCEEDED".into(),
				location: None,
				message: Some("Quota 'DISKS_TOTAL_GB' exceeded.".into()),
			}],
		};

		failed.error = Some(error.clone());

		let endpoint =
			Arc::new(ScriptedEndpoint::new([operation_with_status("RUNNING"), failed]));
		let outcome = poller(&endpoint)
			.await_completion(&handle(), Duration::seconds(60))
			.await
			.expect("Polling should succeed.");

		assert_eq!(outcome, PollOutcome::CompletedWithError(error));
		assert!(!outcome.is_success());
	}

	#[tokio::test(start_paused = true)]
	async fn unrecognized_status_is_a_protocol_error() {
		let endpoint = Arc::new(ScriptedEndpoint::from_statuses(["RUNNING", "CANCELLED"]));
		let err = poller(&endpoint)
			.await_completion(&handle(), Duration::seconds(60))
			.await
			.expect_err("Unknown statuses must fail.");

		assert!(matches!(
			err,
			Error::Protocol(ProtocolError::UnrecognizedStatus { ref status, .. }) if status == "CANCELLED"
		));
		assert_eq!(endpoint.fetch_count(), 2);
	}

	#[tokio::test(start_paused = true)]
	async fn status_regression_is_a_protocol_error() {
		let endpoint = Arc::new(ScriptedEndpoint::from_statuses(["RUNNING", "PENDING"]));
		let err = poller(&endpoint)
			.await_completion(&handle(), Duration::seconds(60))
			.await
			.expect_err("Regressions must fail.");

		assert!(matches!(
			err,
			Error::Protocol(ProtocolError::StatusRegression {
				from: OperationStatus::Running,
				to: OperationStatus::Pending,
				..
			})
		));
	}

	#[tokio::test(start_paused = true)]
	async fn endpoint_failures_propagate_unchanged() {
		struct Unreachable;
		impl OperationStatusEndpoint for Unreachable {
			fn fetch<'a>(&'a self, _handle: &'a OperationHandle) -> OperationFuture<'a> {
				Box::pin(async {
					Err::<Operation, Error>(
						TransportError::Io(std::io::Error::other("connection reset")).into(),
					)
				})
			}
		}

		let poller = OperationPoller::<dyn OperationStatusEndpoint>::new(
			Arc::new(Unreachable) as Arc<dyn OperationStatusEndpoint>
		);
		let err = poller
			.await_completion(&handle(), Duration::seconds(60))
			.await
			.expect_err("Transport failures must propagate.");

		assert!(matches!(err, Error::Transport(TransportError::Io(_))));
	}

	#[tokio::test(start_paused = true)]
	async fn complete_short_circuits_finished_operations() {
		let endpoint = Arc::new(ScriptedEndpoint::default());
		let outcome = poller(&endpoint)
			.complete(&operation_with_status("DONE"), Duration::seconds(60))
			.await
			.expect("Finished operations should resolve.");

		assert_eq!(outcome, PollOutcome::Completed);
		assert_eq!(endpoint.fetch_count(), 0);
	}

	#[tokio::test(start_paused = true)]
	async fn complete_polls_the_derived_handle() {
		let endpoint = Arc::new(ScriptedEndpoint::from_statuses(["RUNNING", "DONE"]));
		let outcome = poller(&endpoint)
			.complete(&operation_with_status("PENDING"), Duration::seconds(60))
			.await
			.expect("Pending operations should be polled.");

		assert_eq!(outcome, PollOutcome::Completed);
		assert_eq!(endpoint.fetched_handles(), vec![handle(), handle()]);
	}
}
