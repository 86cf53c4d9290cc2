#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
use time::Duration;
// self
use gce_auth_ops::{
	auth::{OperationId, ProjectId, RegionName, TokenSecret, ZoneName},
	error::{Error, ProtocolError, TransientError},
	http::ReqwestHttpClient,
	operation::{
		OperationHandle, OperationPoller, OperationScope, OperationStatus,
		OperationStatusEndpoint, PollOutcome, ReqwestOperationEndpoint,
	},
	url::Url,
};

const OPERATION: &str = "operation-1700000000000-disk-create";
const ZONAL_PATH: &str =
	"/compute/v1/projects/demo/zones/us-central1-a/operations/operation-1700000000000-disk-create";

fn endpoint(server: &MockServer) -> ReqwestOperationEndpoint {
	let base = Url::parse(&server.url("/compute/v1/")).expect("Mock base URL should parse.");
	let project = ProjectId::new("demo").expect("Project fixture should be valid.");

	ReqwestOperationEndpoint::new(ReqwestHttpClient::default(), base, project)
		.expect("Endpoint should accept the mock base URL.")
		.with_bearer_token(TokenSecret::new("signed-token"))
}

fn handle(server: &MockServer, scope: OperationScope) -> OperationHandle {
	OperationHandle::new(
		OperationId::new(OPERATION).expect("Operation fixture should be valid."),
		scope,
		Url::parse(&server.url("/self")).expect("Self link should parse."),
	)
}

fn zone() -> OperationScope {
	OperationScope::Zone(ZoneName::new("us-central1-a").expect("Zone fixture should be valid."))
}

fn body(status: &str) -> String {
	format!(
		r#"{{"kind":"compute#operation","name":"{OPERATION}","status":"{status}","selfLink":"https://compute.example.com/compute/v1/projects/demo/zones/us-central1-a/operations/{OPERATION}","zone":"https://compute.example.com/compute/v1/projects/demo/zones/us-central1-a"}}"#
	)
}

#[tokio::test]
async fn fetch_targets_scope_specific_paths_with_bearer_token() {
	let server = MockServer::start_async().await;
	let endpoint = endpoint(&server);
	let cases = [
		(zone(), "/compute/v1/projects/demo/zones/us-central1-a/operations"),
		(
			OperationScope::Region(RegionName::new("us-central1").expect("Region fixture should be valid.")),
			"/compute/v1/projects/demo/regions/us-central1/operations",
		),
		(OperationScope::Global, "/compute/v1/projects/demo/global/operations"),
	];

	for (scope, prefix) in cases {
		let path = format!("{prefix}/{OPERATION}");
		let mock = server
			.mock_async(|when, then| {
				when.method(GET).path(path.as_str()).header("authorization", "Bearer signed-token");
				then.status(200).header("content-type", "application/json").body(body("RUNNING"));
			})
			.await;
		let operation = endpoint
			.fetch(&handle(&server, scope))
			.await
			.expect("Status fetch should succeed against the mock.");

		mock.assert_async().await;

		assert_eq!(operation.name, OPERATION);
		assert_eq!(
			operation.parsed_status().expect("RUNNING is a known status."),
			OperationStatus::Running
		);
	}
}

#[tokio::test]
async fn done_operation_completes() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path(ZONAL_PATH);
			then.status(200).header("content-type", "application/json").body(body("DONE"));
		})
		.await;
	let poller = OperationPoller::new(endpoint(&server));
	let outcome = poller
		.await_completion(&handle(&server, zone()), Duration::seconds(30))
		.await
		.expect("DONE should resolve the poll.");

	mock.assert_async().await;

	assert_eq!(outcome, PollOutcome::Completed);
}

#[tokio::test]
async fn error_payload_completes_with_error() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path(ZONAL_PATH);
			then.status(200).header("content-type", "application/json").body(format!(
				r#"{{"name":"{OPERATION}","status":"DONE","error":{{"errors":[{{"code":"QUOTA_EXCEEDED","message":"Quota 'DISKS_TOTAL_GB' exceeded."}}]}}}}"#
			));
		})
		.await;

	let outcome = OperationPoller::new(endpoint(&server))
		.await_completion(&handle(&server, zone()), Duration::seconds(30))
		.await
		.expect("A failed operation is still a completed poll.");

	match outcome {
		PollOutcome::CompletedWithError(error) => {
			assert_eq!(error.errors.len(), 1);
			assert_eq!(error.errors[0].code, "QUOTA_EXCEEDED");
		},
		other => panic!("Unexpected outcome: {other:?}."),
	}
}

#[tokio::test]
async fn unknown_status_is_a_protocol_error() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path(ZONAL_PATH);
			then.status(200).header("content-type", "application/json").body(body("CANCELLED"));
		})
		.await;

	let err = OperationPoller::new(endpoint(&server))
		.await_completion(&handle(&server, zone()), Duration::seconds(30))
		.await
		.expect_err("CANCELLED must not be treated as a known status.");

	assert!(matches!(
		err,
		Error::Protocol(ProtocolError::UnrecognizedStatus { ref status, .. }) if status == "CANCELLED"
	));
}

#[tokio::test]
async fn non_success_status_is_transient_with_retry_hint() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path(ZONAL_PATH);
			then.status(503).header("retry-after", "7").body("unavailable");
		})
		.await;

	let err = endpoint(&server)
		.fetch(&handle(&server, zone()))
		.await
		.expect_err("503 must surface as an error.");

	match err {
		Error::Transient(TransientError::StatusEndpoint { status, retry_after, .. }) => {
			assert_eq!(status, 503);
			assert_eq!(retry_after, Some(Duration::seconds(7)));
		},
		other => panic!("Unexpected error: {other:?}."),
	}
}

async fn fetch_failure(status: u16) -> Error {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path(ZONAL_PATH);
			then.status(status).body("{}");
		})
		.await;

	endpoint(&server)
		.fetch(&handle(&server, zone()))
		.await
		.expect_err("Non-success statuses must surface as errors.")
}

#[tokio::test]
async fn throttling_and_timeouts_are_transient() {
	for status in [408, 429, 500] {
		let err = fetch_failure(status).await;

		assert!(
			matches!(err, Error::Transient(TransientError::StatusEndpoint { status: s, .. }) if s == status),
			"HTTP {status} should be transient, got {err:?}."
		);
	}
}

#[tokio::test]
async fn rejected_credentials_are_not_retryable() {
	for status in [401, 403] {
		let err = fetch_failure(status).await;

		assert!(
			matches!(err, Error::Unauthorized { status: s, .. } if s == status),
			"HTTP {status} should be unauthorized, got {err:?}."
		);
	}
}

#[tokio::test]
async fn missing_operation_is_not_found() {
	let err = fetch_failure(404).await;

	assert!(
		matches!(err, Error::OperationNotFound { ref operation } if operation == OPERATION),
		"HTTP 404 should be not-found, got {err:?}."
	);
}

#[tokio::test]
async fn other_client_errors_are_rejections() {
	let err = fetch_failure(409).await;

	assert!(matches!(err, Error::Rejected { status: 409, .. }), "Unexpected error: {err:?}.");
}

#[tokio::test]
async fn malformed_body_is_a_parse_error() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path(ZONAL_PATH);
			then.status(200).header("content-type", "application/json").body(r#"{"name":7}"#);
		})
		.await;

	let err = endpoint(&server)
		.fetch(&handle(&server, zone()))
		.await
		.expect_err("A numeric name must fail to decode.");

	assert!(matches!(err, Error::Transient(TransientError::OperationParse { status: Some(200), .. })));
}

#[tokio::test]
async fn zero_budget_fetches_once_and_times_out() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path(ZONAL_PATH);
			then.status(200).header("content-type", "application/json").body(body("RUNNING"));
		})
		.await;
	let outcome = OperationPoller::new(endpoint(&server))
		.await_completion(&handle(&server, zone()), Duration::ZERO)
		.await
		.expect("A zero budget should time out, not fail.");

	mock.assert_async().await;

	assert_eq!(outcome, PollOutcome::TimedOut { last_status: OperationStatus::Running });
}
