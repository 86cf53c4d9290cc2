//! Signs an assertion for a disk-creation call and waits for the resulting operation against a
//! mocked compute endpoint.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use time::Duration;
// self
use gce_auth_ops::{
	auth::{
		AssertionBuilder, CallSite, Credentials, KeyMaterial, ProjectId, ScopeTable,
		ServiceAccountId, UnsecuredSigner,
	},
	config::{AssertionConfig, GOOGLE_TOKEN_AUDIENCE},
	flows::Authenticator,
	http::ReqwestHttpClient,
	operation::{Operation, OperationPoller, PollOutcome, ReqwestOperationEndpoint},
	url::Url,
};

const OPERATION: &str = "operation-1700000000000-disk-create";

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let zone_url = server.url("/compute/v1/projects/demo/zones/us-central1-a");
	let self_link = format!("{zone_url}/operations/{OPERATION}");
	let status_mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path(format!("/compute/v1/projects/demo/zones/us-central1-a/operations/{OPERATION}"));
			then.status(200).header("content-type", "application/json").body(format!(
				r#"{{"name":"{OPERATION}","status":"DONE","zone":"{zone_url}","selfLink":"{self_link}","progress":100}}"#
			));
		})
		.await;
	let config = AssertionConfig::builder(GOOGLE_TOKEN_AUDIENCE)
		.signature_algorithm(UnsecuredSigner::ALGORITHM)
		.build()?;
	let scopes =
		ScopeTable::new().declare_owner("DiskApi", ["https://www.googleapis.com/auth/compute"])?;
	let credentials = Credentials::new(
		ServiceAccountId::new("robot@demo.iam.gserviceaccount.com")?,
		KeyMaterial::new("demo-key"),
	);
	let authenticator = Authenticator::<UnsecuredSigner>::new(
		AssertionBuilder::new(config, scopes),
		Arc::new(credentials),
		Arc::new(UnsecuredSigner),
	);
	let signed = authenticator.authenticate(&CallSite::new("DiskApi", "insert"))?;

	println!("Signed assertion with scope {:?}.", signed.request.scope());

	let endpoint = ReqwestOperationEndpoint::new(
		ReqwestHttpClient::default(),
		Url::parse(&server.url("/compute/v1/"))?,
		ProjectId::new("demo")?,
	)?
	.with_bearer_token(signed.token);
	// What a disk insert call would have returned.
	let pending = Operation {
		name: OPERATION.into(),
		status: "PENDING".into(),
		zone: Some(zone_url.clone()),
		self_link: Some(Url::parse(&self_link)?),
		..Default::default()
	};

	match OperationPoller::new(endpoint).complete(&pending, Duration::minutes(2)).await? {
		PollOutcome::Completed => println!("Operation {OPERATION} completed."),
		PollOutcome::CompletedWithError(error) => println!("Operation {OPERATION} failed: {error}."),
		PollOutcome::TimedOut { last_status } =>
			println!("Operation {OPERATION} still {last_status} after two minutes."),
	}

	status_mock.assert_async().await;

	Ok(())
}
