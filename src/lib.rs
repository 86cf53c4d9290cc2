//! Service-account token assertions and long-running-operation polling for compute cloud APIs.
//!
//! Two pieces carry the weight: [`auth::AssertionBuilder`] turns a call site plus
//! credentials into an ordered, deterministic JWT claim set, and
//! [`operation::OperationPoller`] waits for provider-side mutations to reach a terminal
//! state within a bounded budget.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod clock;
pub mod config;
pub mod error;
pub mod ext;
pub mod flows;
#[cfg(feature = "reqwest")] pub mod http;
pub mod obs;
pub mod operation;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for tests; enabled via `cfg(test)` or the `test`
	//! crate feature.

	pub use crate::_prelude::*;

	// std
	use std::collections::VecDeque;
	// self
	use crate::operation::{Operation, OperationFuture, OperationHandle, OperationStatusEndpoint};

	/// Status endpoint that replays a fixed script of operation resources.
	///
	/// Once the script is exhausted the last entry keeps being returned, which models an
	/// operation that is stuck in its final observed state.
	#[derive(Debug, Default)]
	pub struct ScriptedEndpoint {
		script: Mutex<VecDeque<Operation>>,
		last: Mutex<Option<Operation>>,
		fetches: Mutex<Vec<OperationHandle>>,
	}
	impl ScriptedEndpoint {
		/// Builds an endpoint that replays the given resources in order.
		pub fn new(script: impl IntoIterator<Item = Operation>) -> Self {
			Self { script: Mutex::new(script.into_iter().collect()), ..Default::default() }
		}

		/// Builds an endpoint from raw status strings, none of which carry an error payload.
		pub fn from_statuses<'a>(statuses: impl IntoIterator<Item = &'a str>) -> Self {
			Self::new(statuses.into_iter().map(operation_with_status))
		}

		/// Number of fetches served so far.
		pub fn fetch_count(&self) -> usize {
			self.fetches.lock().len()
		}

		/// Handles seen by the endpoint, in fetch order.
		pub fn fetched_handles(&self) -> Vec<OperationHandle> {
			self.fetches.lock().clone()
		}
	}
	impl OperationStatusEndpoint for ScriptedEndpoint {
		fn fetch<'a>(&'a self, handle: &'a OperationHandle) -> OperationFuture<'a> {
			Box::pin(async move {
				self.fetches.lock().push(handle.clone());

				let next = self.script.lock().pop_front();
				let mut last = self.last.lock();

				if let Some(operation) = next {
					*last = Some(operation);
				}

				Ok(last.clone().unwrap_or_else(|| operation_with_status("PENDING")))
			})
		}
	}

	/// Minimal zonal operation resource carrying `status` and no error payload.
	pub fn operation_with_status(status: &str) -> Operation {
		Operation {
			name: "operation-1700000000000-disk-create".into(),
			status: status.into(),
			zone: Some("https://compute.example.com/compute/v1/projects/demo/zones/us-central1-a".into()),
			self_link: Some(
				Url::parse(
					"https://compute.example.com/compute/v1/projects/demo/zones/us-central1-a/operations/operation-1700000000000-disk-create",
				)
				.expect("Fixture self link should parse."),
			),
			..Default::default()
		}
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::{Map as JsonMap, Value};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
