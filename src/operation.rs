//! Long-running operations: handles, wire resources, status endpoints, and the poller.
//!
//! Mutating calls return an [`Operation`] resource. Convert it into an [`OperationHandle`] (or
//! pass it straight to [`OperationPoller::complete`]) and await a terminal [`PollOutcome`] before
//! reporting success to the caller.

pub mod endpoint;
pub mod handle;
pub mod poller;
pub mod resource;

pub use endpoint::*;
pub use handle::*;
pub use poller::*;
pub use resource::*;
