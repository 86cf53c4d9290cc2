//! Extension contracts for attaching issued tokens to outbound requests.
//!
//! The trait stays generic over the request type so downstream services can bring their own HTTP
//! client; the reqwest adapter ships behind the `reqwest` feature.

pub mod request_signer;

pub use request_signer::*;
