//! Token assertions: secrets, the unsigned request model, and the builder that assembles it.

pub mod builder;
pub mod request;
pub mod secret;
