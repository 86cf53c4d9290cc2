//! Auth-domain identifiers, scope declarations, credentials, and token assertions.

pub mod credentials;
pub mod id;
pub mod resolver;
pub mod scope;
pub mod signer;
pub mod token;

pub use credentials::*;
pub use id::*;
pub use resolver::*;
pub use scope::*;
pub use signer::*;
pub use token::{builder::*, request::*, secret::*};
