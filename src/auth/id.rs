//! Strongly typed identifiers for projects, locations, operations, and service accounts.
//!
//! Every identifier ends up either in a URL path or in the `iss` claim, so all kinds reject
//! empty values, whitespace, and `/`. Location names are further limited to the lowercase
//! alphabet the provider uses, and service-account identities must look like an email.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

macro_rules! def_id {
	($name:ident, $doc:literal, $kind:literal, $rule:expr) => {
		#[doc = $doc]
		#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $name(String);
		impl $name {
			const RULE: IdRule = $rule;

			/// Creates a new identifier after validation.
			pub fn new(value: impl Into<String>) -> Result<Self, IdentifierError> {
				let value = value.into();

				Self::RULE.check($kind, &value)?;

				Ok(Self(value))
			}
		}
		impl Deref for $name {
			type Target = str;

			fn deref(&self) -> &Self::Target {
				&self.0
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
		impl Borrow<str> for $name {
			fn borrow(&self) -> &str {
				&self.0
			}
		}
		impl From<$name> for String {
			fn from(value: $name) -> Self {
				value.0
			}
		}
		impl TryFrom<String> for $name {
			type Error = IdentifierError;

			fn try_from(value: String) -> Result<Self, Self::Error> {
				Self::new(value)
			}
		}
		impl FromStr for $name {
			type Err = IdentifierError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::new(s)
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, concat!($kind, "({})"), self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
	};
}

const IDENTIFIER_MAX_LEN: usize = 256;

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("{kind} identifier cannot be empty.")]
	Empty {
		/// Kind of identifier (project, zone, operation, ...).
		kind: &'static str,
	},
	/// The identifier contains whitespace characters.
	#[error("{kind} identifier contains whitespace.")]
	ContainsWhitespace {
		/// Kind of identifier.
		kind: &'static str,
	},
	/// The identifier contains a path separator.
	#[error("{kind} identifier contains a path separator.")]
	ContainsSeparator {
		/// Kind of identifier.
		kind: &'static str,
	},
	/// A location name used a character outside `[a-z0-9-]`.
	#[error("{kind} identifier contains the disallowed character `{character}`.")]
	InvalidCharacter {
		/// Kind of identifier.
		kind: &'static str,
		/// First offending character.
		character: char,
	},
	/// A service-account identity lacked its `user@domain` shape.
	#[error("{kind} identifier must be an email address.")]
	NotAnEmail {
		/// Kind of identifier.
		kind: &'static str,
	},
	/// The identifier exceeded the allowed length.
	#[error("{kind} identifier exceeds {max} bytes.")]
	TooLong {
		/// Kind of identifier.
		kind: &'static str,
		/// Maximum permitted length in bytes.
		max: usize,
	},
}

#[derive(Clone, Copy, Debug)]
enum IdRule {
	Opaque,
	Location,
	Email,
}
impl IdRule {
	fn check(self, kind: &'static str, view: &str) -> Result<(), IdentifierError> {
		if view.is_empty() {
			return Err(IdentifierError::Empty { kind });
		}
		if view.len() > IDENTIFIER_MAX_LEN {
			return Err(IdentifierError::TooLong { kind, max: IDENTIFIER_MAX_LEN });
		}
		if view.chars().any(char::is_whitespace) {
			return Err(IdentifierError::ContainsWhitespace { kind });
		}
		if view.contains('/') {
			return Err(IdentifierError::ContainsSeparator { kind });
		}

		match self {
			IdRule::Opaque => Ok(()),
			IdRule::Location => match view
				.chars()
				.find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-'))
			{
				Some(character) => Err(IdentifierError::InvalidCharacter { kind, character }),
				None => Ok(()),
			},
			IdRule::Email => match view.split_once('@') {
				Some((user, domain)) if !user.is_empty() && domain.contains('.') => Ok(()),
				_ => Err(IdentifierError::NotAnEmail { kind }),
			},
		}
	}
}

def_id! { ProjectId, "Cloud project that owns the resources and operations.", "Project", IdRule::Opaque }
def_id! { ZoneName, "Zone name such as `us-central1-a`.", "Zone", IdRule::Location }
def_id! { RegionName, "Region name such as `us-central1`.", "Region", IdRule::Location }
def_id! { OperationId, "Provider-assigned name of a long-running operation.", "Operation", IdRule::Opaque }
def_id! {
	ServiceAccountId,
	"Service-account email used as the assertion issuer.",
	"ServiceAccount",
	IdRule::Email
}
