//! Scope declarations attached to API owners and methods.

// std
use std::slice::Iter;
// crates.io
use serde::{Deserializer, Serializer, de::Error as DeError, ser::SerializeSeq};
// self
use crate::_prelude::*;

/// Delimiter used when a declaration is rendered into a `scope` claim.
pub const SCOPE_DELIMITER: char = ',';

/// Errors emitted when validating scopes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum ScopeValidationError {
	/// A declaration must name at least one scope.
	#[error("Scope declarations must contain at least one scope.")]
	NoScopes,
	/// Empty scope entries are not allowed.
	#[error("Scope entries cannot be empty.")]
	Empty,
	/// Scopes cannot contain embedded whitespace characters.
	#[error("Scope contains whitespace: {scope}.")]
	ContainsWhitespace {
		/// The offending scope string.
		scope: String,
	},
	/// Scopes cannot contain the join delimiter.
	#[error("Scope contains the `,` delimiter: {scope}.")]
	ContainsDelimiter {
		/// The offending scope string.
		scope: String,
	},
}

/// Ordered, non-empty list of OAuth scopes declared for an owner or a method.
///
/// Declaration order is preserved and duplicates are kept as written, so the joined claim
/// reproduces the declaration exactly.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ScopeList {
	scopes: Arc<[String]>,
}
impl ScopeList {
	/// Creates a validated scope list from any iterator.
	pub fn new<I, S>(scopes: I) -> Result<Self, ScopeValidationError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let mut buf = Vec::new();

		for scope in scopes {
			let owned: String = scope.into();

			validate(&owned)?;
			buf.push(owned);
		}

		if buf.is_empty() {
			return Err(ScopeValidationError::NoScopes);
		}

		Ok(Self { scopes: Arc::from(buf) })
	}

	/// Number of declared scopes.
	pub fn len(&self) -> usize {
		self.scopes.len()
	}

	/// Always false; declarations are never empty.
	pub fn is_empty(&self) -> bool {
		self.scopes.is_empty()
	}

	/// Iterator over declared scopes.
	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.scopes.iter().map(|s| s.as_str())
	}

	/// Renders the `scope` claim value (comma-joined, declaration order).
	pub fn joined(&self) -> String {
		let mut buf = String::new();

		for (idx, value) in self.scopes.iter().enumerate() {
			if idx > 0 {
				buf.push(SCOPE_DELIMITER);
			}

			buf.push_str(value);
		}

		buf
	}

	/// Returns the underlying slice of scope strings.
	pub fn as_slice(&self) -> &[String] {
		&self.scopes
	}
}
impl Debug for ScopeList {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("ScopeList").field(&self.scopes).finish()
	}
}
impl Display for ScopeList {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.joined())
	}
}

/// Iterator over scope strings.
pub struct ScopeIter<'a> {
	inner: Iter<'a, String>,
}
impl<'a> Iterator for ScopeIter<'a> {
	type Item = &'a str;

	fn next(&mut self) -> Option<Self::Item> {
		self.inner.next().map(|s| s.as_str())
	}
}
impl<'a> IntoIterator for &'a ScopeList {
	type IntoIter = ScopeIter<'a>;
	type Item = &'a str;

	fn into_iter(self) -> Self::IntoIter {
		ScopeIter { inner: self.scopes.iter() }
	}
}
impl TryFrom<Vec<String>> for ScopeList {
	type Error = ScopeValidationError;

	fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}
impl FromStr for ScopeList {
	type Err = ScopeValidationError;

	/// Parses a comma-joined declaration such as `"compute,devstorage.read_only"`.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s.split(SCOPE_DELIMITER))
	}
}
impl Serialize for ScopeList {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		let mut seq = serializer.serialize_seq(Some(self.scopes.len()))?;

		for scope in self.scopes.iter() {
			seq.serialize_element(scope)?;
		}

		seq.end()
	}
}
impl<'de> Deserialize<'de> for ScopeList {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let values = <Vec<String>>::deserialize(deserializer)?;

		ScopeList::new(values).map_err(DeError::custom)
	}
}

fn validate(scope: &str) -> Result<(), ScopeValidationError> {
	if scope.is_empty() {
		return Err(ScopeValidationError::Empty);
	}
	if scope.chars().any(char::is_whitespace) {
		return Err(ScopeValidationError::ContainsWhitespace { scope: scope.to_owned() });
	}
	if scope.contains(SCOPE_DELIMITER) {
		return Err(ScopeValidationError::ContainsDelimiter { scope: scope.to_owned() });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	const COMPUTE: &str = "https://www.googleapis.com/auth/compute";
	const COMPUTE_RO: &str = "https://www.googleapis.com/auth/compute.readonly";

	#[test]
	fn joined_preserves_declaration_order() {
		let scopes = ScopeList::new([COMPUTE_RO, COMPUTE]).expect("Scope list should be valid.");

		assert_eq!(scopes.joined(), format!("{COMPUTE_RO},{COMPUTE}"));
		assert_eq!(scopes.iter().collect::<Vec<_>>(), vec![COMPUTE_RO, COMPUTE]);
	}

	#[test]
	fn declarations_must_be_non_empty_and_clean() {
		assert_eq!(
			ScopeList::new(Vec::<String>::new()).expect_err("Empty declarations must fail."),
			ScopeValidationError::NoScopes
		);
		assert_eq!(ScopeList::new([""]).expect_err("Blank entries must fail."), ScopeValidationError::Empty);
		assert!(matches!(
			ScopeList::new(["a b"]),
			Err(ScopeValidationError::ContainsWhitespace { .. })
		));
		assert!(matches!(
			ScopeList::new(["a,b"]),
			Err(ScopeValidationError::ContainsDelimiter { .. })
		));
	}

	#[test]
	fn from_str_splits_on_delimiter() {
		let scopes = ScopeList::from_str("compute,storage").expect("Joined scopes should parse.");

		assert_eq!(scopes.len(), 2);
		assert_eq!(scopes.to_string(), "compute,storage");
		assert!(ScopeList::from_str("compute,,storage").is_err());
	}

	#[test]
	fn serde_enforces_validation() {
		let scopes: ScopeList =
			serde_json::from_str("[\"compute\",\"storage\"]").expect("Scope list should deserialize.");

		assert_eq!(serde_json::to_string(&scopes).expect("Scope list should serialize."), "[\"compute\",\"storage\"]");
		assert!(serde_json::from_str::<ScopeList>("[]").is_err());
	}
}
