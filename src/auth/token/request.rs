//! Unsigned token request: JOSE header plus an insertion-ordered claim set.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Serializer, ser::SerializeMap};
// self
use crate::_prelude::*;

/// Issuer claim name.
pub const ISSUER: &str = "iss";
/// Scope claim name.
pub const SCOPE: &str = "scope";
/// Audience claim name.
pub const AUDIENCE: &str = "aud";
/// Expiration-time claim name.
pub const EXPIRATION_TIME: &str = "exp";
/// Issued-at claim name.
pub const ISSUED_AT: &str = "iat";

/// JOSE header of an assertion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
	/// Signature algorithm identifier, e.g. `RS256`.
	#[serde(rename = "alg")]
	pub algorithm: String,
	/// Token type; always `JWT` for assertions built by this crate.
	#[serde(rename = "typ")]
	pub token_type: String,
}
impl Header {
	/// Token type written into every assertion header.
	pub const JWT: &'static str = "JWT";

	/// Creates a `JWT` header for `algorithm`.
	pub fn jwt(algorithm: impl Into<String>) -> Self {
		Self { algorithm: algorithm.into(), token_type: Self::JWT.into() }
	}
}

/// Insertion-ordered claim set with unique keys.
///
/// Re-inserting an existing key replaces its value but keeps the key's original position, so
/// the serialized object is stable regardless of how many overrides were applied.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClaimSet(Vec<(String, Value)>);
impl ClaimSet {
	/// Builds a claim set from ordered pairs; later duplicates override earlier ones.
	pub fn from_pairs<I, K>(pairs: I) -> Self
	where
		I: IntoIterator<Item = (K, Value)>,
		K: Into<String>,
	{
		Self::default().overlay(pairs)
	}

	/// Applies every pair on top of the current claims and returns the result.
	pub fn overlay<I, K>(mut self, pairs: I) -> Self
	where
		I: IntoIterator<Item = (K, Value)>,
		K: Into<String>,
	{
		for (name, value) in pairs {
			self.insert(name, value);
		}

		self
	}

	/// Inserts or replaces a claim, returning the previous value.
	pub fn insert(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
		let name = name.into();

		match self.0.iter_mut().find(|(key, _)| *key == name) {
			Some((_, slot)) => Some(std::mem::replace(slot, value)),
			None => {
				self.0.push((name, value));

				None
			},
		}
	}

	/// Looks up a claim by name.
	pub fn get(&self, name: &str) -> Option<&Value> {
		self.0.iter().find(|(key, _)| key == name).map(|(_, value)| value)
	}

	/// Claim names in serialization order.
	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.0.iter().map(|(key, _)| key.as_str())
	}

	/// Claims in serialization order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
		self.0.iter().map(|(key, value)| (key.as_str(), value))
	}

	/// Number of claims.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns true if no claims are present.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl Serialize for ClaimSet {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		let mut map = serializer.serialize_map(Some(self.0.len()))?;

		for (name, value) in &self.0 {
			map.serialize_entry(name, value)?;
		}

		map.end()
	}
}

/// Header and claims ready to be signed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TokenRequest {
	/// JOSE header.
	pub header: Header,
	/// Ordered claims.
	pub claims: ClaimSet,
}
impl TokenRequest {
	/// Pairs a header with its claims.
	pub fn new(header: Header, claims: ClaimSet) -> Self {
		Self { header, claims }
	}

	/// `iat` claim as seconds since the epoch, when numeric.
	pub fn issued_at(&self) -> Option<i64> {
		self.claims.get(ISSUED_AT).and_then(Value::as_i64)
	}

	/// `exp` claim as seconds since the epoch, when numeric.
	pub fn expires_at(&self) -> Option<i64> {
		self.claims.get(EXPIRATION_TIME).and_then(Value::as_i64)
	}

	/// `scope` claim, when it is a string.
	pub fn scope(&self) -> Option<&str> {
		self.claims.get(SCOPE).and_then(Value::as_str)
	}

	/// Compact JWS signing input: `base64url(header) "." base64url(claims)` without padding.
	pub fn signing_input(&self) -> Result<String, serde_json::Error> {
		let header = serde_json::to_vec(&self.header)?;
		let claims = serde_json::to_vec(&self.claims)?;

		Ok(format!("{}.{}", URL_SAFE_NO_PAD.encode(header), URL_SAFE_NO_PAD.encode(claims)))
	}
}
