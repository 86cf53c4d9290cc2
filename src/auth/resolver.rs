//! Per-call scope resolution.
//!
//! API owners (for example a disk or instance API) and their individual methods register the
//! scopes they require in a [`ScopeTable`]. [`ScopeResolver`] answers the scope for a
//! [`CallSite`] with a strict precedence: the method declaration, else the owner declaration,
//! else the global default. Tiers are never merged, so a method can narrow or widen the
//! permissions its owner declares.

// std
use std::borrow::Cow;
// self
use crate::{
	_prelude::*,
	auth::{ScopeList, ScopeValidationError},
	error::ConfigError,
};

/// Identifies the API method an outgoing request belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CallSite {
	/// Owning API type, e.g. `DiskApi`.
	pub owner: Cow<'static, str>,
	/// Method name, e.g. `create`.
	pub method: Cow<'static, str>,
}
impl CallSite {
	/// Creates a call site for `owner::method`.
	pub fn new(owner: impl Into<Cow<'static, str>>, method: impl Into<Cow<'static, str>>) -> Self {
		Self { owner: owner.into(), method: method.into() }
	}
}
impl Display for CallSite {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{}::{}", self.owner, self.method)
	}
}

/// Registration table of owner- and method-level scope declarations.
#[derive(Clone, Debug, Default)]
pub struct ScopeTable {
	owners: HashMap<String, ScopeList>,
	methods: HashMap<String, HashMap<String, ScopeList>>,
}
impl ScopeTable {
	/// Creates an empty table.
	pub fn new() -> Self {
		Self::default()
	}

	/// Declares the scopes every method of `owner` requires unless the method overrides them.
	pub fn declare_owner<I, S>(
		mut self,
		owner: impl Into<String>,
		scopes: I,
	) -> Result<Self, ScopeValidationError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.owners.insert(owner.into(), ScopeList::new(scopes)?);

		Ok(self)
	}

	/// Declares the scopes a single method requires, shadowing its owner's declaration.
	pub fn declare_method<I, S>(
		mut self,
		owner: impl Into<String>,
		method: impl Into<String>,
		scopes: I,
	) -> Result<Self, ScopeValidationError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.methods.entry(owner.into()).or_default().insert(method.into(), ScopeList::new(scopes)?);

		Ok(self)
	}

	/// Scopes declared directly on the method, if any.
	pub fn method_scopes(&self, call_site: &CallSite) -> Option<&ScopeList> {
		self.methods.get(call_site.owner.as_ref())?.get(call_site.method.as_ref())
	}

	/// Scopes declared on the owner, if any.
	pub fn owner_scopes(&self, call_site: &CallSite) -> Option<&ScopeList> {
		self.owners.get(call_site.owner.as_ref())
	}

	/// Returns true when nothing has been declared.
	pub fn is_empty(&self) -> bool {
		self.owners.is_empty() && self.methods.is_empty()
	}
}

/// Resolves the `scope` claim for a call site.
#[derive(Clone, Debug, Default)]
pub struct ScopeResolver {
	table: Arc<ScopeTable>,
	global_default: Option<String>,
}
impl ScopeResolver {
	/// Builds a resolver over `table` with an optional process-wide default.
	///
	/// Blank defaults are treated as absent.
	pub fn new(table: impl Into<Arc<ScopeTable>>, global_default: Option<String>) -> Self {
		let global_default = global_default.filter(|scope| !scope.trim().is_empty());

		Self { table: table.into(), global_default }
	}

	/// Returns the comma-joined scope string required by `call_site`.
	pub fn resolve(&self, call_site: &CallSite) -> Result<String> {
		if let Some(scopes) = self.table.method_scopes(call_site) {
			return Ok(scopes.joined());
		}
		if let Some(scopes) = self.table.owner_scopes(call_site) {
			return Ok(scopes.joined());
		}
		if let Some(scope) = self.global_default.as_ref() {
			return Ok(scope.clone());
		}

		Err(ConfigError::MissingScopeConfiguration {
			owner: call_site.owner.to_string(),
			method: call_site.method.to_string(),
		}
		.into())
	}

	/// The configured global default, if any.
	pub fn global_default(&self) -> Option<&str> {
		self.global_default.as_deref()
	}
}
