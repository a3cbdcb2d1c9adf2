//! Scope and API resource descriptors used by the registration half of the host contract.

// self
use crate::_prelude::*;

/// OAuth scope as modeled by the host platform.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Scope {
	/// Scope key.
	pub key: String,
	/// Display name.
	pub name: String,
	/// Roles allowed to request the scope, joined with commas.
	#[serde(default)]
	pub roles: String,
	/// Human-readable description.
	#[serde(default)]
	pub description: String,
}

/// API published on the host platform.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResource {
	/// Platform API identifier.
	pub id: String,
	/// API name.
	pub name: String,
	/// API context path.
	pub context: String,
	/// API version.
	pub version: String,
}
