//! Host-contract operations this provider does not implement.
//!
//! Token introspection style calls fail with [`Error::Unsupported`]. Resource and scope
//! registration calls answer with empty or negative results so hosts that always invoke them keep
//! working. Every call still requires a loaded configuration.

// std
use std::collections::BTreeSet;
// self
use crate::{
	_prelude::*,
	manager::KeyManager,
	platform::{AccessTokenInfo, ApiResource, OAuthApplicationInfo, Scope},
};

impl KeyManager {
	/// Token metadata lookups are not offered by the provider.
	pub fn get_token_metadata(&self, _access_token: &str) -> Result<AccessTokenInfo> {
		self.unsupported("get_token_metadata")
	}

	/// Mapping an externally created client is not supported.
	pub fn map_oauth_application(
		&self,
		_application: &OAuthApplicationInfo,
	) -> Result<OAuthApplicationInfo> {
		self.unsupported("map_oauth_application")
	}

	/// Active token enumeration is not offered by the provider.
	pub fn get_active_tokens_by_consumer_key(&self, _consumer_key: &str) -> Result<BTreeSet<String>> {
		self.unsupported("get_active_tokens_by_consumer_key")
	}

	/// Token lookup by consumer key is not offered by the provider.
	pub fn get_access_token_by_consumer_key(&self, _consumer_key: &str) -> Result<AccessTokenInfo> {
		self.unsupported("get_access_token_by_consumer_key")
	}

	/// Always `false`; API resources are not registered with the provider.
	pub fn register_new_resource(
		&self,
		_api: &ApiResource,
		_attributes: &BTreeMap<String, String>,
	) -> Result<bool> {
		self.configured().map(|_| false)
	}

	/// Always empty.
	pub fn get_resource_by_api_id(&self, _api_id: &str) -> Result<BTreeMap<String, String>> {
		self.configured().map(|_| BTreeMap::new())
	}

	/// Always `false`.
	pub fn update_registered_resource(
		&self,
		_api: &ApiResource,
		_attributes: &BTreeMap<String, String>,
	) -> Result<bool> {
		self.configured().map(|_| false)
	}

	/// No-op.
	pub fn delete_registered_resource_by_api_id(&self, _api_id: &str) -> Result<()> {
		self.configured().map(drop)
	}

	/// No-op.
	pub fn delete_mapped_application(&self, _consumer_key: &str) -> Result<()> {
		self.configured().map(drop)
	}

	/// No-op; scopes are not mirrored to the provider.
	pub fn register_scope(&self, _scope: &Scope) -> Result<()> {
		self.configured().map(drop)
	}

	/// No-op.
	pub fn update_scope(&self, _scope: &Scope) -> Result<()> {
		self.configured().map(drop)
	}

	/// No-op.
	pub fn delete_scope(&self, _name: &str) -> Result<()> {
		self.configured().map(drop)
	}

	/// Always `None`.
	pub fn get_scope_by_name(&self, _name: &str) -> Result<Option<Scope>> {
		self.configured().map(|_| None)
	}

	/// Always empty.
	pub fn get_all_scopes(&self) -> Result<BTreeMap<String, Scope>> {
		self.configured().map(|_| BTreeMap::new())
	}

	/// Always empty.
	pub fn get_scopes_for_apis(&self, _api_ids: &[String]) -> Result<BTreeMap<String, BTreeSet<Scope>>> {
		self.configured().map(|_| BTreeMap::new())
	}

	/// Always `false`.
	pub fn is_scope_exists(&self, _name: &str) -> Result<bool> {
		self.configured().map(|_| false)
	}

	fn unsupported<T>(&self, operation: &'static str) -> Result<T> {
		self.configured()?;

		tracing::debug!(operation, "Unsupported key-manager operation invoked.");

		Err(Error::Unsupported { operation })
	}
}
