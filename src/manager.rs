//! Key-manager facade exposed to the host platform.
//!
//! [`KeyManager`] moves from unconfigured to configured exactly once, through
//! [`KeyManager::load_configuration`]. Every other operation fails fast with
//! [`ConfigError::NotConfigured`] before that. Once configured the facade only holds immutable
//! configuration and shared provider handles, so it can be driven from many tasks at once.

mod application;
mod token;
mod unsupported;

// std
use std::sync::OnceLock;
// self
use crate::{
	_prelude::*,
	config::KeyManagerConfiguration,
	error::ConfigError,
	http::ReqwestHttpClient,
	interceptor::{ManagementTokenInterceptor, RequestInterceptor},
	obs::{self, OperationKind},
	provider::{
		ClientRegistrar, DcrClient, ResourceProvisioner, ResourceServerClient, TokenBroker,
		TokenEndpointBroker,
	},
};

/// Type label reported to the host platform.
pub const KEY_MANAGER_TYPE: &str = "Auth0";

/// Provider clients the facade composes.
#[derive(Clone)]
pub struct KeyManagerComponents {
	/// Dynamic client registration.
	pub registrar: Arc<dyn ClientRegistrar>,
	/// Resource-server provisioning.
	pub provisioner: Arc<dyn ResourceProvisioner>,
	/// Application token exchange.
	pub broker: Arc<dyn TokenBroker>,
}
impl KeyManagerComponents {
	/// Builds the reqwest-backed clients, applying the configured transport timeouts.
	pub fn from_configuration(configuration: &KeyManagerConfiguration) -> Result<Self> {
		let http_client = ReqwestHttpClient::with_timeouts(&configuration.timeouts)?;

		Self::with_http_client(configuration, http_client)
	}

	/// Builds the clients on top of a caller-supplied HTTP client.
	///
	/// Management calls are authenticated by a [`ManagementTokenInterceptor`] derived from the
	/// configured adapter credentials.
	pub fn with_http_client(
		configuration: &KeyManagerConfiguration,
		http_client: ReqwestHttpClient,
	) -> Result<Self> {
		let interceptor = Arc::new(ManagementTokenInterceptor::from_configuration(
			configuration,
			http_client.clone(),
		));

		Self::with_interceptor(configuration, http_client, interceptor)
	}

	/// Builds the clients with an explicit management-call interceptor.
	pub fn with_interceptor(
		configuration: &KeyManagerConfiguration,
		http_client: ReqwestHttpClient,
		interceptor: Arc<dyn RequestInterceptor>,
	) -> Result<Self> {
		Ok(Self {
			registrar: Arc::new(DcrClient::new(
				http_client.clone(),
				configuration.clients_endpoint()?,
				interceptor.clone(),
			)),
			provisioner: Arc::new(ResourceServerClient::new(
				http_client.clone(),
				configuration.resource_servers_endpoint()?,
				interceptor,
			)),
			broker: Arc::new(TokenEndpointBroker::new(
				http_client,
				configuration.token_endpoint.clone(),
			)),
		})
	}
}
impl Debug for KeyManagerComponents {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("KeyManagerComponents").finish_non_exhaustive()
	}
}

/// Host-facing key manager.
#[derive(Debug, Default)]
pub struct KeyManager {
	state: OnceLock<Configured>,
}
impl KeyManager {
	/// Creates an unconfigured key manager.
	pub fn new() -> Self {
		Self::default()
	}

	/// Stores the configuration, wires the reqwest-backed provider clients, and provisions the
	/// resource server.
	pub async fn load_configuration(&self, configuration: KeyManagerConfiguration) -> Result<()> {
		let components = KeyManagerComponents::from_configuration(&configuration)?;

		self.load_configuration_with(configuration, components).await
	}

	/// Same as [`load_configuration`](Self::load_configuration) with caller-supplied components.
	pub async fn load_configuration_with(
		&self,
		configuration: KeyManagerConfiguration,
		components: KeyManagerComponents,
	) -> Result<()> {
		obs::observe(OperationKind::LoadConfiguration, "load_configuration", async move {
			self.state
				.set(Configured { configuration, components })
				.map_err(|_| ConfigError::AlreadyConfigured)?;

			let configured = self.configured()?;

			tracing::info!(
				audience = %configured.configuration.audience,
				resource_identifier = configured.configuration.resource_identifier(),
				"Key manager configured."
			);

			configured.reconcile_resource_server().await;

			Ok(())
		})
		.await
	}

	/// Returns true once a configuration has been loaded.
	pub fn is_configured(&self) -> bool {
		self.state.get().is_some()
	}

	/// Returns the loaded configuration.
	pub fn get_key_manager_configuration(&self) -> Result<&KeyManagerConfiguration> {
		Ok(&self.configured()?.configuration)
	}

	/// Stable type label of this key manager.
	pub fn key_manager_type(&self) -> &'static str {
		KEY_MANAGER_TYPE
	}

	fn configured(&self) -> Result<&Configured> {
		self.state.get().ok_or_else(|| ConfigError::NotConfigured.into())
	}
}

#[derive(Debug)]
struct Configured {
	configuration: KeyManagerConfiguration,
	components: KeyManagerComponents,
}
impl Configured {
	/// Best-effort resource-server reconciliation; failures are logged and absorbed.
	async fn reconcile_resource_server(&self) {
		let identifier = self.configuration.resource_identifier();
		let result = obs::observe(
			OperationKind::ProvisionResourceServer,
			"reconcile_resource_server",
			self.components.provisioner.ensure_resource_server(identifier),
		)
		.await;

		if let Err(e) = result {
			tracing::error!(identifier, error = %e, "Resource server provisioning failed.");
		}
	}
}
