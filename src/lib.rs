//! Key-manager adapter that hands OAuth 2.0 client registration, secret rotation, token issuance,
//! and resource-server provisioning to an external authorization server.
//!
//! The host platform talks to [`manager::KeyManager`]. The facade translates platform entities
//! through [`codec`] and drives the provider clients in [`provider`], whose management calls are
//! authenticated by an [`interceptor::RequestInterceptor`].

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod codec;
pub mod config;
pub mod error;
pub mod http;
pub mod interceptor;
pub mod manager;
pub mod oauth;
pub mod obs;
pub mod platform;
pub mod provider;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		config::{self, KeyManagerConfiguration},
		http::ReqwestHttpClient,
		interceptor::StaticBearerInterceptor,
		manager::{KeyManager, KeyManagerComponents},
		provider::{
			ClientRegistrar, ProviderClientInfo, ProviderFuture, ProviderTokenRequest,
			ProviderTokenResponse, ProvisionOutcome, ResourceProvisioner, TokenBroker,
			TokenExchange,
		},
	};

	/// Bearer token attached by [`static_bearer_components`].
	pub const TEST_MANAGEMENT_TOKEN: &str = "mgmt-token";

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Builds a configuration whose token endpoint is `{base}/oauth/token` and whose audience is
	/// `{base}/api/v2/`.
	pub fn test_configuration(base_url: &str) -> KeyManagerConfiguration {
		KeyManagerConfiguration::from_parameters([
			(config::TOKEN_ENDPOINT, format!("{base_url}/oauth/token")),
			(config::AUDIENCE, format!("{base_url}/api/v2/")),
			(config::CLIENT_ID, "adapter".to_owned()),
			(config::CLIENT_SECRET, "adapter-secret".to_owned()),
		])
		.expect("Test configuration should parse.")
	}

	/// Wires reqwest-backed components that authenticate management calls with
	/// [`TEST_MANAGEMENT_TOKEN`].
	pub fn static_bearer_components(configuration: &KeyManagerConfiguration) -> KeyManagerComponents {
		KeyManagerComponents::with_interceptor(
			configuration,
			test_reqwest_http_client(),
			Arc::new(StaticBearerInterceptor::new(TEST_MANAGEMENT_TOKEN)),
		)
		.expect("Static bearer components should build.")
	}

	/// Loads `configuration` into a fresh [`KeyManager`] using `components`.
	pub async fn build_test_key_manager(
		configuration: KeyManagerConfiguration,
		components: KeyManagerComponents,
	) -> KeyManager {
		let manager = KeyManager::new();

		manager
			.load_configuration_with(configuration, components)
			.await
			.expect("Test key manager should load its configuration.");

		manager
	}

	/// Builds a configured [`KeyManager`] whose provider clients are [`RecordingProvider`] stubs.
	pub async fn configured_key_manager_with_stubs() -> KeyManager {
		let provider = Arc::new(RecordingProvider::default());

		build_test_key_manager(test_configuration("https://idp.test"), provider.components()).await
	}

	/// In-memory provider that records every call and answers with canned records.
	#[derive(Debug, Default)]
	pub struct RecordingProvider {
		calls: Mutex<Vec<String>>,
	}
	impl RecordingProvider {
		/// Client id assigned by [`ClientRegistrar::create`].
		pub const CLIENT_ID: &str = "stub-client";
		/// Secret assigned by [`ClientRegistrar::create`].
		pub const CLIENT_SECRET: &str = "stub-secret";
		/// Secret returned by [`ClientRegistrar::regenerate_secret`].
		pub const ROTATED_SECRET: &str = "stub-rotated";

		/// Returns the calls recorded so far, in order.
		pub fn calls(&self) -> Vec<String> {
			self.calls.lock().clone()
		}

		/// Uses this provider for every facade component.
		pub fn components(self: &Arc<Self>) -> KeyManagerComponents {
			KeyManagerComponents {
				registrar: self.clone(),
				provisioner: self.clone(),
				broker: self.clone(),
			}
		}

		fn record(&self, call: String) {
			self.calls.lock().push(call);
		}
	}
	impl ClientRegistrar for RecordingProvider {
		fn create<'a>(
			&'a self,
			client: &'a ProviderClientInfo,
		) -> ProviderFuture<'a, ProviderClientInfo> {
			Box::pin(async move {
				self.record(format!("create:{}", client.client_name.as_deref().unwrap_or_default()));

				Ok(ProviderClientInfo {
					client_id: Some(Self::CLIENT_ID.into()),
					client_secret: Some(Self::CLIENT_SECRET.into()),
					..client.clone()
				})
			})
		}

		fn update<'a>(
			&'a self,
			client_id: &'a str,
			client: &'a ProviderClientInfo,
		) -> ProviderFuture<'a, ProviderClientInfo> {
			Box::pin(async move {
				self.record(format!("update:{client_id}"));

				Ok(ProviderClientInfo { client_id: Some(client_id.into()), ..client.clone() })
			})
		}

		fn delete<'a>(&'a self, client_id: &'a str) -> ProviderFuture<'a, ()> {
			Box::pin(async move {
				self.record(format!("delete:{client_id}"));

				Ok(())
			})
		}

		fn retrieve<'a>(&'a self, client_id: &'a str) -> ProviderFuture<'a, ProviderClientInfo> {
			Box::pin(async move {
				self.record(format!("retrieve:{client_id}"));

				Ok(ProviderClientInfo { client_id: Some(client_id.into()), ..Default::default() })
			})
		}

		fn regenerate_secret<'a>(
			&'a self,
			client_id: &'a str,
		) -> ProviderFuture<'a, ProviderClientInfo> {
			Box::pin(async move {
				self.record(format!("regenerate_secret:{client_id}"));

				Ok(ProviderClientInfo {
					client_id: Some(client_id.into()),
					client_secret: Some(Self::ROTATED_SECRET.into()),
					..Default::default()
				})
			})
		}
	}
	impl ResourceProvisioner for RecordingProvider {
		fn ensure_resource_server<'a>(
			&'a self,
			identifier: &'a str,
		) -> ProviderFuture<'a, ProvisionOutcome> {
			Box::pin(async move {
				self.record(format!("provision:{identifier}"));

				Ok(ProvisionOutcome::AlreadyExists)
			})
		}
	}
	impl TokenBroker for RecordingProvider {
		fn issue_token<'a>(
			&'a self,
			request: &'a ProviderTokenRequest,
		) -> ProviderFuture<'a, TokenExchange> {
			Box::pin(async move {
				self.record(format!("issue_token:{}", request.audience));

				Ok(TokenExchange::Issued(ProviderTokenResponse {
					access_token: "stub-token".into(),
					scope: request.scope.clone(),
					expires_in: Some(3_600),
					token_type: Some("Bearer".into()),
				}))
			})
		}
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::Mutex;
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
