//! Application lifecycle operations.

// self
use crate::{
	_prelude::*,
	auth::Secret,
	codec,
	error::TransportError,
	manager::KeyManager,
	obs::{self, OperationKind},
	platform::{AccessTokenRequest, OAuthApplicationInfo},
	provider::ProviderClientInfo,
};

impl KeyManager {
	/// Registers a new OAuth client for the platform application.
	///
	/// The resource server is reconciled first. The returned descriptor carries the
	/// provider-assigned client id and secret.
	pub async fn create_application(
		&self,
		application: &OAuthApplicationInfo,
	) -> Result<OAuthApplicationInfo> {
		obs::observe(OperationKind::CreateApplication, "create_application", async move {
			let configured = self.configured()?;

			configured.reconcile_resource_server().await;

			let client = ProviderClientInfo {
				client_id: None,
				client_secret: None,
				..codec::to_provider_client_info(application)
			};
			let created = configured.components.registrar.create(&client).await?;

			tracing::info!(
				client_name = created.client_name.as_deref().unwrap_or_default(),
				client_id = created.client_id.as_deref().unwrap_or_default(),
				"Client registered."
			);

			Ok(codec::to_oauth_application_info(&created))
		})
		.await
	}

	/// Updates an existing client. The application's current secret is carried into the payload.
	pub async fn update_application(
		&self,
		application: &OAuthApplicationInfo,
	) -> Result<OAuthApplicationInfo> {
		const KIND: OperationKind = OperationKind::UpdateApplication;

		obs::observe(KIND, "update_application", async move {
			let configured = self.configured()?;
			let client_id = codec::require_client_id(KIND, application.client_id.as_deref())?;

			configured.reconcile_resource_server().await;

			let client =
				ProviderClientInfo { client_id: None, ..codec::to_provider_client_info(application) };
			let updated = configured.components.registrar.update(client_id, &client).await?;

			Ok(codec::to_oauth_application_info(&updated))
		})
		.await
	}

	/// Deletes a client. Deleting an unknown client succeeds.
	pub async fn delete_application(&self, client_id: &str) -> Result<()> {
		const KIND: OperationKind = OperationKind::DeleteApplication;

		obs::observe(KIND, "delete_application", async move {
			let configured = self.configured()?;
			let client_id = codec::require_client_id(KIND, Some(client_id))?;

			configured.components.registrar.delete(client_id).await
		})
		.await
	}

	/// Fetches a client by id.
	pub async fn retrieve_application(&self, client_id: &str) -> Result<OAuthApplicationInfo> {
		const KIND: OperationKind = OperationKind::RetrieveApplication;

		obs::observe(KIND, "retrieve_application", async move {
			let configured = self.configured()?;
			let client_id = codec::require_client_id(KIND, Some(client_id))?;
			let client = configured.components.registrar.retrieve(client_id).await?;

			Ok(codec::to_oauth_application_info(&client))
		})
		.await
	}

	/// Rotates the client secret and returns the new one.
	pub async fn get_new_application_consumer_secret(
		&self,
		request: &AccessTokenRequest,
	) -> Result<Secret> {
		const KIND: OperationKind = OperationKind::RegenerateSecret;

		obs::observe(KIND, "get_new_application_consumer_secret", async move {
			let configured = self.configured()?;
			let client_id = codec::require_client_id(KIND, Some(request.client_id.as_str()))?;

			configured.reconcile_resource_server().await;

			let rotated = configured.components.registrar.regenerate_secret(client_id).await?;

			rotated
				.client_secret
				.filter(|secret| !secret.is_empty())
				.ok_or_else(|| {
					Error::from(TransportError::MissingField { operation: KIND, field: "client_secret" })
				})
		})
		.await
	}
}
