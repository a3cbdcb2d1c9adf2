//! Application token issuance.

// self
use crate::{
	_prelude::*,
	codec,
	manager::KeyManager,
	obs::{self, OperationKind},
	platform::{AccessTokenRequest, TokenOutcome},
};

impl KeyManager {
	/// Exchanges the application's credentials for an access token.
	///
	/// The token audience is the platform's canonical server URL. A provider 403 is returned as
	/// [`TokenOutcome::ResourceNotAuthorized`]; any other non-200 answer is an error.
	pub async fn get_new_application_access_token(
		&self,
		request: &AccessTokenRequest,
	) -> Result<TokenOutcome> {
		const KIND: OperationKind = OperationKind::IssueToken;

		obs::observe(KIND, "get_new_application_access_token", async move {
			let configured = self.configured()?;

			codec::require_client_id(KIND, Some(request.client_id.as_str()))?;

			let wire = codec::to_provider_token_request(
				request,
				configured.configuration.resource_identifier(),
			);
			let exchange = configured.components.broker.issue_token(&wire).await?;

			codec::to_token_outcome(request, exchange)
		})
		.await
	}
}
