//! Application token exchange at the provider token endpoint.

// self
use crate::{
	_prelude::*,
	http::ReqwestHttpClient,
	obs::OperationKind,
	provider::{ProviderFuture, ProviderTokenRequest, ProviderTokenResponse},
};

const KIND: OperationKind = OperationKind::IssueToken;
const OK: u16 = 200;
const FORBIDDEN: u16 = 403;

/// Raw result of a token exchange, before translation into platform types.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenExchange {
	/// HTTP 200 with a decoded token response.
	Issued(ProviderTokenResponse),
	/// HTTP 403: the client is not authorized for the requested audience.
	Forbidden,
}

/// Exchanges client credentials for access tokens.
pub trait TokenBroker
where
	Self: Send + Sync,
{
	/// Performs one token request.
	///
	/// Only HTTP 200 and 403 produce a [`TokenExchange`]; every other status, an empty body, or a
	/// transport failure is an error.
	fn issue_token<'a>(&'a self, request: &'a ProviderTokenRequest) -> ProviderFuture<'a, TokenExchange>;
}

/// [`TokenBroker`] that posts JSON to the configured token endpoint.
///
/// Client credentials travel inside the JSON body, so no interceptor is involved.
#[derive(Clone)]
pub struct TokenEndpointBroker {
	http_client: ReqwestHttpClient,
	token_endpoint: Url,
}
impl TokenEndpointBroker {
	/// Creates a broker for the provided token endpoint.
	pub fn new(http_client: ReqwestHttpClient, token_endpoint: Url) -> Self {
		Self { http_client, token_endpoint }
	}
}
impl TokenBroker for TokenEndpointBroker {
	fn issue_token<'a>(&'a self, request: &'a ProviderTokenRequest) -> ProviderFuture<'a, TokenExchange> {
		Box::pin(async move {
			let builder = self.http_client.post(self.token_endpoint.clone()).json(request);
			let response = self.http_client.dispatch(KIND, builder).await?;

			match response.status {
				OK => Ok(TokenExchange::Issued(response.json(KIND)?)),
				FORBIDDEN => {
					tracing::warn!(
						client_id = request.client_id.as_str(),
						audience = request.audience.as_str(),
						"Token endpoint refused the client for this audience."
					);

					Ok(TokenExchange::Forbidden)
				},
				_ => Err(response.rejected(KIND)),
			}
		})
	}
}
impl Debug for TokenEndpointBroker {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenEndpointBroker")
			.field("token_endpoint", &self.token_endpoint.as_str())
			.finish()
	}
}
