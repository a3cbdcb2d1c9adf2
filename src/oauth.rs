//! Client-credentials exchange used to authenticate management API calls.

pub use oauth2;

// crates.io
use oauth2::{
	AuthType, ClientId, ClientSecret, HttpClientError, RequestTokenError, TokenResponse, TokenUrl,
	basic::{BasicClient, BasicErrorResponse, BasicRequestTokenError},
};
// self
use crate::{
	_prelude::*,
	auth::Secret,
	error::{ConfigError, TransportError},
	http::{ReqwestHttpClient, ResponseMetadata, ResponseMetadataSlot, map_reqwest_error},
	obs::OperationKind,
};

const KIND: OperationKind = OperationKind::ManagementToken;

/// Bearer token issued to the adapter for management API calls.
#[derive(Clone, Debug)]
pub struct ManagementToken {
	/// Access token value.
	pub access_token: Secret,
	/// Instant the token stops being valid.
	pub expires_at: OffsetDateTime,
}
impl ManagementToken {
	/// Returns true when the token expires within `window` of `now`.
	pub fn expires_within(&self, window: Duration, now: OffsetDateTime) -> bool {
		self.expires_at - now <= window
	}
}

/// Credentials and endpoint for the management token exchange.
#[derive(Clone, Debug)]
pub struct ManagementCredentials {
	/// Provider token endpoint.
	pub token_endpoint: Url,
	/// Adapter client identifier.
	pub client_id: String,
	/// Adapter client secret.
	pub client_secret: Secret,
	/// Management API audience.
	pub audience: String,
}
impl ManagementCredentials {
	/// Performs the `client_credentials` grant with the management audience.
	///
	/// Client credentials travel in the request body, which the provider requires for
	/// audience-scoped grants.
	pub async fn exchange(&self, http_client: &ReqwestHttpClient) -> Result<ManagementToken> {
		let token_url = TokenUrl::new(self.token_endpoint.to_string())
			.map_err(|source| ConfigError::InvalidUrl { name: crate::config::TOKEN_ENDPOINT, source })?;
		let oauth_client = BasicClient::new(ClientId::new(self.client_id.clone()))
			.set_client_secret(ClientSecret::new(self.client_secret.expose().to_owned()))
			.set_token_uri(token_url)
			.set_auth_type(AuthType::RequestBody);
		let meta = ResponseMetadataSlot::default();
		let instrumented = http_client.instrumented(meta.clone());
		let response = oauth_client
			.exchange_client_credentials()
			.add_extra_param("audience", self.audience.as_str())
			.request_async(&instrumented)
			.await
			.map_err(|err| map_request_error(meta.take(), err))?;
		let expires_in = response.expires_in().ok_or(ConfigError::MissingExpiresIn)?.as_secs();

		Ok(ManagementToken {
			access_token: Secret::new(response.access_token().secret().to_owned()),
			expires_at: expiry_after(OffsetDateTime::now_utc(), expires_in)?,
		})
	}
}

/// Resolves `expires_in` seconds against `issued_at`, rejecting zero and out-of-range values.
fn expiry_after(issued_at: OffsetDateTime, expires_in: u64) -> Result<OffsetDateTime> {
	let expires_in = i64::try_from(expires_in).map_err(|_| ConfigError::ExpiresInOutOfRange)?;

	if expires_in <= 0 {
		return Err(ConfigError::NonPositiveExpiresIn.into());
	}

	issued_at
		.checked_add(Duration::seconds(expires_in))
		.ok_or_else(|| ConfigError::ExpiresInOutOfRange.into())
}

fn map_request_error(
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<ReqwestError>>,
) -> Error {
	let status = meta.and_then(|value| value.status);

	match err {
		RequestTokenError::ServerResponse(response) => map_server_response_error(response, status),
		RequestTokenError::Request(error) => map_transport_error(error),
		RequestTokenError::Parse(source, _body) =>
			TransportError::Decode { operation: KIND, status, source }.into(),
		RequestTokenError::Other(message) => TransportError::Unexpected { message }.into(),
	}
}

fn map_server_response_error(response: BasicErrorResponse, status: Option<u16>) -> Error {
	let message = match response.error_description() {
		Some(description) => description.clone(),
		None => response.error().as_ref().to_string(),
	};

	Error::ProviderRejected { operation: KIND, status: status.unwrap_or(400), message }
}

fn map_transport_error(err: HttpClientError<ReqwestError>) -> Error {
	match err {
		HttpClientError::Reqwest(inner) => map_reqwest_error(KIND, *inner),
		HttpClientError::Http(inner) => ConfigError::from(inner).into(),
		HttpClientError::Io(inner) => TransportError::Io(inner).into(),
		HttpClientError::Other(message) => TransportError::Unexpected { message }.into(),
		_ => TransportError::Unexpected {
			message: "HTTP client error occurred while calling the token endpoint".into(),
		}
		.into(),
	}
}
