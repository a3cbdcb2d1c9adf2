//! Transport primitives for provider calls.
//!
//! [`ReqwestHttpClient`] is the only HTTP dependency of the adapter. Management and token calls go
//! through [`ReqwestHttpClient::dispatch`], which reads the whole body before returning so every
//! connection is released on every exit path. The `oauth2` client-credentials exchange uses
//! [`InstrumentedHandle`], which records the HTTP status into a [`ResponseMetadataSlot`] so error
//! mapping can report it.

// std
use std::ops::Deref;
// crates.io
use oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse};
use reqwest::{RequestBuilder, redirect::Policy};
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	config::TransportTimeouts,
	error::{ConfigError, TransportError},
	obs::OperationKind,
};

const BODY_PREVIEW_LIMIT: usize = 256;

/// Captures metadata from the most recent HTTP response for downstream error mapping.
#[derive(Clone, Debug, Default)]
pub struct ResponseMetadata {
	/// HTTP status code returned by the provider, if available.
	pub status: Option<u16>,
}

/// Thread-safe slot for sharing [`ResponseMetadata`] between transport and error layers.
#[derive(Clone, Debug, Default)]
pub struct ResponseMetadataSlot(Arc<Mutex<Option<ResponseMetadata>>>);
impl ResponseMetadataSlot {
	/// Stores new metadata for the current request.
	pub fn store(&self, meta: ResponseMetadata) {
		*self.0.lock() = Some(meta);
	}

	/// Returns the captured metadata, if any, consuming it from the slot.
	pub fn take(&self) -> Option<ResponseMetadata> {
		self.0.lock().take()
	}
}

/// Fully read provider response.
#[derive(Clone, Debug)]
pub struct ProviderResponse {
	/// HTTP status code.
	pub status: u16,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl ProviderResponse {
	/// Returns true for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Decodes the body as JSON, reporting the failing field path on error.
	pub fn json<T>(&self, operation: OperationKind) -> Result<T>
	where
		T: DeserializeOwned,
	{
		if self.body.iter().all(u8::is_ascii_whitespace) {
			return Err(TransportError::EmptyBody { operation, status: self.status }.into());
		}

		let mut de = serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(&mut de).map_err(|source| {
			TransportError::Decode { operation, status: Some(self.status), source }.into()
		})
	}

	/// Builds the rejection error for a non-tolerated status.
	pub fn rejected(&self, operation: OperationKind) -> Error {
		Error::ProviderRejected { operation, status: self.status, message: self.message() }
	}

	/// Extracts the provider's error description, falling back to a body preview.
	pub fn message(&self) -> String {
		#[derive(Deserialize)]
		struct ErrorBody {
			message: Option<String>,
			error_description: Option<String>,
			error: Option<String>,
		}

		if let Ok(body) = serde_json::from_slice::<ErrorBody>(&self.body)
			&& let Some(message) = body.message.or(body.error_description).or(body.error)
		{
			return message;
		}

		body_preview(&String::from_utf8_lossy(&self.body))
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Provider calls never follow redirects; configure any custom [`ReqwestClient`] the same way.
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client that applies the provided timeouts and refuses redirects.
	pub fn with_timeouts(timeouts: &TransportTimeouts) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder()
			.connect_timeout(timeouts.connect)
			.timeout(timeouts.request)
			.redirect(Policy::none())
			.build()
			.map_err(ConfigError::http_client_build)?;

		Ok(Self(client))
	}

	/// Sends the request and reads the full response body.
	pub async fn dispatch(
		&self,
		operation: OperationKind,
		request: RequestBuilder,
	) -> Result<ProviderResponse> {
		let response = request.send().await.map_err(|e| map_reqwest_error(operation, e))?;
		let status = response.status().as_u16();
		let body = response.bytes().await.map_err(|e| map_reqwest_error(operation, e))?.to_vec();

		tracing::debug!(operation = operation.as_str(), status, "Provider responded.");

		Ok(ProviderResponse { status, body })
	}

	/// Builds an instrumented handle that captures response metadata for `oauth2` exchanges.
	pub(crate) fn instrumented(&self, slot: ResponseMetadataSlot) -> InstrumentedHandle {
		InstrumentedHandle::new(self.0.clone(), slot)
	}
}
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

/// Instrumented adapter that implements [`AsyncHttpClient`] for reqwest.
pub(crate) struct InstrumentedHttpClient {
	client: ReqwestClient,
	slot: ResponseMetadataSlot,
}

/// Handle returned by [`ReqwestHttpClient::instrumented`].
#[derive(Clone)]
pub struct InstrumentedHandle(Arc<InstrumentedHttpClient>);
impl InstrumentedHandle {
	fn new(client: ReqwestClient, slot: ResponseMetadataSlot) -> Self {
		Self(Arc::new(InstrumentedHttpClient { client, slot }))
	}
}
impl<'c> AsyncHttpClient<'c> for InstrumentedHandle {
	type Error = HttpClientError<ReqwestError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		let client = Arc::clone(&self.0);

		Box::pin(async move {
			client.slot.take();

			let response = client
				.client
				.execute(request.try_into().map_err(Box::new)?)
				.await
				.map_err(Box::new)?;
			let status = response.status();
			let headers = response.headers().to_owned();

			client.slot.store(ResponseMetadata { status: Some(status.as_u16()) });

			let mut response_new =
				HttpResponse::new(response.bytes().await.map_err(Box::new)?.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}

/// Maps reqwest failures into adapter errors.
pub(crate) fn map_reqwest_error(operation: OperationKind, err: ReqwestError) -> Error {
	if err.is_builder() {
		return ConfigError::http_client_build(err).into();
	}
	if err.is_timeout() {
		return TransportError::Timeout { operation }.into();
	}
	if err.is_decode() || err.is_body() {
		tracing::warn!(operation = operation.as_str(), "Provider response body could not be read.");
	}

	TransportError::from(err).into()
}

/// Truncates a response body for inclusion in error messages.
pub(crate) fn body_preview(body: &str) -> String {
	let body = body.trim();

	if body.chars().count() <= BODY_PREVIEW_LIMIT {
		return body.to_owned();
	}

	let mut buf = String::new();

	for (idx, ch) in body.chars().enumerate() {
		if idx >= BODY_PREVIEW_LIMIT {
			buf.push('…');

			break;
		}
		buf.push(ch);
	}

	buf
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn response(status: u16, body: &str) -> ProviderResponse {
		ProviderResponse { status, body: body.as_bytes().to_vec() }
	}

	#[test]
	fn empty_bodies_are_reported() {
		let err = response(200, " \n")
			.json::<serde_json::Value>(OperationKind::IssueToken)
			.expect_err("Blank body must not decode.");

		assert!(matches!(
			err,
			Error::Transport(TransportError::EmptyBody { operation: OperationKind::IssueToken, status: 200 })
		));
	}

	#[test]
	fn decode_errors_carry_the_field_path() {
		#[derive(Debug, Deserialize)]
		struct Payload {
			#[allow(dead_code)]
			expires_in: i64,
		}

		let err = response(200, "{\"expires_in\":\"soon\"}")
			.json::<Payload>(OperationKind::IssueToken)
			.expect_err("Mistyped field must not decode.");
		let Error::Transport(TransportError::Decode { source, .. }) = err else {
			panic!("Expected a decode error.");
		};

		assert_eq!(source.path().to_string(), "expires_in");
	}

	#[test]
	fn rejection_prefers_provider_message() {
		let structured = response(400, "{\"statusCode\":400,\"message\":\"Payload validation error\"}");
		let plain = response(502, "bad gateway");

		assert!(matches!(
			structured.rejected(OperationKind::CreateApplication),
			Error::ProviderRejected { status: 400, ref message, .. } if message == "Payload validation error"
		));
		assert_eq!(plain.message(), "bad gateway");
		assert!(!plain.is_success());
		assert!(response(201, "{}").is_success());
	}

	#[test]
	fn previews_are_truncated() {
		let long = "x".repeat(BODY_PREVIEW_LIMIT + 10);
		let preview = body_preview(&long);

		assert_eq!(preview.chars().count(), BODY_PREVIEW_LIMIT + 1);
		assert!(preview.ends_with('…'));
	}

	#[test]
	fn timeout_client_builds() {
		assert!(ReqwestHttpClient::with_timeouts(&TransportTimeouts::default()).is_ok());
	}
}
