//! Adapter-level error types shared by the codec, provider clients, and the facade.

// self
use crate::{_prelude::*, obs::OperationKind};

/// Adapter-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn StdError + Send + Sync>;

/// Canonical adapter error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Missing or invalid configuration.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Network or encoding failure while reaching the provider.
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Provider answered with a non-success status the adapter does not tolerate.
	#[error("Provider rejected the {operation} request with HTTP {status}: {message}.")]
	ProviderRejected {
		/// Operation that issued the request.
		operation: OperationKind,
		/// HTTP status code, when available.
		status: u16,
		/// Provider error description or a preview of the response body.
		message: String,
	},
	/// Provider does not know the requested client.
	#[error("Client `{client_id}` is not registered with the provider ({operation}).")]
	NotFound {
		/// Operation that issued the request.
		operation: OperationKind,
		/// Client identifier that could not be found.
		client_id: String,
	},
	/// Operation is part of the host contract but not implemented by this provider.
	#[error("The {operation} operation is not supported by this key manager.")]
	Unsupported {
		/// Host-contract operation name.
		operation: &'static str,
	},
	/// Operation requires a client identifier but none was supplied.
	#[error("The {operation} operation requires a client identifier.")]
	MissingClientId {
		/// Operation that required the identifier.
		operation: OperationKind,
	},
}

/// Configuration and validation failures raised by the adapter.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Required configuration parameter is absent or blank.
	#[error("Configuration parameter `{name}` is required.")]
	MissingParameter {
		/// Parameter key.
		name: &'static str,
	},
	/// Configuration parameter is not a valid URL.
	#[error("Configuration parameter `{name}` is not a valid URL.")]
	InvalidUrl {
		/// Parameter key.
		name: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Configuration URL uses a scheme other than HTTP(S).
	#[error("Configuration parameter `{name}` must use http or https: {url}.")]
	UnsupportedScheme {
		/// Parameter key.
		name: &'static str,
		/// Offending URL.
		url: String,
	},
	/// Timeout parameter is not a positive number of seconds.
	#[error("Configuration parameter `{name}` must be a positive number of seconds, got `{value}`.")]
	InvalidTimeout {
		/// Parameter key.
		name: &'static str,
		/// Raw value supplied by the host.
		value: String,
	},
	/// An operation was invoked before [`load_configuration`](crate::manager::KeyManager::load_configuration).
	#[error("Key manager has not been configured.")]
	NotConfigured,
	/// Configuration may only be loaded once.
	#[error("Key manager has already been configured.")]
	AlreadyConfigured,
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Token endpoint response omitted `expires_in`.
	#[error("Token endpoint response is missing expires_in.")]
	MissingExpiresIn,
	/// Token endpoint returned an excessively large `expires_in`.
	#[error("The expires_in value exceeds the supported range.")]
	ExpiresInOutOfRange,
	/// Token endpoint returned a non-positive duration.
	#[error("The expires_in value must be positive.")]
	NonPositiveExpiresIn,
	/// Scopes cannot be normalized.
	#[error("Scopes are invalid.")]
	InvalidScope(#[from] crate::auth::ScopeValidationError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}

/// Transport-level failures (network, IO, payload encoding).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the provider.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Request timed out before the provider answered.
	#[error("Request to the provider timed out during {operation}.")]
	Timeout {
		/// Operation that issued the request.
		operation: OperationKind,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the provider.")]
	Io(#[from] std::io::Error),
	/// Provider responded without a body where one is required.
	#[error("Provider returned an empty body for {operation} (HTTP {status}).")]
	EmptyBody {
		/// Operation that issued the request.
		operation: OperationKind,
		/// HTTP status code.
		status: u16,
	},
	/// Provider responded with JSON that could not be decoded.
	#[error("Provider returned malformed JSON for {operation}.")]
	Decode {
		/// Operation that issued the request.
		operation: OperationKind,
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Provider response lacks a field the operation needs.
	#[error("Provider response for {operation} is missing `{field}`.")]
	MissingField {
		/// Operation that issued the request.
		operation: OperationKind,
		/// Missing field name.
		field: &'static str,
	},
	/// Provider-side OAuth error or unexpected response from the `oauth2` client.
	#[error("Token endpoint returned an unexpected response: {message}.")]
	Unexpected {
		/// Summary of the failure.
		message: String,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
