//! Key-manager configuration parsed from the host platform's parameter bag.

// std
use std::time::Duration as StdDuration;
// self
use crate::{_prelude::*, auth::Secret, error::ConfigError};

/// Parameter key holding the provider token endpoint.
pub const TOKEN_ENDPOINT: &str = "token_endpoint";
/// Parameter key holding the management API base URL (audience).
pub const AUDIENCE: &str = "audience";
/// Parameter key holding the adapter's own client identifier.
pub const CLIENT_ID: &str = "client_id";
/// Parameter key holding the adapter's own client secret.
pub const CLIENT_SECRET: &str = "client_secret";
/// Parameter key holding the platform's canonical server URL.
pub const SERVER_URL: &str = "server_url";
/// Parameter key holding the connect timeout in seconds.
pub const CONNECT_TIMEOUT: &str = "connect_timeout";
/// Parameter key holding the overall request timeout in seconds.
pub const REQUEST_TIMEOUT: &str = "request_timeout";

/// Timeouts applied to every outbound provider call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransportTimeouts {
	/// Maximum time spent establishing a connection.
	pub connect: StdDuration,
	/// Maximum time for a whole request/response exchange.
	pub request: StdDuration,
}
impl Default for TransportTimeouts {
	fn default() -> Self {
		Self { connect: StdDuration::from_secs(10), request: StdDuration::from_secs(30) }
	}
}

/// Immutable configuration held by a configured key manager.
#[derive(Clone, Debug)]
pub struct KeyManagerConfiguration {
	/// Provider token endpoint used for application tokens and management tokens.
	pub token_endpoint: Url,
	/// Management API base URL; also the audience of management tokens.
	pub audience: Url,
	/// Client identifier the adapter authenticates its management calls with.
	pub client_id: String,
	/// Client secret the adapter authenticates its management calls with.
	pub client_secret: Secret,
	/// Canonical URL of this platform deployment (resource-server identifier, token audience).
	pub server_url: Url,
	/// Explicit transport timeouts.
	pub timeouts: TransportTimeouts,
	/// Host parameters the adapter does not interpret, kept verbatim.
	pub additional_parameters: BTreeMap<String, String>,
}
impl KeyManagerConfiguration {
	/// Parses and validates the host parameter bag.
	pub fn from_parameters<I, K, V>(parameters: I) -> Result<Self, ConfigError>
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		let mut parameters = parameters
			.into_iter()
			.map(|(key, value)| (key.into(), value.into()))
			.collect::<BTreeMap<String, String>>();
		let mut take = |name: &'static str| {
			parameters.remove(name).map(|value| value.trim().to_owned()).filter(|v| !v.is_empty())
		};
		let token_endpoint = take(TOKEN_ENDPOINT);
		let audience = take(AUDIENCE);
		let client_id = take(CLIENT_ID);
		let client_secret = take(CLIENT_SECRET);
		let server_url = take(SERVER_URL);
		let connect_timeout = take(CONNECT_TIMEOUT);
		let request_timeout = take(REQUEST_TIMEOUT);
		let token_endpoint = parse_url(TOKEN_ENDPOINT, required(TOKEN_ENDPOINT, token_endpoint)?)?;
		let audience = parse_url(AUDIENCE, required(AUDIENCE, audience)?)?;
		let client_id = required(CLIENT_ID, client_id)?;
		let client_secret = Secret::new(required(CLIENT_SECRET, client_secret)?);
		let server_url = match server_url {
			Some(raw) => parse_url(SERVER_URL, raw)?,
			None => {
				tracing::warn!(
					%audience,
					"server_url is not configured; using the management audience as resource identifier and token audience."
				);

				audience.clone()
			},
		};
		let defaults = TransportTimeouts::default();
		let timeouts = TransportTimeouts {
			connect: parse_timeout(CONNECT_TIMEOUT, connect_timeout)?.unwrap_or(defaults.connect),
			request: parse_timeout(REQUEST_TIMEOUT, request_timeout)?.unwrap_or(defaults.request),
		};

		Ok(Self {
			token_endpoint,
			audience,
			client_id,
			client_secret,
			server_url,
			timeouts,
			additional_parameters: parameters,
		})
	}

	/// Overrides the transport timeouts.
	pub fn with_timeouts(mut self, timeouts: TransportTimeouts) -> Self {
		self.timeouts = timeouts;

		self
	}

	/// Client-registration endpoint, `{audience}clients`.
	pub fn clients_endpoint(&self) -> Result<Url, ConfigError> {
		self.management_endpoint("clients")
	}

	/// Resource-server endpoint, `{audience}resource-servers`.
	pub fn resource_servers_endpoint(&self) -> Result<Url, ConfigError> {
		self.management_endpoint("resource-servers")
	}

	/// Canonical identifier of this platform deployment.
	pub fn resource_identifier(&self) -> &str {
		self.server_url.as_str()
	}

	fn management_endpoint(&self, segment: &str) -> Result<Url, ConfigError> {
		let mut base = self.audience.clone();

		if !base.path().ends_with('/') {
			let path = format!("{}/", base.path());

			base.set_path(&path);
		}

		base.join(segment).map_err(|source| ConfigError::InvalidUrl { name: AUDIENCE, source })
	}
}

fn required(name: &'static str, value: Option<String>) -> Result<String, ConfigError> {
	value.ok_or(ConfigError::MissingParameter { name })
}

fn parse_url(name: &'static str, raw: String) -> Result<Url, ConfigError> {
	let url = Url::parse(&raw).map_err(|source| ConfigError::InvalidUrl { name, source })?;

	match url.scheme() {
		"http" | "https" => Ok(url),
		_ => Err(ConfigError::UnsupportedScheme { name, url: raw }),
	}
}

fn parse_timeout(name: &'static str, raw: Option<String>) -> Result<Option<StdDuration>, ConfigError> {
	let Some(raw) = raw else {
		return Ok(None);
	};

	match raw.parse::<u64>() {
		Ok(secs) if secs > 0 => Ok(Some(StdDuration::from_secs(secs))),
		_ => Err(ConfigError::InvalidTimeout { name, value: raw }),
	}
}
