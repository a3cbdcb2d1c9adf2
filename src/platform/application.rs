//! OAuth application descriptors shared with the host platform.

// crates.io
use serde_json::{Map, Value};
// self
use crate::{_prelude::*, auth::Secret};

/// Platform-level description of an OAuth application.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OAuthApplicationInfo {
	/// Raw application name as shown by the platform.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub client_name: Option<String>,
	/// Provider-assigned client identifier.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub client_id: Option<String>,
	/// Provider-assigned client secret.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub client_secret: Option<Secret>,
	/// Callback URLs joined with commas.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub callback_url: Option<String>,
	/// Well-known named parameters.
	#[serde(default)]
	pub parameters: ApplicationParameters,
}
impl OAuthApplicationInfo {
	/// Creates an application descriptor with the provided display name.
	pub fn new(client_name: impl Into<String>) -> Self {
		Self { client_name: Some(client_name.into()), ..Default::default() }
	}

	/// Sets the provider client identifier.
	pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
		self.client_id = Some(client_id.into());

		self
	}

	/// Sets the provider client secret.
	pub fn with_client_secret(mut self, client_secret: impl Into<Secret>) -> Self {
		self.client_secret = Some(client_secret.into());

		self
	}

	/// Sets the comma-joined callback URLs.
	pub fn with_callback_url(mut self, callback_url: impl Into<String>) -> Self {
		self.callback_url = Some(callback_url.into());

		self
	}

	/// Sets the owning (fully qualified) username.
	pub fn with_username(mut self, username: impl Into<String>) -> Self {
		self.parameters.username = Some(username.into());

		self
	}

	/// Sets the key type (for example `PRODUCTION` or `SANDBOX`).
	pub fn with_key_type(mut self, key_type: impl Into<String>) -> Self {
		self.parameters.key_type = Some(key_type.into());

		self
	}

	/// Sets the comma-joined grant types.
	pub fn with_grant_types(mut self, grant_types: impl Into<String>) -> Self {
		self.parameters.grant_types = Some(grant_types.into());

		self
	}

	/// Sets the additional-properties bag.
	pub fn with_additional_properties(mut self, properties: AdditionalProperties) -> Self {
		self.parameters.additional_properties = Some(properties);

		self
	}

	/// Splits the callback URL list into individual entries.
	pub fn callback_urls(&self) -> Vec<String> {
		split_list(self.callback_url.as_deref())
	}
}

/// Well-known named parameters of an [`OAuthApplicationInfo`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationParameters {
	/// Key type the application keys are generated for.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub key_type: Option<String>,
	/// Fully qualified owner username.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub username: Option<String>,
	/// Grant types joined with commas.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub grant_types: Option<String>,
	/// Client name echoed back from the provider.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub client_name: Option<String>,
	/// Client identifier echoed back from the provider.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub client_id: Option<String>,
	/// Client secret echoed back from the provider.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub client_secret: Option<Secret>,
	/// Provider-specific properties.
	#[serde(default, rename = "additionalProperties", skip_serializing_if = "Option::is_none")]
	pub additional_properties: Option<AdditionalProperties>,
}
impl ApplicationParameters {
	/// Splits the grant type list into individual entries.
	pub fn grant_type_list(&self) -> Vec<String> {
		split_list(self.grant_types.as_deref())
	}
}

/// Provider-specific properties, supplied either as a JSON object or as JSON-encoded text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
	/// Already-decoded mapping.
	Object(Map<String, Value>),
	/// JSON-encoded mapping, as some hosts store it.
	Encoded(String),
}
impl AdditionalProperties {
	/// Returns the properties as a mapping.
	///
	/// Encoded text that is not a JSON object yields an empty mapping.
	pub fn to_object(&self) -> Map<String, Value> {
		match self {
			Self::Object(map) => map.clone(),
			Self::Encoded(raw) => match serde_json::from_str::<Value>(raw) {
				Ok(Value::Object(map)) => map,
				Ok(_) | Err(_) => {
					tracing::warn!("Ignoring additional properties that are not a JSON object.");

					Map::new()
				},
			},
		}
	}

	/// Reads a string-valued property.
	pub fn get_str(&self, key: &str) -> Option<String> {
		self.to_object().get(key).and_then(Value::as_str).map(str::to_owned)
	}
}

fn split_list(raw: Option<&str>) -> Vec<String> {
	raw.map(|value| {
		value.split(',').map(str::trim).filter(|item| !item.is_empty()).map(str::to_owned).collect()
	})
	.unwrap_or_default()
}
