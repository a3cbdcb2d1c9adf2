//! Provider wire representations.

// crates.io
use serde::Deserializer;
use serde_json::{Map, Value};
// self
use crate::{_prelude::*, auth::Secret};

/// Client registration record as exchanged with the provider.
///
/// Fields the adapter does not model are captured in [`extra`](Self::extra) so they survive a
/// read/modify cycle and show up in the additional-properties snapshot handed to the host.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderClientInfo {
	/// Client name.
	#[serde(rename = "name", default, skip_serializing_if = "Option::is_none")]
	pub client_name: Option<String>,
	/// Provider-assigned client identifier.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub client_id: Option<String>,
	/// Client secret.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub client_secret: Option<Secret>,
	/// Allowed redirect URIs.
	#[serde(
		rename = "callbacks",
		default,
		deserialize_with = "null_as_empty",
		skip_serializing_if = "Vec::is_empty"
	)]
	pub redirect_uris: Vec<String>,
	/// Allowed grant types.
	#[serde(default, deserialize_with = "null_as_empty", skip_serializing_if = "Vec::is_empty")]
	pub grant_types: Vec<String>,
	/// Provider application type.
	#[serde(rename = "app_type", default, skip_serializing_if = "Option::is_none")]
	pub application_type: Option<String>,
	/// Token endpoint client authentication method.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub token_endpoint_auth_method: Option<String>,
	/// Provider fields not modeled above.
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

// The provider returns `null` for lists it has never stored.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
	D: Deserializer<'de>,
{
	Option::<Vec<String>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Token request sent to the provider token endpoint as JSON.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProviderTokenRequest {
	/// Client identifier.
	pub client_id: String,
	/// Client secret.
	pub client_secret: Secret,
	/// OAuth grant type.
	pub grant_type: String,
	/// Audience the token is requested for.
	pub audience: String,
	/// Space-delimited scopes.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub scope: Option<String>,
}

/// Token response returned by the provider token endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ProviderTokenResponse {
	/// Issued access token.
	pub access_token: Secret,
	/// Space-delimited granted scopes.
	#[serde(default)]
	pub scope: Option<String>,
	/// Token lifetime in seconds.
	#[serde(default)]
	pub expires_in: Option<i64>,
	/// Token type, usually `Bearer`.
	#[serde(default)]
	pub token_type: Option<String>,
}

/// Protected resource (audience) registered with the provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceServerInfo {
	/// Audience identifier.
	pub identifier: String,
	/// Display name.
	pub name: String,
	/// Default token lifetime in seconds.
	pub token_lifetime: u32,
}
impl ResourceServerInfo {
	/// Display name used for the platform's resource server.
	pub const DEFAULT_NAME: &str = "API Manager Resource Server";
	/// Default token lifetime, in seconds, for the platform's resource server.
	pub const DEFAULT_TOKEN_LIFETIME: u32 = 86_400;

	/// Builds the record for the provided audience with the default name and lifetime.
	pub fn for_audience(identifier: impl Into<String>) -> Self {
		Self {
			identifier: identifier.into(),
			name: Self::DEFAULT_NAME.into(),
			token_lifetime: Self::DEFAULT_TOKEN_LIFETIME,
		}
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	#[test]
	fn client_info_uses_provider_field_names_and_keeps_unknown_fields() {
		let client: ProviderClientInfo = serde_json::from_value(json!({
			"name": "alice_app1_PRODUCTION",
			"client_id": "cid",
			"client_secret": "csecret",
			"callbacks": ["https://a.example/cb"],
			"grant_types": ["client_credentials"],
			"app_type": "non_interactive",
			"is_first_party": true
		}))
		.expect("Provider payload should decode.");

		assert_eq!(client.client_name.as_deref(), Some("alice_app1_PRODUCTION"));
		assert_eq!(client.redirect_uris, vec!["https://a.example/cb"]);
		assert_eq!(client.extra.get("is_first_party"), Some(&json!(true)));

		let encoded = serde_json::to_value(&client).expect("Client should encode.");

		assert_eq!(encoded["app_type"], json!("non_interactive"));
		assert_eq!(encoded["is_first_party"], json!(true));
		assert!(encoded.get("token_endpoint_auth_method").is_none());
	}

	#[test]
	fn null_lists_decode_as_empty() {
		let client: ProviderClientInfo = serde_json::from_value(json!({
			"name": "a",
			"client_id": "c",
			"callbacks": null,
			"grant_types": null
		}))
		.expect("Null lists should decode.");

		assert!(client.redirect_uris.is_empty());
		assert!(client.grant_types.is_empty());
		assert!(client.extra.is_empty());
		assert_eq!(
			serde_json::to_value(&client).expect("Client should encode."),
			json!({ "name": "a", "client_id": "c" }),
		);
	}

	#[test]
	fn token_request_omits_missing_scope() {
		let request = ProviderTokenRequest {
			client_id: "cid".into(),
			client_secret: Secret::new("csecret"),
			grant_type: "client_credentials".into(),
			audience: "https://apim.example/".into(),
			scope: None,
		};

		assert_eq!(
			serde_json::to_value(&request).expect("Token request should encode."),
			json!({
				"client_id": "cid",
				"client_secret": "csecret",
				"grant_type": "client_credentials",
				"audience": "https://apim.example/"
			}),
		);
	}

	#[test]
	fn resource_server_defaults() {
		let server = ResourceServerInfo::for_audience("https://apim.example/");

		assert_eq!(server.identifier, "https://apim.example/");
		assert_eq!(server.name, ResourceServerInfo::DEFAULT_NAME);
		assert_eq!(server.token_lifetime, ResourceServerInfo::DEFAULT_TOKEN_LIFETIME);
	}
}
