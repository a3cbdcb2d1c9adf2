//! Credential-request codec.
//!
//! Pure translation between the host platform's generic entities ([`OAuthApplicationInfo`],
//! [`AccessTokenRequest`]) and the provider wire records. Nothing here performs I/O; the only
//! failures are missing client identifiers on paths that address an existing client.

// std
use std::borrow::Cow;
// crates.io
use serde_json::{Map, Value};
// self
use crate::{
	_prelude::*,
	auth::{self, ScopeSet},
	error::ConfigError,
	obs::OperationKind,
	platform::{
		AccessTokenInfo, AccessTokenRequest, AdditionalProperties, ApplicationParameters,
		OAuthApplicationInfo, TokenOutcome,
	},
	provider::{ProviderClientInfo, ProviderTokenRequest, ProviderTokenResponse, TokenExchange},
};

/// Additional-properties key selecting the provider application type.
pub const APP_TYPE: &str = "app_type";
/// Additional-properties key selecting the token endpoint authentication method.
pub const TOKEN_ENDPOINT_AUTH_METHOD: &str = "token_endpoint_auth_method";
/// Application type registered when the host does not choose one.
pub const DEFAULT_APP_TYPE: &str = "non_interactive";

const CLIENT_NAME_SEPARATOR: &str = "_";

/// Derives the provider client name for a platform application.
///
/// With a key type the name joins the owner segments, the application name, and the key type
/// with `_`, so `alice`/`app1`/`PRODUCTION` gives `alice_app1_PRODUCTION`. Owner segments come
/// from [`auth::client_name_segments`]; a secondary user-store domain is its own segment. Inside
/// every segment `%` becomes `%25` and `_` becomes `%5F`, so no segment carries the separator.
/// Without a key type the raw application name is used unchanged.
pub fn provider_client_name(app: &OAuthApplicationInfo) -> String {
	let name = app.client_name.as_deref().unwrap_or_default();
	let Some(key_type) = app.parameters.key_type.as_deref().filter(|value| !value.is_empty()) else {
		return name.to_owned();
	};
	let owner =
		app.parameters.username.as_deref().map(auth::client_name_segments).unwrap_or_default();

	owner
		.into_iter()
		.chain([name, key_type])
		.map(escape_name_segment)
		.collect::<Vec<_>>()
		.join(CLIENT_NAME_SEPARATOR)
}

fn escape_name_segment(segment: &str) -> Cow<'_, str> {
	if !segment.contains(['_', '%']) {
		return Cow::Borrowed(segment);
	}

	let mut escaped = String::with_capacity(segment.len() + 4);

	for ch in segment.chars() {
		match ch {
			'%' => escaped.push_str("%25"),
			'_' => escaped.push_str("%5F"),
			_ => escaped.push(ch),
		}
	}

	Cow::Owned(escaped)
}

/// Builds the provider registration record for create and update calls.
pub fn to_provider_client_info(app: &OAuthApplicationInfo) -> ProviderClientInfo {
	let properties = app.parameters.additional_properties.as_ref();
	let property = |key: &str| properties.and_then(|properties| properties.get_str(key));

	ProviderClientInfo {
		client_name: Some(provider_client_name(app)),
		client_id: app.client_id.clone().filter(|id| !id.is_empty()),
		client_secret: app.client_secret.clone().filter(|secret| !secret.is_empty()),
		redirect_uris: app.callback_urls(),
		grant_types: app.parameters.grant_type_list(),
		application_type: Some(property(APP_TYPE).unwrap_or_else(|| DEFAULT_APP_TYPE.into())),
		token_endpoint_auth_method: property(TOKEN_ENDPOINT_AUTH_METHOD),
		extra: Map::new(),
	}
}

/// Translates a provider record back into the platform descriptor.
///
/// The full provider record is also stored as a JSON object under the additional-properties
/// parameter so the host can keep provider fields it does not model.
pub fn to_oauth_application_info(client: &ProviderClientInfo) -> OAuthApplicationInfo {
	let snapshot = match serde_json::to_value(client) {
		Ok(Value::Object(map)) => map,
		Ok(_) | Err(_) => Map::new(),
	};
	let non_empty = |value: &Option<String>| value.clone().filter(|value| !value.is_empty());

	OAuthApplicationInfo {
		client_name: client.client_name.clone(),
		client_id: client.client_id.clone(),
		client_secret: client.client_secret.clone(),
		callback_url: (!client.redirect_uris.is_empty()).then(|| client.redirect_uris.join(",")),
		parameters: ApplicationParameters {
			client_name: non_empty(&client.client_name),
			client_id: non_empty(&client.client_id),
			client_secret: client.client_secret.clone().filter(|secret| !secret.is_empty()),
			grant_types: (!client.grant_types.is_empty()).then(|| client.grant_types.join(",")),
			additional_properties: Some(AdditionalProperties::Object(snapshot)),
			..Default::default()
		},
	}
}

/// Returns the trimmed client id or [`Error::MissingClientId`] when it is absent or blank.
pub fn require_client_id(operation: OperationKind, client_id: Option<&str>) -> Result<&str> {
	client_id
		.map(str::trim)
		.filter(|id| !id.is_empty())
		.ok_or(Error::MissingClientId { operation })
}

/// Builds the wire token request; `audience` is the platform's canonical server URL.
pub fn to_provider_token_request(request: &AccessTokenRequest, audience: &str) -> ProviderTokenRequest {
	ProviderTokenRequest {
		client_id: request.client_id.clone(),
		client_secret: request.client_secret.clone(),
		grant_type: request.effective_grant_type().to_owned(),
		audience: audience.to_owned(),
		scope: (!request.scopes.is_empty()).then(|| request.scopes.normalized()),
	}
}

/// Converts a decoded token response into the platform token info.
pub fn to_access_token_info(
	request: &AccessTokenRequest,
	response: ProviderTokenResponse,
) -> Result<AccessTokenInfo> {
	let scopes = match response.scope.as_deref() {
		Some(raw) => ScopeSet::from_str(raw).map_err(ConfigError::from)?,
		None => ScopeSet::default(),
	};

	Ok(AccessTokenInfo {
		consumer_key: request.client_id.clone(),
		consumer_secret: request.client_secret.clone(),
		access_token: response.access_token,
		scopes,
		validity_period: response.expires_in.map(Duration::seconds),
	})
}

/// Maps a raw token exchange onto the platform outcome.
pub fn to_token_outcome(request: &AccessTokenRequest, exchange: TokenExchange) -> Result<TokenOutcome> {
	match exchange {
		TokenExchange::Issued(response) =>
			to_access_token_info(request, response).map(TokenOutcome::Issued),
		TokenExchange::Forbidden => Ok(TokenOutcome::resource_not_authorized()),
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::collections::HashSet;
	// crates.io
	use serde_json::json;
	// self
	use super::*;
	use crate::auth::Secret;

	fn app(username: &str, name: &str, key_type: &str) -> OAuthApplicationInfo {
		OAuthApplicationInfo::new(name).with_username(username).with_key_type(key_type)
	}

	#[test]
	fn client_name_joins_owner_application_and_key_type() {
		assert_eq!(provider_client_name(&app("alice", "app1", "PRODUCTION")), "alice_app1_PRODUCTION");
		assert_eq!(
			provider_client_name(&app("alice@tenant.com", "app1", "SANDBOX")),
			"alice_app1_SANDBOX",
		);
		assert_eq!(
			provider_client_name(&app("SECONDARY/bob", "app1", "PRODUCTION")),
			"SECONDARY_bob_app1_PRODUCTION",
		);
		assert_eq!(provider_client_name(&OAuthApplicationInfo::new("raw").with_username("alice")), "raw");
		assert_eq!(
			provider_client_name(&OAuthApplicationInfo::new("app1").with_key_type("PRODUCTION")),
			"app1_PRODUCTION",
		);
	}

	#[test]
	fn client_names_do_not_collide_across_owners_or_key_types() {
		let users = [
			"alice",
			"bob",
			"LDAP/alice",
			"carol@tenant.com",
			"alice_x",
			"LDAP/bob",
			"LDAP_bob",
			"a_",
			"a",
		];
		let names = ["app", "app1", "shop", "x_app1", "app1_", "_b", "b", "%5F"];
		let key_types = ["PRODUCTION", "SANDBOX", "SAND_BOX"];
		let mut seen = HashSet::new();

		for user in users {
			for name in names {
				for key_type in key_types {
					assert!(
						seen.insert(provider_client_name(&app(user, name, key_type))),
						"Duplicate client name for {user}/{name}/{key_type}.",
					);
				}
			}
		}

		assert_eq!(seen.len(), users.len() * names.len() * key_types.len());
		assert_ne!(
			provider_client_name(&app("alice", "x_app1", "PRODUCTION")),
			provider_client_name(&app("alice_x", "app1", "PRODUCTION")),
		);
		assert_ne!(
			provider_client_name(&app("LDAP/bob", "app1", "PRODUCTION")),
			provider_client_name(&app("LDAP_bob", "app1", "PRODUCTION")),
		);
		assert_ne!(
			provider_client_name(&OAuthApplicationInfo::new("a_").with_key_type("b")),
			provider_client_name(&OAuthApplicationInfo::new("a").with_key_type("_b")),
		);
	}

	#[test]
	fn client_name_segments_escape_separator_and_escape_characters() {
		assert_eq!(
			provider_client_name(&app("alice", "x_app1", "PRODUCTION")),
			"alice_x%5Fapp1_PRODUCTION",
		);
		assert_eq!(
			provider_client_name(&app("LDAP_bob", "app1", "PRODUCTION")),
			"LDAP%5Fbob_app1_PRODUCTION",
		);
		assert_eq!(
			provider_client_name(&app("alice", "100%", "PRODUCTION")),
			"alice_100%25_PRODUCTION",
		);
		assert_eq!(
			provider_client_name(&OAuthApplicationInfo::new("raw_name").with_username("alice")),
			"raw_name",
		);
	}

	#[test]
	fn provider_record_splits_lists_and_reads_properties() {
		let encoded = OAuthApplicationInfo::new("app1")
			.with_callback_url("https://a.example/cb,https://b.example/cb")
			.with_grant_types("client_credentials,refresh_token")
			.with_additional_properties(AdditionalProperties::Encoded(
				"{\"app_type\":\"spa\",\"token_endpoint_auth_method\":\"none\"}".into(),
			));
		let client = to_provider_client_info(&encoded);

		assert_eq!(client.redirect_uris, vec!["https://a.example/cb", "https://b.example/cb"]);
		assert_eq!(client.grant_types, vec!["client_credentials", "refresh_token"]);
		assert_eq!(client.application_type.as_deref(), Some("spa"));
		assert_eq!(client.token_endpoint_auth_method.as_deref(), Some("none"));

		let bare = to_provider_client_info(&OAuthApplicationInfo::new("app1"));

		assert_eq!(bare.application_type.as_deref(), Some(DEFAULT_APP_TYPE));
		assert!(bare.token_endpoint_auth_method.is_none());
		assert!(bare.redirect_uris.is_empty());
		assert!(bare.grant_types.is_empty());
		assert!(bare.client_id.is_none());
	}

	#[test]
	fn round_trip_preserves_shared_fields() {
		let original = OAuthApplicationInfo::new("app1")
			.with_client_id("cid")
			.with_client_secret("csecret")
			.with_callback_url("https://a.example/cb,https://b.example/cb");
		let restored = to_oauth_application_info(&to_provider_client_info(&original));

		assert_eq!(restored.client_name, original.client_name);
		assert_eq!(restored.client_id, original.client_id);
		assert_eq!(restored.client_secret, original.client_secret);
		assert_eq!(restored.callback_urls(), original.callback_urls());
	}

	#[test]
	fn restored_descriptor_registers_the_same_client() {
		let original = OAuthApplicationInfo::new("app1")
			.with_client_id("cid")
			.with_client_secret("csecret")
			.with_grant_types("authorization_code,refresh_token")
			.with_callback_url("https://a.example/cb")
			.with_additional_properties(AdditionalProperties::Encoded(
				"{\"app_type\":\"spa\",\"token_endpoint_auth_method\":\"none\"}".into(),
			));
		let registered = to_provider_client_info(&original);
		let restored = to_oauth_application_info(&registered);

		assert_eq!(to_provider_client_info(&restored), registered);
	}

	#[test]
	fn platform_descriptor_echoes_parameters_and_snapshot() {
		let mut client = ProviderClientInfo {
			client_name: Some("alice_app1_PRODUCTION".into()),
			client_id: Some("cid".into()),
			client_secret: Some(Secret::new("csecret")),
			..Default::default()
		};

		client.extra.insert("is_first_party".into(), json!(false));

		let app = to_oauth_application_info(&client);
		let properties = app
			.parameters
			.additional_properties
			.as_ref()
			.expect("Snapshot should be present.")
			.to_object();

		assert_eq!(app.parameters.client_name.as_deref(), Some("alice_app1_PRODUCTION"));
		assert_eq!(app.parameters.client_id.as_deref(), Some("cid"));
		assert_eq!(app.parameters.client_secret, Some(Secret::new("csecret")));
		assert!(app.callback_url.is_none());
		assert_eq!(properties.get("client_id"), Some(&json!("cid")));
		assert_eq!(properties.get("is_first_party"), Some(&json!(false)));
	}

	#[test]
	fn blank_client_ids_are_rejected() {
		assert_eq!(
			require_client_id(OperationKind::DeleteApplication, Some(" cid ")).ok(),
			Some("cid")
		);
		assert!(matches!(
			require_client_id(OperationKind::UpdateApplication, Some("  ")),
			Err(Error::MissingClientId { operation: OperationKind::UpdateApplication })
		));
		assert!(matches!(
			require_client_id(OperationKind::RetrieveApplication, None),
			Err(Error::MissingClientId { .. })
		));
	}

	#[test]
	fn token_request_defaults_grant_and_joins_scopes() {
		let scopes = ScopeSet::new(["write", "read"]).expect("Scope fixture should be valid.");
		let request = AccessTokenRequest::new("cid", "csecret").with_scopes(scopes);
		let wire = to_provider_token_request(&request, "https://apim.example/");

		assert_eq!(wire.grant_type, "client_credentials");
		assert_eq!(wire.scope.as_deref(), Some("read write"));
		assert_eq!(wire.audience, "https://apim.example/");
		assert!(
			to_provider_token_request(&AccessTokenRequest::new("cid", "csecret"), "aud")
				.scope
				.is_none()
		);
	}

	#[test]
	fn token_response_scopes_split_on_whitespace_runs() {
		let request = AccessTokenRequest::new("cid", "csecret");
		let response = ProviderTokenResponse {
			access_token: Secret::new("at"),
			scope: Some("read  write".into()),
			expires_in: Some(86_400),
			token_type: Some("Bearer".into()),
		};
		let info = to_access_token_info(&request, response).expect("Token info should build.");

		assert_eq!(info.scopes.iter().collect::<Vec<_>>(), vec!["read", "write"]);
		assert_eq!(info.validity_period, Some(Duration::seconds(86_400)));
		assert_eq!(info.consumer_key, "cid");
		assert_eq!(info.access_token.expose(), "at");
	}

	#[test]
	fn forbidden_exchange_becomes_not_authorized() {
		let outcome =
			to_token_outcome(&AccessTokenRequest::new("cid", "csecret"), TokenExchange::Forbidden)
				.expect("Forbidden exchange is not an error.");

		assert!(matches!(outcome, TokenOutcome::ResourceNotAuthorized { .. }));
	}
}
