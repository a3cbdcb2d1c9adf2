//! Demonstrates the key manager against a mocked provider: configuration load, client
//! registration, and an application token exchange.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use oauth2_key_manager::{
	auth::ScopeSet,
	config::{self, KeyManagerConfiguration},
	http::ReqwestHttpClient,
	manager::{KeyManager, KeyManagerComponents},
	platform::{AccessTokenRequest, OAuthApplicationInfo, TokenOutcome},
	reqwest::Client,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let management_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/oauth/token")
				.header("content-type", "application/x-www-form-urlencoded");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-management\",\"token_type\":\"Bearer\",\"expires_in\":86400}",
			);
		})
		.await;
	let resource_server_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/v2/resource-servers");
			then.status(409).body("{\"message\":\"already exists\"}");
		})
		.await;
	let clients_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/v2/clients");
			then.status(201).header("content-type", "application/json").body(
				"{\"name\":\"alice_app1_PRODUCTION\",\"client_id\":\"demo-client\",\"client_secret\":\"demo-secret\"}",
			);
		})
		.await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token").header("content-type", "application/json");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"scope\":\"read write\",\"expires_in\":3600,\"token_type\":\"Bearer\"}",
			);
		})
		.await;
	let configuration = KeyManagerConfiguration::from_parameters([
		(config::TOKEN_ENDPOINT, server.url("/oauth/token")),
		(config::AUDIENCE, server.url("/api/v2/")),
		(config::CLIENT_ID, "demo-adapter".to_owned()),
		(config::CLIENT_SECRET, "demo-adapter-secret".to_owned()),
	])?;
	let http_client = ReqwestHttpClient::with_client(
		Client::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()?,
	);
	let components = KeyManagerComponents::with_http_client(&configuration, http_client)?;
	let manager = KeyManager::new();

	manager.load_configuration_with(configuration, components).await?;

	let application = manager
		.create_application(
			&OAuthApplicationInfo::new("app1")
				.with_username("alice")
				.with_key_type("PRODUCTION")
				.with_grant_types("client_credentials"),
		)
		.await?;

	println!(
		"Registered {} as {}.",
		application.client_name.as_deref().unwrap_or_default(),
		application.client_id.as_deref().unwrap_or_default()
	);

	let request = AccessTokenRequest::new(
		application.client_id.clone().unwrap_or_default(),
		application.client_secret.clone().unwrap_or_else(|| "".into()),
	)
	.with_scopes(ScopeSet::new(["read", "write"])?);

	match manager.get_new_application_access_token(&request).await? {
		TokenOutcome::Issued(info) => println!(
			"Issued token for {} with scopes [{}], valid for {:?}.",
			info.consumer_key, info.scopes, info.validity_period
		),
		TokenOutcome::ResourceNotAuthorized { message } => println!("{message}"),
	}

	management_mock.assert_calls_async(1).await;
	resource_server_mock.assert_calls_async(2).await;
	clients_mock.assert_async().await;
	token_mock.assert_async().await;

	Ok(())
}
