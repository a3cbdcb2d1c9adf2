// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use oauth2_key_manager::{
	_preludet::*,
	auth::Secret,
	interceptor::StaticBearerInterceptor,
	obs::OperationKind,
	provider::{ClientRegistrar, DcrClient, ProviderClientInfo},
};

const BEARER: &str = "Bearer mgmt-token";

fn registrar(server: &MockServer) -> DcrClient {
	let configuration = test_configuration(&server.base_url());

	DcrClient::new(
		test_reqwest_http_client(),
		configuration.clients_endpoint().expect("Clients endpoint should derive."),
		Arc::new(StaticBearerInterceptor::new(TEST_MANAGEMENT_TOKEN)),
	)
}

#[tokio::test]
async fn create_posts_the_record_with_management_bearer() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/v2/clients")
				.header("authorization", BEARER)
				.header("content-type", "application/json")
				.json_body(json!({
					"name": "alice_app1_PRODUCTION",
					"grant_types": ["client_credentials"],
					"app_type": "non_interactive"
				}));
			then.status(201).header("content-type", "application/json").body(
				"{\"name\":\"alice_app1_PRODUCTION\",\"client_id\":\"cid-1\",\"client_secret\":\"cs-1\",\
				 \"grant_types\":[\"client_credentials\"],\"app_type\":\"non_interactive\",\"tenant\":\"t\"}",
			);
		})
		.await;
	let client = ProviderClientInfo {
		client_name: Some("alice_app1_PRODUCTION".into()),
		grant_types: vec!["client_credentials".into()],
		application_type: Some("non_interactive".into()),
		..Default::default()
	};
	let created = registrar(&server).create(&client).await.expect("Create should succeed.");

	assert_eq!(created.client_id.as_deref(), Some("cid-1"));
	assert_eq!(created.client_secret, Some(Secret::new("cs-1")));
	assert_eq!(created.extra.get("tenant"), Some(&json!("t")));

	mock.assert_async().await;
}

#[tokio::test]
async fn create_rejection_surfaces_provider_message() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/v2/clients");
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"statusCode\":400,\"error\":\"Bad Request\",\"message\":\"Payload validation error\"}");
		})
		.await;
	let err = registrar(&server)
		.create(&ProviderClientInfo::default())
		.await
		.expect_err("Rejected payload must fail.");

	assert!(matches!(
		err,
		Error::ProviderRejected {
			operation: OperationKind::CreateApplication,
			status: 400,
			ref message,
		} if message == "Payload validation error"
	));

	mock.assert_async().await;
}

#[tokio::test]
async fn update_puts_to_the_client_resource_with_the_current_secret() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(PUT)
				.path("/api/v2/clients/cid-1")
				.header("authorization", BEARER)
				.json_body(json!({ "name": "renamed", "client_secret": "cs-1" }));
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"name\":\"renamed\",\"client_id\":\"cid-1\",\"client_secret\":\"cs-1\"}");
		})
		.await;
	let client = ProviderClientInfo {
		client_name: Some("renamed".into()),
		client_secret: Some(Secret::new("cs-1")),
		..Default::default()
	};
	let updated =
		registrar(&server).update("cid-1", &client).await.expect("Update should succeed.");

	assert_eq!(updated.client_name.as_deref(), Some("renamed"));
	assert_eq!(updated.client_secret, Some(Secret::new("cs-1")));

	mock.assert_async().await;
}

#[tokio::test]
async fn delete_treats_missing_clients_as_deleted() {
	let server = MockServer::start_async().await;
	let present = server
		.mock_async(|when, then| {
			when.method(DELETE).path("/api/v2/clients/cid-1").header("authorization", BEARER);
			then.status(204);
		})
		.await;
	let missing = server
		.mock_async(|when, then| {
			when.method(DELETE).path("/api/v2/clients/gone");
			then.status(404).body("{\"message\":\"Client not found\"}");
		})
		.await;
	let registrar = registrar(&server);

	registrar.delete("cid-1").await.expect("Delete should succeed.");
	registrar.delete("gone").await.expect("Deleting an unknown client should succeed.");

	present.assert_async().await;
	missing.assert_async().await;
}

#[tokio::test]
async fn retrieve_unknown_client_is_not_found() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v2/clients/unknown");
			then.status(404).body("{\"message\":\"Client not found\"}");
		})
		.await;
	let err = registrar(&server).retrieve("unknown").await.expect_err("Unknown client must fail.");

	assert!(matches!(
		err,
		Error::NotFound { operation: OperationKind::RetrieveApplication, ref client_id }
			if client_id == "unknown"
	));

	mock.assert_async().await;
}

#[tokio::test]
async fn regenerate_secret_hits_the_rotation_endpoint() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/v2/clients/cid-1/rotate-secret").header("authorization", BEARER);
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"name\":\"app\",\"client_id\":\"cid-1\",\"client_secret\":\"cs-2\"}");
		})
		.await;
	let rotated =
		registrar(&server).regenerate_secret("cid-1").await.expect("Rotation should succeed.");

	assert_eq!(rotated.client_secret, Some(Secret::new("cs-2")));
	assert_eq!(rotated.client_name.as_deref(), Some("app"));

	mock.assert_async().await;
}
