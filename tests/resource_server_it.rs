// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use oauth2_key_manager::{
	_preludet::*,
	interceptor::StaticBearerInterceptor,
	obs::OperationKind,
	provider::{ProvisionOutcome, ResourceProvisioner, ResourceServerClient, ResourceServerInfo},
};

const AUDIENCE: &str = "https://apim.example/";

fn provisioner(server: &MockServer) -> ResourceServerClient {
	let configuration = test_configuration(&server.base_url());

	ResourceServerClient::new(
		test_reqwest_http_client(),
		configuration.resource_servers_endpoint().expect("Resource-server endpoint should derive."),
		Arc::new(StaticBearerInterceptor::new(TEST_MANAGEMENT_TOKEN)),
	)
}

fn expected_body() -> serde_json::Value {
	json!({
		"identifier": AUDIENCE,
		"name": ResourceServerInfo::DEFAULT_NAME,
		"token_lifetime": ResourceServerInfo::DEFAULT_TOKEN_LIFETIME
	})
}

#[tokio::test]
async fn creates_the_resource_server() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/v2/resource-servers")
				.header("authorization", "Bearer mgmt-token")
				.json_body(expected_body());
			then.status(201).header("content-type", "application/json").body("{}");
		})
		.await;
	let outcome = provisioner(&server)
		.ensure_resource_server(AUDIENCE)
		.await
		.expect("Provisioning should succeed.");

	assert_eq!(outcome, ProvisionOutcome::Created);

	mock.assert_async().await;
}

#[tokio::test]
async fn conflicts_are_idempotent_success() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/v2/resource-servers").json_body(expected_body());
			then.status(409)
				.header("content-type", "application/json")
				.body("{\"statusCode\":409,\"error\":\"Conflict\",\"message\":\"already exists\"}");
		})
		.await;
	let provisioner = provisioner(&server);

	for _ in 0..2 {
		assert_eq!(
			provisioner
				.ensure_resource_server(AUDIENCE)
				.await
				.expect("Conflicts must not be errors."),
			ProvisionOutcome::AlreadyExists,
		);
	}

	mock.assert_calls_async(2).await;
}

#[tokio::test]
async fn other_failures_are_reported() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/v2/resource-servers");
			then.status(500).body("upstream exploded");
		})
		.await;
	let err = provisioner(&server)
		.ensure_resource_server(AUDIENCE)
		.await
		.expect_err("Server errors must be reported to the caller.");

	assert!(matches!(
		err,
		Error::ProviderRejected {
			operation: OperationKind::ProvisionResourceServer,
			status: 500,
			ref message,
		} if message == "upstream exploded"
	));

	mock.assert_async().await;
}
