//! Conflict-tolerant provisioning of the platform's resource server.

// self
use crate::{
	_prelude::*,
	http::ReqwestHttpClient,
	interceptor::RequestInterceptor,
	obs::OperationKind,
	provider::{ProviderFuture, ResourceServerInfo},
};

const KIND: OperationKind = OperationKind::ProvisionResourceServer;
const CONFLICT: u16 = 409;

/// What a provisioning attempt found at the provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProvisionOutcome {
	/// The resource server did not exist and was created.
	Created,
	/// The provider reported a conflict; the resource server already exists.
	AlreadyExists,
}

/// Ensures a resource server exists for an audience.
pub trait ResourceProvisioner
where
	Self: Send + Sync,
{
	/// Creates the resource server for `identifier`, treating "already exists" as success.
	///
	/// Safe to call repeatedly and concurrently; the provider's uniqueness constraint settles races.
	fn ensure_resource_server<'a>(
		&'a self,
		identifier: &'a str,
	) -> ProviderFuture<'a, ProvisionOutcome>;
}

/// [`ResourceProvisioner`] backed by the provider's `{audience}resource-servers` resource.
#[derive(Clone)]
pub struct ResourceServerClient {
	http_client: ReqwestHttpClient,
	endpoint: Url,
	interceptor: Arc<dyn RequestInterceptor>,
}
impl ResourceServerClient {
	/// Creates a provisioner bound to the resource-servers endpoint.
	pub fn new(
		http_client: ReqwestHttpClient,
		endpoint: Url,
		interceptor: Arc<dyn RequestInterceptor>,
	) -> Self {
		Self { http_client, endpoint, interceptor }
	}
}
impl ResourceProvisioner for ResourceServerClient {
	fn ensure_resource_server<'a>(
		&'a self,
		identifier: &'a str,
	) -> ProviderFuture<'a, ProvisionOutcome> {
		Box::pin(async move {
			let server = ResourceServerInfo::for_audience(identifier);
			let request = self.http_client.post(self.endpoint.clone()).json(&server);
			let request = self.interceptor.intercept(request).await?;
			let response = self.http_client.dispatch(KIND, request).await?;

			match response.status {
				CONFLICT => {
					tracing::warn!(identifier, "Resource server already exists.");

					Ok(ProvisionOutcome::AlreadyExists)
				},
				_ if response.is_success() => {
					tracing::info!(identifier, "Resource server created.");

					Ok(ProvisionOutcome::Created)
				},
				_ => Err(response.rejected(KIND)),
			}
		})
	}
}
impl Debug for ResourceServerClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ResourceServerClient").field("endpoint", &self.endpoint.as_str()).finish()
	}
}
