//! Dynamic client registration against the provider's management API.

// crates.io
use reqwest::RequestBuilder;
// self
use crate::{
	_prelude::*,
	config::AUDIENCE,
	error::ConfigError,
	http::{ProviderResponse, ReqwestHttpClient},
	interceptor::RequestInterceptor,
	obs::OperationKind,
	provider::{ProviderClientInfo, ProviderFuture},
};

const ROTATE_SECRET: &str = "rotate-secret";

/// Client lifecycle operations exposed by the provider.
pub trait ClientRegistrar
where
	Self: Send + Sync,
{
	/// Registers a new client, returning the record with its assigned id and secret.
	fn create<'a>(
		&'a self,
		client: &'a ProviderClientInfo,
	) -> ProviderFuture<'a, ProviderClientInfo>;

	/// Replaces an existing client's settings. The payload must carry the current secret.
	fn update<'a>(
		&'a self,
		client_id: &'a str,
		client: &'a ProviderClientInfo,
	) -> ProviderFuture<'a, ProviderClientInfo>;

	/// Removes a client. Unknown clients count as already deleted.
	fn delete<'a>(&'a self, client_id: &'a str) -> ProviderFuture<'a, ()>;

	/// Fetches a client by id.
	fn retrieve<'a>(&'a self, client_id: &'a str) -> ProviderFuture<'a, ProviderClientInfo>;

	/// Rotates the client secret, leaving every other field untouched.
	fn regenerate_secret<'a>(&'a self, client_id: &'a str)
	-> ProviderFuture<'a, ProviderClientInfo>;
}

/// [`ClientRegistrar`] backed by the provider's `{audience}clients` resource.
#[derive(Clone)]
pub struct DcrClient {
	http_client: ReqwestHttpClient,
	endpoint: Url,
	interceptor: Arc<dyn RequestInterceptor>,
}
impl DcrClient {
	/// Creates a registrar bound to the clients endpoint.
	pub fn new(
		http_client: ReqwestHttpClient,
		endpoint: Url,
		interceptor: Arc<dyn RequestInterceptor>,
	) -> Self {
		Self { http_client, endpoint, interceptor }
	}

	/// Clients endpoint this registrar talks to.
	pub fn endpoint(&self) -> &Url {
		&self.endpoint
	}

	fn client_url(&self, client_id: &str, suffix: Option<&str>) -> Result<Url> {
		let mut url = self.endpoint.clone();

		{
			let mut segments = url.path_segments_mut().map_err(|_| ConfigError::UnsupportedScheme {
				name: AUDIENCE,
				url: self.endpoint.to_string(),
			})?;

			segments.pop_if_empty().push(client_id);

			if let Some(suffix) = suffix {
				segments.push(suffix);
			}
		}

		Ok(url)
	}

	async fn send(&self, operation: OperationKind, request: RequestBuilder) -> Result<ProviderResponse> {
		let request = self.interceptor.intercept(request).await?;

		self.http_client.dispatch(operation, request).await
	}

	async fn client_call(
		&self,
		operation: OperationKind,
		client_id: &str,
		request: RequestBuilder,
	) -> Result<ProviderClientInfo> {
		let response = self.send(operation, request).await?;

		match response.status {
			404 => Err(Error::NotFound { operation, client_id: client_id.to_owned() }),
			_ if response.is_success() => response.json(operation),
			_ => Err(response.rejected(operation)),
		}
	}
}
impl ClientRegistrar for DcrClient {
	fn create<'a>(
		&'a self,
		client: &'a ProviderClientInfo,
	) -> ProviderFuture<'a, ProviderClientInfo> {
		Box::pin(async move {
			const KIND: OperationKind = OperationKind::CreateApplication;

			let request = self.http_client.post(self.endpoint.clone()).json(client);
			let response = self.send(KIND, request).await?;

			if !response.is_success() {
				return Err(response.rejected(KIND));
			}

			response.json(KIND)
		})
	}

	fn update<'a>(
		&'a self,
		client_id: &'a str,
		client: &'a ProviderClientInfo,
	) -> ProviderFuture<'a, ProviderClientInfo> {
		Box::pin(async move {
			let request = self.http_client.put(self.client_url(client_id, None)?).json(client);

			self.client_call(OperationKind::UpdateApplication, client_id, request).await
		})
	}

	fn delete<'a>(&'a self, client_id: &'a str) -> ProviderFuture<'a, ()> {
		Box::pin(async move {
			const KIND: OperationKind = OperationKind::DeleteApplication;

			let request = self.http_client.delete(self.client_url(client_id, None)?);
			let response = self.send(KIND, request).await?;

			match response.status {
				404 => {
					tracing::warn!(client_id, "Client was already absent at the provider.");

					Ok(())
				},
				_ if response.is_success() => Ok(()),
				_ => Err(response.rejected(KIND)),
			}
		})
	}

	fn retrieve<'a>(&'a self, client_id: &'a str) -> ProviderFuture<'a, ProviderClientInfo> {
		Box::pin(async move {
			let request = self.http_client.get(self.client_url(client_id, None)?);

			self.client_call(OperationKind::RetrieveApplication, client_id, request).await
		})
	}

	fn regenerate_secret<'a>(
		&'a self,
		client_id: &'a str,
	) -> ProviderFuture<'a, ProviderClientInfo> {
		Box::pin(async move {
			let request = self.http_client.post(self.client_url(client_id, Some(ROTATE_SECRET))?);

			self.client_call(OperationKind::RegenerateSecret, client_id, request).await
		})
	}
}
impl Debug for DcrClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("DcrClient").field("endpoint", &self.endpoint.as_str()).finish()
	}
}
