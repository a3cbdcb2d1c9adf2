//! Interceptor that obtains and caches the adapter's own management token.

// crates.io
use reqwest::RequestBuilder;
// self
use crate::{
	_prelude::*,
	config::KeyManagerConfiguration,
	http::ReqwestHttpClient,
	interceptor::{InterceptFuture, RequestInterceptor},
	oauth::{ManagementCredentials, ManagementToken},
};

/// Authenticates management calls with a client-credentials token scoped to the management
/// audience.
///
/// The token is cached until it enters the preemptive window; concurrent callers that find the
/// cache stale wait on a single in-flight exchange instead of stampeding the token endpoint.
pub struct ManagementTokenInterceptor {
	credentials: ManagementCredentials,
	http_client: ReqwestHttpClient,
	preemptive_window: Duration,
	cached: Mutex<Option<ManagementToken>>,
	refresh_guard: AsyncMutex<()>,
}
impl ManagementTokenInterceptor {
	const DEFAULT_PREEMPTIVE_WINDOW: Duration = Duration::seconds(60);

	/// Creates an interceptor from explicit credentials.
	pub fn new(credentials: ManagementCredentials, http_client: ReqwestHttpClient) -> Self {
		Self {
			credentials,
			http_client,
			preemptive_window: Self::DEFAULT_PREEMPTIVE_WINDOW,
			cached: Mutex::new(None),
			refresh_guard: AsyncMutex::new(()),
		}
	}

	/// Creates an interceptor from the key-manager configuration.
	pub fn from_configuration(
		configuration: &KeyManagerConfiguration,
		http_client: ReqwestHttpClient,
	) -> Self {
		Self::new(
			ManagementCredentials {
				token_endpoint: configuration.token_endpoint.clone(),
				client_id: configuration.client_id.clone(),
				client_secret: configuration.client_secret.clone(),
				audience: configuration.audience.to_string(),
			},
			http_client,
		)
	}

	/// Overrides the preemptive refresh window (defaults to 60 seconds).
	pub fn with_preemptive_window(mut self, window: Duration) -> Self {
		self.preemptive_window = if window.is_negative() { Duration::ZERO } else { window };

		self
	}

	/// Returns a valid management token, exchanging credentials when the cache is stale.
	pub async fn token(&self) -> Result<ManagementToken> {
		if let Some(token) = self.fresh_cached(OffsetDateTime::now_utc()) {
			return Ok(token);
		}

		let _singleflight = self.refresh_guard.lock().await;

		if let Some(token) = self.fresh_cached(OffsetDateTime::now_utc()) {
			return Ok(token);
		}

		let token = self.credentials.exchange(&self.http_client).await?;

		tracing::debug!(expires_at = %token.expires_at, "Management token refreshed.");

		*self.cached.lock() = Some(token.clone());

		Ok(token)
	}

	fn fresh_cached(&self, now: OffsetDateTime) -> Option<ManagementToken> {
		self.cached
			.lock()
			.as_ref()
			.filter(|token| !token.expires_within(self.preemptive_window, now))
			.cloned()
	}
}
impl RequestInterceptor for ManagementTokenInterceptor {
	fn intercept(&self, request: RequestBuilder) -> InterceptFuture<'_> {
		Box::pin(async move {
			let token = self.token().await?;

			Ok(request.bearer_auth(token.access_token.expose()))
		})
	}
}
impl Debug for ManagementTokenInterceptor {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ManagementTokenInterceptor")
			.field("token_endpoint", &self.credentials.token_endpoint.as_str())
			.field("client_id", &self.credentials.client_id)
			.field("audience", &self.credentials.audience)
			.field("token_cached", &self.cached.lock().is_some())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{_preludet::*, auth::Secret};

	fn interceptor() -> ManagementTokenInterceptor {
		ManagementTokenInterceptor::from_configuration(
			&test_configuration("https://idp.test"),
			ReqwestHttpClient::default(),
		)
	}

	fn seed(interceptor: &ManagementTokenInterceptor, lifetime: Duration) {
		*interceptor.cached.lock() = Some(ManagementToken {
			access_token: Secret::new("cached"),
			expires_at: OffsetDateTime::now_utc() + lifetime,
		});
	}

	#[test]
	fn credentials_come_from_configuration() {
		let interceptor = interceptor();

		assert_eq!(interceptor.credentials.token_endpoint.as_str(), "https://idp.test/oauth/token");
		assert_eq!(interceptor.credentials.audience, "https://idp.test/api/v2/");
		assert_eq!(interceptor.credentials.client_id, "adapter");
		assert!(!format!("{interceptor:?}").contains("adapter-secret"));
	}

	#[test]
	fn tokens_inside_the_preemptive_window_are_stale() {
		let interceptor = interceptor();
		let now = OffsetDateTime::now_utc();

		assert!(interceptor.fresh_cached(now).is_none());

		seed(&interceptor, Duration::minutes(10));

		assert!(interceptor.fresh_cached(now).is_some());

		seed(&interceptor, Duration::seconds(30));

		assert!(interceptor.fresh_cached(now).is_none());
	}

	#[test]
	fn negative_windows_clamp_to_zero() {
		let interceptor = interceptor().with_preemptive_window(Duration::seconds(-5));

		assert_eq!(interceptor.preemptive_window, Duration::ZERO);

		seed(&interceptor, Duration::seconds(30));

		assert!(interceptor.fresh_cached(OffsetDateTime::now_utc()).is_some());
	}

	#[tokio::test]
	async fn cached_tokens_are_attached_without_an_exchange() {
		let interceptor = interceptor();

		seed(&interceptor, Duration::hours(1));

		let request = interceptor
			.intercept(ReqwestClient::new().get("https://idp.test/api/v2/clients"))
			.await
			.expect("Cached token should be attached.")
			.build()
			.expect("Request should build.");

		assert_eq!(
			request.headers().get("authorization").and_then(|value| value.to_str().ok()),
			Some("Bearer cached"),
		);
	}
}
