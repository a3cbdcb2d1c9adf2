//! Request interceptors that authenticate management API calls.
//!
//! Provider clients never attach credentials themselves; they hand every outbound
//! [`RequestBuilder`] to a [`RequestInterceptor`] before dispatching it.

pub mod management;

pub use management::*;

// crates.io
use reqwest::RequestBuilder;
// self
use crate::{_prelude::*, auth::Secret};

/// Future returned by [`RequestInterceptor::intercept`].
pub type InterceptFuture<'a> = Pin<Box<dyn Future<Output = Result<RequestBuilder>> + 'a + Send>>;

/// Decorates outbound management requests with authentication state.
pub trait RequestInterceptor
where
	Self: Send + Sync,
{
	/// Consumes the request and returns it with credentials attached.
	fn intercept(&self, request: RequestBuilder) -> InterceptFuture<'_>;
}

/// Interceptor that attaches a fixed bearer token.
#[derive(Clone, Debug)]
pub struct StaticBearerInterceptor {
	token: Secret,
}
impl StaticBearerInterceptor {
	/// Creates an interceptor for a pre-issued management token.
	pub fn new(token: impl Into<Secret>) -> Self {
		Self { token: token.into() }
	}
}
impl RequestInterceptor for StaticBearerInterceptor {
	fn intercept(&self, request: RequestBuilder) -> InterceptFuture<'_> {
		Box::pin(async move { Ok(request.bearer_auth(self.token.expose())) })
	}
}
