//! Token exchange inputs and outputs shared with the host platform.

// self
use crate::{
	_prelude::*,
	auth::{ScopeSet, Secret},
};

/// Grant type used when the caller does not request one.
pub const DEFAULT_GRANT_TYPE: &str = "client_credentials";

/// Message carried by [`TokenOutcome::ResourceNotAuthorized`].
pub const RESOURCE_NOT_AUTHORIZED_MESSAGE: &str =
	"Please register this application with the platform's protected resource to receive tokens.";

/// Platform-level token exchange request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessTokenRequest {
	/// Client identifier of the application.
	pub client_id: String,
	/// Client secret of the application.
	pub client_secret: Secret,
	/// Requested grant type; [`DEFAULT_GRANT_TYPE`] when unset.
	pub grant_type: Option<String>,
	/// Requested scopes.
	pub scopes: ScopeSet,
}
impl AccessTokenRequest {
	/// Creates a request for the provided client credentials.
	pub fn new(client_id: impl Into<String>, client_secret: impl Into<Secret>) -> Self {
		Self {
			client_id: client_id.into(),
			client_secret: client_secret.into(),
			grant_type: None,
			scopes: ScopeSet::default(),
		}
	}

	/// Overrides the grant type.
	pub fn with_grant_type(mut self, grant_type: impl Into<String>) -> Self {
		self.grant_type = Some(grant_type.into());

		self
	}

	/// Overrides the requested scopes.
	pub fn with_scopes(mut self, scopes: ScopeSet) -> Self {
		self.scopes = scopes;

		self
	}

	/// Grant type sent to the provider.
	pub fn effective_grant_type(&self) -> &str {
		self.grant_type.as_deref().filter(|grant| !grant.trim().is_empty()).unwrap_or(DEFAULT_GRANT_TYPE)
	}
}

/// Platform-level description of an issued token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessTokenInfo {
	/// Client identifier the token was issued to.
	pub consumer_key: String,
	/// Client secret used for the exchange.
	pub consumer_secret: Secret,
	/// Issued access token.
	pub access_token: Secret,
	/// Scopes granted by the provider.
	pub scopes: ScopeSet,
	/// Token lifetime reported by the provider.
	pub validity_period: Option<Duration>,
}

/// Result of an application token exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenOutcome {
	/// Provider issued a token.
	Issued(AccessTokenInfo),
	/// Provider refused with HTTP 403 because the client is not authorized for the platform's
	/// resource server. No token was issued.
	ResourceNotAuthorized {
		/// Human-readable remediation hint.
		message: String,
	},
}
impl TokenOutcome {
	/// Builds the forbidden outcome with the standard remediation message.
	pub fn resource_not_authorized() -> Self {
		Self::ResourceNotAuthorized { message: RESOURCE_NOT_AUTHORIZED_MESSAGE.into() }
	}

	/// Returns the issued token info, if any.
	pub fn issued(&self) -> Option<&AccessTokenInfo> {
		match self {
			Self::Issued(info) => Some(info),
			Self::ResourceNotAuthorized { .. } => None,
		}
	}

	/// Consumes the outcome, returning the issued token info, if any.
	pub fn into_issued(self) -> Option<AccessTokenInfo> {
		match self {
			Self::Issued(info) => Some(info),
			Self::ResourceNotAuthorized { .. } => None,
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn grant_type_defaults_to_client_credentials() {
		let request = AccessTokenRequest::new("client", "secret");

		assert_eq!(request.effective_grant_type(), DEFAULT_GRANT_TYPE);
		assert_eq!(request.clone().with_grant_type(" ").effective_grant_type(), DEFAULT_GRANT_TYPE);
		assert_eq!(request.with_grant_type("password").effective_grant_type(), "password");
	}

	#[test]
	fn forbidden_outcome_has_no_token() {
		let outcome = TokenOutcome::resource_not_authorized();

		assert!(outcome.issued().is_none());
		assert!(matches!(
			&outcome,
			TokenOutcome::ResourceNotAuthorized { message } if message == RESOURCE_NOT_AUTHORIZED_MESSAGE
		));
		assert!(outcome.into_issued().is_none());
	}
}
