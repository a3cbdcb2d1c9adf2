//! Username rules used when deriving provider client names.
//!
//! Platform usernames arrive fully qualified as `[DOMAIN/]name[@tenant]`. Client names registered
//! with the provider use the tenant-aware form (tenant suffix removed), and secondary user-store
//! domains keep their prefix as a separate name segment.

// std
use std::borrow::Cow;

/// User-store domain that owns unqualified usernames.
pub const PRIMARY_DOMAIN: &str = "PRIMARY";
/// Separator between a user-store domain and the username.
pub const DOMAIN_SEPARATOR: char = '/';
/// Separator between the username and its tenant domain.
pub const TENANT_SEPARATOR: char = '@';

/// Strips the trailing `@tenant` qualifier from a fully qualified username.
pub fn tenant_aware_username(username: &str) -> &str {
	match username.rfind(TENANT_SEPARATOR) {
		Some(idx) if idx > 0 => &username[..idx],
		_ => username,
	}
}

/// Extracts the user-store domain, falling back to [`PRIMARY_DOMAIN`].
pub fn user_store_domain(username: &str) -> Cow<'_, str> {
	match username.split_once(DOMAIN_SEPARATOR) {
		Some((domain, _)) if !domain.is_empty() => Cow::Owned(domain.to_ascii_uppercase()),
		_ => Cow::Borrowed(PRIMARY_DOMAIN),
	}
}

/// Splits a username into the segments used inside provider client names.
///
/// The tenant qualifier is removed. Users outside the primary domain yield their domain and bare
/// name as two segments; everyone else yields the tenant-aware name as one.
pub fn client_name_segments(username: &str) -> Vec<&str> {
	let tenant_aware = tenant_aware_username(username);

	if tenant_aware.is_empty() {
		return Vec::new();
	}
	if user_store_domain(tenant_aware) == PRIMARY_DOMAIN {
		return vec![tenant_aware];
	}

	match tenant_aware.split_once(DOMAIN_SEPARATOR) {
		Some((domain, name)) => vec![domain, name],
		None => vec![tenant_aware],
	}
}
