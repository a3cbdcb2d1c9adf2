//! Provider-facing wire records and the clients that speak to the authorization server.
//!
//! Each concern sits behind its own trait so the facade can compose them and tests can swap any
//! of them out:
//!
//! - [`ClientRegistrar`] performs dynamic client registration (`{audience}clients`).
//! - [`ResourceProvisioner`] ensures the platform's resource server exists
//!   (`{audience}resource-servers`).
//! - [`TokenBroker`] exchanges application credentials at the token endpoint.

pub mod model;
pub mod registrar;
pub mod resource_server;
pub mod token;

pub use model::*;
pub use registrar::*;
pub use resource_server::*;
pub use token::*;

// self
use crate::_prelude::*;

/// Future returned by provider clients.
pub type ProviderFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;
