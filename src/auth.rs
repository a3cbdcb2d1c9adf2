//! Credential primitives: redacted secrets, normalized scope sets, and username rules.

pub mod scope;
pub mod secret;
pub mod username;

pub use scope::*;
pub use secret::*;
pub use username::*;
