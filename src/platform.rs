//! Generic host-platform entities exchanged through the key-manager contract.
//!
//! These types are owned by the host platform. The adapter reads and writes a fixed set of
//! well-known parameters and never persists any of them.

pub mod application;
pub mod resource;
pub mod token;

pub use application::*;
pub use resource::*;
pub use token::*;
