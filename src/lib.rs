//! Client for the collaborative exercises platform.
//!
//! ARCHITECTURE
//! ============
//! `gateway` is the single request path: it joins endpoints to the base
//! URL, attaches the bearer token from the injected `session` store, and
//! turns every response into JSON or a typed failure. `services` holds one
//! function per API operation on top of it, decoding into `types`.
//! `display` has the client-side presentation helpers.

pub mod config;
pub mod display;
pub mod error;
pub mod gateway;
pub mod services;
pub mod session;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
