//! Tokenpair core domain.
//!
//! - [`auth`] -- the session rotation engine: token codec, refresh-secret
//!   hashing and generation, collaborator traits, and [`auth::SessionRotator`].
//! - [`error`] -- generic domain errors shared by the HTTP surface.
//! - [`types`] -- primitive aliases used across crates.

pub mod auth;
pub mod error;
pub mod types;
