//! Outbound security notices for tokenpair.
//!
//! - [`delivery`] -- SMTP transport for plain-text emails.
//! - [`notifier`] -- implementations of the core `Notifier` trait: email
//!   delivery, or a log-only fallback when SMTP is not configured.

pub mod delivery;
pub mod notifier;

pub use delivery::email::{EmailConfig, EmailDelivery, EmailError};
pub use notifier::{EmailNotifier, LogNotifier};
