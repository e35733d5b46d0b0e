//! [`Notifier`] implementations used by the server.

use async_trait::async_trait;
use tokenpair_core::auth::{Notifier, NotifyError};

use crate::delivery::email::{EmailDelivery, EmailError};

pub const LOGIN_FROM_NEW_IP_SUBJECT: &str = "Login from new IP.";

/// Body of the new-IP notice.
pub fn login_from_new_ip_body(old_ip: &str) -> String {
    format!("Login from new IP address: {old_ip}")
}

/// Delivers new-IP notices by email.
pub struct EmailNotifier {
    delivery: EmailDelivery,
}

impl EmailNotifier {
    pub fn new(delivery: EmailDelivery) -> Self {
        Self { delivery }
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn send_login_from_new_ip(&self, old_ip: &str, email: &str) -> Result<(), NotifyError> {
        self.delivery
            .send(
                email,
                LOGIN_FROM_NEW_IP_SUBJECT,
                &login_from_new_ip_body(old_ip),
            )
            .await
            .map_err(into_notify_error)
    }
}

fn into_notify_error(err: EmailError) -> NotifyError {
    match err {
        EmailError::Address(e) => NotifyError::Address(e.to_string()),
        other => NotifyError::Delivery(Box::new(other)),
    }
}

/// Fallback when SMTP is not configured: the notice is only logged.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_login_from_new_ip(&self, old_ip: &str, email: &str) -> Result<(), NotifyError> {
        tracing::warn!(
            to = email,
            old_ip,
            "Login from new IP; email delivery not configured"
        );
        Ok(())
    }
}
