use axum::async_trait;
use tracing::{info, warn};

/// Outbound notification message. `text` and `html` are alternative bodies
/// of the same content.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Email delivery abstraction. Delivery is best-effort everywhere in this
/// service; no caller rolls back state when a send fails.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> anyhow::Result<()>;
}

/// Local/dev sender that logs the message instead of delivering it.
#[derive(Clone, Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &EmailMessage) -> anyhow::Result<()> {
        info!(
            to = %message.to,
            subject = %message.subject,
            "email send stub"
        );
        Ok(())
    }
}

/// Sends a notification, logging and swallowing any failure. User and
/// referral creation are considered successful even when delivery fails.
pub async fn send_best_effort(mailer: &dyn Mailer, message: EmailMessage) {
    if let Err(e) = mailer.send(&message).await {
        warn!(to = %message.to, error = %e, "email delivery failed; continuing");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn log_mailer_always_succeeds() {
        let mailer = LogMailer;
        let msg = EmailMessage {
            to: "someone@example.com".into(),
            subject: "hello".into(),
            text: "hi".into(),
            html: "<p>hi</p>".into(),
        };
        assert!(mailer.send(&msg).await.is_ok());
    }
}
