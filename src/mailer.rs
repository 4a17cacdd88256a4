use axum::async_trait;
use tracing::info;

/// Outbound mail seam. The service only ever sends the password-reset
/// message, so the trait stays narrow.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_password_reset(
        &self,
        recipient_name: &str,
        recipient_email: &str,
        temp_token: &str,
    ) -> anyhow::Result<()>;
}

/// Transport that writes the message to the log instead of sending it.
/// Real delivery lives outside this service; swapping the trait object in
/// `AppState` is enough to plug in an SMTP or API transport.
#[derive(Clone)]
pub struct LogMailer {
    from: String,
    reset_base_url: String,
}

impl LogMailer {
    pub fn new(from: &str, reset_base_url: &str) -> Self {
        Self {
            from: from.to_string(),
            reset_base_url: reset_base_url.to_string(),
        }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send_password_reset(
        &self,
        recipient_name: &str,
        recipient_email: &str,
        temp_token: &str,
    ) -> anyhow::Result<()> {
        let reset_link = format!("{}/{}", self.reset_base_url.trim_end_matches('/'), temp_token);
        info!(
            from = %self.from,
            to = %recipient_email,
            name = %recipient_name,
            %reset_link,
            "password reset mail (logged, not sent)"
        );
        Ok(())
    }
}
