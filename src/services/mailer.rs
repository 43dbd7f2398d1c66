use crate::utils::error::AppError;
use async_trait::async_trait;

/// Outbound notifications. Delivery is pluggable; the default only logs.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_password_reset(&self, to: &str, reset_link: &str) -> Result<(), AppError>;
}

/// Logs the delivery instead of sending an email. The link carries a
/// bearer token, so it only shows up at debug level.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_password_reset(&self, to: &str, reset_link: &str) -> Result<(), AppError> {
        log::info!("📧 Password reset link sent to {}", to);
        log::debug!("   🔗 {}", reset_link);
        Ok(())
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Keeps every message so tests can assert on them
    #[derive(Default)]
    pub struct RecordingMailer {
        pub sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send_password_reset(&self, to: &str, reset_link: &str) -> Result<(), AppError> {
            self.sent
                .lock()
                .unwrap()
                .push((to.to_string(), reset_link.to_string()));
            Ok(())
        }
    }
}
