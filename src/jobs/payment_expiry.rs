// ==================== PAYMENT EXPIRY SCHEDULER ====================
// Hourly sweep that marks yearly subscriptions as unpaid once they lapse.

use crate::{database::MongoDB, services::payment_service};
use tokio::time::{interval, Duration};

const SWEEP_INTERVAL: Duration = Duration::from_secs(3600);

/// Spawns the sweep. The first tick fires immediately, so lapsed
/// payments are caught on startup too.
pub fn start_payment_expiry_scheduler(db: MongoDB) {
    log::info!("📅 Starting payment expiry scheduler (runs every hour)");

    tokio::spawn(async move {
        let mut interval = interval(SWEEP_INTERVAL);

        loop {
            interval.tick().await;

            match payment_service::expire_stale_payments(&db).await {
                Ok(0) => log::debug!("⏰ Payment expiry check: nothing to expire"),
                Ok(count) => log::info!("✅ Payment expiry check: {} subscriptions marked unpaid", count),
                Err(e) => log::error!("❌ Payment expiry check failed: {}", e),
            }
        }
    });
}
