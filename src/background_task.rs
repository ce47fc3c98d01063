use std::sync::Arc;

use tokio::time::{interval, Duration};

use crate::{AppAuthHandler, AppProjectHandler};

const PURGE_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Periodically drops expired token revocations and deletion tickets.
pub async fn start_purge_task(auth_handler: Arc<AppAuthHandler>, project_handler: Arc<AppProjectHandler>) {
    let mut interval = interval(PURGE_INTERVAL);

    loop {
        interval.tick().await;

        let revocations = auth_handler.purge_expired_revocations();
        let tickets = project_handler.purge_expired_tickets();
        if revocations > 0 || tickets > 0 {
            tracing::info!(revocations, tickets, "Purged expired entries");
        }
    }
}
