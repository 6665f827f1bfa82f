use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::calendar;
use crate::engine::Engine;

/// Background task that keeps booking statuses in step with the wall-clock date.
pub async fn run_status_ticker(engine: Arc<Engine>, period: Duration) {
    let mut interval = tokio::time::interval(period);
    loop {
        interval.tick().await;
        let today = calendar::today();
        match engine.advance_statuses(today).await {
            Ok(changes) if !changes.is_empty() => debug!(%today, changes = changes.len(), "ticker advanced statuses"),
            Ok(_) => {}
            // Outside the supported year window; nothing to advance.
            Err(e) => warn!("ticker skip {today}: {e}"),
        }
    }
}
