use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::logger::object::{format_offset, sync_local_offset};

/// Interval between two local offset checks.
pub const TZ_SYNC_PERIOD: Duration = Duration::from_secs(3600);

/// Keep the local offset of timestamps current (DST changes) until `cancel` fires.
///
/// Detection can fail in a multi-threaded process; such rounds are skipped.
pub async fn run_timezone_sync(period: Duration, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => match sync_local_offset() {
                Some((old, new)) => {
                    info!(from = %format_offset(old), to = %format_offset(new), "local timezone offset changed");
                }
                None => debug!("local timezone offset unchanged"),
            },
        }
    }
    debug!("timezone sync stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn stops_on_cancel() {
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run_timezone_sync(Duration::from_secs(1), cancel.clone()));
        tokio::time::sleep(Duration::from_secs(3)).await;
        cancel.cancel();
        task.await.unwrap();
    }
}
