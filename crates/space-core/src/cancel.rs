use std::future::Future;

use tokio_util::sync::CancellationToken;

/// Drive `fut` unless `cancel` fires first. `None` means canceled.
///
/// The future is dropped on cancellation, together with any claim guard it owns.
pub(crate) async fn or_cancel<F>(cancel: &CancellationToken, fut: F) -> Option<F::Output>
where
    F: Future,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        out = fut => Some(out),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn completes_when_not_canceled() {
        let cancel = CancellationToken::new();
        assert_eq!(or_cancel(&cancel, async { 7 }).await, Some(7));
    }

    #[tokio::test]
    async fn cancellation_wins_over_pending_work() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let out = or_cancel(&cancel, tokio::time::sleep(Duration::from_secs(60))).await;
        assert!(out.is_none());
    }
}
