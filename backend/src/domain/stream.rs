//! Serialized stream driver for large collection scans.
//!
//! Jobs that walk the whole user collection must bound both memory and the
//! load they put on downstream services (store writes, mail transport). The
//! driver pulls one record at a time and awaits the per-record action to
//! completion before polling the source again, so exactly one side-effecting
//! action is in flight per stream. This deliberately trades throughput for
//! safety against overload.

use std::fmt::Display;
use std::pin::pin;

use futures_util::{Stream, StreamExt};
use tracing::warn;

use super::Error;

/// Totals for one drained stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrainSummary {
    /// Records whose action completed successfully.
    pub processed: u64,
    /// Records dropped because the stream item or the action failed.
    pub failed: u64,
}

/// Drain `stream`, running `action` for each record strictly one at a time.
///
/// Failures are fail-open per record: a failed stream item or action is
/// logged under `label` and the stream resumes. A stream yielding zero
/// records completes normally with an all-zero summary.
pub async fn drain_serially<R, E, S, F, Fut>(stream: S, label: &str, mut action: F) -> DrainSummary
where
    S: Stream<Item = Result<R, E>>,
    E: Display,
    F: FnMut(R) -> Fut,
    Fut: Future<Output = Result<(), Error>>,
{
    let mut stream = pin!(stream);
    let mut summary = DrainSummary::default();

    while let Some(item) = stream.next().await {
        match item {
            Ok(record) => match action(record).await {
                Ok(()) => summary.processed += 1,
                Err(error) => {
                    summary.failed += 1;
                    warn!(job = label, error = %error, "record action failed; stream resumes");
                }
            },
            Err(error) => {
                summary.failed += 1;
                warn!(job = label, error = %error, "stream item failed; stream resumes");
            }
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

    use futures_util::stream;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::empty(0)]
    #[case::single(1)]
    #[case::large(1000)]
    #[tokio::test]
    async fn never_runs_two_actions_concurrently(#[case] count: u64) {
        let active = AtomicUsize::new(0);
        let max_active = AtomicUsize::new(0);

        let items = stream::iter((0..count).map(Ok::<u64, std::convert::Infallible>));
        let summary = drain_serially(items, "concurrency-probe", |_record| async {
            let now = active.fetch_add(1, Ordering::SeqCst) + 1;
            max_active.fetch_max(now, Ordering::SeqCst);
            tokio::task::yield_now().await;
            active.fetch_sub(1, Ordering::SeqCst);
            Ok(())
        })
        .await;

        assert_eq!(summary.processed, count);
        assert_eq!(summary.failed, 0);
        assert!(
            max_active.load(Ordering::SeqCst) <= 1,
            "a second action must never start before the first completes",
        );
    }

    #[tokio::test]
    async fn action_failures_do_not_stop_the_stream() {
        let attempted = AtomicU64::new(0);

        let items = stream::iter((0_u64..5).map(Ok::<u64, std::convert::Infallible>));
        let summary = drain_serially(items, "fail-open-probe", |record| {
            attempted.fetch_add(1, Ordering::SeqCst);
            async move {
                if record % 2 == 0 {
                    Err(Error::internal("record rejected"))
                } else {
                    Ok(())
                }
            }
        })
        .await;

        assert_eq!(attempted.load(Ordering::SeqCst), 5, "every record is attempted");
        assert_eq!(summary.processed, 2);
        assert_eq!(summary.failed, 3);
    }

    #[tokio::test]
    async fn stream_item_errors_are_counted_and_skipped() {
        let items = stream::iter(vec![Ok(1_u64), Err("cursor wobble"), Ok(2)]);
        let summary = drain_serially(items, "item-error-probe", |_record| async { Ok(()) }).await;

        assert_eq!(summary.processed, 2);
        assert_eq!(summary.failed, 1);
    }
}
