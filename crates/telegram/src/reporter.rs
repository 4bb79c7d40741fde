//! Drives a status message from byte-count samples
//!
//! The transfer side publishes cumulative byte counts through a
//! [`ProgressSender`]; a spawned task owns the [`TransferSession`], decides
//! when to edit the status message and performs the edits. Edits never block
//! the transfer, and failed edits are logged and dropped.

use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;

use progress::{render_text, TransferSession};
use tokio::io::{AsyncRead, ReadBuf};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::status::{discard_push_error, StatusSink};

/// Cheap handle for publishing the cumulative byte count of a transfer
#[derive(Clone)]
pub struct ProgressSender {
    tx: Arc<watch::Sender<u64>>,
}

impl ProgressSender {
    pub fn report(&self, transferred_bytes: u64) {
        self.tx.send_replace(transferred_bytes);
    }
}

/// Background task rendering the progress of one transfer
pub struct ProgressReporter {
    sender: ProgressSender,
    stop: CancellationToken,
    handle: JoinHandle<()>,
}

impl ProgressReporter {
    /// Spawn the reporter task for `session`
    pub fn spawn<S: StatusSink>(status: S, session: TransferSession, filename: String) -> Self {
        let (tx, rx) = watch::channel(0);
        let stop = CancellationToken::new();
        let handle = tokio::spawn(run(rx, stop.clone(), session, status, filename));

        Self {
            sender: ProgressSender { tx: Arc::new(tx) },
            stop,
            handle,
        }
    }

    pub fn sender(&self) -> ProgressSender {
        self.sender.clone()
    }

    /// Stop the task after it has handled the latest sample.
    ///
    /// If the transfer completed, the 100% frame is shown before this returns.
    pub async fn finish(self) {
        self.stop.cancel();
        if let Err(e) = self.handle.await {
            tracing::warn!("Progress reporter task failed: {}", e);
        }
    }
}

async fn run<S: StatusSink>(
    mut rx: watch::Receiver<u64>,
    stop: CancellationToken,
    mut session: TransferSession,
    status: S,
    filename: String,
) {
    let mut completion_shown = false;

    loop {
        tokio::select! {
            biased;
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let bytes = *rx.borrow_and_update();
                let now = Instant::now();
                if session.record_sample_at(bytes, now).is_none() && !session.is_complete() {
                    continue;
                }
                if session.should_push_update(now) && !completion_shown {
                    completion_shown = push(&mut session, &status, &filename, now).await;
                }
            }
            _ = stop.cancelled() => break,
        }
    }

    // Pick up a final sample published right before the stop signal
    let bytes = *rx.borrow();
    let now = Instant::now();
    session.record_sample_at(bytes, now);
    if session.is_complete() && !completion_shown {
        push(&mut session, &status, &filename, now).await;
    }
}

/// Edit the status message; returns whether a completed session was shown
async fn push<S: StatusSink>(
    session: &mut TransferSession,
    status: &S,
    filename: &str,
    now: Instant,
) -> bool {
    let text = render_text(&session.snapshot_at(now), filename);
    match status.push(text).await {
        Ok(()) => {
            session.mark_pushed(now);
            session.is_complete()
        }
        Err(err) => {
            discard_push_error(Err(err));
            false
        }
    }
}

/// `AsyncRead` adapter publishing how many bytes have been read.
///
/// Reading fails with `Interrupted` once `cancel` fires, which aborts the
/// request streaming the body.
pub struct CountingReader<R> {
    inner: R,
    read: u64,
    progress: ProgressSender,
    cancel: CancellationToken,
}

impl<R> CountingReader<R> {
    pub fn new(inner: R, progress: ProgressSender, cancel: CancellationToken) -> Self {
        Self {
            inner,
            read: 0,
            progress,
            cancel,
        }
    }

    pub fn bytes_read(&self) -> u64 {
        self.read
    }
}

impl<R: AsyncRead + Unpin> AsyncRead for CountingReader<R> {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = &mut *self;
        if this.cancel.is_cancelled() {
            return Poll::Ready(Err(io::Error::new(
                io::ErrorKind::Interrupted,
                "transfer cancelled",
            )));
        }

        let before = buf.filled().len();
        match Pin::new(&mut this.inner).poll_read(cx, buf) {
            Poll::Ready(Ok(())) => {
                let n = buf.filled().len() - before;
                if n > 0 {
                    this.read += n as u64;
                    this.progress.report(this.read);
                }
                Poll::Ready(Ok(()))
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::PushError;
    use async_trait::async_trait;
    use progress::{Direction, ProgressPolicy};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::io::AsyncReadExt;

    fn sender() -> (ProgressSender, watch::Receiver<u64>) {
        let (tx, rx) = watch::channel(0);
        (ProgressSender { tx: Arc::new(tx) }, rx)
    }

    /// Keeps every frame that went through and fails the next `failures` pushes
    #[derive(Clone, Default)]
    struct RecordingSink {
        pushed: Arc<Mutex<Vec<String>>>,
        attempts: Arc<AtomicUsize>,
        failures: Arc<AtomicUsize>,
    }

    impl RecordingSink {
        fn failing(failures: usize) -> Self {
            let sink = Self::default();
            sink.failures.store(failures, Ordering::SeqCst);
            sink
        }

        fn pushed(&self) -> Vec<String> {
            self.pushed.lock().unwrap().clone()
        }

        fn attempts(&self) -> usize {
            self.attempts.load(Ordering::SeqCst)
        }

        async fn wait_for_attempts(&self, n: usize) {
            tokio::time::timeout(Duration::from_secs(5), async {
                while self.attempts() < n {
                    tokio::time::sleep(Duration::from_millis(1)).await;
                }
            })
            .await
            .expect("reporter never pushed");
        }
    }

    #[async_trait]
    impl StatusSink for RecordingSink {
        async fn push(&self, text: String) -> Result<(), PushError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            let fail = self
                .failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if fail {
                return Err(PushError::RateLimited);
            }
            self.pushed.lock().unwrap().push(text);
            Ok(())
        }
    }

    fn session(total: u64, min_sample_interval: Duration, ui_throttle: Duration) -> TransferSession {
        let policy = ProgressPolicy {
            min_sample_interval,
            ui_throttle,
        };
        TransferSession::with_policy(total, Direction::Download, policy)
    }

    #[tokio::test]
    async fn test_completion_frame_pushed_once() {
        let sink = RecordingSink::default();
        let reporter = ProgressReporter::spawn(
            sink.clone(),
            session(100, Duration::ZERO, Duration::from_secs(1)),
            "a.bin".to_string(),
        );
        let progress = reporter.sender();

        progress.report(40);
        sink.wait_for_attempts(1).await;
        progress.report(100);
        sink.wait_for_attempts(2).await;

        // A repeated final count must not edit the message again
        progress.report(100);
        tokio::time::sleep(Duration::from_millis(20)).await;
        reporter.finish().await;

        let pushed = sink.pushed();
        assert_eq!(sink.attempts(), 2);
        assert_eq!(pushed.len(), 2);
        assert!(pushed[0].contains("40.0%"));
        assert!(pushed[1].contains("100.0%"));
        assert_eq!(pushed.iter().filter(|t| t.contains("100.0%")).count(), 1);
    }

    #[tokio::test]
    async fn test_failed_completion_frame_is_retried() {
        let sink = RecordingSink::failing(1);
        let reporter = ProgressReporter::spawn(
            sink.clone(),
            session(100, Duration::ZERO, Duration::from_secs(1)),
            "a.bin".to_string(),
        );

        reporter.sender().report(100);
        sink.wait_for_attempts(1).await;
        reporter.finish().await;

        let pushed = sink.pushed();
        assert_eq!(sink.attempts(), 2);
        assert_eq!(pushed.len(), 1);
        assert!(pushed[0].contains("100.0%"));
    }

    #[tokio::test]
    async fn test_failed_push_keeps_throttle_open() {
        let sink = RecordingSink::failing(1);
        let reporter = ProgressReporter::spawn(
            sink.clone(),
            session(1000, Duration::ZERO, Duration::from_secs(3600)),
            "a.bin".to_string(),
        );
        let progress = reporter.sender();

        progress.report(10);
        sink.wait_for_attempts(1).await;
        assert!(sink.pushed().is_empty());

        // The failed edit did not start the throttle window
        progress.report(20);
        sink.wait_for_attempts(2).await;

        // The successful one did
        progress.report(30);
        tokio::time::sleep(Duration::from_millis(20)).await;
        reporter.finish().await;

        let pushed = sink.pushed();
        assert_eq!(sink.attempts(), 2);
        assert_eq!(pushed.len(), 1);
        assert!(pushed[0].contains("2.0%"));
    }

    #[tokio::test]
    async fn test_final_frame_inside_sampling_interval() {
        let sink = RecordingSink::default();
        let reporter = ProgressReporter::spawn(
            sink.clone(),
            session(100, Duration::from_secs(3600), Duration::from_secs(3600)),
            "a.bin".to_string(),
        );

        reporter.sender().report(100);
        reporter.finish().await;

        let pushed = sink.pushed();
        assert_eq!(pushed.len(), 1);
        assert!(pushed[0].contains("100.0%"));
    }

    #[tokio::test]
    async fn test_incomplete_transfer_gets_no_final_frame() {
        let sink = RecordingSink::default();
        let reporter = ProgressReporter::spawn(
            sink.clone(),
            session(100, Duration::from_secs(3600), Duration::from_secs(3600)),
            "a.bin".to_string(),
        );

        reporter.sender().report(50);
        reporter.finish().await;

        assert_eq!(sink.attempts(), 0);
    }

    #[tokio::test]
    async fn test_counting_reader_reports_bytes() {
        let (progress, rx) = sender();
        let data = vec![7u8; 10_000];
        let mut reader = CountingReader::new(&data[..], progress, CancellationToken::new());

        let mut out = Vec::new();
        reader.read_to_end(&mut out).await.unwrap();

        assert_eq!(out, data);
        assert_eq!(reader.bytes_read(), 10_000);
        assert_eq!(*rx.borrow(), 10_000);
    }

    #[tokio::test]
    async fn test_counting_reader_stops_on_cancel() {
        let (progress, rx) = sender();
        let cancel = CancellationToken::new();
        let data = vec![1u8; 64];
        let mut reader = CountingReader::new(&data[..], progress, cancel.clone());

        let mut chunk = [0u8; 16];
        assert_eq!(reader.read(&mut chunk).await.unwrap(), 16);

        cancel.cancel();
        let err = reader.read(&mut chunk).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Interrupted);
        assert_eq!(*rx.borrow(), 16);
    }

    #[tokio::test]
    async fn test_sender_keeps_latest_value() {
        let (progress, mut rx) = sender();
        progress.report(10);
        progress.report(20);
        progress.clone().report(30);

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), 30);
    }
}
