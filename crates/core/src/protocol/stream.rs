//! Background decoding with a single consumer.
//!
//! A blocking worker decodes the payload and pushes records into a bounded
//! channel; the consumer reads them through [`RecordStream`]. Dropping the
//! stream or firing its token stops the worker at the next record.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;
use tokio::task::{self, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use ledgersync_shared::types::ApiVersion;

use super::dialect::dialect_for;
use super::error::ProtocolError;
use super::tree::TreeBuilder;
use crate::model::{AccountNode, AccountTree, Transaction};

/// Forward-only stream of decoded records.
///
/// Yields `Err` at most once, as its last item. A cancelled decode ends
/// with `ProtocolError::Cancelled`, so a truncated stream is never mistaken
/// for a complete one. A worker that stops without reporting is surfaced as
/// `ProtocolError::WorkerFailed`.
#[derive(Debug)]
pub struct RecordStream<T> {
    rx: mpsc::Receiver<Result<T, ProtocolError>>,
    worker: Option<JoinHandle<()>>,
    cancel: CancellationToken,
}

impl<T> RecordStream<T> {
    /// Token that stops the worker when cancelled.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Asks the worker to stop before its next record.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Receives the next record.
    pub async fn recv(&mut self) -> Option<Result<T, ProtocolError>> {
        std::future::poll_fn(|cx| Pin::new(&mut *self).poll_next(cx)).await
    }
}

impl<T> Stream for RecordStream<T> {
    type Item = Result<T, ProtocolError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        match this.rx.poll_recv(cx) {
            Poll::Ready(Some(item)) => Poll::Ready(Some(item)),
            Poll::Pending => Poll::Pending,
            Poll::Ready(None) => {
                let Some(worker) = this.worker.as_mut() else {
                    return Poll::Ready(None);
                };
                match Pin::new(worker).poll(cx) {
                    Poll::Pending => Poll::Pending,
                    Poll::Ready(joined) => {
                        this.worker = None;
                        match joined {
                            Ok(()) => Poll::Ready(None),
                            Err(err) => Poll::Ready(Some(Err(ProtocolError::WorkerFailed(
                                err.to_string(),
                            )))),
                        }
                    }
                }
            }
        }
    }
}

impl<T> Unpin for RecordStream<T> {}

impl<T> Drop for RecordStream<T> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Spawns a blocking worker that feeds `produce`'s records into a stream.
fn spawn_worker<T, P>(capacity: usize, cancel: CancellationToken, produce: P) -> RecordStream<T>
where
    T: Send + 'static,
    P: FnOnce(&CancellationToken, &mut dyn FnMut(T) -> Result<(), ProtocolError>) -> Result<usize, ProtocolError>
        + Send
        + 'static,
{
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let worker_cancel = cancel.clone();

    let worker = task::spawn_blocking(move || {
        let mut send = |record: T| {
            tx.blocking_send(Ok(record))
                .map_err(|_| ProtocolError::Cancelled)
        };
        match produce(&worker_cancel, &mut send) {
            Ok(count) => debug!(records = count, "decode worker finished"),
            Err(err) => {
                if matches!(err, ProtocolError::Cancelled) {
                    debug!("decode worker cancelled");
                } else {
                    warn!(error = %err, code = err.error_code(), "decode worker failed");
                }
                // The consumer may be gone already.
                let _ = tx.blocking_send(Err(err));
            }
        }
    });

    RecordStream {
        rx,
        worker: Some(worker),
        cancel,
    }
}

/// Decodes accounts on a blocking worker.
///
/// Must be called from within a Tokio runtime.
///
/// # Errors
///
/// Returns `ProtocolError::UnsupportedVersion` before spawning anything if
/// `version` has no dialect.
pub fn stream_accounts(
    bytes: Vec<u8>,
    version: ApiVersion,
    capacity: usize,
    cancel: CancellationToken,
) -> Result<RecordStream<AccountNode>, ProtocolError> {
    let dialect = dialect_for(version)?;
    debug!(%version, bytes = bytes.len(), "starting account decode");
    Ok(spawn_worker(capacity, cancel, move |cancel, sink| {
        dialect.decode_accounts(&bytes, cancel, sink)
    }))
}

/// Decodes transactions on a blocking worker.
///
/// Must be called from within a Tokio runtime.
///
/// # Errors
///
/// Returns `ProtocolError::UnsupportedVersion` before spawning anything if
/// `version` has no dialect.
pub fn stream_transactions(
    bytes: Vec<u8>,
    version: ApiVersion,
    capacity: usize,
    cancel: CancellationToken,
) -> Result<RecordStream<Transaction>, ProtocolError> {
    let dialect = dialect_for(version)?;
    debug!(%version, bytes = bytes.len(), "starting transaction decode");
    Ok(spawn_worker(capacity, cancel, move |cancel, sink| {
        dialect.decode_transactions(&bytes, cancel, sink)
    }))
}

/// Drains an account stream into a tree.
///
/// The tree is only returned once the whole stream succeeded; on any error,
/// cancellation included, the partial tree is discarded.
///
/// # Errors
///
/// Returns the first error from the stream or from tree building.
pub async fn collect_tree(
    mut stream: RecordStream<AccountNode>,
) -> Result<AccountTree, ProtocolError> {
    let mut builder = TreeBuilder::new();
    while let Some(record) = stream.recv().await {
        builder.insert(record?)?;
    }
    let tree = builder.finish();
    info!(
        accounts = tree.len(),
        postings = tree.total_postings(),
        "account tree built"
    );
    Ok(tree)
}

/// Drains a transaction stream.
///
/// # Errors
///
/// Returns the first error from the stream, `ProtocolError::Cancelled`
/// included; no partial list is returned.
pub async fn collect_transactions(
    mut stream: RecordStream<Transaction>,
) -> Result<Vec<Transaction>, ProtocolError> {
    let mut transactions = Vec::new();
    while let Some(record) = stream.recv().await {
        transactions.push(record?);
    }
    info!(transactions = transactions.len(), "transactions decoded");
    Ok(transactions)
}
