//! # Print Job
//!
//! One receipt, start to finish:
//!
//! ```text
//! request ─► build ─► encode ─► negotiate ─► stream ─► release
//! ```
//!
//! Building and encoding are pure and never suspend, so they run before the
//! (slow, user-driven) device negotiation: a malformed request fails without
//! ever opening the chooser. The encoded bytes are kept whenever they were
//! produced, so a failed print can still be saved to a file.
//!
//! Dismissing the device chooser is not a failure. It is reported as
//! [`PrintEvent::Dismissed`] and [`JobFailure::is_user_cancelled`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::PrintConfig;
use crate::document;
use crate::error::NotaError;
use crate::receipt::PrintRequest;
use crate::transport::{
    BluetoothCapability, DeliveryChannel, NegotiationState, Negotiator, StreamResult, Streamer,
};

/// Progress notifications for a UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrintEvent {
    Negotiation(NegotiationState),
    Progress { sent: usize, total: usize },
    Finished { bytes_sent: usize },
    /// The user closed the device chooser.
    Dismissed,
    Failed { reason: String },
}

/// A completed print.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintReport {
    pub job_id: Uuid,
    /// Device name or output path.
    pub target: String,
    pub bytes_total: usize,
    pub bytes_sent: usize,
    pub elapsed: Duration,
}

/// A failed print, with the encoded receipt if encoding got that far.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct JobFailure {
    pub error: NotaError,
    pub encoded: Option<Vec<u8>>,
}

impl JobFailure {
    /// The user dismissed the device chooser; nothing to report.
    pub fn is_user_cancelled(&self) -> bool {
        self.error.is_user_cancelled()
    }

    fn new(error: impl Into<NotaError>, encoded: Option<Vec<u8>>) -> Self {
        Self {
            error: error.into(),
            encoded,
        }
    }
}

type EventObserver = Arc<dyn Fn(PrintEvent) + Send + Sync>;

/// Builds, encodes and delivers receipts with one configuration.
pub struct PrintJob {
    config: PrintConfig,
    observer: Option<EventObserver>,
    cancel: CancellationToken,
}

impl PrintJob {
    pub fn new(config: PrintConfig) -> Self {
        Self {
            config,
            observer: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_observer(mut self, observer: impl Fn(PrintEvent) + Send + Sync + 'static) -> Self {
        self.observer = Some(Arc::new(observer));
        self
    }

    /// Token that stops the stream at the next chunk boundary.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &PrintConfig {
        &self.config
    }

    fn emit(&self, event: PrintEvent) {
        if let Some(observer) = &self.observer {
            observer(event);
        }
    }

    /// Build and encode a receipt without touching any device.
    pub fn prepare(&self, request: &PrintRequest) -> Result<Vec<u8>, NotaError> {
        let doc = document::build_with(request, self.config.paper, &self.config.receipt_options())?;
        Ok(document::encode_with(
            &doc,
            self.config.paper,
            &self.config.encode_options(),
        ))
    }

    /// Print over Bluetooth: prepare the bytes, negotiate a printer, then
    /// stream and release.
    pub async fn run(
        &self,
        capability: Arc<dyn BluetoothCapability>,
        request: &PrintRequest,
    ) -> Result<PrintReport, JobFailure> {
        let job_id = Uuid::new_v4();
        let span = tracing::info_span!("print_job", %job_id, code = %request.transaction.code);

        async {
            let started = Instant::now();
            let negotiator = match &self.observer {
                Some(observer) => {
                    let observer = observer.clone();
                    Negotiator::new(capability)
                        .with_observer(move |state| observer(PrintEvent::Negotiation(state)))
                }
                None => Negotiator::new(capability),
            };

            let bytes = match self.prepare(request) {
                Ok(bytes) => bytes,
                Err(err) => return Err(self.failed(JobFailure::new(err, None))),
            };
            let mut session = match negotiator.negotiate(self.config.scan_timeout()).await {
                Ok(session) => session,
                Err(err) => return Err(self.failed(JobFailure::new(err, Some(bytes)))),
            };

            let result = self.deliver(&mut session, &bytes).await;
            session.release().await;
            self.finish(job_id, session.describe(), bytes, result, started)
        }
        .instrument(span)
        .await
    }

    /// Stream an already-encoded receipt to any channel and release it.
    pub async fn run_on(
        &self,
        channel: &mut dyn DeliveryChannel,
        bytes: Vec<u8>,
    ) -> Result<PrintReport, JobFailure> {
        let job_id = Uuid::new_v4();
        let span = tracing::info_span!("print_job", %job_id);

        async {
            let started = Instant::now();
            let result = self.deliver(channel, &bytes).await;
            channel.release().await;
            self.finish(job_id, channel.describe(), bytes, result, started)
        }
        .instrument(span)
        .await
    }

    async fn deliver(&self, channel: &mut dyn DeliveryChannel, bytes: &[u8]) -> StreamResult {
        Streamer::new(self.config.stream_options())
            .with_cancellation(self.cancel.clone())
            .stream(channel, bytes, |sent, total| {
                self.emit(PrintEvent::Progress { sent, total })
            })
            .await
    }

    fn finish(
        &self,
        job_id: Uuid,
        target: String,
        bytes: Vec<u8>,
        result: StreamResult,
        started: Instant,
    ) -> Result<PrintReport, JobFailure> {
        let bytes_total = bytes.len();
        match result {
            StreamResult::Completed(bytes_sent) => {
                let report = PrintReport {
                    job_id,
                    target,
                    bytes_total,
                    bytes_sent,
                    elapsed: started.elapsed(),
                };
                tracing::info!(
                    destination = %report.target,
                    bytes = bytes_sent,
                    elapsed_ms = report.elapsed.as_millis() as u64,
                    "receipt printed"
                );
                self.emit(PrintEvent::Finished { bytes_sent });
                Ok(report)
            }
            StreamResult::Failed(source, bytes_sent) => {
                let error = NotaError::ChunkWriteFailed {
                    bytes_sent,
                    bytes_total,
                    source,
                };
                Err(self.failed(JobFailure::new(error, Some(bytes))))
            }
            StreamResult::Cancelled(bytes_sent) => Err(self.failed(JobFailure::new(
                NotaError::Cancelled { bytes_sent },
                Some(bytes),
            ))),
        }
    }

    fn failed(&self, failure: JobFailure) -> JobFailure {
        if failure.is_user_cancelled() {
            tracing::info!("print job dismissed");
            self.emit(PrintEvent::Dismissed);
        } else {
            tracing::warn!(error = %failure.error, "print job failed");
            self.emit(PrintEvent::Failed {
                reason: failure.error.to_string(),
            });
        }
        failure
    }
}
