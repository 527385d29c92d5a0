//! Shipping-label workflow
//!
//! Per-order sequencing of the document protocol: resolve tracking, resolve
//! document type, request creation, poll until the task settles, download
//! and persist. Expected-terminal conditions (shipment never arranged,
//! already shipped, channel without documents) end in the skip path and are
//! counted separately from failures.

pub mod storage;

pub use storage::{LabelStorage, LocalLabelStorage, StorageError};

use shoal_marketplace::label::{DocumentStatus, LabelTransport};
use shoal_marketplace::MarketplaceError;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

/// Why an order was skipped rather than processed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The upstream "arrange shipment" step was never completed
    NotArranged,
    /// The parcel already left; no document can be created anymore
    AlreadyShipped,
    /// The logistics channel does not produce shipping documents
    ChannelUnsupported(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotArranged => write!(f, "shipment not arranged yet"),
            Self::AlreadyShipped => write!(f, "order already shipped"),
            Self::ChannelUnsupported(detail) => {
                write!(f, "channel does not support documents: {detail}")
            }
        }
    }
}

/// Terminal state of one workflow invocation
#[derive(Debug)]
pub enum LabelOutcome {
    /// Document downloaded and persisted; `reference` goes into the ledger
    Stored { order_sn: String, reference: String },
    /// Expected-terminal condition; nothing to alarm on
    Skipped {
        order_sn: String,
        reason: SkipReason,
    },
}

/// Label workflow error type
#[derive(Debug, Error)]
pub enum LabelError {
    /// Transport-level failure talking to the marketplace
    #[error("Label transport error: {0}")]
    Transport(#[from] MarketplaceError),

    /// Persisting the downloaded document failed
    #[error("Label storage error: {0}")]
    Storage(#[from] StorageError),

    /// The upstream document task reported failure
    #[error("Document task for {order_sn} failed: {reason}")]
    Failed { order_sn: String, reason: String },

    /// The task never left PROCESSING within the wait budget
    #[error("Document task for {order_sn} still processing after {waited_secs}s")]
    Timeout { order_sn: String, waited_secs: u64 },
}

/// Drives the label protocol for one order at a time
pub struct LabelWorkflow {
    transport: Arc<dyn LabelTransport>,
    storage: Arc<dyn LabelStorage>,
    poll_interval: Duration,
    max_wait: Duration,
}

impl LabelWorkflow {
    pub fn new(
        transport: Arc<dyn LabelTransport>,
        storage: Arc<dyn LabelStorage>,
        poll_interval: Duration,
        max_wait: Duration,
    ) -> Self {
        Self {
            transport,
            storage,
            poll_interval,
            max_wait,
        }
    }

    /// Run the full protocol for one order
    ///
    /// Re-invocation is safe: every step re-resolves upstream state instead
    /// of trusting anything from a previous attempt.
    pub async fn run(&self, order_sn: &str) -> Result<LabelOutcome, LabelError> {
        let Some(tracking) = self.transport.tracking_number(order_sn).await? else {
            tracing::info!(order_sn, "No tracking number yet, skipping");
            return Ok(LabelOutcome::Skipped {
                order_sn: order_sn.to_string(),
                reason: SkipReason::NotArranged,
            });
        };
        tracing::debug!(order_sn, tracking, "Tracking number resolved");

        let document_type = self.transport.suggested_document_type(order_sn).await?;

        if let Err(e) = self
            .transport
            .create_document(order_sn, None, &document_type)
            .await
        {
            if let Some(reason) = classify_create_error(&e) {
                tracing::info!(order_sn, %reason, "Document creation declined, skipping");
                return Ok(LabelOutcome::Skipped {
                    order_sn: order_sn.to_string(),
                    reason,
                });
            }
            return Err(e.into());
        }

        self.wait_until_ready(order_sn).await?;

        let bytes = self.transport.download_document(order_sn).await?;
        let reference = self.storage.store(order_sn, &bytes).await?;
        tracing::info!(order_sn, reference, "Label stored");

        Ok(LabelOutcome::Stored {
            order_sn: order_sn.to_string(),
            reference,
        })
    }

    /// Poll the document task until READY, FAILED or the wait budget runs out
    async fn wait_until_ready(&self, order_sn: &str) -> Result<(), LabelError> {
        let started = Instant::now();
        loop {
            match self.transport.document_status(order_sn).await? {
                DocumentStatus::Ready => return Ok(()),
                DocumentStatus::Failed { reason } => {
                    return Err(LabelError::Failed {
                        order_sn: order_sn.to_string(),
                        reason,
                    });
                }
                DocumentStatus::Processing => {
                    if started.elapsed() >= self.max_wait {
                        return Err(LabelError::Timeout {
                            order_sn: order_sn.to_string(),
                            waited_secs: started.elapsed().as_secs(),
                        });
                    }
                    tokio::time::sleep(self.poll_interval).await;
                }
            }
        }
    }
}

/// Map a creation error onto a skip reason where one applies
///
/// Only payload-level API errors are candidates; transport failures always
/// stay failures.
fn classify_create_error(error: &MarketplaceError) -> Option<SkipReason> {
    let MarketplaceError::Api { code, message } = error else {
        return None;
    };
    let haystack = format!("{} {}", code, message).to_lowercase();
    if haystack.contains("already_shipped") || haystack.contains("already shipped") {
        return Some(SkipReason::AlreadyShipped);
    }
    if haystack.contains("not support") || haystack.contains("unsupported") {
        return Some(SkipReason::ChannelUnsupported(message.clone()));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use shoal_marketplace::MarketplaceResult;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct ScriptedTransport {
        tracking: Option<String>,
        create_error: Option<(String, String)>,
        statuses: Mutex<VecDeque<DocumentStatus>>,
        created_with: Mutex<Vec<String>>,
    }

    impl ScriptedTransport {
        fn ready_after(processing_polls: usize) -> Self {
            let mut statuses: VecDeque<DocumentStatus> =
                std::iter::repeat(DocumentStatus::Processing)
                    .take(processing_polls)
                    .collect();
            statuses.push_back(DocumentStatus::Ready);
            Self {
                tracking: Some("TRACK123".to_string()),
                create_error: None,
                statuses: Mutex::new(statuses),
                created_with: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LabelTransport for ScriptedTransport {
        async fn tracking_number(&self, _order_sn: &str) -> MarketplaceResult<Option<String>> {
            Ok(self.tracking.clone())
        }

        async fn suggested_document_type(&self, _order_sn: &str) -> MarketplaceResult<String> {
            Ok("THERMAL_AIR_WAYBILL".to_string())
        }

        async fn create_document(
            &self,
            _order_sn: &str,
            _package_number: Option<&str>,
            document_type: &str,
        ) -> MarketplaceResult<()> {
            self.created_with
                .lock()
                .unwrap()
                .push(document_type.to_string());
            match &self.create_error {
                Some((code, message)) => Err(MarketplaceError::Api {
                    code: code.clone(),
                    message: message.clone(),
                }),
                None => Ok(()),
            }
        }

        async fn document_status(&self, _order_sn: &str) -> MarketplaceResult<DocumentStatus> {
            let mut statuses = self.statuses.lock().unwrap();
            let next = statuses.pop_front().unwrap_or(DocumentStatus::Processing);
            Ok(next)
        }

        async fn download_document(&self, _order_sn: &str) -> MarketplaceResult<Vec<u8>> {
            Ok(b"%PDF-1.4 label".to_vec())
        }
    }

    #[derive(Default)]
    struct MemoryStorage {
        saved: Mutex<Vec<(String, Vec<u8>)>>,
    }

    #[async_trait]
    impl LabelStorage for MemoryStorage {
        async fn store(&self, order_sn: &str, bytes: &[u8]) -> Result<String, StorageError> {
            self.saved
                .lock()
                .unwrap()
                .push((order_sn.to_string(), bytes.to_vec()));
            Ok(format!("mem://label_{order_sn}.pdf"))
        }
    }

    fn workflow(transport: ScriptedTransport, storage: Arc<MemoryStorage>) -> LabelWorkflow {
        LabelWorkflow::new(
            Arc::new(transport),
            storage,
            Duration::from_secs(3),
            Duration::from_secs(30),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_happy_path_stores_label() {
        let storage = Arc::new(MemoryStorage::default());
        let wf = workflow(ScriptedTransport::ready_after(2), storage.clone());

        let outcome = wf.run("X001").await.unwrap();
        match outcome {
            LabelOutcome::Stored {
                order_sn,
                reference,
            } => {
                assert_eq!(order_sn, "X001");
                assert_eq!(reference, "mem://label_X001.pdf");
            }
            other => panic!("expected stored, got {other:?}"),
        }

        let saved = storage.saved.lock().unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].1, b"%PDF-1.4 label");
    }

    #[tokio::test]
    async fn test_missing_tracking_takes_skip_path() {
        let storage = Arc::new(MemoryStorage::default());
        let transport = ScriptedTransport {
            tracking: None,
            ..ScriptedTransport::ready_after(0)
        };
        let wf = workflow(transport, storage.clone());

        let outcome = wf.run("X002").await.unwrap();
        assert!(matches!(
            outcome,
            LabelOutcome::Skipped {
                reason: SkipReason::NotArranged,
                ..
            }
        ));
        assert!(storage.saved.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_passes_suggested_document_type() {
        let storage = Arc::new(MemoryStorage::default());
        let transport = Arc::new(ScriptedTransport::ready_after(0));
        let wf = LabelWorkflow::new(
            transport.clone(),
            storage,
            Duration::from_secs(3),
            Duration::from_secs(30),
        );

        wf.run("X003").await.unwrap();
        let created = transport.created_with.lock().unwrap().clone();
        assert_eq!(created, vec!["THERMAL_AIR_WAYBILL".to_string()]);
    }

    #[tokio::test]
    async fn test_already_shipped_create_error_skips() {
        let storage = Arc::new(MemoryStorage::default());
        let transport = ScriptedTransport {
            create_error: Some((
                "logistics.package_already_shipped".to_string(),
                "The package has already shipped".to_string(),
            )),
            ..ScriptedTransport::ready_after(0)
        };
        let wf = workflow(transport, storage);

        let outcome = wf.run("X004").await.unwrap();
        assert!(matches!(
            outcome,
            LabelOutcome::Skipped {
                reason: SkipReason::AlreadyShipped,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_unsupported_channel_create_error_skips() {
        let storage = Arc::new(MemoryStorage::default());
        let transport = ScriptedTransport {
            create_error: Some((
                "logistics.error_param".to_string(),
                "Channel does not support shipping document".to_string(),
            )),
            ..ScriptedTransport::ready_after(0)
        };
        let wf = workflow(transport, storage);

        let outcome = wf.run("X005").await.unwrap();
        match outcome {
            LabelOutcome::Skipped {
                reason: SkipReason::ChannelUnsupported(detail),
                ..
            } => assert!(detail.contains("not support")),
            other => panic!("expected unsupported skip, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_other_create_error_is_a_failure() {
        let storage = Arc::new(MemoryStorage::default());
        let transport = ScriptedTransport {
            create_error: Some((
                "error_server".to_string(),
                "internal server error".to_string(),
            )),
            ..ScriptedTransport::ready_after(0)
        };
        let wf = workflow(transport, storage);

        let result = wf.run("X006").await;
        assert!(matches!(result, Err(LabelError::Transport(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_task_raises_with_reason() {
        let storage = Arc::new(MemoryStorage::default());
        let transport = ScriptedTransport {
            statuses: Mutex::new(VecDeque::from(vec![
                DocumentStatus::Processing,
                DocumentStatus::Failed {
                    reason: "address invalid".to_string(),
                },
            ])),
            ..ScriptedTransport::ready_after(0)
        };
        let wf = workflow(transport, storage);

        match wf.run("X007").await {
            Err(LabelError::Failed { order_sn, reason }) => {
                assert_eq!(order_sn, "X007");
                assert_eq!(reason, "address invalid");
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stuck_processing_raises_timeout() {
        let storage = Arc::new(MemoryStorage::default());
        // statuses queue drains to Processing forever
        let transport = ScriptedTransport {
            statuses: Mutex::new(VecDeque::new()),
            ..ScriptedTransport::ready_after(0)
        };
        let wf = workflow(transport, storage.clone());

        match wf.run("X008").await {
            Err(LabelError::Timeout {
                order_sn,
                waited_secs,
            }) => {
                assert_eq!(order_sn, "X008");
                assert!(waited_secs >= 30);
            }
            other => panic!("expected timeout, got {other:?}"),
        }
        // nothing downloaded or stored on the timeout path
        assert!(storage.saved.lock().unwrap().is_empty());
    }
}
