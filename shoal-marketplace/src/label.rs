//! Shipping-document transport
//!
//! Authenticated transport for the label endpoints: tracking lookup,
//! document-type suggestion, creation, status polling and download. The
//! per-order sequencing (and the skip-vs-fail taxonomy) lives in the sync
//! agent's label workflow; this module only moves bytes.

use crate::client::MarketplaceClient;
use crate::error::{MarketplaceError, MarketplaceResult};
use crate::types::{
    CreateDocumentOrder, CreateDocumentRequest, DocumentParameterResponse, DocumentQueryRequest,
    DocumentResultResponse, Envelope, TrackingNumberResponse,
};
use async_trait::async_trait;

/// Document type used when the upstream suggests nothing
pub const DEFAULT_DOCUMENT_TYPE: &str = "THERMAL_AIR_WAYBILL";

/// State of a shipping-document task upstream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentStatus {
    Processing,
    Ready,
    Failed { reason: String },
}

impl DocumentStatus {
    fn from_wire(status: &str, fail_message: String) -> MarketplaceResult<Self> {
        match status {
            "PROCESSING" => Ok(Self::Processing),
            "READY" => Ok(Self::Ready),
            "FAILED" => Ok(Self::Failed {
                reason: fail_message,
            }),
            other => Err(MarketplaceError::InvalidResponse(format!(
                "unknown document status {other:?}"
            ))),
        }
    }
}

/// Transport seam for the shipping-document endpoints
///
/// Implemented by [`MarketplaceClient`]; the label workflow depends on this
/// trait so it can be exercised without a network.
#[async_trait]
pub trait LabelTransport: Send + Sync {
    /// Look up the tracking number for an order
    ///
    /// `None` means the "arrange shipment" step was never completed upstream,
    /// which is an expected terminal condition for the caller, not an error.
    async fn tracking_number(&self, order_sn: &str) -> MarketplaceResult<Option<String>>;

    /// Ask the upstream which document type it suggests for this order
    async fn suggested_document_type(&self, order_sn: &str) -> MarketplaceResult<String>;

    /// Request creation of the shipping document
    ///
    /// Safe to call again when the result of a prior attempt was lost.
    async fn create_document(
        &self,
        order_sn: &str,
        package_number: Option<&str>,
        document_type: &str,
    ) -> MarketplaceResult<()>;

    /// Poll the document task status
    async fn document_status(&self, order_sn: &str) -> MarketplaceResult<DocumentStatus>;

    /// Download the finished document
    ///
    /// The endpoint answers with a binary PDF body on success and a JSON
    /// error envelope otherwise; the two are told apart by content type.
    async fn download_document(&self, order_sn: &str) -> MarketplaceResult<Vec<u8>>;
}

#[async_trait]
impl LabelTransport for MarketplaceClient {
    async fn tracking_number(&self, order_sn: &str) -> MarketplaceResult<Option<String>> {
        let response: TrackingNumberResponse = self
            .get(
                "/api/v2/logistics/get_tracking_number",
                &[("order_sn", order_sn.to_string())],
            )
            .await?;

        let tracking = response.tracking_number.trim().to_string();
        Ok(if tracking.is_empty() {
            None
        } else {
            Some(tracking)
        })
    }

    async fn suggested_document_type(&self, order_sn: &str) -> MarketplaceResult<String> {
        let response: DocumentParameterResponse = self
            .post(
                "/api/v2/logistics/get_shipping_document_parameter",
                &DocumentQueryRequest {
                    order_list: vec![CreateDocumentOrder {
                        order_sn: order_sn.to_string(),
                        package_number: None,
                    }],
                },
            )
            .await?;

        let suggested = response
            .result_list
            .into_iter()
            .next()
            .map(|r| r.suggest_shipping_document_type)
            .unwrap_or_default();
        Ok(if suggested.is_empty() {
            DEFAULT_DOCUMENT_TYPE.to_string()
        } else {
            suggested
        })
    }

    async fn create_document(
        &self,
        order_sn: &str,
        package_number: Option<&str>,
        document_type: &str,
    ) -> MarketplaceResult<()> {
        let _: serde_json::Value = self
            .post(
                "/api/v2/logistics/create_shipping_document",
                &CreateDocumentRequest {
                    order_list: vec![CreateDocumentOrder {
                        order_sn: order_sn.to_string(),
                        package_number: package_number.map(str::to_string),
                    }],
                    shipping_document_type: Some(document_type.to_string()),
                },
            )
            .await?;
        Ok(())
    }

    async fn document_status(&self, order_sn: &str) -> MarketplaceResult<DocumentStatus> {
        let response: DocumentResultResponse = self
            .post(
                "/api/v2/logistics/get_shipping_document_result",
                &DocumentQueryRequest {
                    order_list: vec![CreateDocumentOrder {
                        order_sn: order_sn.to_string(),
                        package_number: None,
                    }],
                },
            )
            .await?;

        let result = response
            .result_list
            .into_iter()
            .find(|r| r.order_sn == order_sn || r.order_sn.is_empty())
            .ok_or_else(|| {
                MarketplaceError::InvalidResponse(format!(
                    "order {order_sn} missing from document result"
                ))
            })?;
        DocumentStatus::from_wire(&result.status, result.fail_message)
    }

    async fn download_document(&self, order_sn: &str) -> MarketplaceResult<Vec<u8>> {
        let response = self
            .post_raw(
                "/api/v2/logistics/download_shipping_document",
                &DocumentQueryRequest {
                    order_list: vec![CreateDocumentOrder {
                        order_sn: order_sn.to_string(),
                        package_number: None,
                    }],
                },
            )
            .await?;

        let content_type = response
            .headers()
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        let success = response.status().is_success();
        let bytes = response.bytes().await?;

        let document = decode_download(&content_type, success, &bytes)?;
        tracing::debug!(order_sn, size = document.len(), "Downloaded shipping document");
        Ok(document)
    }
}

/// Tell a document body apart from an error envelope
///
/// The download endpoint answers with binary PDF bytes on success and a JSON
/// envelope otherwise, distinguished by content type. A JSON body that
/// unwraps cleanly is still wrong here: there is no document in it.
fn decode_download(content_type: &str, success: bool, bytes: &[u8]) -> MarketplaceResult<Vec<u8>> {
    if content_type.contains("application/json") {
        let envelope: Envelope<serde_json::Value> = serde_json::from_slice(bytes)?;
        return match MarketplaceClient::unwrap_envelope(envelope) {
            Err(e) => Err(e),
            Ok(_) => Err(MarketplaceError::InvalidResponse(
                "download returned JSON instead of a document".to_string(),
            )),
        };
    }

    if !success {
        return Err(MarketplaceError::UnexpectedContentType(
            content_type.to_string(),
        ));
    }

    Ok(bytes.to_vec())
}
