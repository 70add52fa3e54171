#![warn(missing_docs)]
//! # cv-lens-upload
//!
//! ## Purpose
//! Builds and submits the single multipart analysis request.
//!
//! ## Responsibilities
//! - Validate upload endpoint policy (HTTPS, `/analyze/file` path).
//! - Assemble one-part multipart envelopes with a stable content digest.
//! - Execute exactly one attempt through an injectable transport.
//! - Decode 2xx bodies into [`cv_lens_core::AnalysisResponse`].
//! - Classify failures for operator-facing logging.
//!
//! ## Data flow
//! Screen controller supplies file metadata + staged bytes ->
//! [`build_envelope`] -> [`UploadClient::submit`] sends through
//! [`UploadTransport`] -> decoded response returns to the controller.
//!
//! ## Ownership and lifetimes
//! The envelope owns its encoded body and exists only for the duration of
//! one submit call; nothing retains request bytes after the attempt.
//!
//! ## Error model
//! Endpoint policy violations, transport failures, HTTP status failures, and
//! undecodable bodies are surfaced as [`UploadError`], allowing the screen
//! to render a single blocking message.
//!
//! ## Retry notes
//! There is no retry loop. [`classify_upload_error`] labels failures as
//! transient or permanent for log lines only; a failed attempt always
//! returns to the user.

use std::sync::Arc;

use cv_lens_core::{AnalysisResponse, SelectedFile};
use sha2::{Digest, Sha256};
use thiserror::Error;
use url::Url;

/// Multipart field name the analysis service expects.
pub const UPLOAD_FIELD_NAME: &str = "file";

/// Required upload path suffix for the canonical contract.
pub const REQUIRED_ANALYZE_PATH: &str = "/analyze/file";

/// Transport timeout configuration, carried as data for the transport
/// implementation to honor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutConfig {
    /// Connection establishment budget in milliseconds.
    pub connect_ms: u64,
    /// Response read budget in milliseconds.
    pub read_ms: u64,
    /// Request write budget in milliseconds.
    pub write_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_ms: 30_000,
            read_ms: 30_000,
            write_ms: 30_000,
        }
    }
}

/// One fully-encoded multipart upload request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadEnvelope {
    /// Absolute endpoint URL for this attempt.
    pub endpoint: String,
    /// File name carried in the part's content disposition.
    pub file_name: String,
    /// MIME type carried in the part's content type.
    pub mime_type: String,
    /// Multipart boundary token.
    pub boundary: String,
    /// Encoded multipart body bytes.
    pub body: Vec<u8>,
    /// Hex SHA-256 of the content bytes, attached as an idempotency value
    /// so the service can deduplicate repeated submissions.
    pub content_digest: String,
}

impl UploadEnvelope {
    /// Returns the `Content-Type` header value for this envelope.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }
}

/// Computes the hex SHA-256 digest for a document's content bytes.
pub fn content_digest(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}

/// Assembles the one-part multipart envelope for a selected file.
///
/// The boundary is derived from the content digest, so identical bytes
/// produce identical envelopes.
pub fn build_envelope(
    endpoint: impl Into<String>,
    file: &SelectedFile,
    content: &[u8],
) -> UploadEnvelope {
    let digest = content_digest(content);
    let boundary = format!("cv-lens-{}", &digest[..24]);

    let mut body = Vec::with_capacity(content.len() + 256);
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{UPLOAD_FIELD_NAME}\"; filename=\"{}\"\r\n",
            file.name
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", file.mime_type).as_bytes());
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    UploadEnvelope {
        endpoint: endpoint.into(),
        file_name: file.name.clone(),
        mime_type: file.mime_type.clone(),
        boundary,
        body,
        content_digest: digest,
    }
}

/// Abstract transport used by the upload client.
pub trait UploadTransport: Send + Sync {
    /// Sends one multipart request and returns the raw 2xx response body.
    ///
    /// # Errors
    /// Implementations map DNS/connect failures to [`UploadError::Network`],
    /// elapsed budgets to [`UploadError::Timeout`], and non-2xx statuses to
    /// [`UploadError::Server`] / [`UploadError::Client`].
    fn send(
        &self,
        envelope: &UploadEnvelope,
        timeouts: TimeoutConfig,
    ) -> Result<Vec<u8>, UploadError>;
}

/// Upload client bound to one validated endpoint.
///
/// Instances are constructed explicitly and injected where needed; there is
/// no process-wide client singleton.
#[derive(Clone)]
pub struct UploadClient {
    endpoint: String,
    timeouts: TimeoutConfig,
    transport: Arc<dyn UploadTransport>,
}

impl UploadClient {
    /// Creates a validated upload client.
    ///
    /// # Errors
    /// Returns [`UploadError::InvalidEndpoint`] when the URL is not HTTPS or
    /// does not end with the canonical `/analyze/file` path.
    pub fn new(
        endpoint: impl Into<String>,
        timeouts: TimeoutConfig,
        transport: Arc<dyn UploadTransport>,
    ) -> Result<Self, UploadError> {
        let endpoint = endpoint.into();
        validate_analyze_endpoint(&endpoint)?;
        Ok(Self {
            endpoint,
            timeouts,
            transport,
        })
    }

    /// Submits one analysis request and decodes the response.
    ///
    /// Exactly one attempt: no retry on any failure class. In-flight
    /// exclusivity is the screen controller's responsibility, not this
    /// client's.
    ///
    /// # Errors
    /// Propagates transport failures and returns
    /// [`UploadError::MalformedResponse`] when a 2xx body does not decode as
    /// an analysis response.
    pub fn submit(
        &self,
        file: &SelectedFile,
        content: &[u8],
    ) -> Result<AnalysisResponse, UploadError> {
        let envelope = build_envelope(&self.endpoint, file, content);
        let raw = self.transport.send(&envelope, self.timeouts)?;

        AnalysisResponse::from_json_bytes(&raw)
            .map_err(|error| UploadError::MalformedResponse(error.to_string()))
    }

    /// Returns the configured endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Returns the configured timeout budget.
    pub fn timeouts(&self) -> TimeoutConfig {
        self.timeouts
    }
}

/// Validates canonical upload endpoint constraints.
///
/// # Errors
/// Returns [`UploadError::InvalidEndpoint`] for non-HTTPS schemes or paths
/// that do not end with `/analyze/file`.
pub fn validate_analyze_endpoint(endpoint: &str) -> Result<(), UploadError> {
    let parsed = Url::parse(endpoint)
        .map_err(|error| UploadError::InvalidEndpoint(format!("invalid upload url: {error}")))?;

    if parsed.scheme() != "https" {
        return Err(UploadError::InvalidEndpoint(
            "upload endpoint must use https".to_string(),
        ));
    }

    if !parsed.path().ends_with(REQUIRED_ANALYZE_PATH) {
        return Err(UploadError::InvalidEndpoint(format!(
            "upload endpoint path must end with {REQUIRED_ANALYZE_PATH}"
        )));
    }

    Ok(())
}

/// Coarse failure classification used for log labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// The same request could plausibly succeed later.
    Retriable,
    /// Repeating the request unchanged cannot succeed.
    Permanent,
}

/// Classifies an upload failure for operator-facing log lines.
///
/// The classification never drives an automatic retry; a failed attempt is
/// always surfaced to the user.
pub fn classify_upload_error(error: &UploadError) -> FailureClass {
    match error {
        UploadError::Network(_) | UploadError::Timeout | UploadError::Server(_) => {
            FailureClass::Retriable
        }
        UploadError::InvalidEndpoint(_)
        | UploadError::Client(_)
        | UploadError::MalformedResponse(_) => FailureClass::Permanent,
    }
}

/// Errors produced by upload assembly and submission.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Endpoint violates security or contract requirements.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
    /// Transport-level failure (DNS, connection refused, reset).
    #[error("network failure: {0}")]
    Network(String),
    /// A configured timeout budget elapsed.
    #[error("request timed out")]
    Timeout,
    /// Service answered with a 5xx status.
    #[error("server failure: http {0}")]
    Server(u16),
    /// Service answered with a 4xx status.
    #[error("client-rejected request: http {0}")]
    Client(u16),
    /// 2xx body did not decode as an analysis response.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

#[cfg(test)]
mod tests {
    //! Unit tests for envelope assembly and endpoint policy.

    use super::*;

    fn fixture_file() -> SelectedFile {
        SelectedFile::new("cv_2024.pdf", 16, "application/pdf").expect("file should be valid")
    }

    #[test]
    fn envelope_contains_exactly_one_part_with_expected_field() {
        let envelope = build_envelope(
            "https://api.example.test/analyze/file",
            &fixture_file(),
            b"%PDF-1.4 fixture",
        );

        let body = String::from_utf8(envelope.body.clone()).expect("fixture body is utf-8");
        assert_eq!(body.matches("Content-Disposition").count(), 1);
        assert!(body.contains("name=\"file\"; filename=\"cv_2024.pdf\""));
        assert!(body.contains("Content-Type: application/pdf"));
        assert!(body.ends_with(&format!("--{}--\r\n", envelope.boundary)));
    }

    #[test]
    fn envelope_digest_is_stable_for_identical_content() {
        let first = build_envelope(
            "https://api.example.test/analyze/file",
            &fixture_file(),
            b"%PDF-1.4 fixture",
        );
        let second = build_envelope(
            "https://api.example.test/analyze/file",
            &fixture_file(),
            b"%PDF-1.4 fixture",
        );

        assert_eq!(first.content_digest, second.content_digest);
        assert_eq!(first.boundary, second.boundary);
    }

    #[test]
    fn endpoint_policy_rejects_http_and_legacy_paths() {
        validate_analyze_endpoint("https://api.example.test/analyze/file")
            .expect("canonical endpoint should pass");
        assert!(validate_analyze_endpoint("http://api.example.test/analyze/file").is_err());
        assert!(validate_analyze_endpoint("https://api.example.test/predict").is_err());
    }
}
