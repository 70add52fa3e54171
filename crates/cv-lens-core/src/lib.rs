#![warn(missing_docs)]
//! # cv-lens-core
//!
//! ## Purpose
//! Defines the pure data model used across the `cv-lens` workspace.
//!
//! ## Responsibilities
//! - Represent a user-picked document as validated metadata.
//! - Mirror the analysis service's wire response shape exactly.
//! - Encode/decode responses for transfer across screen boundaries.
//!
//! ## Data flow
//! Picker code resolves a handle into [`SelectedFile`]. The upload layer
//! sends its bytes and receives an [`AnalysisResponse`], which travels to the
//! results screen through the JSON codec on this type.
//!
//! ## Ownership and lifetimes
//! All model types own their string/byte data so responses can outlive the
//! network buffers and screen instances that produced them.
//!
//! ## Error model
//! Validation failures (blank file name, blank MIME type) and codec failures
//! return [`CoreError`] variants with caller-actionable categorization.
//!
//! ## Wire compatibility notes
//! Response field names are the service's Spanish identifiers
//! (`prediccion_principal`, `todas_las_areas`, ...) and must not be renamed:
//! the backend contract is byte-level JSON, not a Rust-side convention.
//!
//! ## Example
//! ```rust
//! use cv_lens_core::SelectedFile;
//!
//! let file = SelectedFile::new("cv_2024.pdf", 812 * 1024, "application/pdf").unwrap();
//! assert_eq!(file.human_size(), "812 KB");
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Metadata for one user-picked document.
///
/// Created when the user picks a file, replaced when a new file is picked,
/// and discarded when the screen is left.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedFile {
    /// Display name reported by the picker backend.
    pub name: String,
    /// Size in bytes reported by the picker backend.
    pub size_bytes: u64,
    /// Resolved MIME type (already validated against the allow-list).
    pub mime_type: String,
}

impl SelectedFile {
    /// Constructs a validated selected-file record.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidFileName`] when the name is blank and
    /// [`CoreError::InvalidMimeType`] when the MIME type is blank.
    pub fn new(
        name: impl Into<String>,
        size_bytes: u64,
        mime_type: impl Into<String>,
    ) -> Result<Self, CoreError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CoreError::InvalidFileName);
        }

        let mime_type = mime_type.into();
        if mime_type.trim().is_empty() {
            return Err(CoreError::InvalidMimeType);
        }

        Ok(Self {
            name,
            size_bytes,
            mime_type,
        })
    }

    /// Formats the byte size for the selected-file caption.
    ///
    /// Sizes below one mebibyte render as whole `KB`, everything else as
    /// whole `MB`, matching the caption the results screen shows.
    pub fn human_size(&self) -> String {
        if self.size_bytes < 1024 * 1024 {
            format!("{} KB", self.size_bytes / 1024)
        } else {
            format!("{} MB", self.size_bytes / (1024 * 1024))
        }
    }
}

/// One area score as reported on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaResult {
    /// Professional area name (for example `Sistemas` or `Finanzas`).
    pub area: String,
    /// Raw percentage score. The service does not guarantee [0, 100];
    /// clamping happens at display-mapping time, never here.
    pub porcentaje: i64,
    /// Qualitative confidence indicator for this score.
    #[serde(default)]
    pub confianza: String,
}

/// Versioning metadata the service attaches to an analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    /// Model version that produced the scores.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_modelo: Option<String>,
    /// Service-side analysis timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fecha_analisis: Option<String>,
}

/// Echo of the uploaded file's metadata as the service saw it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchivoInfo {
    /// File name the service received.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    /// Byte size the service received.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tamano_bytes: Option<u64>,
    /// MIME type the service received.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tipo: Option<String>,
}

/// Full analysis response as received from `POST /analyze/file`.
///
/// Received once per upload and passed by value to the results screen;
/// [`AnalysisResponse::to_json_bytes`] / [`AnalysisResponse::from_json_bytes`]
/// carry it across that boundary with exact field fidelity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    /// Whether the service considers the analysis successful.
    pub success: bool,
    /// Headline area prediction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediccion_principal: Option<String>,
    /// Confidence percentage for the headline prediction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confianza_principal: Option<i64>,
    /// Per-area breakdown. Absent on the wire decodes as empty; the client
    /// treats `success` with an empty list as "zero results", not an error.
    #[serde(default)]
    pub todas_las_areas: Vec<AreaResult>,
    /// Service-side versioning metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadatos: Option<AnalysisMetadata>,
    /// Echo of the uploaded file's metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archivo_info: Option<ArchivoInfo>,
    /// Failure description. The service does not always populate this on
    /// failure; callers must handle `success == false` with no error text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisResponse {
    /// Serializes the response to compact JSON bytes.
    ///
    /// # Errors
    /// Returns [`CoreError::Codec`] when JSON serialization fails.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, CoreError> {
        serde_json::to_vec(self).map_err(CoreError::Codec)
    }

    /// Deserializes a response from JSON bytes.
    ///
    /// # Errors
    /// Returns [`CoreError::Codec`] when JSON decoding fails.
    pub fn from_json_bytes(raw: &[u8]) -> Result<Self, CoreError> {
        serde_json::from_slice(raw).map_err(CoreError::Codec)
    }
}

/// Error type for core model validation and codec failures.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Selected-file name cannot be blank.
    #[error("selected file name is empty")]
    InvalidFileName,
    /// Selected-file MIME type cannot be blank.
    #[error("selected file mime type is empty")]
    InvalidMimeType,
    /// JSON encoding/decoding error.
    #[error("response codec failure: {0}")]
    Codec(#[from] serde_json::Error),
}
