//! Shared fixtures for app integration tests.

use std::sync::Arc;

use cv_lens_app::{AppConfig, ScreenController};
use cv_lens_picker::{SyntheticDocument, SyntheticPickerBackend};
use cv_lens_upload::{TimeoutConfig, UploadEnvelope, UploadError, UploadTransport};

/// Content bytes of the valid fixture document.
#[allow(dead_code)]
pub const PDF_BYTES: &[u8] = b"%PDF-1.4 fixture document";

/// Backend preloaded with the documents the flows exercise.
#[allow(dead_code)]
pub fn fixture_backend() -> SyntheticPickerBackend {
    SyntheticPickerBackend::with_documents([
        (
            "doc-pdf".to_string(),
            SyntheticDocument {
                display_name: Some("cv_2024.pdf".to_string()),
                declared_mime: Some("application/pdf".to_string()),
                bytes: PDF_BYTES.to_vec(),
            },
        ),
        (
            "doc-exe".to_string(),
            SyntheticDocument {
                display_name: Some("tool.exe".to_string()),
                declared_mime: Some("application/octet-stream".to_string()),
                bytes: vec![0x4D, 0x5A, 0x90, 0x00],
            },
        ),
        (
            "doc-anon".to_string(),
            SyntheticDocument {
                display_name: None,
                declared_mime: Some("application/pdf".to_string()),
                bytes: PDF_BYTES.to_vec(),
            },
        ),
    ])
}

/// Canonical success response body with two areas.
#[allow(dead_code)]
pub fn success_body() -> Vec<u8> {
    br#"{
        "success": true,
        "prediccion_principal": "Sistemas",
        "confianza_principal": 91,
        "todas_las_areas": [
            {"area": "Sistemas", "porcentaje": 91, "confianza": "alta"},
            {"area": "Finanzas", "porcentaje": 47, "confianza": "media"}
        ],
        "metadatos": {"version_modelo": "v3", "fecha_analisis": "2024-11-02"}
    }"#
    .to_vec()
}

/// Canonical failure response body.
#[allow(dead_code)]
pub fn failure_body() -> Vec<u8> {
    br#"{"success": false, "error": "documento ilegible"}"#.to_vec()
}

/// Transport that answers every attempt with a fixed 2xx body.
#[allow(dead_code)]
#[derive(Debug)]
pub struct StubTransport {
    pub body: Vec<u8>,
}

impl UploadTransport for StubTransport {
    fn send(
        &self,
        _envelope: &UploadEnvelope,
        _timeouts: TimeoutConfig,
    ) -> Result<Vec<u8>, UploadError> {
        Ok(self.body.clone())
    }
}

/// Transport that times out on every attempt.
#[allow(dead_code)]
#[derive(Debug)]
pub struct TimeoutTransport;

impl UploadTransport for TimeoutTransport {
    fn send(
        &self,
        _envelope: &UploadEnvelope,
        _timeouts: TimeoutConfig,
    ) -> Result<Vec<u8>, UploadError> {
        Err(UploadError::Timeout)
    }
}

/// Builds a screen controller over the fixture backend and given transport.
#[allow(dead_code)]
pub fn fixture_controller(transport: Arc<dyn UploadTransport>) -> ScreenController {
    ScreenController::new(
        &AppConfig::new("https://api.example.test"),
        TimeoutConfig::default(),
        Arc::new(fixture_backend()),
        transport,
    )
    .expect("controller should build")
}
