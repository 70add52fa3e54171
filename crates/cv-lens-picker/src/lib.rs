#![warn(missing_docs)]
//! # cv-lens-picker
//!
//! ## Purpose
//! Resolves picker-provided file handles into validated upload candidates.
//!
//! ## Responsibilities
//! - Define a backend-agnostic picker trait.
//! - Expose real filesystem resolution on desktop targets.
//! - Expose deterministic synthetic resolution for CI and unit tests.
//! - Enforce the document MIME allow-list.
//! - Materialize a scratch copy whose bytes survive transient providers.
//!
//! ## Data flow
//! Host picker emits a [`PickedHandle`] -> [`resolve`] produces
//! [`cv_lens_core::SelectedFile`] -> [`materialize`] stages a [`ScratchCopy`]
//! that the upload layer re-reads at submit time.
//!
//! ## Ownership and lifetimes
//! The scratch copy is an RAII guard: dropping it removes the staged bytes.
//! The screen controller holds it for exactly the selection's lifetime, so
//! success, failure, cancellation, and screen teardown all release the file
//! through the same path.
//!
//! ## Error model
//! Unresolvable handles, missing display names, disallowed MIME types, and
//! I/O failures are reported as [`PickerError`] values.
//!
//! ## MIME resolution notes
//! Resolution order is backend-declared type, then content sniffing, then
//! file extension. A file that resolves to none of these is treated as
//! `application/octet-stream`, which the allow-list rejects.

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

use cv_lens_core::SelectedFile;
use tempfile::NamedTempFile;
use thiserror::Error;

/// MIME types the analysis service accepts.
pub const ALLOWED_MIME_TYPES: [&str; 3] = [
    "application/pdf",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "text/plain",
];

/// Type assigned when no resolution strategy produces a MIME type.
pub const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// Opaque reference to a document the user picked.
///
/// The wrapped value is backend-defined: a filesystem path for
/// [`FsPickerBackend`], an arbitrary key for [`SyntheticPickerBackend`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PickedHandle(String);

impl PickedHandle {
    /// Wraps a backend-defined handle value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw handle value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Raw metadata a backend reports for one handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandleStat {
    /// Display name, when the provider exposes one.
    pub display_name: Option<String>,
    /// Content size in bytes.
    pub size_bytes: u64,
    /// MIME type declared by the provider, when it declares one.
    pub declared_mime: Option<String>,
}

/// Trait implemented by concrete picker providers.
pub trait PickerBackend: Send + Sync {
    /// Resolves raw metadata for a picked handle.
    ///
    /// # Errors
    /// Returns [`PickerError::InvalidHandle`] when the handle does not refer
    /// to a readable document.
    fn stat(&self, handle: &PickedHandle) -> Result<HandleStat, PickerError>;

    /// Reads the full content bytes for a picked handle.
    ///
    /// # Errors
    /// Returns [`PickerError::InvalidHandle`] for unknown handles and
    /// [`PickerError::Io`] for read failures.
    fn read_bytes(&self, handle: &PickedHandle) -> Result<Vec<u8>, PickerError>;
}

/// Real filesystem picker backend for desktop targets.
///
/// Handles are interpreted as filesystem paths. The filesystem declares no
/// MIME type, so resolution falls through to sniffing and extensions.
#[derive(Debug, Clone, Default)]
pub struct FsPickerBackend;

impl FsPickerBackend {
    /// Creates a filesystem backend.
    pub fn new() -> Self {
        Self
    }
}

impl PickerBackend for FsPickerBackend {
    fn stat(&self, handle: &PickedHandle) -> Result<HandleStat, PickerError> {
        let path = Path::new(handle.as_str());
        let metadata = std::fs::metadata(path).map_err(|error| {
            PickerError::InvalidHandle(format!(
                "'{}' is not a readable file: {error}",
                handle.as_str()
            ))
        })?;

        if !metadata.is_file() {
            return Err(PickerError::InvalidHandle(format!(
                "'{}' is not a regular file",
                handle.as_str()
            )));
        }

        let display_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());

        Ok(HandleStat {
            display_name,
            size_bytes: metadata.len(),
            declared_mime: None,
        })
    }

    fn read_bytes(&self, handle: &PickedHandle) -> Result<Vec<u8>, PickerError> {
        std::fs::read(handle.as_str()).map_err(PickerError::Io)
    }
}

/// One document registered in the synthetic backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticDocument {
    /// Display name, `None` to simulate providers that withhold it.
    pub display_name: Option<String>,
    /// Declared MIME type, `None` to force sniff/extension resolution.
    pub declared_mime: Option<String>,
    /// Document content bytes.
    pub bytes: Vec<u8>,
}

/// Deterministic synthetic backend for test and CI usage.
#[derive(Debug, Default)]
pub struct SyntheticPickerBackend {
    documents: HashMap<String, SyntheticDocument>,
}

impl SyntheticPickerBackend {
    /// Creates an empty synthetic backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one document under the given handle value.
    pub fn insert(&mut self, handle: impl Into<String>, document: SyntheticDocument) {
        self.documents.insert(handle.into(), document);
    }

    /// Creates a backend preloaded with caller-provided documents.
    pub fn with_documents(
        documents: impl IntoIterator<Item = (String, SyntheticDocument)>,
    ) -> Self {
        Self {
            documents: documents.into_iter().collect(),
        }
    }
}

impl PickerBackend for SyntheticPickerBackend {
    fn stat(&self, handle: &PickedHandle) -> Result<HandleStat, PickerError> {
        let document = self
            .documents
            .get(handle.as_str())
            .ok_or_else(|| PickerError::InvalidHandle(handle.as_str().to_string()))?;

        Ok(HandleStat {
            display_name: document.display_name.clone(),
            size_bytes: document.bytes.len() as u64,
            declared_mime: document.declared_mime.clone(),
        })
    }

    fn read_bytes(&self, handle: &PickedHandle) -> Result<Vec<u8>, PickerError> {
        self.documents
            .get(handle.as_str())
            .map(|document| document.bytes.clone())
            .ok_or_else(|| PickerError::InvalidHandle(handle.as_str().to_string()))
    }
}

/// Resolves a picked handle into validated upload metadata.
///
/// # Errors
/// Returns [`PickerError::MissingName`] when the provider withholds the
/// display name: the resolver never substitutes a fabricated name.
/// Returns [`PickerError::UnsupportedType`] when the resolved MIME type is
/// not allow-listed; callers surface this as a blocking message.
pub fn resolve(
    backend: &dyn PickerBackend,
    handle: &PickedHandle,
) -> Result<SelectedFile, PickerError> {
    let stat = backend.stat(handle)?;
    let name = stat.display_name.ok_or(PickerError::MissingName)?;

    let mime_type = match stat.declared_mime {
        Some(declared) if !declared.trim().is_empty() => declared,
        _ => {
            let bytes = backend.read_bytes(handle)?;
            sniff_mime(&bytes)
                .or_else(|| mime_from_extension(&name))
                .unwrap_or(FALLBACK_MIME_TYPE)
                .to_string()
        }
    };

    if !is_allowed_mime(&mime_type) {
        return Err(PickerError::UnsupportedType(mime_type));
    }

    SelectedFile::new(name, stat.size_bytes, mime_type)
        .map_err(|error| PickerError::InvalidHandle(error.to_string()))
}

/// Returns `true` when the MIME type is on the service allow-list.
pub fn is_allowed_mime(mime_type: &str) -> bool {
    ALLOWED_MIME_TYPES.contains(&mime_type)
}

fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    // Sniffing reports what the content actually is, so a disallowed format
    // hiding behind an allow-listed extension still fails the check below.
    infer::get(bytes).map(|kind| kind.mime_type())
}

fn mime_from_extension(name: &str) -> Option<&'static str> {
    let extension = Path::new(name).extension()?.to_str()?;
    match extension.to_ascii_lowercase().as_str() {
        "pdf" => Some("application/pdf"),
        "docx" => {
            Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document")
        }
        "txt" => Some("text/plain"),
        _ => None,
    }
}

/// Scratch copy of a picked document staged for upload.
///
/// The copy lives in the process temp directory and is deleted when this
/// guard drops, whichever exit path releases it first.
#[derive(Debug)]
pub struct ScratchCopy {
    file: NamedTempFile,
    size_bytes: u64,
}

impl ScratchCopy {
    /// Returns the scratch file location.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Returns the staged byte count.
    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Re-reads the staged bytes for an upload attempt.
    ///
    /// # Errors
    /// Returns [`PickerError::Io`] when the scratch file cannot be read.
    pub fn read(&self) -> Result<Vec<u8>, PickerError> {
        std::fs::read(self.file.path()).map_err(PickerError::Io)
    }
}

/// Copies a picked document into a process-local scratch location.
///
/// Transient/virtual providers cannot always be re-opened mid-upload; the
/// scratch copy guarantees the upload attempt reads stable bytes.
///
/// # Errors
/// Returns [`PickerError::InvalidHandle`] for unknown handles and
/// [`PickerError::Io`] when staging fails.
pub fn materialize(
    backend: &dyn PickerBackend,
    handle: &PickedHandle,
) -> Result<ScratchCopy, PickerError> {
    let bytes = backend.read_bytes(handle)?;

    let mut file = tempfile::Builder::new()
        .prefix("cv-lens-scratch-")
        .tempfile()
        .map_err(PickerError::Io)?;
    file.write_all(&bytes).map_err(PickerError::Io)?;
    file.flush().map_err(PickerError::Io)?;

    Ok(ScratchCopy {
        file,
        size_bytes: bytes.len() as u64,
    })
}

/// Picker layer error type.
#[derive(Debug, Error)]
pub enum PickerError {
    /// Handle does not refer to a usable document.
    #[error("invalid file handle: {0}")]
    InvalidHandle(String),
    /// Provider withheld the display name.
    #[error("picked file has no resolvable display name")]
    MissingName,
    /// Resolved MIME type is not allow-listed.
    #[error("unsupported file type: {0}")]
    UnsupportedType(String),
    /// Filesystem failure while reading or staging bytes.
    #[error("picker io failure: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    //! Unit tests for synthetic resolution and scratch lifecycle.

    use super::*;

    fn pdf_document() -> SyntheticDocument {
        SyntheticDocument {
            display_name: Some("cv_2024.pdf".to_string()),
            declared_mime: Some("application/pdf".to_string()),
            bytes: b"%PDF-1.4 fixture".to_vec(),
        }
    }

    #[test]
    fn resolve_uses_declared_mime_and_reported_size() {
        let mut backend = SyntheticPickerBackend::new();
        backend.insert("doc-1", pdf_document());

        let file = resolve(&backend, &PickedHandle::new("doc-1")).expect("resolve should work");
        assert_eq!(file.name, "cv_2024.pdf");
        assert_eq!(file.mime_type, "application/pdf");
        assert_eq!(file.size_bytes, b"%PDF-1.4 fixture".len() as u64);
    }

    #[test]
    fn resolve_fails_without_display_name() {
        let mut backend = SyntheticPickerBackend::new();
        backend.insert(
            "doc-anon",
            SyntheticDocument {
                display_name: None,
                ..pdf_document()
            },
        );

        let error = resolve(&backend, &PickedHandle::new("doc-anon"))
            .expect_err("resolve should fail");
        assert!(matches!(error, PickerError::MissingName));
    }

    #[test]
    fn resolve_falls_back_to_extension_for_plain_text() {
        let mut backend = SyntheticPickerBackend::new();
        backend.insert(
            "doc-txt",
            SyntheticDocument {
                display_name: Some("notas.txt".to_string()),
                declared_mime: None,
                bytes: b"solo texto".to_vec(),
            },
        );

        let file = resolve(&backend, &PickedHandle::new("doc-txt")).expect("resolve should work");
        assert_eq!(file.mime_type, "text/plain");
    }

    #[test]
    fn fs_backend_resolves_real_files_by_path() {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        let path = dir.path().join("notas.txt");
        std::fs::write(&path, b"solo texto").expect("fixture write should work");

        let backend = FsPickerBackend::new();
        let handle = PickedHandle::new(path.to_string_lossy().into_owned());

        let file = resolve(&backend, &handle).expect("resolve should work");
        assert_eq!(file.name, "notas.txt");
        assert_eq!(file.mime_type, "text/plain");
        assert_eq!(file.size_bytes, b"solo texto".len() as u64);

        let missing = PickedHandle::new(dir.path().join("nada.pdf").to_string_lossy().into_owned());
        assert!(matches!(
            resolve(&backend, &missing),
            Err(PickerError::InvalidHandle(_))
        ));
    }

    #[test]
    fn scratch_copy_is_removed_on_drop() {
        let mut backend = SyntheticPickerBackend::new();
        backend.insert("doc-1", pdf_document());

        let scratch = materialize(&backend, &PickedHandle::new("doc-1"))
            .expect("materialize should work");
        let path = scratch.path().to_path_buf();
        assert!(path.exists());
        assert_eq!(scratch.read().expect("read should work"), b"%PDF-1.4 fixture");

        drop(scratch);
        assert!(!path.exists());
    }
}
