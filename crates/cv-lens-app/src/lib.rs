#![warn(missing_docs)]
//! # cv-lens-app
//!
//! ## Purpose
//! Orchestrates picker, upload, analysis mapping, and screen state for
//! `cv-lens`.
//!
//! ## Responsibilities
//! - Drive the pick → stage → upload → map flow through one controller.
//! - Enforce one upload in flight per screen instance.
//! - Surface every failure as a single blocking user-facing message.
//! - Provide configuration, runtime kill-switch, and per-run file logging.
//!
//! ## Data flow
//! Picker handle -> selected file + scratch copy -> upload job executed on
//! the host's background sequence -> outcome applied back to the controller
//! -> display results and status projection.
//!
//! ## Ownership and lifetimes
//! The controller owns the selected file and its scratch guard; dropping the
//! controller (screen teardown) releases the scratch copy through the same
//! RAII path as completion and cancellation.
//!
//! ## Error model
//! Subsystem failures are wrapped in [`AppError`]; [`user_message`] reduces
//! every variant to the one blocking message the screen shows. No failure is
//! fatal to the process and nothing retries automatically.
//!
//! ## Logging notes
//! Run logs are line-oriented `timestamp | level | stage | action | detail`
//! records. Detail strings pass through [`redact_sensitive`] so token and
//! credential markers never reach disk.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use cv_lens_analysis_contract::{
    AnalysisContractError, DisplayResult, map_display_results, parse_analysis_response,
};
use cv_lens_core::{AnalysisResponse, SelectedFile};
use cv_lens_picker::{
    PickedHandle, PickerBackend, PickerError, ScratchCopy, materialize, resolve,
};
use cv_lens_ui::{ScreenState, SubmitBlocked, UploadPhase};
use cv_lens_upload::{
    REQUIRED_ANALYZE_PATH, TimeoutConfig, UploadClient, UploadError, UploadTransport,
    classify_upload_error,
};
use thiserror::Error;
use time::OffsetDateTime;

/// Build-time application version loaded from root `VERSION` file.
pub const APP_VERSION: &str = env!("CV_LENS_VERSION");

/// Base URL used when `CV_LENS_BASE_URL` is unset.
pub const DEFAULT_BASE_URL: &str = "https://cv-lens.example.test";

/// Returns the app version sourced from root `VERSION`.
pub fn app_version() -> &'static str {
    APP_VERSION
}

/// Runtime configuration for the analysis service connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Service base URL without the analyze route.
    pub base_url: String,
}

impl AppConfig {
    /// Creates configuration with an explicit base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Loads configuration, honoring the `CV_LENS_BASE_URL` override.
    pub fn from_env() -> Self {
        let base_url = std::env::var("CV_LENS_BASE_URL")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Self { base_url }
    }

    /// Returns the absolute upload endpoint for this configuration.
    pub fn analyze_endpoint(&self) -> String {
        format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            REQUIRED_ANALYZE_PATH
        )
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Checks the runtime upload kill-switch env var.
///
/// Semantics:
/// - Unset => uploads enabled.
/// - `0`, `false`, `off` (case-insensitive) => uploads disabled.
/// - Any other value => uploads enabled.
pub fn upload_enabled_from_env() -> bool {
    match std::env::var("CV_LENS_UPLOAD_ENABLED") {
        Ok(value) => {
            let normalized = value.trim().to_ascii_lowercase();
            !(normalized == "0" || normalized == "false" || normalized == "off")
        }
        Err(_) => true,
    }
}

/// Redacts common secret markers in log-safe output.
pub fn redact_sensitive(input: &str) -> String {
    let mut redacted = input.to_string();
    for key in ["password", "token", "authorization", "bearer"] {
        redacted = redact_key_value(&redacted, key);
    }
    redacted
}

fn redact_key_value(input: &str, key: &str) -> String {
    let lower = input.to_ascii_lowercase();
    if let Some(position) = lower.find(key) {
        let prefix = &input[..position];
        return format!("{prefix}{key}=<redacted>");
    }

    input.to_string()
}

/// Per-run line logger writing `timestamp | level | stage | action | detail`.
pub struct RunLogger {
    file: Mutex<File>,
    path: PathBuf,
}

impl RunLogger {
    /// Creates a run log file inside `dir`, named after the start timestamp.
    ///
    /// # Errors
    /// Returns [`AppError::Logging`] when the log file cannot be created.
    pub fn create_in(dir: &Path) -> Result<Self, AppError> {
        let timestamp = timestamp_compact_utc();
        let path = dir.join(format!("{timestamp}_log.txt"));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|error| {
                AppError::Logging(format!(
                    "unable to create log file '{}': {error}",
                    path.display()
                ))
            })?;

        Ok(Self {
            file: Mutex::new(file),
            path,
        })
    }

    /// Creates a run log file beside the current executable.
    ///
    /// # Errors
    /// Returns [`AppError::Logging`] when the executable directory cannot be
    /// resolved or the file cannot be created.
    pub fn beside_current_exe() -> Result<Self, AppError> {
        let exe_path = std::env::current_exe().map_err(|error| {
            AppError::Logging(format!("unable to resolve executable path: {error}"))
        })?;
        let exe_dir = exe_path
            .parent()
            .ok_or_else(|| AppError::Logging("executable parent directory is missing".to_string()))?;

        Self::create_in(exe_dir)
    }

    /// Returns the log file location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one structured log line.
    ///
    /// Detail text is redacted before it reaches disk. Error lines flush
    /// immediately so a crash does not lose them.
    pub fn write_line(&self, level: &str, stage: &str, action: &str, detail: &str) {
        let timestamp = timestamp_compact_utc();
        let detail = redact_sensitive(detail);
        let line = format!("{timestamp} | {level} | {stage} | {action} | {detail}\n");

        if let Ok(mut file) = self.file.lock() {
            let _ = file.write_all(line.as_bytes());
            if level == "ERROR" {
                let _ = file.flush();
            }
        }
    }
}

static RUN_LOGGER: OnceLock<RunLogger> = OnceLock::new();

/// Installs the process-wide run logger beside the current executable.
///
/// Subsequent calls are no-ops; the first logger wins.
///
/// # Errors
/// Propagates log file creation failures.
pub fn initialize_logger() -> Result<(), AppError> {
    if RUN_LOGGER.get().is_some() {
        return Ok(());
    }

    install_logger(RunLogger::beside_current_exe()?);
    Ok(())
}

/// Installs the process-wide run logger inside `dir`.
///
/// Subsequent calls are no-ops; the first logger wins.
///
/// # Errors
/// Propagates log file creation failures.
pub fn initialize_logger_in(dir: &Path) -> Result<(), AppError> {
    if RUN_LOGGER.get().is_some() {
        return Ok(());
    }

    install_logger(RunLogger::create_in(dir)?);
    Ok(())
}

fn install_logger(logger: RunLogger) {
    let path = logger.path().display().to_string();
    let _ = RUN_LOGGER.set(logger);
    log_info("logging", "file_created", &format!("log_file={path}"));
}

/// Writes an INFO line through the process-wide logger, if installed.
pub fn log_info(stage: &str, action: &str, detail: &str) {
    if let Some(logger) = RUN_LOGGER.get() {
        logger.write_line("INFO", stage, action, detail);
    }
}

/// Writes an ERROR line through the process-wide logger, if installed.
pub fn log_error(stage: &str, action: &str, detail: &str) {
    if let Some(logger) = RUN_LOGGER.get() {
        logger.write_line("ERROR", stage, action, detail);
    }
}

fn timestamp_compact_utc() -> String {
    let now = OffsetDateTime::now_utc();
    format!(
        "{:04}{:02}{:02}_{:02}{:02}{:02}",
        now.year(),
        now.month() as u8,
        now.day(),
        now.hour(),
        now.minute(),
        now.second()
    )
}

/// Parses a serialized response and maps it for display.
///
/// Used by the results screen, which receives the response as JSON across
/// the navigation boundary.
///
/// # Errors
/// Returns [`AppError::Analysis`] when the payload does not parse.
pub fn parse_analysis(raw: &str) -> Result<(AnalysisResponse, Vec<DisplayResult>), AppError> {
    let response = parse_analysis_response(raw).map_err(AppError::Analysis)?;
    let results = map_display_results(&response);
    Ok((response, results))
}

/// Consolidated runtime status snapshot for simple UI projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeStatus {
    /// Whether selection, phase, and kill-switch currently allow a submit.
    pub submit_allowed: bool,
    /// Upload phase as human-readable string.
    pub phase: String,
    /// Analysis status headline.
    pub analysis: String,
    /// Selected file name, if any.
    pub selected_file: Option<String>,
}

/// Projects screen state into a flat status snapshot.
pub fn project_runtime_status(state: &ScreenState) -> RuntimeStatus {
    RuntimeStatus {
        submit_allowed: state.can_submit() && upload_enabled_from_env(),
        phase: format!("{:?}", state.phase),
        analysis: state.analysis_status.clone(),
        selected_file: state.selected.as_ref().map(|caption| caption.name.clone()),
    }
}

/// One prepared upload attempt, executed on the host's background sequence.
#[derive(Debug)]
pub struct UploadJob {
    generation: u64,
    /// File metadata for the attempt.
    pub file: SelectedFile,
    /// Content bytes re-read from the scratch copy.
    pub content: Vec<u8>,
}

/// Result of applying an upload outcome to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadConclusion {
    /// The attempt completed and produced display results (possibly zero).
    Completed(Vec<DisplayResult>),
    /// The outcome arrived after cancellation and was discarded.
    Discarded,
}

/// Screen controller driving one upload flow instance.
///
/// The host shell calls [`ScreenController::start_upload`] on the UI-bound
/// sequence, executes the returned job through [`ScreenController::client`]
/// on its background sequence, and applies the outcome back. The phase
/// machine guarantees at most one job between those two calls.
pub struct ScreenController {
    state: ScreenState,
    client: UploadClient,
    backend: Arc<dyn PickerBackend>,
    selected: Option<SelectedFile>,
    scratch: Option<ScratchCopy>,
    last_response: Option<AnalysisResponse>,
    last_results: Vec<DisplayResult>,
    generation: u64,
}

impl ScreenController {
    /// Creates a controller for one screen instance.
    ///
    /// The transport is injected here, at screen-construction time; there is
    /// no process-wide client object.
    ///
    /// # Errors
    /// Returns [`AppError::Upload`] when the configured endpoint violates
    /// upload policy.
    pub fn new(
        config: &AppConfig,
        timeouts: TimeoutConfig,
        backend: Arc<dyn PickerBackend>,
        transport: Arc<dyn UploadTransport>,
    ) -> Result<Self, AppError> {
        let client = UploadClient::new(config.analyze_endpoint(), timeouts, transport)
            .map_err(AppError::Upload)?;

        Ok(Self {
            state: ScreenState::new(app_version()),
            client,
            backend,
            selected: None,
            scratch: None,
            last_response: None,
            last_results: Vec::new(),
            generation: 0,
        })
    }

    /// Returns the current screen state snapshot.
    pub fn state(&self) -> &ScreenState {
        &self.state
    }

    /// Returns the upload client bound to this screen.
    pub fn client(&self) -> &UploadClient {
        &self.client
    }

    /// Returns the currently selected file, if any.
    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.selected.as_ref()
    }

    /// Returns the scratch copy location while one is staged.
    pub fn scratch_path(&self) -> Option<&Path> {
        self.scratch.as_ref().map(|scratch| scratch.path())
    }

    /// Returns the response from the last completed upload, if any.
    pub fn last_response(&self) -> Option<&AnalysisResponse> {
        self.last_response.as_ref()
    }

    /// Resolves and stages a picked file, replacing any previous selection.
    ///
    /// # Errors
    /// Returns [`AppError::UploadInFlight`] while an upload is pending and
    /// propagates resolver failures (invalid handle, missing name,
    /// disallowed MIME type).
    pub fn pick_file(&mut self, handle: &PickedHandle) -> Result<(), AppError> {
        if self.state.phase == UploadPhase::Uploading {
            return Err(AppError::UploadInFlight);
        }

        let file = resolve(self.backend.as_ref(), handle)?;
        let scratch = materialize(self.backend.as_ref(), handle)?;
        log_info(
            "picker",
            "file_selected",
            &format!(
                "name={} size_bytes={} staged_bytes={} mime={}",
                file.name,
                file.size_bytes,
                scratch.size_bytes(),
                file.mime_type
            ),
        );

        self.state.select_file(&file);
        self.selected = Some(file);
        // Replacing the guard drops the previous selection's scratch copy.
        self.scratch = Some(scratch);
        Ok(())
    }

    /// Clears the current selection and releases its scratch copy.
    pub fn clear_selection(&mut self) {
        self.selected = None;
        self.scratch = None;
        self.state.clear_selection();
    }

    /// Starts one upload attempt and returns the prepared job.
    ///
    /// # Errors
    /// Returns [`AppError::UploadInFlight`] while a job is pending (the
    /// second submit is rejected, never interleaved),
    /// [`AppError::NoSelection`] without a staged file, and scratch re-read
    /// failures as [`AppError::Picker`].
    pub fn start_upload(&mut self) -> Result<UploadJob, AppError> {
        if self.state.phase == UploadPhase::Uploading {
            return Err(AppError::UploadInFlight);
        }

        let (file, scratch) = match (&self.selected, &self.scratch) {
            (Some(file), Some(scratch)) => (file.clone(), scratch),
            _ => return Err(AppError::NoSelection),
        };

        let content = scratch.read().map_err(AppError::Picker)?;
        self.state.begin_upload().map_err(|blocked| match blocked {
            SubmitBlocked::Busy => AppError::UploadInFlight,
            SubmitBlocked::NoSelection => AppError::NoSelection,
        })?;

        log_info(
            "upload",
            "attempt_started",
            &format!("file={} bytes={}", file.name, content.len()),
        );

        Ok(UploadJob {
            generation: self.generation,
            file,
            content,
        })
    }

    /// Applies the outcome of an executed job back to the screen.
    ///
    /// Outcomes from a generation older than the last cancellation are
    /// discarded: their scratch copy is already released and their results
    /// must not resurrect a dismissed screen flow.
    ///
    /// # Errors
    /// Returns the upload failure or [`AppError::Application`] for a
    /// `success:false` response, after recording the user-facing message in
    /// screen state.
    pub fn apply_outcome(
        &mut self,
        job: UploadJob,
        outcome: Result<AnalysisResponse, UploadError>,
    ) -> Result<UploadConclusion, AppError> {
        if job.generation != self.generation || self.state.phase != UploadPhase::Uploading {
            log_info("upload", "outcome_discarded", "stale upload generation");
            return Ok(UploadConclusion::Discarded);
        }

        // The attempt is over either way; the scratch copy's job is done.
        self.scratch = None;

        let response = match outcome {
            Ok(response) => response,
            Err(error) => {
                let class = classify_upload_error(&error);
                log_error(
                    "upload",
                    "attempt_failed",
                    &format!("class={class:?} error={error}"),
                );
                let error = AppError::Upload(error);
                self.state.fail_upload(user_message(&error));
                return Err(error);
            }
        };

        if !response.success {
            let error = AppError::Application(
                response
                    .error
                    .clone()
                    .unwrap_or_else(|| "Error desconocido en la respuesta".to_string()),
            );
            log_error("upload", "analysis_rejected", &format!("error={error}"));
            self.state.fail_upload(user_message(&error));
            return Err(error);
        }

        let results = map_display_results(&response);
        log_info(
            "upload",
            "analysis_completed",
            &format!("areas={}", results.len()),
        );
        self.state.complete_upload(&response, &results);
        self.last_response = Some(response);
        self.last_results = results.clone();
        Ok(UploadConclusion::Completed(results))
    }

    /// Runs one full attempt synchronously.
    ///
    /// Hosts call this from their background sequence; the UI-bound sequence
    /// observes progress through [`ScreenController::state`].
    ///
    /// # Errors
    /// Propagates [`ScreenController::start_upload`] and
    /// [`ScreenController::apply_outcome`] failures.
    pub fn submit_blocking(&mut self) -> Result<UploadConclusion, AppError> {
        let job = self.start_upload()?;
        let outcome = self.client.submit(&job.file, &job.content);
        self.apply_outcome(job, outcome)
    }

    /// Cancels the flow when the user navigates away.
    ///
    /// Releases the scratch copy immediately and invalidates any in-flight
    /// job so a late outcome is discarded instead of racing a new flow.
    pub fn cancel_upload(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.scratch = None;
        self.selected = None;
        self.state.clear_selection();
        self.state.reset_flow();
        log_info("upload", "cancelled", "selection and scratch copy released");
    }

    /// Formats the share payload for the last completed analysis.
    ///
    /// # Errors
    /// Returns [`AppError::NothingToShare`] when there are no results, so
    /// the screen shows the nothing-to-share notice instead of sharing an
    /// empty body.
    pub fn share_text(&self) -> Result<String, AppError> {
        cv_lens_analysis_contract::build_share_text(&self.last_results)
            .ok_or(AppError::NothingToShare)
    }
}

/// Reduces an error to the single blocking message the screen shows.
pub fn user_message(error: &AppError) -> String {
    match error {
        AppError::Picker(PickerError::UnsupportedType(_)) => {
            "Formato no soportado. Usa PDF, DOCX o TXT.".to_string()
        }
        AppError::Picker(_) => "No se pudo procesar el archivo".to_string(),
        AppError::Upload(UploadError::MalformedResponse(_)) => {
            "Error desconocido en la respuesta".to_string()
        }
        AppError::Upload(upload_error) => format!("Error de conexión: {upload_error}"),
        AppError::Analysis(_) => "Error desconocido en la respuesta".to_string(),
        AppError::Application(message) => message.clone(),
        AppError::NoSelection => "Por favor selecciona un archivo primero".to_string(),
        AppError::UploadInFlight => "Ya hay un análisis en curso".to_string(),
        AppError::NothingToShare => "No hay resultados para compartir".to_string(),
        AppError::Logging(_) => "No se pudo iniciar el registro de la sesión".to_string(),
    }
}

/// App integration error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Picker subsystem error.
    #[error("picker error: {0}")]
    Picker(#[from] PickerError),
    /// Upload subsystem error.
    #[error("upload error: {0}")]
    Upload(#[from] UploadError),
    /// Analysis parse error.
    #[error("analysis error: {0}")]
    Analysis(#[from] AnalysisContractError),
    /// Service reported `success:false`.
    #[error("analysis rejected: {0}")]
    Application(String),
    /// Submit without a staged selection.
    #[error("no file is selected")]
    NoSelection,
    /// Second submit while one upload is pending.
    #[error("an upload is already in flight")]
    UploadInFlight,
    /// Share requested with zero results.
    #[error("there are no results to share")]
    NothingToShare,
    /// Run log file could not be created.
    #[error("logging failure: {0}")]
    Logging(String),
}
