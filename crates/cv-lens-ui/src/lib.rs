#![warn(missing_docs)]
//! # cv-lens-ui
//!
//! ## Purpose
//! Defines the screen-facing runtime state model for `cv-lens`.
//!
//! ## Responsibilities
//! - Represent file selection and the upload phase machine.
//! - Gate submission on selection and in-flight exclusivity.
//! - Project analysis results into display-safe status text.
//! - Project history entries with an explicit empty state.
//!
//! ## Data flow
//! Screen-controller events mutate [`ScreenState`], which drives rendered
//! status in the host shell. The phase machine is the only navigation-
//! relevant progress model; cosmetic progress animation is out of scope.
//!
//! ## Ownership and lifetimes
//! `ScreenState` owns all string/status values to simplify event reducers
//! and keep the host shell free of borrowed state.
//!
//! ## Error model
//! This crate favors explicit state over recoverable errors. The one
//! rejection it models, [`SubmitBlocked`], is a signal for the controller to
//! translate, not a failure.

use cv_lens_analysis_contract::DisplayResult;
use cv_lens_core::{AnalysisResponse, SelectedFile};

/// Upload flow phase for one screen instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPhase {
    /// No upload has been started.
    Idle,
    /// Exactly one upload is in flight.
    Uploading,
    /// The last upload completed and parsed.
    Succeeded,
    /// The last upload failed; `last_error` holds the user-facing message.
    Failed,
}

/// Signal returned when a submit request cannot start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitBlocked {
    /// An upload is already in flight; the new request is rejected, never
    /// interleaved with the pending one.
    Busy,
    /// No file is selected.
    NoSelection,
}

/// Caption data for the selected-file banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionCaption {
    /// Display name of the picked file.
    pub name: String,
    /// Human-readable size caption (`"812 KB"`).
    pub size_caption: String,
}

/// Aggregate screen runtime state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenState {
    /// App version string sourced from root `VERSION`.
    pub version: String,
    /// Currently selected file caption, if any.
    pub selected: Option<SelectionCaption>,
    /// Upload phase machine state.
    pub phase: UploadPhase,
    /// Human-readable analysis status headline.
    pub analysis_status: String,
    /// User-facing message for the last failure, if any.
    pub last_error: Option<String>,
}

impl ScreenState {
    /// Creates default screen state.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            selected: None,
            phase: UploadPhase::Idle,
            analysis_status: "Sin análisis todavía".to_string(),
            last_error: None,
        }
    }

    /// Records a new file selection, replacing any previous one.
    pub fn select_file(&mut self, file: &SelectedFile) {
        self.selected = Some(SelectionCaption {
            name: file.name.clone(),
            size_caption: file.human_size(),
        });
    }

    /// Clears the current selection.
    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Returns `true` when a submit request would be accepted.
    pub fn can_submit(&self) -> bool {
        self.selected.is_some() && self.phase != UploadPhase::Uploading
    }

    /// Transitions into the uploading phase.
    ///
    /// # Errors
    /// Returns [`SubmitBlocked::Busy`] while an upload is in flight and
    /// [`SubmitBlocked::NoSelection`] when no file is selected.
    pub fn begin_upload(&mut self) -> Result<(), SubmitBlocked> {
        if self.phase == UploadPhase::Uploading {
            return Err(SubmitBlocked::Busy);
        }
        if self.selected.is_none() {
            return Err(SubmitBlocked::NoSelection);
        }

        self.phase = UploadPhase::Uploading;
        self.last_error = None;
        Ok(())
    }

    /// Transitions to `Succeeded` and updates the analysis headline.
    pub fn complete_upload(&mut self, response: &AnalysisResponse, results: &[DisplayResult]) {
        self.phase = UploadPhase::Succeeded;
        self.analysis_status = analysis_headline(response, results);
    }

    /// Transitions to `Failed` with a user-facing message.
    pub fn fail_upload(&mut self, message: impl Into<String>) {
        self.phase = UploadPhase::Failed;
        self.last_error = Some(message.into());
    }

    /// Returns to `Idle`, discarding any in-flight or terminal phase.
    ///
    /// Used when the user cancels an upload or leaves the results screen.
    pub fn reset_flow(&mut self) {
        self.phase = UploadPhase::Idle;
        self.last_error = None;
    }
}

/// Builds the analysis status headline for a completed upload.
///
/// The headline prefers the service's primary prediction; zero results get
/// an explicit empty-state caption rather than an empty string.
pub fn analysis_headline(response: &AnalysisResponse, results: &[DisplayResult]) -> String {
    if results.is_empty() {
        return "Sin resultados para mostrar".to_string();
    }

    match (&response.prediccion_principal, response.confianza_principal) {
        (Some(area), Some(confidence)) => format!("Área principal: {area} ({confidence}%)"),
        (Some(area), None) => format!("Área principal: {area}"),
        _ => format!("Área principal: {}", results[0].area),
    }
}

/// One completed-analysis record shown on the history screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Stable record identifier.
    pub id: String,
    /// Analyzed file name.
    pub file_name: String,
    /// Analysis date caption source (`"15/05/2023"`).
    pub analyzed_on: String,
    /// Highest-scoring area for the record.
    pub top_area: String,
    /// Score of the highest-scoring area, clamped at record time.
    pub score: u8,
}

impl HistoryEntry {
    /// Returns the date caption for the history row.
    pub fn date_caption(&self) -> String {
        format!("Analizado el {}", self.analyzed_on)
    }

    /// Returns the score caption for the history row.
    pub fn score_caption(&self) -> String {
        format!("{}%", self.score)
    }
}

/// History screen projection with an explicit empty state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryView {
    /// No records: the screen shows the empty-state container.
    Empty,
    /// At least one record: the screen shows the list.
    Entries(Vec<HistoryEntry>),
}

/// Projects history records into the screen view model.
pub fn project_history(entries: Vec<HistoryEntry>) -> HistoryView {
    if entries.is_empty() {
        HistoryView::Empty
    } else {
        HistoryView::Entries(entries)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for submit gating and phase transitions.

    use super::*;

    fn fixture_file() -> SelectedFile {
        SelectedFile::new("cv_2024.pdf", 812 * 1024, "application/pdf")
            .expect("file should be valid")
    }

    #[test]
    fn submit_gate_requires_selection_and_idle_phase() {
        let mut state = ScreenState::new("v0.1.0");
        assert!(!state.can_submit());
        assert_eq!(state.begin_upload(), Err(SubmitBlocked::NoSelection));

        state.select_file(&fixture_file());
        assert!(state.can_submit());
        state.begin_upload().expect("upload should start");

        assert_eq!(state.begin_upload(), Err(SubmitBlocked::Busy));
    }

    #[test]
    fn selection_caption_uses_human_size() {
        let mut state = ScreenState::new("v0.1.0");
        state.select_file(&fixture_file());

        let caption = state.selected.expect("selection should be recorded");
        assert_eq!(caption.name, "cv_2024.pdf");
        assert_eq!(caption.size_caption, "812 KB");
    }
}
