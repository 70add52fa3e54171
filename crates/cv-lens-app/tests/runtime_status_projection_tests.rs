//! Integration tests for runtime status projection.

use cv_lens_app::project_runtime_status;
use cv_lens_core::SelectedFile;
use cv_lens_ui::ScreenState;

#[test]
fn runtime_status_projection_tests_reflects_screen_state() {
    let mut state = ScreenState::new("v0.1.0");
    let file = SelectedFile::new("cv_2024.pdf", 812 * 1024, "application/pdf")
        .expect("file should be valid");
    state.select_file(&file);
    state.analysis_status = "Área principal: Sistemas (91%)".to_string();

    let snapshot = project_runtime_status(&state);
    assert!(snapshot.submit_allowed);
    assert_eq!(snapshot.phase, "Idle");
    assert_eq!(snapshot.analysis, "Área principal: Sistemas (91%)");
    assert_eq!(snapshot.selected_file.as_deref(), Some("cv_2024.pdf"));
}

#[test]
fn runtime_status_projection_tests_blocks_submit_while_uploading() {
    let mut state = ScreenState::new("v0.1.0");
    let file = SelectedFile::new("cv_2024.pdf", 812 * 1024, "application/pdf")
        .expect("file should be valid");
    state.select_file(&file);
    state.begin_upload().expect("upload should start");

    let snapshot = project_runtime_status(&state);
    assert!(!snapshot.submit_allowed);
    assert_eq!(snapshot.phase, "Uploading");
}
