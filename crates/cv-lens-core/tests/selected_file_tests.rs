//! Tests selected-file validation and size captions.

use cv_lens_core::{CoreError, SelectedFile};

#[test]
fn selected_file_tests_rejects_blank_name_and_mime() {
    assert!(matches!(
        SelectedFile::new("  ", 10, "application/pdf"),
        Err(CoreError::InvalidFileName)
    ));
    assert!(matches!(
        SelectedFile::new("cv.pdf", 10, ""),
        Err(CoreError::InvalidMimeType)
    ));
}

#[test]
fn selected_file_tests_formats_size_caption_in_kb_below_one_mb() {
    let file = SelectedFile::new("cv.pdf", 512 * 1024, "application/pdf")
        .expect("file should be valid");
    assert_eq!(file.human_size(), "512 KB");
}

#[test]
fn selected_file_tests_formats_size_caption_in_mb_from_one_mb() {
    let file = SelectedFile::new("cv.pdf", 5 * 1024 * 1024 + 300, "application/pdf")
        .expect("file should be valid");
    assert_eq!(file.human_size(), "5 MB");
}
