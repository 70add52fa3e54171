//! Integration tests for MIME allow-list enforcement.

mod common;

use std::sync::Arc;

use cv_lens_app::{AppError, user_message};
use cv_lens_picker::{PickedHandle, PickerError};

#[test]
fn mime_allow_list_tests_blocks_disallowed_types_with_user_message() {
    let mut controller = common::fixture_controller(Arc::new(common::StubTransport {
        body: common::success_body(),
    }));

    let error = controller
        .pick_file(&PickedHandle::new("doc-exe"))
        .expect_err("disallowed type should be rejected");

    assert!(matches!(
        error,
        AppError::Picker(PickerError::UnsupportedType(_))
    ));
    assert_eq!(user_message(&error), "Formato no soportado. Usa PDF, DOCX o TXT.");
    assert!(controller.selected_file().is_none());
}
