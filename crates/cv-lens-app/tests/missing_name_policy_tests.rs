//! Integration tests for the missing-display-name policy.

mod common;

use std::sync::Arc;

use cv_lens_app::AppError;
use cv_lens_picker::{PickedHandle, PickerError};

#[test]
fn missing_name_policy_tests_fails_instead_of_fabricating_a_name() {
    let mut controller = common::fixture_controller(Arc::new(common::StubTransport {
        body: common::success_body(),
    }));

    let error = controller
        .pick_file(&PickedHandle::new("doc-anon"))
        .expect_err("nameless file should be rejected");

    assert!(matches!(error, AppError::Picker(PickerError::MissingName)));
    assert!(controller.selected_file().is_none());
    assert!(controller.state().selected.is_none());
}
