//! Integration tests for qualitative level thresholds.

use cv_lens_analysis_contract::{FitLevel, level_for_percentage};

#[test]
fn level_threshold_tests_match_fixed_boundaries() {
    let expectations = [
        (85, FitLevel::Excelente),
        (84, FitLevel::MuyBueno),
        (70, FitLevel::MuyBueno),
        (69, FitLevel::Bueno),
        (50, FitLevel::Bueno),
        (49, FitLevel::Regular),
        (30, FitLevel::Regular),
        (29, FitLevel::NecesitaMejorar),
    ];

    for (percentage, expected) in expectations {
        assert_eq!(
            level_for_percentage(percentage),
            expected,
            "percentage {percentage} should map to {expected:?}"
        );
    }
}

#[test]
fn level_threshold_tests_cover_range_extremes() {
    assert_eq!(level_for_percentage(100), FitLevel::Excelente);
    assert_eq!(level_for_percentage(0), FitLevel::NecesitaMejorar);
}
