#![warn(missing_docs)]
//! # cv-lens-app binary
//!
//! Headless entry point for cv-lens; the mobile shells embed the library
//! crates directly.

use cv_lens_app::{AppConfig, app_version, initialize_logger, log_info, upload_enabled_from_env};

/// CLI entry point.
fn main() {
    if let Err(error) = initialize_logger() {
        eprintln!("failed to initialize run logging: {error}");
    }

    let config = AppConfig::from_env();
    log_info(
        "bootstrap",
        "startup",
        &format!(
            "version={} endpoint={} upload_enabled={}",
            app_version(),
            config.analyze_endpoint(),
            upload_enabled_from_env()
        ),
    );

    println!("cv-lens-app {}", app_version());
    println!("analyze_endpoint={}", config.analyze_endpoint());
    println!(
        "upload_enabled={} (CV_LENS_UPLOAD_ENABLED)",
        upload_enabled_from_env()
    );
}
