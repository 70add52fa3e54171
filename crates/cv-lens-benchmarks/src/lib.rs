//! Benchmark crate for `cv-lens`.
//!
//! Holds no runtime code; the `tests/` directory carries lightweight NFR
//! smoke checks over the pure envelope/mapping pipeline.
