//! Contract test crate for `cv-lens`.
//!
//! Holds no runtime code; the `tests/` directory validates the frozen wire
//! contract fixtures against their JSON schemas.
