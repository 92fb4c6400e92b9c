//! Shared numeric helpers used across indicators and structure detectors.

pub mod math;
