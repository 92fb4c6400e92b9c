//! Volume indicators

pub mod volume_ratio;

pub use volume_ratio::*;
