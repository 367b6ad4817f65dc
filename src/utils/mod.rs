//! Utility modules for common functionality

pub mod logger;
pub mod progress;
pub(crate) mod write_utils;
