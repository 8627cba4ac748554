//! Shared terminal output helpers.

pub mod icons;
