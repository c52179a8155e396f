//! Configuration module for the tally counter
//!
//! This module concentrates the user-facing settings shared between the
//! settings panel and the rest of the application, together with the
//! normalization applied to every value crossing into them.

pub mod settings;

pub use settings::{normalize_group_size, parse_group_size, Language, Settings, Theme};
