//! # Report Model
//!
//! - `template`: stored templates and their field definitions.
//! - `data`: timestamped field values, many per field name.
//! - `document`: primitives recovered from rendered markup.

pub mod data;
pub mod document;
pub mod template;
