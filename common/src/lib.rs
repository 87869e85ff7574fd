//! Data model shared by the report engine and its HTTP clients.
//!
//! - `model`: templates, data records and the document primitives the
//!   extractor produces.
//! - `jobs`: status of background generation jobs.
//! - `requests`: request bodies accepted by the HTTP API.

pub mod jobs;
pub mod model;
pub mod requests;
