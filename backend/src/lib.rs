//! Report engine: turns a stored markup template plus timestamped field
//! values into a paginated PDF.
//!
//! The pipeline lives in [`services`]: data resolution, template
//! validation, placeholder rendering, structural extraction and the
//! [`services::engine::ReportEngine`] that sequences them. Storage and
//! painting sit behind the [`repository::ReportRepository`] and
//! [`services::pdf::LayoutBackend`] traits.

pub mod config;
pub mod error;
pub mod job_controller;
pub mod repository;
pub mod services;
