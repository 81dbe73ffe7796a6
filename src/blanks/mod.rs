//! Blanks module - business logic for stamping hunting blanks.
//!
//! This module contains the coordinate registry and the two blank
//! generators:
//! - `PermitGenerator` - the two-page hunting permit (yellow/pink/blue stocks)
//! - `VoucherGenerator` - the voucher stamped over a scanned background sheet
//!
//! plus resource-group expansion and the voucher-number sequence.

pub mod common;
pub mod coords;
pub mod engine;
pub mod groups;
pub mod handlers;
pub mod permit;
pub mod sequence;
pub mod traits;
pub mod validation;
pub mod voucher;

pub use engine::BlankFont;
pub use groups::{expand, ExpandError, GroupExpansion};
pub use permit::{PermitGenerator, PermitRequest};
pub use sequence::{allocate, VoucherAllocation};
pub use traits::{Generator, Validator};
pub use voucher::{VoucherGenerator, VoucherRequest};

use thiserror::Error;

/// Errors that can occur during blank generation.
#[derive(Debug, Error)]
pub enum BlankError {
    /// A mandatory coordinate is missing from the variant's table. This is
    /// a deployment defect, not an operator mistake, and aborts the render
    /// before anything is drawn.
    #[error("blank template defect: {0}")]
    ConfigDefect(String),
    #[error("failed to load stamping font: {0}")]
    FontIo(#[source] std::io::Error),
    #[error("stamping font could not be parsed")]
    FontParse,
    #[error("failed to parse voucher background PDF: {0}")]
    Background(#[source] lopdf::Error),
    #[error("voucher background PDF contains no pages")]
    EmptyBackground,
    #[error("PDF assembly failed: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("failed to write PDF output: {0}")]
    PdfIo(#[from] std::io::Error),
}

/// Result of a successful blank generation.
#[derive(Debug)]
pub struct GeneratedBlank {
    pub filename: String,
    pub pdf: Vec<u8>,
}
