//! Certificate generation.
//!
//! - `naming` - artifact ids and file names
//! - `models` - request/response types and the validated item record
//! - `layout` - page flow layout
//! - `render` - PDF serialization
//! - `compositor` - the end-to-end pipeline from record to stored artifact

pub mod compositor;
pub mod format;
pub mod handlers;
pub mod layout;
pub mod models;
pub mod naming;
pub mod render;

pub use compositor::{lay_out_certificate, render_certificate, Compositor};
pub use models::{CompletionDescriptor, GeneratePdfRequest, GeneratePdfResponse, ItemRecord};
pub use naming::{ArtifactClock, ArtifactId};

use actix_web::http::StatusCode;
use std::time::Duration;
use thiserror::Error;

use crate::qr::EncodingError;
use crate::storage::StorageError;
use crate::validation::ValidationErrors;

/// Errors raised while laying out or serializing a document.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("document has no pages")]
    EmptyDocument,
    #[error("image buffer holds {actual} bytes, expected {expected}")]
    ImageSize { expected: usize, actual: usize },
    #[error("PDF construction failed: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("failed to write PDF: {0}")]
    Write(String),
    #[error("render task failed: {0}")]
    Blocking(String),
}

/// Any failure of the certificate pipeline.
#[derive(Debug, Error)]
pub enum CertificateError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("certificate generation exceeded the {0:?} deadline")]
    Timeout(Duration),
}

impl CertificateError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            CertificateError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
