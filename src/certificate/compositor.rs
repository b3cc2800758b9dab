//! Certificate pipeline: id → URL → code → layout → PDF → store.

use actix_web::web;
use std::time::{Duration, Instant};

use super::format::format_local_millis;
use super::layout::{Align, Page, PageLayout, Rect, PAGE_MARGIN, PAGE_WIDTH};
use super::models::{CompletionDescriptor, ItemRecord};
use super::naming::{ArtifactClock, ArtifactId};
use super::render::{render_pdf, DocumentInfo, EmbeddedImage};
use super::{CertificateError, RenderError};
use crate::qr::{self, CodeOptions};
use crate::storage::ArtifactStore;

pub const CERTIFICATE_TITLE: &str = "Railway Track Fitting Certificate";
pub const UPLOADS_ROUTE: &str = "/uploads";

/// Printed size of the embedded code, in points.
const CODE_SIZE: f32 = 100.0;
/// Offset of the code's left edge from the right page edge.
const CODE_RIGHT_OFFSET: f32 = 150.0;

/// Lay out the certificate pages for `record`. The document id line and the
/// generation time both derive from `id`.
pub fn lay_out_certificate(record: &ItemRecord, id: ArtifactId) -> Vec<Page> {
    let mut layout = PageLayout::new();

    // The title spans the full content width; only later lines avoid the code.
    layout
        .font_size(24.0)
        .text(CERTIFICATE_TITLE, Align::Center)
        .move_down(1.5);

    layout.place_image(Rect {
        x: PAGE_WIDTH - CODE_RIGHT_OFFSET,
        y: PAGE_MARGIN,
        width: CODE_SIZE,
        height: CODE_SIZE,
    });

    layout
        .font_size(16.0)
        .underlined("Item Details")
        .move_down(2.5);

    layout.font_size(12.0);
    for (label, value, gap_after) in record.printed_fields() {
        layout
            .text(&format!("{}: {}", label, value), Align::Left)
            .move_down(gap_after);
    }

    layout
        .font_size(10.0)
        .text(
            &format!("Generated on: {}", format_local_millis(id.millis())),
            Align::Left,
        )
        .move_down(1.0)
        .text(&format!("Document ID: {}", id), Align::Left);

    layout.finish()
}

/// Encode the code for `url`, lay out `record` around it and serialize the
/// PDF. No I/O.
pub fn render_certificate(
    record: &ItemRecord,
    id: ArtifactId,
    url: &str,
) -> Result<Vec<u8>, CertificateError> {
    let code = qr::encode(url, &CodeOptions::certificate())?;
    let image = EmbeddedImage {
        width: code.width,
        height: code.height,
        rgb: code.decode_rgb()?,
    };

    let pages = lay_out_certificate(record, id);
    let subject = format!("Document ID: {}", id);
    let info = DocumentInfo {
        title: CERTIFICATE_TITLE,
        subject: &subject,
    };
    Ok(render_pdf(&pages, Some(&image), &info)?)
}

/// Composes certificates and commits them to the artifact store.
#[derive(Debug)]
pub struct Compositor {
    store: ArtifactStore,
    clock: ArtifactClock,
    deadline: Duration,
}

impl Compositor {
    pub fn new(store: ArtifactStore, deadline: Duration) -> Self {
        Self {
            store,
            clock: ArtifactClock::new(),
            deadline,
        }
    }

    /// Generate and store a certificate whose embedded code points at its own
    /// retrieval URL under `base_url`.
    ///
    /// Encoding, layout and the store commit share one deadline. On any
    /// failure nothing is left under the artifact's name.
    pub async fn compose(
        &self,
        record: ItemRecord,
        base_url: &str,
    ) -> Result<CompletionDescriptor, CertificateError> {
        let started = Instant::now();
        let deadline = started + self.deadline;

        let id = self.clock.issue();
        let artifact_name = id.artifact_name();
        let relative_path = format!("{}/{}", UPLOADS_ROUTE, artifact_name);
        let absolute_url = format!("{}{}", base_url.trim_end_matches('/'), relative_path);

        let url = absolute_url.clone();
        let render = web::block(move || render_certificate(&record, id, &url));
        let pdf = match tokio::time::timeout_at(deadline.into(), render).await {
            Ok(Ok(result)) => result?,
            Ok(Err(e)) => return Err(RenderError::Blocking(e.to_string()).into()),
            Err(_) => return Err(CertificateError::Timeout(self.deadline)),
        };

        let size = pdf.len();
        self.store.write_before(&artifact_name, pdf, deadline).await?;

        log::info!(
            "Composed {} ({} bytes) in {:?}",
            artifact_name,
            size,
            started.elapsed()
        );

        Ok(CompletionDescriptor {
            artifact_name,
            relative_path,
            absolute_url,
            timestamp: id.millis(),
        })
    }
}
