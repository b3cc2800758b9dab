use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::validation::{Validate, ValidationError, ValidationErrors};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQrRequest {
    #[schema(example = "http://example.com/x.pdf")]
    pub pdf_url: Option<String>,
}

impl Validate for GenerateQrRequest {
    type Output = String;

    /// The URL is encoded verbatim, so it is only checked for blankness.
    fn validate(self) -> Result<String, ValidationErrors> {
        match self.pdf_url {
            Some(url) if !url.trim().is_empty() => Ok(url),
            _ => {
                let mut errors = ValidationErrors::new();
                errors.add(ValidationError::empty_field("pdfUrl", "PDF URL"));
                Err(errors)
            }
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQrResponse {
    pub success: bool,
    #[schema(example = "data:image/png;base64,iVBORw0KGgo...")]
    pub qr_code: String,
    #[schema(example = "http://example.com/x.pdf")]
    pub pdf_url: String,
}
