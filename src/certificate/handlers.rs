use actix_web::{web, HttpResponse, Responder};
use log::{error, info, warn};

use crate::certificate::models::{GeneratePdfRequest, GeneratePdfResponse};
use crate::state::AppState;
use crate::validation::Validate;
use crate::ErrorResponse;

#[utoipa::path(
    context_path = "/api",
    tag = "Certificate Service",
    post,
    path = "/generate-pdf",
    request_body = GeneratePdfRequest,
    responses(
        (status = 200, description = "Certificate generated and stored", body = GeneratePdfResponse),
        (status = 400, description = "Missing or malformed fields", body = ErrorResponse),
        (status = 500, description = "Encoding, rendering or storage failed", body = ErrorResponse)
    )
)]
pub async fn generate_pdf(
    state: web::Data<AppState>,
    req: web::Json<GeneratePdfRequest>,
) -> impl Responder {
    let record = match req.into_inner().validate() {
        Ok(record) => record,
        Err(errors) => {
            warn!("Rejected certificate request: {}", errors);
            return HttpResponse::BadRequest().json(ErrorResponse::new(errors.to_string()));
        }
    };

    match state
        .compositor
        .compose(record, &state.config.public_base_url)
        .await
    {
        Ok(descriptor) => {
            info!("Generated certificate {}", descriptor.absolute_url);
            HttpResponse::Ok().json(GeneratePdfResponse::from(descriptor))
        }
        Err(e) => {
            error!("Error generating PDF: {}", e);
            HttpResponse::build(e.status_code()).json(ErrorResponse::new(e.to_string()))
        }
    }
}
