use actix_web::{web, HttpResponse, Responder};
use log::{error, info, warn};

use crate::qr::models::{GenerateQrRequest, GenerateQrResponse};
use crate::qr::{encode, CodeOptions};
use crate::validation::Validate;
use crate::ErrorResponse;

#[utoipa::path(
    context_path = "/api",
    tag = "QR Service",
    post,
    path = "/generate-qr",
    request_body = GenerateQrRequest,
    responses(
        (status = 200, description = "QR code generated", body = GenerateQrResponse),
        (status = 400, description = "Missing pdfUrl", body = ErrorResponse),
        (status = 500, description = "Encoding failed", body = ErrorResponse)
    )
)]
pub async fn generate_qr(req: web::Json<GenerateQrRequest>) -> impl Responder {
    let pdf_url = match req.into_inner().validate() {
        Ok(url) => url,
        Err(errors) => {
            warn!("Rejected QR request: {}", errors);
            return HttpResponse::BadRequest().json(ErrorResponse::new(errors.to_string()));
        }
    };

    let payload = pdf_url.clone();
    let encoded = web::block(move || encode(&payload, &CodeOptions::standalone())).await;

    match encoded {
        Ok(Ok(image)) => {
            info!("Generated standalone QR code for {}", pdf_url);
            HttpResponse::Ok().json(GenerateQrResponse {
                success: true,
                qr_code: image.to_data_url(),
                pdf_url,
            })
        }
        Ok(Err(e)) => {
            error!("Error generating QR code: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse::new(e.to_string()))
        }
        Err(e) => {
            error!("QR encoding task failed: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse::new(e.to_string()))
        }
    }
}
