use actix_cors::Cors;
use actix_files::Files;
use actix_web::middleware::{Compress, Logger};
use actix_web::{http::header, web, App, HttpResponse, HttpServer};
use actix_web_prometheus::PrometheusMetricsBuilder;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub mod certificate;
pub mod config;
pub mod health;
pub mod qr;
pub mod state;
pub mod storage;
pub mod validation;

pub use crate::config::AppConfig;
pub use crate::state::AppState;

/// Largest JSON body accepted by the API.
const JSON_LIMIT: usize = 64 * 1024;

/// Failure body shared by every endpoint.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    #[schema(example = "Validation failed: [vendorName] Vendor Name must not be empty")]
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: message.into(),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::certificate::handlers::generate_pdf,
        crate::qr::handlers::generate_qr,
        crate::health::health,
        crate::health::root
    ),
    components(
        schemas(
            certificate::models::GeneratePdfRequest,
            certificate::models::GeneratePdfResponse,
            qr::models::GenerateQrRequest,
            qr::models::GenerateQrResponse,
            health::HealthResponse,
            health::RootResponse,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Certificate Service", description = "Certificate generation with embedded QR code."),
        (name = "QR Service", description = "Standalone QR code generation."),
        (name = "System", description = "Health and status endpoints.")
    )
)]
pub struct ApiDoc;

/// JSON extractor config: malformed bodies get the same failure shape as
/// every other error.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_LIMIT)
        .error_handler(|err, _req| {
            let message = err.to_string();
            actix_web::error::InternalError::from_response(
                err,
                HttpResponse::BadRequest().json(ErrorResponse::new(message)),
            )
            .into()
        })
}

/// Register API routes and the artifact file service.
pub fn configure_routes(cfg: &mut web::ServiceConfig, uploads_dir: &Path) {
    cfg.app_data(json_config())
        .service(
            web::scope("/api")
                .service(
                    web::resource("/generate-pdf")
                        .route(web::post().to(certificate::handlers::generate_pdf)),
                )
                .service(
                    web::resource("/generate-qr").route(web::post().to(qr::handlers::generate_qr)),
                )
                .service(web::resource("/health").route(web::get().to(health::health))),
        )
        .service(Files::new(certificate::compositor::UPLOADS_ROUTE, uploads_dir))
        .service(web::resource("/").route(web::get().to(health::root)));
}

pub async fn run() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env().context("failed to load configuration")?;
    let app_state = web::Data::new(AppState::new(config.clone()).with_context(|| {
        format!(
            "failed to prepare uploads directory {}",
            config.uploads_dir.display()
        )
    })?);

    let prometheus = PrometheusMetricsBuilder::new("railtrack_server")
        .endpoint("/metrics")
        .build()
        .map_err(|e| anyhow::anyhow!("failed to create Prometheus metrics middleware: {}", e))?;

    log::info!("Backend server running on {}:{}", config.host, config.port);
    log::info!("Uploads directory: {}", config.uploads_dir.display());
    log::info!("Public base URL: {}", config.public_base_url);

    let uploads_dir = config.uploads_dir.clone();
    let origins = config.allowed_origins.clone();

    HttpServer::new(move || {
        let app_state = app_state.clone();
        let prometheus = prometheus.clone();
        let cors = origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![
                header::AUTHORIZATION,
                header::ACCEPT,
                header::CONTENT_TYPE,
            ])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(Compress::default())
            .wrap(Logger::default())
            .wrap(prometheus)
            .wrap(cors)
            .app_data(app_state)
            .configure(|cfg| configure_routes(cfg, &uploads_dir))
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    Ok(())
}
