use actix_cors::Cors;
use actix_web::middleware::Compress;
use actix_web::{http::header, web, App, HttpServer};
use actix_web_prometheus::PrometheusMetricsBuilder;
use serde::{Deserialize, Serialize};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub mod auth;
pub mod config;
pub mod counter;
pub mod db;
pub mod error;
pub mod metrics;
pub mod numbering;
pub mod registry;
pub mod validation;

pub use crate::config::AppConfig;
pub use crate::db::AppState;

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: &str) -> Self {
        Self {
            error: error_type.to_string(),
            message: message.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn not_found(message: &str) -> Self {
        Self::new("NotFound", message)
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new("BadRequest", message)
    }

    pub fn internal_error(message: &str) -> Self {
        Self::new("InternalServerError", message)
    }
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::counter::handlers::preview_letter_number,
        crate::counter::handlers::commit_letter_number,
        crate::counter::handlers::letter_number_statistics,
        crate::counter::handlers::letter_counter_report,
        crate::counter::handlers::reset_letter_counter,
        crate::registry::routes::list_document_types,
        crate::registry::routes::get_document_type,
        crate::registry::routes::upsert_document_type,
        crate::registry::routes::validate_fields,
        crate::registry::routes::list_programs
    ),
    components(
        schemas(
            counter::handlers::PreviewResponse,
            counter::handlers::CommitResponse,
            counter::handlers::StatisticsResponse,
            counter::handlers::ReportResponse,
            counter::handlers::ResetResponse,
            counter::LetterNumberParams,
            counter::CounterKey,
            counter::CounterReport,
            counter::CounterReportEntry,
            counter::EntryStatus,
            counter::ProgramStatistics,
            counter::DocumentTypeCount,
            counter::MonthlyCount,
            counter::ResetRequest,
            counter::ResetOutcome,
            registry::DocumentType,
            registry::AdditionalField,
            registry::FieldKind,
            registry::Program,
            registry::routes::UpsertDocumentTypeRequest,
            registry::routes::FieldValues,
            registry::routes::FieldValidationResponse,
            auth::Role,
            validation::ValidationError,
            error::MissingParametersResponse,
            error::ValidationErrorResponse,
            ErrorResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Letter Number", description = "Letter number preview, issuance and counter reports."),
        (name = "Registry", description = "Letter types and study programs.")
    ),
    servers(
        (url = "http://127.0.0.1:8080", description = "Local server")
    )
)]
pub struct ApiDoc;

/// Register every `/api` route.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.configure(counter::handlers::config)
        .configure(registry::routes::config);
}

pub async fn run() -> std::io::Result<()> {
    dotenvy::dotenv().ok(); // Load .env file
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let app_state = match AppState::from_config(&config).await {
        Ok(state) => web::Data::new(state),
        Err(e) => {
            log::error!(
                "Failed to initialise the database. Please check DATABASE_URL in .env and ensure the database is running. Error: {:#}",
                e
            );
            std::process::exit(1);
        }
    };

    let prometheus = match PrometheusMetricsBuilder::new("siakad_surat_server")
        .endpoint("/metrics")
        .build()
    {
        Ok(prometheus) => prometheus,
        Err(e) => {
            log::error!("Failed to create Prometheus metrics middleware: {}", e);
            std::process::exit(1);
        }
    };

    let (host, port) = config.bind_address();
    let allowed_origins = config.cors_allowed_origins.clone();
    log::info!("Starting server at http://{}:{}", host, port);

    HttpServer::new(move || {
        let app_state = app_state.clone();
        let prometheus = prometheus.clone();
        let cors = allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "PUT", "OPTIONS"])
            .allowed_headers(vec![
                header::AUTHORIZATION,
                header::ACCEPT,
                header::CONTENT_TYPE,
            ])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(Compress::default())
            .wrap(prometheus)
            .wrap(cors)
            .app_data(app_state)
            .service(web::scope("/api").configure(configure_api))
            .service(
                web::resource("/metrics/letter-numbers")
                    .route(web::get().to(metrics::letter_number_metrics)),
            )
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
    })
    .keep_alive(actix_web::http::KeepAlive::Os)
    .bind((host.as_str(), port))?
    .run()
    .await
}
