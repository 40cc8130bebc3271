use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

use crate::auth::{require_role, Role};
use crate::error::{NumberingError, ValidationErrorResponse};
use crate::registry::fields::validate_field_values;
use crate::registry::model::{AdditionalField, DocumentType, Program};
use crate::AppState;

/// Body of `PUT /document-types/{code}`; the code comes from the path.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpsertDocumentTypeRequest {
    #[schema(example = "Surat Keterangan Aktif Kuliah")]
    pub title: String,
    pub approval_role: Role,
    #[schema(example = 3)]
    pub estimated_days: u32,
    #[serde(default)]
    pub required_documents: Vec<String>,
    #[serde(default)]
    pub additional_fields: Vec<AdditionalField>,
    #[serde(default)]
    pub faculty_wide: bool,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Values submitted for a letter type's additional fields, keyed by field name.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct FieldValues(pub HashMap<String, String>);

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FieldValidationResponse {
    pub valid: bool,
}

#[utoipa::path(
    get,
    path = "/api/document-types",
    tag = "Registry",
    responses(
        (status = 200, description = "Active letter types ordered by code", body = Vec<DocumentType>),
        (status = 500, description = "Registry unavailable", body = crate::ErrorResponse)
    )
)]
pub async fn list_document_types(state: web::Data<AppState>) -> impl Responder {
    match state.registry.list_active().await {
        Ok(types) => HttpResponse::Ok().json(types),
        Err(e) => HttpResponse::from(NumberingError::from(e)),
    }
}

#[utoipa::path(
    get,
    path = "/api/document-types/{code}",
    tag = "Registry",
    params(
        ("code" = String, Path, description = "Letter type code, e.g. SKA")
    ),
    responses(
        (status = 200, description = "Letter type found", body = DocumentType),
        (status = 404, description = "Letter type not found", body = crate::ErrorResponse)
    )
)]
pub async fn get_document_type(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let code = path.into_inner();
    match state.registry.find_document_type(&code).await {
        Ok(Some(doc)) => HttpResponse::Ok().json(doc),
        Ok(None) => HttpResponse::from(NumberingError::document_type_not_found(&code)),
        Err(e) => HttpResponse::from(NumberingError::from(e)),
    }
}

#[utoipa::path(
    put,
    path = "/api/document-types/{code}",
    tag = "Registry",
    params(
        ("code" = String, Path, description = "Letter type code, e.g. SKA")
    ),
    request_body = UpsertDocumentTypeRequest,
    responses(
        (status = 200, description = "Letter type saved", body = DocumentType),
        (status = 400, description = "Invalid definition", body = ValidationErrorResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Role may not edit letter types")
    ),
    security(("bearer_auth" = []))
)]
pub async fn upsert_document_type(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<UpsertDocumentTypeRequest>,
) -> impl Responder {
    let claims = match require_role(&req, &state.jwt_secret, Role::can_administer_numbering) {
        Ok(c) => c,
        Err(e) => return e.error_response(),
    };

    let body = body.into_inner();
    let doc = DocumentType {
        code: path.into_inner().trim().to_ascii_uppercase(),
        title: body.title,
        approval_role: body.approval_role,
        estimated_days: body.estimated_days,
        required_documents: body.required_documents,
        additional_fields: body.additional_fields,
        faculty_wide: body.faculty_wide,
        active: body.active,
    };

    log::info!("User {} is saving document type {}", claims.username, doc.code);
    match state.registry.upsert_document_type(doc).await {
        Ok(saved) => HttpResponse::Ok().json(saved),
        Err(e) => HttpResponse::from(e),
    }
}

#[utoipa::path(
    post,
    path = "/api/document-types/{code}/validate-fields",
    tag = "Registry",
    params(
        ("code" = String, Path, description = "Letter type code, e.g. SKA")
    ),
    request_body = FieldValues,
    responses(
        (status = 200, description = "All values are valid", body = FieldValidationResponse),
        (status = 400, description = "Some values are invalid", body = ValidationErrorResponse),
        (status = 404, description = "Letter type not found", body = crate::ErrorResponse)
    )
)]
pub async fn validate_fields(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<FieldValues>,
) -> impl Responder {
    let code = path.into_inner();
    let doc = match state.registry.find_document_type(&code).await {
        Ok(Some(doc)) => doc,
        Ok(None) => return HttpResponse::from(NumberingError::document_type_not_found(&code)),
        Err(e) => return HttpResponse::from(NumberingError::from(e)),
    };

    let errors = validate_field_values(&doc.additional_fields, &body.0.0);
    if errors.is_empty() {
        HttpResponse::Ok().json(FieldValidationResponse { valid: true })
    } else {
        HttpResponse::BadRequest().json(ValidationErrorResponse::new(errors))
    }
}

#[utoipa::path(
    get,
    path = "/api/programs",
    tag = "Registry",
    responses(
        (status = 200, description = "Programs ordered by code", body = Vec<Program>),
        (status = 500, description = "Registry unavailable", body = crate::ErrorResponse)
    )
)]
pub async fn list_programs(state: web::Data<AppState>) -> impl Responder {
    match state.registry.list_programs().await {
        Ok(programs) => HttpResponse::Ok().json(programs),
        Err(e) => HttpResponse::from(NumberingError::from(e)),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/document-types").route(web::get().to(list_document_types)))
        .service(
            web::resource("/document-types/{code}")
                .route(web::get().to(get_document_type))
                .route(web::put().to(upsert_document_type)),
        )
        .service(
            web::resource("/document-types/{code}/validate-fields")
                .route(web::post().to(validate_fields)),
        )
        .service(web::resource("/programs").route(web::get().to(list_programs)));
}
