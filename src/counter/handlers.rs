use actix_web::{web, HttpRequest, HttpResponse, Responder};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::auth::{require_role, Role};
use crate::counter::model::{
    CounterReport, LetterNumberParams, ProgramStatistics, ResetOutcome, ResetRequest,
};
use crate::error::{MissingParametersResponse, NumberingError};
use crate::{AppState, ErrorResponse};

fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResponse {
    pub success: bool,
    #[schema(example = "008/SKA/XI/1446/2024")]
    pub nomor_surat: String,
    pub preview: bool,
    pub candidate_sequence: u64,
    pub year: i32,
    pub params: LetterNumberParams,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommitResponse {
    pub success: bool,
    #[schema(example = "008/SKA/XI/1446/2024")]
    pub nomor_surat: String,
    pub sequence: u64,
    pub year: i32,
    pub issued_on: NaiveDate,
    pub params: LetterNumberParams,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StatisticsQuery {
    #[serde(rename = "prodiId")]
    pub prodi_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatisticsResponse {
    pub success: bool,
    pub statistics: ProgramStatistics,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReportResponse {
    pub success: bool,
    pub report: CounterReport,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ResetResponse {
    pub success: bool,
    pub reset: ResetOutcome,
}

#[utoipa::path(
    get,
    path = "/api/letter-number",
    tag = "Letter Number",
    params(LetterNumberParams),
    responses(
        (status = 200, description = "Preview of the next letter number; nothing is reserved", body = PreviewResponse),
        (status = 400, description = "Missing or invalid parameters", body = MissingParametersResponse),
        (status = 404, description = "Unknown letter type or program", body = ErrorResponse),
        (status = 500, description = "Preview unavailable", body = ErrorResponse)
    )
)]
pub async fn preview_letter_number(
    state: web::Data<AppState>,
    query: web::Query<LetterNumberParams>,
) -> impl Responder {
    let params = query.into_inner();
    let request = match params.clone().into_request() {
        Ok(r) => r,
        Err(e) => return HttpResponse::from(e),
    };

    match state.counters.preview(&request, today()).await {
        Ok(preview) => HttpResponse::Ok().json(PreviewResponse {
            success: true,
            nomor_surat: preview.formatted_preview,
            preview: true,
            candidate_sequence: preview.candidate_sequence,
            year: preview.year,
            params,
        }),
        Err(e) => HttpResponse::from(e),
    }
}

#[utoipa::path(
    post,
    path = "/api/letter-number",
    tag = "Letter Number",
    request_body = LetterNumberParams,
    responses(
        (status = 201, description = "Letter number issued", body = CommitResponse),
        (status = 400, description = "Missing or invalid parameters", body = MissingParametersResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Role may not issue letter numbers"),
        (status = 404, description = "Unknown letter type or program", body = ErrorResponse),
        (status = 500, description = "Issuance failed; outcome of the request is not retried", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn commit_letter_number(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<LetterNumberParams>,
) -> impl Responder {
    let claims = match require_role(&req, &state.jwt_secret, Role::can_issue_numbers) {
        Ok(c) => c,
        Err(e) => return e.error_response(),
    };

    let params = body.into_inner();
    let request = match params.clone().into_request() {
        Ok(r) => r,
        Err(e) => return HttpResponse::from(e),
    };

    match state.counters.commit(&request, today()).await {
        Ok(issued) => {
            log::info!(
                "User {} ({}) committed {}",
                claims.username,
                claims.role,
                issued.nomor_surat
            );
            HttpResponse::Created().json(CommitResponse {
                success: true,
                nomor_surat: issued.nomor_surat,
                sequence: issued.sequence,
                year: issued.year,
                issued_on: issued.issued_on,
                params,
            })
        }
        Err(e) => HttpResponse::from(e),
    }
}

#[utoipa::path(
    get,
    path = "/api/letter-number/statistics",
    tag = "Letter Number",
    params(StatisticsQuery),
    responses(
        (status = 200, description = "Issued-number statistics of the program", body = StatisticsResponse),
        (status = 400, description = "Missing or invalid prodiId", body = MissingParametersResponse),
        (status = 404, description = "Unknown program", body = ErrorResponse),
        (status = 500, description = "Statistics unavailable", body = ErrorResponse)
    )
)]
pub async fn letter_number_statistics(
    state: web::Data<AppState>,
    query: web::Query<StatisticsQuery>,
) -> impl Responder {
    let query = query.into_inner();
    if let Err(e) = NumberingError::check_required(&[("prodiId", query.prodi_id.as_deref())]) {
        return HttpResponse::from(e);
    }

    let raw_id = query.prodi_id.unwrap_or_default();
    let program_id = match Uuid::parse_str(raw_id.trim()) {
        Ok(id) => id,
        Err(_) => {
            return HttpResponse::from(NumberingError::InvalidParameter {
                field: "prodiId",
                message: format!("'{}' is not a valid program id", raw_id.trim()),
            })
        }
    };

    match state.counters.statistics(program_id, today()).await {
        Ok(statistics) => HttpResponse::Ok().json(StatisticsResponse {
            success: true,
            statistics,
        }),
        Err(e) => HttpResponse::from(e),
    }
}

#[utoipa::path(
    get,
    path = "/api/letter-counters",
    tag = "Letter Number",
    responses(
        (status = 200, description = "Last issued number of every letter type in every program", body = ReportResponse),
        (status = 500, description = "Report unavailable", body = ErrorResponse)
    )
)]
pub async fn letter_counter_report(state: web::Data<AppState>) -> impl Responder {
    match state.counters.report(today()).await {
        Ok(report) => HttpResponse::Ok().json(ReportResponse {
            success: true,
            report,
        }),
        Err(e) => HttpResponse::from(e),
    }
}

#[utoipa::path(
    post,
    path = "/api/letter-counters/reset",
    tag = "Letter Number",
    request_body = ResetRequest,
    responses(
        (status = 200, description = "Counter reset to 0", body = ResetResponse),
        (status = 400, description = "Invalid parameters", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Role may not reset counters"),
        (status = 404, description = "Unknown letter type", body = ErrorResponse),
        (status = 500, description = "Reset failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn reset_letter_counter(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<ResetRequest>,
) -> impl Responder {
    let claims = match require_role(&req, &state.jwt_secret, Role::can_administer_numbering) {
        Ok(c) => c,
        Err(e) => return e.error_response(),
    };

    match state.counters.reset(&body, &claims.username).await {
        Ok(reset) => HttpResponse::Ok().json(ResetResponse {
            success: true,
            reset,
        }),
        Err(e) => HttpResponse::from(e),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/letter-number")
            .route(web::get().to(preview_letter_number))
            .route(web::post().to(commit_letter_number)),
    )
    .service(
        web::resource("/letter-number/statistics").route(web::get().to(letter_number_statistics)),
    )
    .service(web::resource("/letter-counters").route(web::get().to(letter_counter_report)))
    .service(
        web::resource("/letter-counters/reset").route(web::post().to(reset_letter_counter)),
    );
}
