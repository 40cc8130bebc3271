mod common;

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use chrono::{Datelike, Local};
use serde_json::{json, Value};
use siakad_surat_server::auth::Role;
use siakad_surat_server::numbering::format_for_date;
use siakad_surat_server::{configure_api, AppState};
use std::sync::Arc;

use common::{bearer, memory_state, state_with, UnavailableCounterStore, INFORMATIKA_ID, SISTEM_INFORMASI_ID};

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .service(web::scope("/api").configure(configure_api)),
        )
        .await
    };
}

fn preview_uri(jenis: &str, kode: &str, id: &str) -> String {
    format!(
        "/api/letter-number?jenisSurat={}&prodiKode={}&prodiId={}",
        jenis, kode, id
    )
}

fn commit_body(jenis: &str, kode: &str, id: &str) -> Value {
    json!({ "jenisSurat": jenis, "prodiKode": kode, "prodiId": id })
}

#[actix_web::test]
async fn test_preview_returns_candidate_without_reserving() {
    let app = init_app!(memory_state());
    let today = Local::now().date_naive();

    for _ in 0..2 {
        let req = test::TestRequest::get()
            .uri(&preview_uri("SKA", "IF", INFORMATIKA_ID))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["preview"], true);
        assert_eq!(body["candidateSequence"], 1);
        assert_eq!(body["year"], today.year());
        assert_eq!(body["nomorSurat"], format_for_date(1, "SKA", today));
        assert_eq!(body["params"]["jenisSurat"], "SKA");
        assert_eq!(body["params"]["prodiKode"], "IF");
        assert_eq!(body["params"]["prodiId"], INFORMATIKA_ID);
    }
}

#[actix_web::test]
async fn test_preview_lists_missing_parameters() {
    let app = init_app!(memory_state());

    let req = test::TestRequest::get()
        .uri("/api/letter-number?jenisSurat=SKA&prodiKode=")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "BadRequest");
    assert_eq!(body["required"], json!(["jenisSurat", "prodiKode", "prodiId"]));
    assert_eq!(body["missing"], json!(["prodiKode", "prodiId"]));
    assert!(body["timestamp"].is_string());
}

#[actix_web::test]
async fn test_preview_rejects_malformed_program_id() {
    let app = init_app!(memory_state());

    let req = test::TestRequest::get()
        .uri(&preview_uri("SKA", "IF", "42"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_unknown_letter_type_is_not_found() {
    let app = init_app!(memory_state());

    let req = test::TestRequest::get()
        .uri(&preview_uri("XYZ", "IF", INFORMATIKA_ID))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "NotFound");
}

#[actix_web::test]
async fn test_malformed_letter_type_is_not_found() {
    let app = init_app!(memory_state());

    let req = test::TestRequest::get()
        .uri(&preview_uri("S", "IF", INFORMATIKA_ID))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_commit_requires_an_issuer_role() {
    let app = init_app!(memory_state());

    let anonymous = test::TestRequest::post()
        .uri("/api/letter-number")
        .set_json(commit_body("SKA", "IF", INFORMATIKA_ID))
        .to_request();
    assert_eq!(
        test::call_service(&app, anonymous).await.status(),
        StatusCode::UNAUTHORIZED
    );

    let student = test::TestRequest::post()
        .uri("/api/letter-number")
        .insert_header(bearer(Role::Mahasiswa))
        .set_json(commit_body("SKA", "IF", INFORMATIKA_ID))
        .to_request();
    assert_eq!(
        test::call_service(&app, student).await.status(),
        StatusCode::FORBIDDEN
    );
}

#[actix_web::test]
async fn test_commit_issues_sequential_numbers() {
    let app = init_app!(memory_state());
    let today = Local::now().date_naive();

    for expected in 1..=3u64 {
        let req = test::TestRequest::post()
            .uri("/api/letter-number")
            .insert_header(bearer(Role::Prodi))
            .set_json(commit_body("SKA", "IF", INFORMATIKA_ID))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["sequence"], expected);
        assert_eq!(body["nomorSurat"], format_for_date(expected, "SKA", today));
        assert_eq!(body["issuedOn"], today.format("%Y-%m-%d").to_string());
    }

    let req = test::TestRequest::get()
        .uri(&preview_uri("SKA", "IF", INFORMATIKA_ID))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["candidateSequence"], 4);
}

#[actix_web::test]
async fn test_faculty_wide_letters_share_one_counter() {
    let app = init_app!(memory_state());

    let mut sequences = Vec::new();
    for (kode, id) in [("IF", INFORMATIKA_ID), ("SI", SISTEM_INFORMASI_ID)] {
        let req = test::TestRequest::post()
            .uri("/api/letter-number")
            .insert_header(bearer(Role::Dekan))
            .set_json(commit_body("SIP", kode, id))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        sequences.push(body["sequence"].as_u64().unwrap());
    }

    assert_eq!(sequences, vec![1, 2]);
}

#[actix_web::test]
async fn test_report_lists_every_combination() {
    let app = init_app!(memory_state());

    let req = test::TestRequest::post()
        .uri("/api/letter-number")
        .insert_header(bearer(Role::AdminUmum))
        .set_json(commit_body("SKA", "SI", SISTEM_INFORMASI_ID))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let req = test::TestRequest::get().uri("/api/letter-counters").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    let entries = body["report"]["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 3);

    let last = |t: &str, p: &str| {
        entries
            .iter()
            .find(|e| e["documentTypeCode"] == t && e["programCode"] == p)
            .map(|e| e["lastNumber"].as_u64().unwrap())
    };
    assert_eq!(last("SKA", "55202"), Some(0));
    assert_eq!(last("SKA", "57201"), Some(1));
    assert_eq!(last("SIP", "FAKULTAS"), Some(0));
    assert_eq!(body["report"]["failedEntries"], 0);
}

#[actix_web::test]
async fn test_store_outage_returns_generic_500() {
    let app = init_app!(state_with(Arc::new(UnavailableCounterStore)));

    let req = test::TestRequest::get().uri("/api/letter-counters").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "InternalServerError");
    assert!(!body["message"].as_str().unwrap().contains("connection refused"));

    let req = test::TestRequest::post()
        .uri("/api/letter-number")
        .insert_header(bearer(Role::Prodi))
        .set_json(commit_body("SKA", "IF", INFORMATIKA_ID))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Failed to issue letter number");
}

#[actix_web::test]
async fn test_statistics_require_program_id() {
    let app = init_app!(memory_state());

    let req = test::TestRequest::get()
        .uri("/api/letter-number/statistics")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["missing"], json!(["prodiId"]));

    let req = test::TestRequest::get()
        .uri(&format!("/api/letter-number/statistics?prodiId={}", INFORMATIKA_ID))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["statistics"]["programCode"], "55202");
    assert_eq!(body["statistics"]["totalIssued"], 0);
    assert_eq!(body["statistics"]["byMonth"].as_array().unwrap().len(), 12);
}

#[actix_web::test]
async fn test_reset_is_restricted_and_restarts_sequence() {
    let state: AppState = memory_state();
    let app = init_app!(state);
    let year = Local::now().date_naive().year();

    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri("/api/letter-number")
            .insert_header(bearer(Role::Prodi))
            .set_json(commit_body("SKA", "IF", INFORMATIKA_ID))
            .to_request();
        test::call_service(&app, req).await;
    }

    let reset_body = json!({ "jenisSurat": "SKA", "programCode": "55202", "year": year });

    let req = test::TestRequest::post()
        .uri("/api/letter-counters/reset")
        .insert_header(bearer(Role::Prodi))
        .set_json(reset_body.clone())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::post()
        .uri("/api/letter-counters/reset")
        .insert_header(bearer(Role::Dekan))
        .set_json(reset_body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["reset"]["previousLastNumber"], 2);

    let req = test::TestRequest::get()
        .uri(&preview_uri("SKA", "IF", INFORMATIKA_ID))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["candidateSequence"], 1);
}
