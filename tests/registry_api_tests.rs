mod common;

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use serde_json::{json, Value};
use siakad_surat_server::auth::Role;
use siakad_surat_server::configure_api;

use common::{bearer, memory_state, INFORMATIKA_ID};

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

#[actix_web::test]
async fn test_list_document_types_and_programs() {
    let app = init_app!(memory_state());

    let req = test::TestRequest::get().uri("/api/document-types").to_request();
    let types: Value = test::call_and_read_body_json(&app, req).await;
    let codes: Vec<&str> = types
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["code"].as_str().unwrap())
        .collect();
    assert_eq!(codes, vec!["SIP", "SKA"]);
    assert_eq!(types[1]["approvalRole"], "prodi");
    assert_eq!(types[1]["additionalFields"][1]["kind"], "select");

    let req = test::TestRequest::get().uri("/api/programs").to_request();
    let programs: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(programs[0]["id"], INFORMATIKA_ID);
    assert_eq!(programs[0]["shortCode"], "IF");
}

#[actix_web::test]
async fn test_get_document_type_is_case_insensitive() {
    let app = init_app!(memory_state());

    let req = test::TestRequest::get().uri("/api/document-types/ska").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri("/api/document-types/XYZ").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_validate_fields_reports_each_problem() {
    let app = init_app!(memory_state());

    let req = test::TestRequest::post()
        .uri("/api/document-types/SKA/validate-fields")
        .set_json(json!({ "semester": "5", "keperluan": "Beasiswa" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "valid": true }));

    let req = test::TestRequest::post()
        .uri("/api/document-types/SKA/validate-fields")
        .set_json(json!({ "semester": "lima", "keperluan": "Liburan" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "ValidationError");
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(
        fields,
        vec!["additionalFields.semester", "additionalFields.keperluan"]
    );
}

#[actix_web::test]
async fn test_upsert_document_type_requires_admin_and_refreshes_listing() {
    let app = init_app!(memory_state());
    let definition = json!({
        "title": "Surat Keterangan Lulus",
        "approvalRole": "dekan",
        "estimatedDays": 7,
        "requiredDocuments": ["Transkrip nilai"],
        "additionalFields": [
            { "name": "tanggalSidang", "label": "Tanggal sidang", "kind": "date", "required": true }
        ]
    });

    let req = test::TestRequest::put()
        .uri("/api/document-types/skl")
        .insert_header(bearer(Role::Prodi))
        .set_json(definition.clone())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::put()
        .uri("/api/document-types/skl")
        .insert_header(bearer(Role::AdminUmum))
        .set_json(definition)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let saved: Value = test::read_body_json(resp).await;
    assert_eq!(saved["code"], "SKL");
    assert_eq!(saved["active"], true);

    let req = test::TestRequest::get().uri("/api/document-types").to_request();
    let types: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(types.as_array().unwrap().len(), 3);
}

#[actix_web::test]
async fn test_upsert_rejects_invalid_definition() {
    let app = init_app!(memory_state());

    let req = test::TestRequest::put()
        .uri("/api/document-types/SKB")
        .insert_header(bearer(Role::Dekan))
        .set_json(json!({
            "title": "",
            "approvalRole": "prodi",
            "estimatedDays": 2,
            "additionalFields": [
                { "name": "jenis", "label": "Jenis", "kind": "select", "required": true }
            ]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["errors"].as_array().unwrap().len(), 2);
}
