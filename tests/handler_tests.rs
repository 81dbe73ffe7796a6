use actix_web::{http::StatusCode, test, web, App};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::json;

use hunt_permit_server::blanks::engine::{BlankDocument, BlankFont};
use hunt_permit_server::blanks::handlers::{self, BlanksState};
use hunt_permit_server::store::ConfigStore;

fn seeded_store(dir: &tempfile::TempDir) -> ConfigStore {
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        json!({
            "organizationName": "ООО «Охотхозяйство»",
            "huntingPlace": "Лесной массив №3",
            "issuedByName": "Петров Пётр Петрович",
            "huntType": "любительская",
            "jobTitle": "егерь",
            "savedGroups": [{
                "id": "g1",
                "name": "Птица осень",
                "animals": ["Гусь", "Утка"],
                "dateFrom": "2025-09-15",
                "dateTo": "2025-12-31",
                "dailyLimit": "2",
                "seasonLimit": "",
                "blankType": "Pink"
            }],
            "voucherNumber": "0012"
        })
        .to_string(),
    )
    .unwrap();
    ConfigStore::open(path).unwrap()
}

fn background_base64() -> String {
    let font = BlankFont::load().unwrap();
    let mut doc = BlankDocument::new(&font);
    doc.add_page(841.89, 595.28);
    BASE64.encode(doc.save().unwrap())
}

macro_rules! app {
    ($dir:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(BlanksState::new(seeded_store($dir)).unwrap()))
                .app_data(web::JsonConfig::default().limit(10 * 1024 * 1024))
                .service(web::scope("/api").configure(handlers::config)),
        )
        .await
    };
}

#[actix_web::test]
async fn test_get_groups_returns_seeded_group() {
    let dir = tempfile::tempdir().unwrap();
    let app = app!(&dir);

    let req = test::TestRequest::get().uri("/api/groups").to_request();
    let groups: Vec<serde_json::Value> = test::call_and_read_body_json(&app, req).await;

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0]["name"], "Птица осень");
    assert_eq!(groups[0]["blankType"], "Pink");
}

#[actix_web::test]
async fn test_expand_group_by_name() {
    let dir = tempfile::tempdir().unwrap();
    let app = app!(&dir);

    let req = test::TestRequest::post()
        .uri("/api/groups/expand")
        .set_json(json!({"input": "птица осень"}))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["variant"], "Pink");
    assert_eq!(body["rows"].as_array().unwrap().len(), 2);
    assert_eq!(body["rows"][0]["resource"], "Гусь");
    assert_eq!(body["rows"][0]["seasonLimit"], "б/о");
}

#[actix_web::test]
async fn test_expand_oversized_list_conflicts_until_confirmed() {
    let dir = tempfile::tempdir().unwrap();
    let app = app!(&dir);
    let input = (1..=12).map(|i| format!("Вид {i}")).collect::<Vec<_>>().join(",");

    let req = test::TestRequest::post()
        .uri("/api/groups/expand")
        .set_json(json!({"input": &input}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::post()
        .uri("/api/groups/expand")
        .set_json(json!({"input": input, "confirmTruncation": true}))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["rows"].as_array().unwrap().len(), 10);
}

#[actix_web::test]
async fn test_expand_empty_input_is_a_noop() {
    let dir = tempfile::tempdir().unwrap();
    let app = app!(&dir);

    let req = test::TestRequest::post()
        .uri("/api/groups/expand")
        .set_json(json!({"input": "  "}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

#[actix_web::test]
async fn test_expand_delimiter_soup_is_unprocessable() {
    let dir = tempfile::tempdir().unwrap();
    let app = app!(&dir);

    let req = test::TestRequest::post()
        .uri("/api/groups/expand")
        .set_json(json!({"input": ",,; \n ,"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn test_render_permit_returns_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let app = app!(&dir);

    let req = test::TestRequest::post()
        .uri("/api/blanks/permit")
        .set_json(json!({
            "hunter": {
                "fullName": "Иванов Иван Иванович",
                "series": "78",
                "number": "014843",
                "issueDate": "2022-10-03"
            },
            "form": {
                "resources": [{"resource": "Гусь", "dateFrom": "2025-09-15", "dateTo": "2026-02-28"}]
            },
            "variant": "Yellow"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("Content-Type").unwrap(),
        "application/pdf"
    );
    let disposition = resp
        .headers()
        .get("Content-Disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("filename*=UTF-8''"));

    let body = test::read_body(resp).await;
    assert!(body.starts_with(b"%PDF"));
}

#[actix_web::test]
async fn test_render_voucher_advances_counter_after_success() {
    let dir = tempfile::tempdir().unwrap();
    let store_path = dir.path().join("config.json");
    let app = app!(&dir);

    let req = test::TestRequest::post()
        .uri("/api/blanks/voucher")
        .set_json(json!({
            "hunter": {"fullName": "Иванов Иван Иванович", "series": "78", "number": "014843"},
            "form": {"resources": [{"resource": "Гусь", "dateFrom": "2025-09-15", "dateTo": "2026-02-28"}]},
            "backgroundPdfBase64": background_base64()
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    assert!(body.starts_with(b"%PDF"));

    let reopened = ConfigStore::open(store_path).unwrap();
    assert_eq!(reopened.voucher_number(), "0013");
}

#[actix_web::test]
async fn test_render_voucher_manual_number_skips_counter() {
    let dir = tempfile::tempdir().unwrap();
    let store_path = dir.path().join("config.json");
    let app = app!(&dir);

    let req = test::TestRequest::post()
        .uri("/api/blanks/voucher")
        .set_json(json!({
            "hunter": {"fullName": "Иванов Иван Иванович", "series": "78", "number": "014843"},
            "form": {"voucherNumber": "7777", "resources": []},
            "backgroundPdfBase64": background_base64()
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let reopened = ConfigStore::open(store_path).unwrap();
    assert_eq!(reopened.voucher_number(), "0012");
}

#[actix_web::test]
async fn test_render_voucher_rejects_bad_base64() {
    let dir = tempfile::tempdir().unwrap();
    let app = app!(&dir);

    let req = test::TestRequest::post()
        .uri("/api/blanks/voucher")
        .set_json(json!({
            "hunter": {"fullName": "Иванов", "series": "78", "number": "1"},
            "form": {},
            "backgroundPdfBase64": "@@@not base64@@@"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_print_settings_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let app = app!(&dir);

    let req = test::TestRequest::get().uri("/api/config/print").to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["organizationName"], "ООО «Охотхозяйство»");
    assert_eq!(body["voucherNumber"], "0012");
    assert_eq!(body["savedGroups"].as_array().unwrap().len(), 1);
}
