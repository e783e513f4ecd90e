//! HTTP client tests against a mock license API.

use licdash_core::ports::LicenseSource;
use licdash_core::{
    Error, LicenseKey, LicensePatch, LicenseStatus, LicenseType, NewLicense, Product,
};
use licdash_tests::{init_test_logging, mock_api_client};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn new_license(client_id: &str) -> NewLicense {
    NewLicense {
        client_id: client_id.to_string(),
        expiry_date: "2026-10-19T00:00:00Z".parse().unwrap(),
        email: "ops@acme.io".to_string(),
        application: Product::Nms,
        license_type: LicenseType::Trial,
        client_email: "ops@acme.io".to_string(),
        identiqa_name: "Dana".to_string(),
        identiqa_email: "dana@identiqa.io".to_string(),
    }
}

#[tokio::test]
async fn test_list_licenses() {
    init_test_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/backend_api/all-licenses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"licenseKey": "A", "clientId": "acme", "application": "NMS"},
            {"licenseKey": "B", "clientId": "globex", "product": "VAPT", "totalHosts": "lots"},
            "not a record"
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = mock_api_client(&server);
    let records = client.list_licenses().await.expect("list");

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].client_key(), "acme");
    assert_eq!(records[1].product(), Some(Product::Vapt));
    assert_eq!(records[1].total_hosts, None);
}

#[tokio::test]
async fn test_list_null_body_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/backend_api/all-licenses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::Value::Null))
        .mount(&server)
        .await;

    let records = mock_api_client(&server).list_licenses().await.expect("list");
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_list_server_error_is_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/backend_api/all-licenses"))
        .respond_with(ResponseTemplate::new(502).set_body_json(json!({"message": "bad gateway"})))
        .mount(&server)
        .await;

    let err = mock_api_client(&server).list_licenses().await.unwrap_err();
    match err {
        Error::Fetch(message) => assert_eq!(message, "bad gateway"),
        other => panic!("expected fetch error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_list_unreachable_is_fetch_error() {
    let server = MockServer::start().await;
    let client = mock_api_client(&server);
    drop(server);

    assert!(matches!(client.list_licenses().await, Err(Error::Fetch(_))));
}

#[tokio::test]
async fn test_create_license() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/backend_api/generate-license"))
        .and(body_json(json!({
            "clientId": "acme",
            "expiryDate": "2026-10-19T00:00:00Z",
            "email": "ops@acme.io",
            "application": "NMS",
            "licenseType": "trial",
            "clientEmail": "ops@acme.io",
            "identiqaName": "Dana",
            "identiqaEmail": "dana@identiqa.io"
        })))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({"licenseKey": "NEW-KEY", "instanceId": "i-77"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let created = mock_api_client(&server)
        .create_license(&new_license("acme"))
        .await
        .expect("create");
    assert_eq!(created.license_key, LicenseKey::new("NEW-KEY"));
    assert_eq!(created.instance_id.as_deref(), Some("i-77"));
}

#[tokio::test]
async fn test_create_without_client_id_never_hits_the_api() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let err = mock_api_client(&server)
        .create_license(&new_license(""))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn test_create_rejected_surfaces_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/backend_api/generate-license"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"message": "clientId already exists"})),
        )
        .mount(&server)
        .await;

    let err = mock_api_client(&server)
        .create_license(&new_license("acme"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "clientId already exists");
}

#[tokio::test]
async fn test_update_license() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/backend_api/update-license/LIC-1"))
        .and(body_json(json!({
            "status": "inactive",
            "expiryDate": "2027-01-31",
            "licenseType": "paid"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "License updated"})))
        .expect(1)
        .mount(&server)
        .await;

    let patch = LicensePatch {
        status: Some(LicenseStatus::Inactive),
        expiry_date: Some("2027-01-31".to_string()),
        license_type: Some(LicenseType::Paid),
    };
    let updated = mock_api_client(&server)
        .update_license(&LicenseKey::new("LIC-1"), &patch)
        .await
        .expect("update");
    assert_eq!(updated, None);
}

#[tokio::test]
async fn test_update_echoes_record() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/backend_api/update-license/LIC-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "licenseKey": "LIC-1",
            "status": "expired",
            "clientId": "acme"
        })))
        .mount(&server)
        .await;

    let patch = LicensePatch {
        status: Some(LicenseStatus::Expired),
        ..Default::default()
    };
    let updated = mock_api_client(&server)
        .update_license(&LicenseKey::new("LIC-1"), &patch)
        .await
        .expect("update")
        .expect("echoed record");
    assert_eq!(updated.status(), Some(LicenseStatus::Expired));
}

#[tokio::test]
async fn test_update_unknown_key() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/backend_api/update-license/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = mock_api_client(&server)
        .update_license(&LicenseKey::new("missing"), &LicensePatch::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::LicenseNotFound(key) if key == "missing"));
}

#[tokio::test]
async fn test_update_server_error_is_update_error() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = mock_api_client(&server)
        .update_license(&LicenseKey::new("LIC-1"), &LicensePatch::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Update(_)));
}

#[tokio::test]
async fn test_delete_license() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/backend_api/delete-license/LIC-9"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/backend_api/delete-license/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = mock_api_client(&server);
    client
        .delete_license(&LicenseKey::new("LIC-9"))
        .await
        .expect("delete");
    assert!(matches!(
        client.delete_license(&LicenseKey::new("gone")).await,
        Err(Error::LicenseNotFound(_))
    ));
}

#[tokio::test]
async fn test_check_license() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/backend_api/check-license/LIC-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"valid": true})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/backend_api/check-license/LIC-2"))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({"error": "license revoked"})),
        )
        .mount(&server)
        .await;

    let client = mock_api_client(&server);
    let result = client
        .check_license(&LicenseKey::new("LIC-1"))
        .await
        .expect("check");
    assert_eq!(result, json!({"valid": true}));

    match client.check_license(&LicenseKey::new("LIC-2")).await {
        Err(Error::Api { status, message }) => {
            assert_eq!(status, 403);
            assert_eq!(message, "license revoked");
        }
        other => panic!("expected API error, got {other:?}"),
    }
}
