mod common;

use anyhow::Result;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;

use common::{maria, TestApp};

#[tokio::test]
async fn create_client_applies_defaults() -> Result<()> {
    let app = TestApp::new();

    // Client routes are open; no session needed.
    let res = app.request(Method::POST, "/clients", Some(maria()), None).await?;

    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body["message"], json!("Client created successfully"));
    assert_eq!(res.body["data"]["vipStatus"], json!(false));
    assert_eq!(res.body["data"]["preferredFragrances"], json!([]));
    assert_eq!(res.body["data"]["email"], json!("maria@x.com"));
    Ok(())
}

#[tokio::test]
async fn duplicate_email_is_case_insensitive() -> Result<()> {
    let app = TestApp::new();

    let first = app.request(Method::POST, "/clients", Some(maria()), None).await?;
    assert_eq!(first.status, StatusCode::CREATED);

    let mut again = maria();
    again["email"] = json!("  MARIA@X.COM ");
    let second = app.request(Method::POST, "/clients", Some(again), None).await?;
    assert_eq!(second.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        second.body,
        json!({"success": false, "message": "Email already exists"})
    );

    assert_eq!(app.get("/clients").await?.body["count"], json!(1));
    Ok(())
}

#[tokio::test]
async fn update_to_taken_email_is_rejected() -> Result<()> {
    let app = TestApp::new();
    app.request(Method::POST, "/clients", Some(maria()), None).await?;

    let mut other = maria();
    other["email"] = json!("ana@x.com");
    let created = app.request(Method::POST, "/clients", Some(other), None).await?;
    let uri = format!("/clients/{}", created.body["data"]["_id"].as_str().unwrap());

    let res = app
        .request(Method::PUT, &uri, Some(json!({"email": "maria@x.com"})), None)
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["message"], json!("Email already exists"));

    // Re-saving its own email is fine.
    let res = app
        .request(Method::PUT, &uri, Some(json!({"email": "ana@x.com", "vipStatus": true})), None)
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["message"], json!("Client updated successfully"));
    assert_eq!(res.body["data"]["vipStatus"], json!(true));
    Ok(())
}

#[tokio::test]
async fn invalid_fields_are_all_reported() -> Result<()> {
    let app = TestApp::new();
    let mut input = maria();
    input["phone"] = json!("555-123");
    input["email"] = json!("not-an-email");
    input["preferredFragrances"] = json!(["Citrus", "Gasoline"]);

    let res = app.request(Method::POST, "/clients", Some(input), None).await?;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["message"], json!("Validation error"));
    assert_eq!(
        res.body["errors"],
        json!([
            "Please provide a valid email address",
            "Phone number must be 10 digits",
            "`Gasoline` is not a valid enum value for path `preferredFragrances.1`."
        ])
    );
    Ok(())
}

#[tokio::test]
async fn update_and_delete_reject_malformed_ids() -> Result<()> {
    let app = TestApp::new();
    let expected = json!({"success": false, "message": "Invalid client ID format"});

    let res = app
        .request(Method::PUT, "/clients/zzz", Some(json!({"city": "Lima"})), None)
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body, expected);

    let res = app.request(Method::DELETE, "/clients/zzz", None, None).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body, expected);
    Ok(())
}

#[tokio::test]
async fn malformed_json_body_is_a_bad_request() -> Result<()> {
    let app = TestApp::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/clients")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"firstName\": "))?;

    let response = app.router.clone().oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await?.to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&bytes)?;
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["message"], json!("Invalid JSON body"));
    Ok(())
}

#[tokio::test]
async fn client_lifecycle() -> Result<()> {
    let app = TestApp::new();
    let created = app.request(Method::POST, "/clients", Some(maria()), None).await?;
    let uri = format!("/clients/{}", created.body["data"]["_id"].as_str().unwrap());

    let res = app.get(&uri).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["firstName"], json!("Maria"));

    let res = app.request(Method::DELETE, &uri, None, None).await?;
    assert_eq!(res.body["message"], json!("Client deleted successfully"));
    assert_eq!(res.body["data"], json!({}));

    let res = app.get(&uri).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body["message"], json!("Client not found"));

    let res = app.get("/clients/12345").await?;
    assert_eq!(res.body["message"], json!("Invalid client ID format"));
    Ok(())
}
