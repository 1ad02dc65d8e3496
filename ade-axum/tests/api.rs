//! Integration tests for the `/api` routes

use std::sync::Arc;

use ade::AdeBuilder;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::{Datelike, Local, Months, NaiveDate};
use http_body_util::BodyExt; // for .collect().await
use serde_json::{Value, json};
use tower::util::ServiceExt; // for `oneshot`

const ADMIN: &str = "Administrateur";
const STANDARD: &str = "Standard";

async fn test_app() -> Router {
    let ade = AdeBuilder::new()
        .with_sqlite("sqlite::memory:")
        .await
        .expect("Failed to connect")
        .apply_migrations(true)
        .build()
        .await
        .expect("Failed to build");

    ade.bootstrap_admin("admin", "secret123")
        .await
        .expect("Failed to bootstrap admin");

    ade_axum::create_router(Arc::new(ade))
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    role: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, axum::http::HeaderMap, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-forwarded-for", "203.0.113.10");
    if let Some(role) = role {
        builder = builder.header("x-user-role", role);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, headers, json)
}

/// Creates a centre, an agence and the ORD category; returns the agence id.
async fn seed(app: &Router) -> i64 {
    let (status, _, centre) = send(
        app,
        "POST",
        "/api/centres",
        Some(ADMIN),
        Some(json!({ "nomCentre": "Centre Oran" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _, agence) = send(
        app,
        "POST",
        "/api/agences",
        Some(ADMIN),
        Some(json!({ "nomAgence": "Agence Es Senia", "centreId": centre["id"] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _, _) = send(
        app,
        "POST",
        "/api/categories",
        Some(ADMIN),
        Some(json!({ "codeType": "ORD", "libelle": "Ordinaire" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    agence["id"].as_i64().unwrap()
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap()
}

#[tokio::test]
async fn test_health() {
    let app = test_app().await;
    let (status, _, body) = send(&app, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_login_success_hides_password() {
    let app = test_app().await;
    let (status, _, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "username": "admin", "password": "secret123" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Connexion réussie");
    assert_eq!(body["user"]["nomUtilisateur"], "admin");
    assert_eq!(body["user"]["role"], "Administrateur");
    assert!(body["user"].get("motDePasse").is_none());
    assert!(body["user"].get("passwordHash").is_none());
}

#[tokio::test]
async fn test_login_rate_limiting() {
    let app = test_app().await;
    let wrong = json!({ "username": "admin", "password": "wrong-password" });

    let (status, _, body) = send(&app, "POST", "/api/auth/login", None, Some(wrong.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["remainingAttempts"], 2);

    let (status, _, body) = send(&app, "POST", "/api/auth/login", None, Some(wrong.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["remainingAttempts"], 1);

    let (status, headers, body) =
        send(&app, "POST", "/api/auth/login", None, Some(wrong.clone())).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    let retry_after: i64 = headers[header::RETRY_AFTER]
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!(retry_after > 0 && retry_after <= 15 * 60);
    assert_eq!(body["retryAfterSec"], retry_after);

    // Blocked even with the right password
    let (status, _, _) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "username": "admin", "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_login_requires_fields() {
    let app = test_app().await;
    let (status, _, _) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "username": "  ", "password": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_role_header_is_required() {
    let app = test_app().await;

    let (status, _, body) = send(&app, "GET", "/api/centres", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 401);

    let (status, _, _) = send(&app, "GET", "/api/centres", Some("administrateur"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = send(&app, "GET", "/api/centres", Some(STANDARD), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_standard_role_cannot_manage_reference_data() {
    let app = test_app().await;

    let (status, _, _) = send(
        &app,
        "POST",
        "/api/centres",
        Some(STANDARD),
        Some(json!({ "nomCentre": "Centre Blida" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, _) = send(&app, "GET", "/api/users", Some(STANDARD), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_reference_data_crud() {
    let app = test_app().await;
    let agence_id = seed(&app).await;

    let (status, _, commune) = send(
        &app,
        "POST",
        "/api/communes",
        Some(ADMIN),
        Some(json!({ "nomCommune": "Es Senia", "agenceId": agence_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _, communes) = send(
        &app,
        "GET",
        &format!("/api/agences/{agence_id}/communes"),
        Some(STANDARD),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(communes.as_array().unwrap().len(), 1);

    let (status, _, stats) = send(&app, "GET", "/api/agences/stats", Some(STANDARD), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats[0]["nombreAgences"], 1);

    // The agence still has a commune
    let (status, _, _) = send(
        &app,
        "DELETE",
        &format!("/api/agences/{agence_id}"),
        Some(ADMIN),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _, body) = send(
        &app,
        "DELETE",
        &format!("/api/communes/{}", commune["id"]),
        Some(ADMIN),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].is_string());

    let (status, _, _) = send(&app, "GET", "/api/communes/9999", Some(ADMIN), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, categorie) = send(
        &app,
        "PUT",
        "/api/categories/ORD",
        Some(ADMIN),
        Some(json!({ "libelle": "Clients ordinaires" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(categorie["libelle"], "Clients ordinaires");
}

#[tokio::test]
async fn test_user_management() {
    let app = test_app().await;
    let agence_id = seed(&app).await;

    let new_user = json!({
        "nomUtilisateur": "yacine",
        "email": "yacine@ade.dz",
        "role": "Standard",
        "agenceId": agence_id,
        "motDePasse": "motdepasse"
    });
    let (status, _, user) = send(&app, "POST", "/api/users", Some(ADMIN), Some(new_user.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(user["actif"], true);
    assert!(user.get("motDePasse").is_none());

    let (status, _, _) = send(&app, "POST", "/api/users", Some(ADMIN), Some(new_user)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _, _) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "username": "yacine", "password": "motdepasse" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_objective_temporal_rules() {
    let app = test_app().await;
    let agence_id = seed(&app).await;
    let today = Local::now().date_naive();

    let start = first_of_month(today);
    let (status, _, objective) = send(
        &app,
        "POST",
        "/api/objectives",
        Some(ADMIN),
        Some(json!({
            "agenceId": agence_id,
            "titre": "Objectif du mois",
            "dateDebut": start.to_string(),
            "dateFin": start.to_string(),
            "objRelances": 10
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(objective["objRelances"], 10);

    let too_old = first_of_month(today.checked_sub_months(Months::new(6)).unwrap());
    let (status, _, body) = send(
        &app,
        "POST",
        "/api/objectives",
        Some(ADMIN),
        Some(json!({
            "agenceId": agence_id,
            "dateDebut": too_old.to_string(),
            "dateFin": too_old.to_string()
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Règles temporelles violées");
    assert_eq!(body["errors"].as_array().unwrap().len(), 1);

    let (status, _, _) = send(
        &app,
        "POST",
        "/api/objectives",
        Some(STANDARD),
        Some(json!({
            "agenceId": agence_id,
            "dateDebut": start.to_string(),
            "dateFin": start.to_string()
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, progress) = send(
        &app,
        "GET",
        &format!("/api/objectives/{}/progress", objective["id"]),
        Some(STANDARD),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(progress["indicateurs"].as_array().unwrap().len(), 5);

    let (status, _, _) = send(
        &app,
        "GET",
        "/api/objectives?mois=13&annee=2025",
        Some(STANDARD),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_objective_update_respects_temporal_rules() {
    let app = test_app().await;
    let agence_id = seed(&app).await;
    let today = Local::now().date_naive();
    let start = first_of_month(today);

    let (status, _, objective) = send(
        &app,
        "POST",
        "/api/objectives",
        Some(ADMIN),
        Some(json!({
            "agenceId": agence_id,
            "dateDebut": start.to_string(),
            "dateFin": start.to_string()
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let uri = format!("/api/objectives/{}", objective["id"]);

    let four_months_back = first_of_month(today.checked_sub_months(Months::new(4)).unwrap());
    let (status, _, body) = send(
        &app,
        "PUT",
        &uri,
        Some(ADMIN),
        Some(json!({
            "agenceId": agence_id,
            "dateDebut": four_months_back.to_string(),
            "dateFin": four_months_back.to_string()
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Règles temporelles violées");
    assert_eq!(body["errors"].as_array().unwrap().len(), 1);

    let (status, _, stored) = send(&app, "GET", &uri, Some(ADMIN), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored["dateDebut"], start.to_string());
}

#[tokio::test]
async fn test_objective_filter_rejects_out_of_range_year() {
    let app = test_app().await;

    for query in ["annee=300000", "annee=2147483647&mois=12", "annee=0"] {
        let (status, _, _) = send(
            &app,
            "GET",
            &format!("/api/objectives?{query}"),
            Some(STANDARD),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "query {query}");
    }
}

#[tokio::test]
async fn test_kpi_lifecycle() {
    let app = test_app().await;
    let agence_id = seed(&app).await;
    let today = Local::now().date_naive();

    let (status, _, record) = send(
        &app,
        "POST",
        "/api/kpis",
        Some(STANDARD),
        Some(json!({
            "dateKpi": today.to_string(),
            "agenceId": agence_id,
            "codeType": "ORD",
            "nbCoupures": 3,
            "mtCoupures": 4500.0
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(record["nbCoupures"], 3);

    let path = format!("/api/kpis/{today}/{agence_id}/ORD");
    let (status, _, updated) = send(
        &app,
        "PUT",
        &path,
        Some(STANDARD),
        Some(json!({ "nbCoupures": 5, "mtCoupures": 7000.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["nbCoupures"], 5);

    let (status, _, summary) = send(
        &app,
        "GET",
        &format!("/api/kpis/summary?agenceId={agence_id}"),
        Some(STANDARD),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["nombreLignes"], 1);
    assert_eq!(summary["nbCoupures"], 5);

    let (status, _, _) = send(&app, "DELETE", &path, Some(STANDARD), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, _) = send(&app, "DELETE", &path, Some(ADMIN), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = send(&app, "GET", &path, Some(ADMIN), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
