use actix_web::{HttpResponse, Result, web};
use validator::Validate;

use crate::errors::AppError;
use crate::middlewares::authmw::Principal;
use crate::models::qr_code::QrCodeRecordResponse;
use crate::state::app_state::AppState;
use crate::structs::qr_request::RecordRequest;

pub async fn create_record(
    app_state: web::Data<AppState>,
    principal: Principal,
    web::Json(req): web::Json<RecordRequest>,
) -> Result<HttpResponse> {
    req.validate().map_err(AppError::from)?;
    let record = app_state.records.create(principal.id(), req.into()).await?;
    Ok(HttpResponse::Created().json(QrCodeRecordResponse::from(record)))
}

/// The caller's own records, private and public, newest first.
pub async fn list_records(
    app_state: web::Data<AppState>,
    principal: Principal,
) -> Result<HttpResponse> {
    let records = app_state.records.list_for_owner(principal.id()).await?;
    let responses: Vec<QrCodeRecordResponse> =
        records.into_iter().map(QrCodeRecordResponse::from).collect();
    Ok(HttpResponse::Ok().json(responses))
}

pub async fn get_record(
    app_state: web::Data<AppState>,
    path: web::Path<String>,
    principal: Option<Principal>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    let caller = principal.as_ref().map(Principal::id);
    let record = app_state.records.get(&id, caller).await?;
    Ok(HttpResponse::Ok().json(QrCodeRecordResponse::from(record)))
}

pub async fn update_record(
    app_state: web::Data<AppState>,
    path: web::Path<String>,
    principal: Principal,
    web::Json(req): web::Json<RecordRequest>,
) -> Result<HttpResponse> {
    req.validate().map_err(AppError::from)?;
    let id = path.into_inner();
    if app_state
        .records
        .update(&id, principal.id(), req.into())
        .await?
    {
        Ok(HttpResponse::NoContent().finish())
    } else {
        Err(AppError::NotFound.into())
    }
}

pub async fn delete_record(
    app_state: web::Data<AppState>,
    path: web::Path<String>,
    principal: Principal,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    if app_state.records.delete(&id, principal.id()).await? {
        Ok(HttpResponse::NoContent().finish())
    } else {
        Err(AppError::NotFound.into())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{
        App,
        http::{StatusCode, header},
        test,
    };
    use serde_json::{Value, json};

    use super::*;
    use crate::db::memory::InMemoryRecordStore;
    use crate::qr::encoder::QrSymbolEncoder;
    use crate::routes::init_routes;
    use crate::utils::jwt::create_token;

    const SECRET: &str = "test-secret";

    macro_rules! app {
        () => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new(AppState::new(
                        Arc::new(QrSymbolEncoder),
                        Arc::new(InMemoryRecordStore::new()),
                    )))
                    .configure(|cfg| init_routes(cfg, SECRET)),
            )
            .await
        };
    }

    fn bearer(user: &str) -> (header::HeaderName, String) {
        let token = create_token(user, SECRET, chrono::Duration::hours(1)).unwrap();
        (header::AUTHORIZATION, format!("Bearer {}", token))
    }

    fn body(title: &str, is_public: bool) -> Value {
        json!({
            "title": title,
            "description": "Lobby network",
            "content": "data:image/png;base64,iVBORw0KGgo=",
            "type": "wifi",
            "isPublic": is_public,
            "ownerId": "mallory",
        })
    }

    #[actix_web::test]
    async fn create_then_read_by_visibility() {
        let app = app!();
        let req = test::TestRequest::post()
            .uri("/api/records")
            .insert_header(bearer("alice"))
            .set_json(body("Guest WiFi", false))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: Value = test::read_body_json(resp).await;
        assert_eq!(created["ownerId"], "alice");
        assert_eq!(created["isPublic"], false);
        let id = created["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::get()
            .uri(&format!("/api/records/{}", id))
            .insert_header(bearer("alice"))
            .to_request();
        let fetched: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(fetched, created);

        for caller in [Some("bob"), None] {
            let mut req = test::TestRequest::get().uri(&format!("/api/records/{}", id));
            if let Some(caller) = caller {
                req = req.insert_header(bearer(caller));
            }
            let resp = test::call_service(&app, req.to_request()).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        }
    }

    #[actix_web::test]
    async fn public_record_is_readable_anonymously() {
        let app = app!();
        let req = test::TestRequest::post()
            .uri("/api/records")
            .insert_header(bearer("alice"))
            .set_json(body("Menu", true))
            .to_request();
        let created: Value = test::call_and_read_body_json(&app, req).await;

        let req = test::TestRequest::get()
            .uri(&format!("/api/records/{}", created["id"].as_str().unwrap()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn owner_scoped_routes_need_identity() {
        let app = app!();
        let requests = [
            test::TestRequest::post()
                .uri("/api/records")
                .set_json(body("x", true))
                .to_request(),
            test::TestRequest::get().uri("/api/records").to_request(),
            test::TestRequest::put()
                .uri("/api/records/abc")
                .set_json(body("x", true))
                .to_request(),
            test::TestRequest::delete().uri("/api/records/abc").to_request(),
        ];
        for req in requests {
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[actix_web::test]
    async fn invalid_token_is_rejected() {
        let app = app!();
        let expired = create_token("alice", SECRET, chrono::Duration::hours(-2)).unwrap();
        let cases = [
            ("Bearer not-a-jwt".to_string(), "Invalid token"),
            (format!("Bearer {}", expired), "Invalid token"),
            ("Basic YWxpY2U6cHc=".to_string(), "Invalid authorization format"),
        ];
        for (value, message) in cases {
            let req = test::TestRequest::get()
                .uri("/api/records")
                .insert_header((header::AUTHORIZATION, value))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
            let json: Value = test::read_body_json(resp).await;
            assert_eq!(json["error"], "Unauthenticated");
            assert_eq!(json["message"], message);
        }

        // Anonymous-friendly routes still refuse a bad token.
        let req = test::TestRequest::post()
            .uri("/api/generate/text")
            .insert_header((header::AUTHORIZATION, "Bearer not-a-jwt"))
            .set_json(json!({"text": "hi"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn update_and_delete_follow_ownership() {
        let app = app!();
        let req = test::TestRequest::post()
            .uri("/api/records")
            .insert_header(bearer("alice"))
            .set_json(body("Guest WiFi", false))
            .to_request();
        let created: Value = test::call_and_read_body_json(&app, req).await;
        let uri = format!("/api/records/{}", created["id"].as_str().unwrap());

        let req = test::TestRequest::put()
            .uri(&uri)
            .insert_header(bearer("bob"))
            .set_json(body("Hijacked", true))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::delete()
            .uri(&uri)
            .insert_header(bearer("bob"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::put()
            .uri(&uri)
            .insert_header(bearer("alice"))
            .set_json(body("Guest WiFi 2", true))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

        let req = test::TestRequest::get().uri(&uri).to_request();
        let fetched: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(fetched["title"], "Guest WiFi 2");
        assert_eq!(fetched["isPublic"], true);
        assert!(fetched["updatedAt"].is_i64());

        let req = test::TestRequest::delete()
            .uri(&uri)
            .insert_header(bearer("alice"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

        let req = test::TestRequest::get()
            .uri(&uri)
            .insert_header(bearer("alice"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn list_returns_only_callers_records() {
        let app = app!();
        for (user, title) in [("alice", "a1"), ("bob", "b1"), ("alice", "a2")] {
            let req = test::TestRequest::post()
                .uri("/api/records")
                .insert_header(bearer(user))
                .set_json(body(title, false))
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
        }

        let req = test::TestRequest::get()
            .uri("/api/records")
            .insert_header(bearer("alice"))
            .to_request();
        let listed: Vec<Value> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().all(|r| r["ownerId"] == "alice"));
    }

    #[actix_web::test]
    async fn record_body_is_validated() {
        let app = app!();
        let req = test::TestRequest::post()
            .uri("/api/records")
            .insert_header(bearer("alice"))
            .set_json(body(&"t".repeat(26), false))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json: Value = test::read_body_json(resp).await;
        assert_eq!(json["error"], "ValidationError");

        let req = test::TestRequest::post()
            .uri("/api/records")
            .insert_header(bearer("alice"))
            .set_json(json!({"title": "t"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
