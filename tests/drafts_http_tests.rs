
use actix_web::{http::{header, StatusCode}, test};
use portfolio_admin::constants::MAX_IMAGE_BYTES;
use serde_json::{json, Value};
use test_utils::*;

fn page_form(name: &str, features: &str, image: Option<&str>) -> (String, Vec<u8>) {
    let mut parts = vec![Part::Json("metadata", json!({"name": name, "features": features}))];
    if let Some(file_name) = image {
        parts.push(Part::File { name: "image", file_name, bytes: png_bytes() });
    }
    multipart(parts)
}

#[actix_rt::test]
async fn draft_flow_publishes_a_project() {
    let ctx = TestContext::new().await;
    let bearer = format!("Bearer {}", ctx.admin_token().await);
    let app = init_app!(ctx.state);

    let req = test::TestRequest::post()
        .uri("/admin/drafts")
        .insert_header((header::AUTHORIZATION, bearer.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let draft: Value = test::read_body_json(resp).await;
    let draft_id = draft["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::patch()
        .uri(&format!("/admin/drafts/{draft_id}"))
        .insert_header((header::AUTHORIZATION, bearer.clone()))
        .set_json(json!({"title": "X", "description": "Portfolio site", "date": "2024-05-01"}))
        .to_request();
    let draft: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(draft["title"], "X");

    for tag in ["Rust", "  ", "Actix"] {
        let req = test::TestRequest::post()
            .uri(&format!("/admin/drafts/{draft_id}/technologies"))
            .insert_header((header::AUTHORIZATION, bearer.clone()))
            .set_json(json!({"name": tag}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let (content_type, body) = page_form("Home", "Landing page", Some("home.png"));
    let req = test::TestRequest::post()
        .uri(&format!("/admin/drafts/{draft_id}/pages"))
        .insert_header((header::AUTHORIZATION, bearer.clone()))
        .insert_header((header::CONTENT_TYPE, content_type))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let (content_type, body) = page_form("Contact", "Form", None);
    let req = test::TestRequest::post()
        .uri(&format!("/admin/drafts/{draft_id}/pages"))
        .insert_header((header::AUTHORIZATION, bearer.clone()))
        .insert_header((header::CONTENT_TYPE, content_type))
        .set_payload(body)
        .to_request();
    let saved: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(saved["draft"]["technologies"], json!(["Rust", "Actix"]));
    assert_eq!(saved["draft"]["pages"].as_array().unwrap().len(), 2);

    let req = test::TestRequest::post()
        .uri(&format!("/admin/drafts/{draft_id}/submit"))
        .insert_header((header::AUTHORIZATION, bearer.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let submitted: Value = test::read_body_json(resp).await;
    let project_id = submitted["id"].as_str().unwrap().to_string();
    assert_eq!(submitted["created"], true);
    assert!(ctx.state.drafts.is_empty());

    let req = test::TestRequest::get().uri("/api/v1/projects").to_request();
    let cards: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(cards[0]["title"], "X");
    assert_eq!(cards[0]["pageCount"], 2);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/projects/{project_id}"))
        .to_request();
    let project: Value = test::call_and_read_body_json(&app, req).await;
    let home_image = project["pages"][0]["imageUrl"].as_str().unwrap().to_string();
    assert!(home_image.starts_with(&format!("{MEDIA_BASE_URL}/pages/")));
    assert!(project["pages"][1].get("imageUrl").is_none());

    let media_path = home_image.trim_start_matches("http://localhost");
    let req = test::TestRequest::get().uri(media_path).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "image/png");
}

#[actix_rt::test]
async fn submitting_without_pages_is_a_validation_error() {
    let ctx = TestContext::new().await;
    let bearer = format!("Bearer {}", ctx.admin_token().await);
    let app = init_app!(ctx.state);

    let req = test::TestRequest::post()
        .uri("/admin/drafts")
        .insert_header((header::AUTHORIZATION, bearer.clone()))
        .to_request();
    let draft: Value = test::call_and_read_body_json(&app, req).await;
    let draft_id = draft["id"].as_str().unwrap();

    let req = test::TestRequest::post()
        .uri(&format!("/admin/drafts/{draft_id}/submit"))
        .insert_header((header::AUTHORIZATION, bearer.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|d| d["field"].as_str())
        .collect();
    assert_eq!(fields, ["pages"]);
    assert_eq!(ctx.state.drafts.len(), 1);
}

#[actix_rt::test]
async fn removing_a_missing_technology_is_rejected() {
    let ctx = TestContext::new().await;
    let bearer = format!("Bearer {}", ctx.admin_token().await);
    let app = init_app!(ctx.state);

    let draft_id = ctx.state.drafts.open_new().id();

    let req = test::TestRequest::delete()
        .uri(&format!("/admin/drafts/{draft_id}/technologies/4"))
        .insert_header((header::AUTHORIZATION, bearer))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn editing_a_page_without_a_new_image_keeps_the_pending_one() {
    let ctx = TestContext::new().await;
    let bearer = format!("Bearer {}", ctx.admin_token().await);
    let app = init_app!(ctx.state);

    let draft_id = ctx.state.drafts.open_new().id();

    let (content_type, body) = page_form("Home", "Hero", Some("home.png"));
    let req = test::TestRequest::post()
        .uri(&format!("/admin/drafts/{draft_id}/pages"))
        .insert_header((header::AUTHORIZATION, bearer.clone()))
        .insert_header((header::CONTENT_TYPE, content_type))
        .set_payload(body)
        .to_request();
    let saved: Value = test::call_and_read_body_json(&app, req).await;
    let page_id = saved["pageId"].as_str().unwrap().to_string();

    let (content_type, body) = page_form("Home", "Hero and footer", None);
    let req = test::TestRequest::put()
        .uri(&format!("/admin/drafts/{draft_id}/pages/{page_id}"))
        .insert_header((header::AUTHORIZATION, bearer))
        .insert_header((header::CONTENT_TYPE, content_type))
        .set_payload(body)
        .to_request();
    let saved: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(saved["page"]["features"], "Hero and footer");
    assert_eq!(saved["page"]["image"]["kind"], "pending");
}

#[actix_rt::test]
async fn non_image_upload_is_rejected() {
    let ctx = TestContext::new().await;
    let bearer = format!("Bearer {}", ctx.admin_token().await);
    let app = init_app!(ctx.state);

    let draft_id = ctx.state.drafts.open_new().id();
    let (content_type, body) = multipart(vec![Part::File {
        name: "image",
        file_name: "notes.txt",
        bytes: b"plain text".to_vec(),
    }]);

    let req = test::TestRequest::put()
        .uri(&format!("/admin/drafts/{draft_id}/cover"))
        .insert_header((header::AUTHORIZATION, bearer))
        .insert_header((header::CONTENT_TYPE, content_type))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let draft = ctx.state.drafts.get(&draft_id.to_string()).unwrap();
    assert!(!draft.cover().is_pending());
}

#[actix_rt::test]
async fn oversized_cover_is_an_image_validation_error() {
    let ctx = TestContext::new().await;
    let bearer = format!("Bearer {}", ctx.admin_token().await);
    let app = init_app!(ctx.state);

    let draft_id = ctx.state.drafts.open_new().id();
    let mut bytes = png_bytes();
    bytes.resize(MAX_IMAGE_BYTES + 1, 0);
    let (content_type, body) = multipart(vec![Part::File {
        name: "image",
        file_name: "huge.png",
        bytes,
    }]);

    let req = test::TestRequest::put()
        .uri(&format!("/admin/drafts/{draft_id}/cover"))
        .insert_header((header::AUTHORIZATION, bearer))
        .insert_header((header::CONTENT_TYPE, content_type))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["details"][0]["field"], "image");
}

#[actix_rt::test]
async fn unknown_draft_is_not_found() {
    let ctx = TestContext::new().await;
    let bearer = format!("Bearer {}", ctx.admin_token().await);
    let app = init_app!(ctx.state);

    let req = test::TestRequest::get()
        .uri(&format!("/admin/drafts/{}", uuid::Uuid::new_v4()))
        .insert_header((header::AUTHORIZATION, bearer))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn public_pages_render_without_a_session() {
    let ctx = TestContext::new().await;
    let app = init_app!(ctx.state);

    let req = test::TestRequest::get().uri("/about").to_request();
    let about: Value = test::call_and_read_body_json(&app, req).await;
    assert!(about["html"].as_str().unwrap().contains("<"));

    let req = test::TestRequest::get().uri("/login").to_request();
    let login: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(login["submit"]["action"], "/auth/login");

    let req = test::TestRequest::get().uri("/api/v1/projects").to_request();
    let cards: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(cards, json!([]));
}
