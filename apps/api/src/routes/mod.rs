pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::state::AppState;
use crate::{draft, export, pages, review, suggest, upload};

/// Headroom on top of the file cap for multipart boundaries and other fields.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/health", get(health::health_handler))
        // Pages
        .route("/", get(pages::handle_home))
        .route("/templates", get(pages::handle_template_chooser))
        .route(
            "/builder",
            get(pages::handle_builder).post(draft::handle_save_draft),
        )
        .route(
            "/reviewer",
            get(pages::handle_reviewer_form).post(pages::handle_reviewer_submit),
        )
        // Draft
        .route(
            "/api/resume",
            get(draft::handle_get_draft)
                .post(draft::handle_save_draft)
                .delete(draft::handle_clear_session),
        )
        // Upload
        .route(
            "/api/upload",
            post(upload::handlers::handle_upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        // AI
        .route("/ai_suggest", post(suggest::handle_suggest))
        .route("/api/ai/suggest", post(suggest::handle_suggest))
        .route("/api/review", post(review::handle_review))
        // Export
        .route("/export_pdf", post(export::handlers::handle_export_posted))
        .route(
            "/api/export/resume",
            get(export::handlers::handle_export_saved),
        )
        .route(
            "/api/export/report",
            get(export::handlers::handle_export_report),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::llm_client::testing::ScriptedBackend;
    use crate::llm_client::CompletionBackend;
    use crate::session::FileSessionStore;
    use crate::upload::extract::tests::docx_with_body;

    const BOUNDARY: &str = "resume-studio-test-boundary";

    async fn test_app(llm: Option<Arc<dyn CompletionBackend>>) -> (Router, TempDir) {
        let dir = TempDir::new().unwrap();
        let config = Config::for_tests(dir.path().to_path_buf());
        let sessions = FileSessionStore::open(dir.path(), chrono::Duration::hours(24))
            .await
            .unwrap();
        let state = AppState {
            config,
            llm,
            sessions: Arc::new(sessions),
        };
        (build_router(state), dir)
    }

    fn json_request(method: &str, uri: &str, body: Value, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn multipart_request(field: &str, filename: &str, data: &[u8]) -> Request<Body> {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        Request::builder()
            .method("POST")
            .uri("/api/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    /// `name=value` pair from the Set-Cookie header, ready to send back.
    fn session_cookie(response: &Response) -> String {
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .expect("session cookie")
            .to_str()
            .unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    #[tokio::test]
    async fn test_health_reports_llm_configuration() {
        let (app, _dir) = test_app(None).await;
        let response = app.oneshot(get_request("/health", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["llm_configured"], false);
    }

    #[tokio::test]
    async fn test_save_then_fetch_returns_normalized_draft() {
        let (app, _dir) = test_app(None).await;
        let draft = json!({
            "name": "  Jane Doe ",
            "email": "jane@example.com",
            "skills": "Rust, Go, rust",
            "experience": [{"role": "Engineer", "company": "Acme", "bullets": "- Shipped v2"}],
            "template": "Classic"
        });

        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/resume", draft, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = session_cookie(&response);
        let saved = body_json(response).await;
        assert_eq!(saved["status"], "saved");

        let response = app
            .oneshot(get_request("/api/resume", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let fetched = body_json(response).await;
        assert_eq!(fetched["resume"], saved["resume"]);
        assert_eq!(fetched["resume"]["name"], "Jane Doe");
        assert_eq!(fetched["resume"]["skills"], "Rust, Go");
        assert_eq!(fetched["resume"]["template"], "classic");
        assert_eq!(fetched["resume"]["experience"][0]["organization"], "Acme");
        assert_eq!(fetched["resume"]["experience"][0]["highlights"][0], "Shipped v2");
    }

    #[tokio::test]
    async fn test_legacy_builder_post_saves_draft() {
        let (app, _dir) = test_app(None).await;
        let response = app
            .oneshot(json_request("POST", "/builder", json!({"name": "Ada"}), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["resume"]["name"], "Ada");
    }

    #[tokio::test]
    async fn test_save_rejects_missing_name_and_bad_email() {
        let (app, _dir) = test_app(None).await;
        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/resume", json!({"title": "Engineer"}), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/resume",
                json!({"name": "Jane", "email": "not-an-email"}),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_json_bodies_use_error_envelope() {
        let (app, _dir) = test_app(None).await;
        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/resume", json!({"name": 5}), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(body["error"]["message"].as_str().unwrap().contains("name"));

        for uri in ["/api/resume", "/ai_suggest", "/api/review", "/export_pdf"] {
            let response = app
                .clone()
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri(uri)
                        .header(header::CONTENT_TYPE, "application/json")
                        .body(Body::from("{not json"))
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
            let body = body_json(response).await;
            assert_eq!(body["error"]["code"], "VALIDATION_ERROR", "{uri}");
        }
    }

    #[tokio::test]
    async fn test_resaving_restored_textarea_sections_keeps_entries() {
        let (app, _dir) = test_app(None).await;
        let experience = "Engineer, Acme | 2019 - 2021\n- Shipped v2\n\nIntern, Initech";
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/resume",
                json!({"name": "Jane", "experience": experience, "template": "compact"}),
                None,
            ))
            .await
            .unwrap();
        let cookie = session_cookie(&response);
        let first = body_json(response).await["resume"].clone();
        assert_eq!(first["experience"].as_array().unwrap().len(), 2);

        // The builder restores each entry as one paragraph and posts the textarea back.
        let restored: Vec<String> = first["experience"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["description"].as_str().unwrap().to_string())
            .collect();
        let response = app
            .oneshot(json_request(
                "POST",
                "/api/resume",
                json!({"name": "Jane", "experience": restored.join("\n\n"), "template": "compact"}),
                Some(&cookie),
            ))
            .await
            .unwrap();
        let second = body_json(response).await["resume"].clone();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_clear_removes_draft() {
        let (app, _dir) = test_app(None).await;
        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/resume", json!({"name": "Jane"}), None))
            .await
            .unwrap();
        let cookie = session_cookie(&response);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/api/resume")
                    .header(header::COOKIE, &cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "cleared");

        let response = app
            .oneshot(get_request("/api/resume", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_get_without_session_is_not_found() {
        let (app, _dir) = test_app(None).await;
        let response = app.oneshot(get_request("/api/resume", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_upload_docx_returns_text() {
        let (app, _dir) = test_app(None).await;
        let docx = docx_with_body(
            "<w:p><w:r><w:t>Jane Doe</w:t></w:r></w:p><w:p><w:r><w:t>Rust engineer</w:t></w:r></w:p>",
        );
        let response = app
            .oneshot(multipart_request("resume", "cv.DOCX", &docx))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["format"], "docx");
        assert_eq!(body["text"], "Jane Doe\nRust engineer");
        assert_eq!(body["words"], 4);
    }

    #[tokio::test]
    async fn test_upload_rejects_unsupported_extension() {
        let (app, _dir) = test_app(None).await;
        let response = app
            .oneshot(multipart_request("file", "resume.txt", b"Jane Doe"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn test_upload_rejects_oversized_file() {
        let (app, _dir) = test_app(None).await;
        let response = app
            .oneshot(multipart_request("file", "resume.pdf", &vec![b'x'; 2048]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_upload_rejects_empty_file_and_missing_field() {
        let (app, _dir) = test_app(None).await;
        let response = app
            .clone()
            .oneshot(multipart_request("file", "resume.pdf", b""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .oneshot(multipart_request("attachment", "resume.pdf", b"%PDF"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_ai_suggest_without_key_is_unavailable() {
        let (app, _dir) = test_app(None).await;
        let response = app
            .oneshot(json_request(
                "POST",
                "/ai_suggest",
                json!({"section": "summary", "content": "Engineer"}),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_ai_suggest_uses_section_prompt() {
        let backend = Arc::new(ScriptedBackend::replying(vec!["\"Rust, PostgreSQL, Docker\""]));
        let (app, _dir) = test_app(Some(backend.clone() as Arc<dyn CompletionBackend>)).await;
        let response = app
            .oneshot(json_request(
                "POST",
                "/api/ai/suggest",
                json!({"section": "skills", "content": "rust, postgres, docker", "job_title": "Backend Engineer"}),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["section"], "skills");
        assert_eq!(body["suggestion"], "Rust, PostgreSQL, Docker");

        let (_, prompt, max_tokens) = backend.last_prompt().unwrap();
        assert!(prompt.contains("SKILLS:\nrust, postgres, docker"));
        assert!(prompt.contains("Backend Engineer"));
        assert_eq!(max_tokens, 150);
    }

    #[tokio::test]
    async fn test_ai_suggest_validates_before_calling_llm() {
        let backend = Arc::new(ScriptedBackend::replying(vec!["unused"]));
        let (app, _dir) = test_app(Some(backend.clone() as Arc<dyn CompletionBackend>)).await;
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/ai_suggest",
                json!({"section": "hobbies", "content": "Chess"}),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .oneshot(json_request(
                "POST",
                "/ai_suggest",
                json!({"section": "summary", "content": "x".repeat(2001)}),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(backend.last_prompt().is_none());
    }

    #[tokio::test]
    async fn test_ai_suggest_empty_reply_is_bad_gateway() {
        let backend = Arc::new(ScriptedBackend::replying(vec!["   "]));
        let (app, _dir) = test_app(Some(backend as Arc<dyn CompletionBackend>)).await;
        let response = app
            .oneshot(json_request(
                "POST",
                "/ai_suggest",
                json!({"section": "summary", "content": "Engineer"}),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(body_json(response).await["error"]["code"], "LLM_ERROR");
    }

    const REPORT_JSON: &str = r#"{"overall_score": 81, "ats_compatibility": "Good",
        "keyword_usage": "Fine", "strengths": ["Clear"], "weaknesses": [],
        "missing_sections": ["Projects"], "improvements": ["Add projects"]}"#;

    #[tokio::test]
    async fn test_review_stores_report_for_export() {
        let backend = Arc::new(ScriptedBackend::replying(vec![REPORT_JSON]));
        let (app, _dir) = test_app(Some(backend as Arc<dyn CompletionBackend>)).await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/review",
                json!({"resume_text": "Jane Doe\nEngineer at Acme"}),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = session_cookie(&response);
        let body = body_json(response).await;
        assert_eq!(body["report"]["overall_score"], 81);
        assert_eq!(body["report"]["missing_sections"][0], "Projects");

        let response = app
            .oneshot(get_request("/api/export/report", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"Resume_Analysis_Report.pdf\""
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn test_review_rejects_empty_and_oversized_text() {
        let backend = Arc::new(ScriptedBackend::replying(vec![REPORT_JSON]));
        let (app, _dir) = test_app(Some(backend as Arc<dyn CompletionBackend>)).await;
        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/review", json!({"resume_text": "  "}), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/review",
                json!({"resume_text": "a".repeat(20_001)}),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_review_of_saved_draft() {
        let backend = Arc::new(ScriptedBackend::replying(vec![REPORT_JSON]));
        let (app, _dir) = test_app(Some(backend.clone() as Arc<dyn CompletionBackend>)).await;
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/resume",
                json!({"name": "Jane Doe", "summary": "Builds databases"}),
                None,
            ))
            .await
            .unwrap();
        let cookie = session_cookie(&response);

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/review",
                json!({"use_draft": true}),
                Some(&cookie),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let (_, prompt, _) = backend.last_prompt().unwrap();
        assert!(prompt.contains("Jane Doe\n\nSUMMARY\nBuilds databases"));
    }

    #[tokio::test]
    async fn test_export_report_without_review_is_not_found() {
        let (app, _dir) = test_app(None).await;
        let response = app
            .oneshot(get_request("/api/export/report", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_export_posted_draft_is_pdf_attachment() {
        let (app, _dir) = test_app(None).await;
        let response = app
            .oneshot(json_request(
                "POST",
                "/export_pdf",
                json!({"name": "Jane Q. Doe", "summary": "Engineer", "template": "minimal"}),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"Jane_Q_Doe_Resume.pdf\""
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn test_export_posted_draft_requires_name() {
        let (app, _dir) = test_app(None).await;
        let response = app
            .oneshot(json_request("POST", "/export_pdf", json!({"summary": "x"}), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_export_saved_draft() {
        let (app, _dir) = test_app(None).await;
        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/resume", json!({"name": "Jane Doe"}), None))
            .await
            .unwrap();
        let cookie = session_cookie(&response);

        let response = app
            .oneshot(get_request("/api/export/resume", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"Jane_Doe_Resume.pdf\""
        );
    }

    #[tokio::test]
    async fn test_pages_render() {
        let (app, _dir) = test_app(None).await;
        for uri in ["/", "/templates", "/builder?template=compact", "/builder?template=nope", "/reviewer"] {
            let response = app.clone().oneshot(get_request(uri, None)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
            let html = body_text(response).await;
            assert!(html.starts_with("<!DOCTYPE html>"), "{uri}");
        }
    }

    #[tokio::test]
    async fn test_builder_unknown_template_falls_back_to_default() {
        let (app, _dir) = test_app(None).await;
        let response = app
            .oneshot(get_request("/builder?template=nope", None))
            .await
            .unwrap();
        let html = body_text(response).await;
        assert!(html.contains("<option value=\"modern\" selected>"));
    }

    fn form_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/reviewer")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_reviewer_form_renders_feedback() {
        let backend = Arc::new(ScriptedBackend::replying(vec![REPORT_JSON]));
        let (app, _dir) = test_app(Some(backend as Arc<dyn CompletionBackend>)).await;
        let response = app
            .oneshot(form_request("resume_text=Jane+Doe+%3Cb%3E"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("81/100"));
        assert!(html.contains("Jane Doe &lt;b&gt;"));
    }

    #[tokio::test]
    async fn test_reviewer_rejects_non_form_body_as_html() {
        let (app, _dir) = test_app(None).await;
        let response = app
            .oneshot(json_request("POST", "/reviewer", json!({"resume_text": "Jane"}), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = body_text(response).await;
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("class=\"error\""));
    }

    #[tokio::test]
    async fn test_reviewer_form_renders_errors_as_html() {
        let (app, _dir) = test_app(None).await;
        let response = app.clone().oneshot(form_request("resume_text=")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = body_text(response).await;
        assert!(html.contains("class=\"error\""));

        let response = app
            .oneshot(form_request("resume_text=Jane+Doe"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(body_text(response).await.contains("not configured"));
    }
}
