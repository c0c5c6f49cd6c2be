pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::resumes::handlers;
use crate::state::AppState;
use crate::summary::handlers::handle_improve_summary;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::index_handler))
        .route("/health", get(health::health_handler))
        // Generation
        .route("/generate-resume", post(handlers::handle_generate_resume))
        .route("/upload-json", post(handlers::handle_upload))
        .route(
            "/generate-from-json",
            post(handlers::handle_generate_from_sample),
        )
        // Artifacts
        .route("/download/:filename", get(handlers::handle_download))
        .route("/cleanup", delete(handlers::handle_cleanup))
        // Reference data
        .route("/template", get(handlers::handle_get_template))
        .route("/sample-data", get(handlers::handle_get_sample_data))
        // Text generation
        .route("/improve-summary", post(handle_improve_summary))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::resumes::pipeline::testing::pipeline_with;
    use crate::typeset::testing::{FakeTypesetter, FAKE_PDF};

    const RECORD: &str = r#"{
        "name": "Ada Lovelace",
        "contact": {"phone": "555-0100", "links": [{"name": "GitHub", "url": "https://github.com/ada"}]},
        "summary": "Engineer & analyst.",
        "skills": [{"category": "Languages", "items": "Rust, C"}],
        "experience": [{"title": "Engineer", "company": "Analytical Engines", "date_start": "1842"}],
        "education": []
    }"#;

    fn test_config(dir: &Path) -> Config {
        Config {
            port: 0,
            rust_log: "debug".to_string(),
            template_path: "templates/resume.tex".into(),
            sample_data_path: dir.join("sample.json"),
            output_dir: dir.join("out"),
            latex_bin: "pdflatex".to_string(),
            latex_timeout_secs: 60,
            artifact_ttl_secs: 0,
            highlight_authors: Vec::new(),
            anthropic_api_key: None,
        }
    }

    fn app(dir: &Path) -> Router {
        let config = test_config(dir);
        let pipeline = pipeline_with(Arc::new(FakeTypesetter::default()), &config.output_dir);
        build_router(AppState {
            config,
            pipeline,
            llm: None,
        })
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    fn json_body(bytes: &[u8]) -> Value {
        serde_json::from_slice(bytes).unwrap()
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn upload(file_name: &str, content: &str) -> Request<Body> {
        let boundary = "cvgen-test-boundary";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n\
             {content}\r\n\
             --{boundary}--\r\n"
        );
        Request::builder()
            .method(Method::POST)
            .uri("/upload-json")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::create_dir(dir.path().join("out")).await.unwrap();
        let (status, body) = send(app(dir.path()), get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        let body = json_body(&body);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["checks"]["typesetter"], "fake");
        assert_eq!(body["checks"]["summary_improvement_enabled"], false);
    }

    #[tokio::test]
    async fn test_health_reports_missing_output_dir_without_creating_it() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = send(app(dir.path()), get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        let body = json_body(&body);
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["checks"]["output_dir_writable"], false);
        assert!(body["checks"].get("template_loaded").is_none());
        assert!(!dir.path().join("out").exists());
    }

    #[tokio::test]
    async fn test_index_lists_endpoints() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = send(app(dir.path()), get("/")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_body(&body)["endpoints"]["cleanup"], "DELETE /cleanup");
    }

    #[tokio::test]
    async fn test_generate_then_download() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path());

        let (status, body) = send(app.clone(), post_json("/generate-resume", RECORD)).await;
        assert_eq!(status, StatusCode::OK);
        let body = json_body(&body);
        let filename = body["filename"].as_str().unwrap().to_string();
        assert!(filename.starts_with("resume-") && filename.ends_with(".pdf"));
        assert_eq!(body["download_url"], format!("/download/{filename}"));

        let (status, pdf) = send(app.clone(), get(&format!("/download/{filename}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(pdf, FAKE_PDF);

        let latex_url = body["latex_url"].as_str().unwrap();
        let (status, tex) = send(app, get(latex_url)).await;
        assert_eq!(status, StatusCode::OK);
        let tex = String::from_utf8(tex).unwrap();
        assert!(tex.contains("Engineer \\& analyst."));
        assert!(!tex.contains("<<"));
    }

    #[tokio::test]
    async fn test_generate_rejects_record_without_skills() {
        let dir = tempfile::tempdir().unwrap();
        let record = json!({
            "contact": {"links": []},
            "experience": [],
            "education": []
        });
        let (status, body) = send(
            app(dir.path()),
            post_json("/generate-resume", &record.to_string()),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json_body(&body)["error"]["code"], "INVALID_RESUME_DATA");
    }

    #[tokio::test]
    async fn test_download_rejects_traversal_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path());

        let (status, _) = send(app.clone(), get("/download/..%2Fsecret.pdf")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(app.clone(), get("/download/notes.txt")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(app, get("/download/resume-missing.pdf")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_upload_yaml_record() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = "name: Ada\ncontact:\n  links: []\nskills: []\nexperience: []\neducation: []\n";
        let (status, body) = send(app(dir.path()), upload("ada.yaml", yaml)).await;
        assert_eq!(status, StatusCode::OK, "{}", String::from_utf8_lossy(&body));
        assert_eq!(json_body(&body)["message"], "Resume generated successfully");
    }

    #[tokio::test]
    async fn test_upload_rejects_other_extensions() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = send(app(dir.path()), upload("ada.txt", RECORD)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json_body(&body)["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_sample_data_and_generate_from_json() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path());

        let (status, _) = send(app.clone(), post_json("/generate-from-json", "")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(app.clone(), get("/sample-data")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        tokio::fs::write(dir.path().join("sample.json"), RECORD).await.unwrap();

        let (status, body) = send(app.clone(), get("/sample-data")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_body(&body)["sample_data"]["name"], "Ada Lovelace");

        let (status, _) = send(app, post_json("/generate-from-json", "")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_template_returns_source() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = send(app(dir.path()), get("/template")).await;
        assert_eq!(status, StatusCode::OK);
        let body = json_body(&body);
        assert!(body["template"].as_str().unwrap().contains("<<skills>>"));
    }

    #[tokio::test]
    async fn test_cleanup_removes_generated_files() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path());
        send(app.clone(), post_json("/generate-resume", RECORD)).await;

        let request = Request::builder()
            .method(Method::DELETE)
            .uri("/cleanup")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::OK);
        let body = json_body(&body);
        assert_eq!(body["status"], "success");
        assert_eq!(body["message"], "Removed 2 generated files");
    }

    #[tokio::test]
    async fn test_improve_summary_rejects_oversized_summary() {
        let dir = tempfile::tempdir().unwrap();
        let body = json!({ "summary": "a".repeat(5_001) });
        let (status, body) = send(
            app(dir.path()),
            post_json("/improve-summary", &body.to_string()),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json_body(&body)["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_improve_summary_validation_then_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path());

        let (status, _) = send(
            app.clone(),
            post_json("/improve-summary", r#"{"summary": "   "}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            app,
            post_json("/improve-summary", r#"{"summary": "Did things."}"#),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json_body(&body)["error"]["code"], "SERVICE_UNAVAILABLE");
    }
}
