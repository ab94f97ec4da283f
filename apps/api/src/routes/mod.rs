pub mod health;
pub mod reference;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::assessment::handlers as assessment;
use crate::dashboard::handlers as dashboard;
use crate::profile::handlers as profile;
use crate::recommendations::handlers as recommendations;
use crate::state::AppState;

/// Upper bound for CV uploads.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Reference data
        .route("/api/v1/occupations", get(reference::handle_list_occupations))
        .route("/api/v1/jobs", get(reference::handle_list_jobs))
        // Profile intake
        .route("/api/v1/profile/extract", post(profile::handle_extract_cv))
        .route("/api/v1/sessions", post(profile::handle_create_session))
        .route("/api/v1/sessions/:id", get(profile::handle_get_session))
        .route(
            "/api/v1/sessions/:id/profile",
            put(profile::handle_update_profile),
        )
        // Assessment
        .route(
            "/api/v1/sessions/:id/assessment",
            post(assessment::handle_generate_assessment),
        )
        .route(
            "/api/v1/sessions/:id/assessment/submit",
            post(assessment::handle_submit_assessment),
        )
        // Recommendations and career chat
        .route(
            "/api/v1/sessions/:id/recommendations",
            get(recommendations::handle_recommendations),
        )
        .route(
            "/api/v1/sessions/:id/chat",
            post(recommendations::handle_chat).delete(recommendations::handle_reset_chat),
        )
        .route("/api/v1/dashboard", get(dashboard::handle_dashboard))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::assessment::generator::QuestionGenerator;
    use crate::assessment::models::Question;
    use crate::config::{Config, SheetNames};
    use crate::errors::AppError;
    use crate::llm_client::fixtures::{text_reply, GeminiStub};
    use crate::llm_client::LlmClient;
    use crate::models::{JobPosting, Occupation};
    use crate::profile::matcher::OccupationMatcher;
    use crate::session::SessionStore;
    use crate::workbook::reference::ReferenceData;

    /// Answers are always the first option.
    struct FixedQuestions;

    #[async_trait]
    impl QuestionGenerator for FixedQuestions {
        async fn generate(
            &self,
            occupation: &Occupation,
            count: usize,
        ) -> Result<Vec<Question>, AppError> {
            Ok((1..=count)
                .map(|i| Question {
                    id: format!("q{i}"),
                    text: format!("Soal {i} untuk {}", occupation.name),
                    options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
                    correct_answer: "A".into(),
                })
                .collect())
        }
    }

    /// Two calls meet at a barrier so both are in flight together. The first
    /// call's key is "A", the second's "B"; the key is shown in the text.
    struct OverlappingQuestions {
        calls: AtomicUsize,
        barrier: tokio::sync::Barrier,
    }

    #[async_trait]
    impl QuestionGenerator for OverlappingQuestions {
        async fn generate(
            &self,
            _occupation: &Occupation,
            count: usize,
        ) -> Result<Vec<Question>, AppError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            self.barrier.wait().await;
            let key = if call == 0 { "A" } else { "B" };
            Ok((1..=count)
                .map(|i| Question {
                    id: format!("q{i}"),
                    text: format!("Soal {i} kunci {key}"),
                    options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
                    correct_answer: key.into(),
                })
                .collect())
        }
    }

    fn test_state() -> AppState {
        let config = Config {
            gemini_api_key: "test-key".into(),
            gemini_base_url: "http://127.0.0.1:9".into(),
            gemini_model: "test-model".into(),
            workbook_path: "unused.xlsx".into(),
            sheets: SheetNames::default(),
            header_row: 1,
            question_count: 2,
            port: 0,
            rust_log: "info".into(),
        };
        let reference = ReferenceData {
            occupations: vec![
                Occupation {
                    id: "OK01".into(),
                    name: "Network Administrator".into(),
                    competency_unit: "Mengelola jaringan komputer".into(),
                    keywords: "router, switch, firewall".into(),
                },
                Occupation {
                    id: "OK02".into(),
                    name: "Data Analyst".into(),
                    competency_unit: "Menganalisis data bisnis".into(),
                    keywords: "python, sql, tableau".into(),
                },
            ],
            job_postings: vec![
                JobPosting::new("Network Engineer", "NetCo", "Medan", "Cisco", "Kelola jaringan."),
                JobPosting::new("Data Analyst", "DataCo", "Jakarta", "Python, SQL", "Analisis data."),
                JobPosting::new("QA Tester", "SoftCo", "Surabaya", "Selenium", "Uji aplikasi."),
            ],
            ..Default::default()
        };
        let matcher = OccupationMatcher::fit(&reference.occupations).unwrap();
        let llm = LlmClient::new(
            config.gemini_api_key.clone(),
            config.gemini_base_url.clone(),
            config.gemini_model.clone(),
        )
        .unwrap();

        AppState {
            reference: Arc::new(reference),
            matcher: Arc::new(matcher),
            sessions: SessionStore::new(),
            question_generator: Arc::new(FixedQuestions),
            llm,
            config,
        }
    }

    async fn send(state: &AppState, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let response = build_router(state.clone())
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    fn profile_body() -> Value {
        json!({
            "email": "rina@mail.id",
            "name": "Rina",
            "location": "Jakarta",
            "cv_text": "Berpengalaman mengolah data dengan python dan membuat dashboard tableau"
        })
    }

    async fn create_session(state: &AppState) -> String {
        let (status, body) = send(state, Method::POST, "/api/v1/sessions", Some(profile_body())).await;
        assert_eq!(status, StatusCode::CREATED);
        body["session_id"].as_str().unwrap().to_string()
    }

    fn multipart(filename: &str, content_type: &str, content: &str) -> Request<Body> {
        let body = format!(
            "--BOUNDARY\r\nContent-Disposition: form-data; name=\"cv\"; filename=\"{filename}\"\r\n\
             Content-Type: {content_type}\r\n\r\n{content}\r\n--BOUNDARY--\r\n"
        );
        Request::builder()
            .method(Method::POST)
            .uri("/api/v1/profile/extract")
            .header(header::CONTENT_TYPE, "multipart/form-data; boundary=BOUNDARY")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(&test_state(), Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "dtp-api");
    }

    #[tokio::test]
    async fn test_reference_listings() {
        let state = test_state();
        let (_, occupations) = send(&state, Method::GET, "/api/v1/occupations", None).await;
        assert_eq!(occupations.as_array().unwrap().len(), 2);
        assert_eq!(occupations[0]["OkupasiID"], "OK01");

        let (_, jobs) = send(&state, Method::GET, "/api/v1/jobs", None).await;
        assert_eq!(jobs[1]["Posisi"], "Data Analyst");
    }

    #[tokio::test]
    async fn test_extract_txt_cv() {
        let request = multipart(
            "cv.txt",
            "text/plain",
            "budi santoso\nbudi.s@mail.id\nlinkedin.com/in/budi-s\nBandung",
        );
        let response = build_router(test_state()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let parsed: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed["name"], "Budi Santoso");
        assert_eq!(parsed["email"], "budi.s@mail.id");
        assert_eq!(parsed["linkedin"], "https://www.linkedin.com/in/budi-s");
        assert_eq!(parsed["location"], "Bandung");
    }

    #[tokio::test]
    async fn test_extract_rejects_docx() {
        let request = multipart(
            "cv.docx",
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            "binary",
        );
        let response = build_router(test_state()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn test_create_session_maps_profile() {
        let state = test_state();
        let (status, body) = send(&state, Method::POST, "/api/v1/sessions", Some(profile_body())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["talent_id"], "rina@mail.id");
        assert_eq!(body["occupation_id"], "OK02");
        assert_eq!(body["skill_gap"], "sql");
        assert_eq!(body["questions_ready"], false);

        let id = body["session_id"].as_str().unwrap();
        let (status, fetched) = send(&state, Method::GET, &format!("/api/v1/sessions/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["occupation_name"], "Data Analyst");
    }

    #[tokio::test]
    async fn test_create_session_requires_fields() {
        let mut body = profile_body();
        body["email"] = json!("");
        let (status, error) = send(&test_state(), Method::POST, "/api/v1/sessions", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_unknown_session_is_404() {
        let uri = format!("/api/v1/sessions/{}", uuid::Uuid::new_v4());
        let (status, _) = send(&test_state(), Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_steps_must_run_in_order() {
        let state = test_state();
        let id = create_session(&state).await;

        let submit = json!({"answers": {"q1": "A"}});
        let (status, _) = send(
            &state,
            Method::POST,
            &format!("/api/v1/sessions/{id}/assessment/submit"),
            Some(submit),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = send(
            &state,
            Method::GET,
            &format!("/api/v1/sessions/{id}/recommendations"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_full_assessment_flow() {
        let state = test_state();
        let id = create_session(&state).await;

        let (status, generated) = send(
            &state,
            Method::POST,
            &format!("/api/v1/sessions/{id}/assessment"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let questions = generated["questions"].as_array().unwrap();
        assert_eq!(questions.len(), 2);
        assert!(questions[0].get("jawaban_benar").is_none());
        assert_eq!(questions[0]["opsi"].as_array().unwrap().len(), 4);

        let answers = json!({"answers": {"q1": " A ", "q2": "C"}});
        let (status, result) = send(
            &state,
            Method::POST,
            &format!("/api/v1/sessions/{id}/assessment/submit"),
            Some(answers),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(result["score"], 50);
        assert_eq!(result["level"], "Menengah");
        assert_eq!(result["details"][1]["is_correct"], false);

        let (status, recs) = send(
            &state,
            Method::GET,
            &format!("/api/v1/sessions/{id}/recommendations"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(recs["jobs"][0]["Posisi"], "Data Analyst");
        assert_eq!(recs["trainings"].as_array().unwrap().len(), 3);

        let (_, dashboard) = send(&state, Method::GET, "/api/v1/dashboard", None).await;
        assert_eq!(dashboard["metrics"]["completed_assessments"], 1);
        assert_eq!(dashboard["metrics"]["average_score"], 50.0);
    }

    #[tokio::test]
    async fn test_remap_discards_questions() {
        let state = test_state();
        let id = create_session(&state).await;
        send(&state, Method::POST, &format!("/api/v1/sessions/{id}/assessment"), None).await;

        let mut body = profile_body();
        body["cv_text"] = json!("Konfigurasi router dan firewall jaringan kantor");
        let (status, summary) = send(
            &state,
            Method::PUT,
            &format!("/api/v1/sessions/{id}/profile"),
            Some(body),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(summary["occupation_id"], "OK01");
        assert_eq!(summary["questions_ready"], false);
    }

    #[tokio::test]
    async fn test_chat_reset_and_validation() {
        let state = test_state();
        let id = create_session(&state).await;

        let (status, _) = send(
            &state,
            Method::POST,
            &format!("/api/v1/sessions/{id}/chat"),
            Some(json!({"message": "   "})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, history) = send(
            &state,
            Method::DELETE,
            &format!("/api/v1/sessions/{id}/chat"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(history.as_array().unwrap().len(), 1);
        assert_eq!(history[0]["role"], "ai");
    }

    #[tokio::test]
    async fn test_overlapping_generation_keeps_first_stored_set() {
        let mut state = test_state();
        let generator = Arc::new(OverlappingQuestions {
            calls: AtomicUsize::new(0),
            barrier: tokio::sync::Barrier::new(2),
        });
        state.question_generator = generator.clone() as Arc<dyn QuestionGenerator>;
        let id = create_session(&state).await;
        let uri = format!("/api/v1/sessions/{id}/assessment");

        let ((first_status, first), (second_status, second)) = tokio::join!(
            send(&state, Method::POST, &uri, None),
            send(&state, Method::POST, &uri, None)
        );
        assert_eq!(first_status, StatusCode::OK);
        assert_eq!(second_status, StatusCode::OK);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 2);
        assert_eq!(first["questions"], second["questions"]);

        // Answer with the key both callers were shown.
        let shown = first["questions"][0]["teks"].as_str().unwrap();
        let key = shown.rsplit(' ').next().unwrap();
        let (status, result) = send(
            &state,
            Method::POST,
            &format!("{uri}/submit"),
            Some(json!({"answers": {"q1": key, "q2": key}})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(result["score"], 100);
    }

    #[tokio::test]
    async fn test_chat_reply_recorded_with_question() {
        let stub = GeminiStub::start(vec![text_reply("Perdalam SQL dan statistik dasar.")]).await;
        let mut state = test_state();
        state.llm = stub.client();
        let id = create_session(&state).await;

        let (status, body) = send(
            &state,
            Method::POST,
            &format!("/api/v1/sessions/{id}/chat"),
            Some(json!({"message": "  Skill apa yang perlu saya tingkatkan?  "})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reply"], "Perdalam SQL dan statistik dasar.");
        let history = body["history"].as_array().unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[1]["role"], "user");
        assert_eq!(history[1]["content"], "Skill apa yang perlu saya tingkatkan?");
        assert_eq!(history[2]["role"], "ai");
        assert_eq!(stub.hits(), 1);
    }

    #[tokio::test]
    async fn test_failed_chat_leaves_history_unchanged() {
        let stub = GeminiStub::start(vec![
            (403, r#"{"error":{"message":"Permission denied"}}"#.into()),
            text_reply("Coba mulai dari sertifikasi cloud."),
        ])
        .await;
        let mut state = test_state();
        state.llm = stub.client();
        let id = create_session(&state).await;
        let uri = format!("/api/v1/sessions/{id}/chat");
        let message = json!({"message": "Bagaimana memulai karier cloud?"});

        let (status, error) = send(&state, Method::POST, &uri, Some(message.clone())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error["error"]["code"], "LLM_ERROR");
        let session = state
            .sessions
            .get(uuid::Uuid::parse_str(&id).unwrap())
            .await
            .unwrap();
        assert_eq!(session.chat_history.len(), 1);

        let (status, body) = send(&state, Method::POST, &uri, Some(message)).await;
        assert_eq!(status, StatusCode::OK);
        let history = body["history"].as_array().unwrap();
        let questions = history.iter().filter(|m| m["role"] == "user").count();
        assert_eq!(questions, 1);
        assert_eq!(history.len(), 3);
    }
}
