//! HTTP integration tests
//!
//! The router runs over the real prompt catalog with a scripted chat
//! completion backend, so no network access is needed.

use std::collections::VecDeque;
use std::io::{Cursor, Read};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use vibe_assistant::config::Settings;
use vibe_assistant::llm::{ChatCompletion, CompletionRequest, LlmError, LlmResult};
use vibe_assistant::server::{create_app, AppState};

/// Replies with queued responses in order and remembers every request
#[derive(Default)]
struct ScriptedBackend {
    replies: Mutex<VecDeque<LlmResult<String>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedBackend {
    fn with_replies(replies: Vec<LlmResult<String>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatCompletion for ScriptedBackend {
    fn model(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: CompletionRequest) -> LlmResult<String> {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::Other("no scripted reply".to_string())))
    }
}

fn test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.templates.dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("prompts");
    settings.templates.hot_reload = false;
    settings
}

fn test_app(backend: Arc<ScriptedBackend>) -> Router {
    create_app(AppState::with_client(test_settings(), backend))
}

fn idle_app() -> Router {
    test_app(ScriptedBackend::with_replies(Vec::new()))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let (status, _, bytes) = send_raw(app, method, uri, body).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn send_raw(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec();
    (status, headers, bytes)
}

#[tokio::test]
async fn test_health() {
    let app = idle_app();
    let (status, body) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_unknown_endpoint_returns_json_404() {
    let app = idle_app();
    let (status, body) = send(&app, "GET", "/api/nothing-here", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Endpoint not found");
    assert_eq!(body["path"], "/api/nothing-here");
}

#[tokio::test]
async fn test_session_lifecycle() {
    let app = idle_app();

    let (status, created) = send(&app, "POST", "/api/sessions", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["currentStep"], 1);
    let id = created["id"].as_str().unwrap().to_string();
    let uri = format!("/api/sessions/{}", id);

    let (status, updated) = send(
        &app,
        "PUT",
        &uri,
        Some(json!({
            "currentStep": 3,
            "ideaDescription": "Бот для учета расходов",
            "category": "BOT",
            "baseAnswers": { "audience": "студенты" }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["currentStep"], 3);
    assert_eq!(updated["category"], "BOT");
    assert_eq!(updated["baseAnswers"]["audience"], "студенты");

    let (_, fetched) = send(&app, "GET", &uri, None).await;
    assert_eq!(fetched["ideaDescription"], "Бот для учета расходов");

    let (_, stats) = send(&app, "GET", "/api/stats", None).await;
    assert_eq!(stats["total"], 1);
    assert_eq!(stats["byCategory"]["BOT"], 1);

    let (status, reset) = send(&app, "POST", &format!("{}/reset", uri), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reset["currentStep"], 1);
    assert_eq!(reset["id"], id.as_str());
    assert!(reset["ideaDescription"].is_null());

    let (_, deleted) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(deleted["deleted"], true);
    let (_, deleted_again) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(deleted_again["deleted"], false);

    let (status, body) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Сессия не найдена");
}

#[tokio::test]
async fn test_session_rejects_step_out_of_range() {
    let app = idle_app();
    let (_, created) = send(&app, "POST", "/api/sessions", None).await;
    let uri = format!("/api/sessions/{}", created["id"].as_str().unwrap());

    let (status, body) = send(&app, "PUT", &uri, Some(json!({ "currentStep": 11 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_malformed_session_id_is_not_found() {
    let app = idle_app();
    let (status, _) = send(&app, "GET", "/api/sessions/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_base_questions_and_validation() {
    let app = idle_app();

    let (status, questions) = send(&app, "GET", "/api/questions/base", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!questions.as_array().unwrap().is_empty());

    let (status, body) = send(&app, "POST", "/api/questions/validate", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Не переданы ответы для валидации");

    let (status, body) = send(
        &app,
        "POST",
        "/api/questions/validate",
        Some(json!({ "answers": {} })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], false);
}

#[tokio::test]
async fn test_category_catalog() {
    let app = idle_app();
    let (status, body) = send(&app, "GET", "/api/questions/categories", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            { "id": "WEB_APP", "name": "Web приложение", "emoji": "🌐" },
            { "id": "BOT", "name": "Telegram бот", "emoji": "🤖" },
            { "id": "MOBILE_APP", "name": "Мобильное приложение", "emoji": "📱" }
        ])
    );
}

#[tokio::test]
async fn test_analyze_category_requires_idea() {
    let app = idle_app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/analyze-category",
        Some(json!({ "ideaDescription": "   " })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Не передано описание идеи");
}

#[tokio::test]
async fn test_malformed_json_is_validation_error() {
    let app = idle_app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/analyze-category")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_analyze_category_detected() {
    let backend = ScriptedBackend::with_replies(vec![Ok(
        "Вот результат: {\"category\": \"BOT\", \"confidence\": 0.92, \"reasoning\": \"Telegram\"}"
            .to_string(),
    )]);
    let app = test_app(backend.clone());

    let (status, body) = send(
        &app,
        "POST",
        "/api/analyze-category",
        Some(json!({ "ideaDescription": "Telegram бот для напоминаний" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["category"], "BOT");
    assert_eq!(body["confidence"], 0.92);
    assert_eq!(body["reasoning"], "Telegram");

    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].user.contains("Telegram бот для напоминаний"));
    assert!(!requests[0].user.contains("{{ideaDescription}}"));
}

#[tokio::test]
async fn test_analyze_category_low_confidence_asks_for_manual_choice() {
    let backend = ScriptedBackend::with_replies(vec![Ok(
        r#"{"category": "WEB_APP", "confidence": 0.4}"#.to_string(),
    )]);
    let app = test_app(backend);

    let (status, body) = send(
        &app,
        "POST",
        "/api/analyze-category",
        Some(json!({ "ideaDescription": "Что-то для заметок" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["category"].is_null());
    assert_eq!(body["confidence"], 0.0);
    assert_eq!(body["requiresManualSelection"], true);
}

#[tokio::test]
async fn test_upstream_failure_is_reported() {
    let backend = ScriptedBackend::with_replies(vec![Err(LlmError::RateLimited)]);
    let app = test_app(backend);

    let (status, body) = send(
        &app,
        "POST",
        "/api/generate-prd",
        Some(json!({
            "ideaDescription": "Сайт для записи к парикмахеру",
            "category": "WEB_APP",
            "allAnswers": { "audience": "клиенты" },
            "goal": "Для пользователей"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "UPSTREAM_ERROR");
}

#[tokio::test]
async fn test_adaptive_questions() {
    let backend = ScriptedBackend::with_replies(vec![Ok(r#"```json
[
  {"id": "auth", "question": "Нужна регистрация?", "type": "select", "options": ["Да", "Нет"], "required": true}
]
```"#
        .to_string())]);
    let app = test_app(backend.clone());

    let (status, body) = send(
        &app,
        "POST",
        "/api/generate-adaptive-questions",
        Some(json!({
            "ideaDescription": "Сайт для записи к парикмахеру",
            "category": "WEB_APP",
            "baseAnswers": { "audience": "клиенты" }
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["questions"][0]["id"], "auth");

    let prompt = &backend.requests()[0].user;
    assert!(prompt.contains("Для веб-приложения"));
    assert!(!prompt.contains("Для Telegram бота"));
}

#[tokio::test]
async fn test_adaptive_questions_require_all_parameters() {
    let app = idle_app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/generate-adaptive-questions",
        Some(json!({ "ideaDescription": "Сайт" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Не переданы все необходимые параметры");
}

#[tokio::test]
async fn test_generate_prompts_from_catalog() {
    let app = idle_app();

    let (status, body) = send(
        &app,
        "POST",
        "/api/generate-prompts",
        Some(json!({
            "prd": "# PRD: бот напоминаний",
            "goal": "Портфолио",
            "category": "BOT"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let prompts = &body["prompts"];
    for key in [
        "setup",
        "planning",
        "implementation",
        "deployVercel",
        "deployDocker",
        "deployLocal",
    ] {
        let text = prompts[key].as_str().unwrap();
        assert!(!text.contains("{{"), "{} left a directive: {}", key, text);
    }

    let setup = prompts["setup"].as_str().unwrap();
    assert!(setup.contains("# PRD: бот напоминаний"));
    assert!(setup.contains("Telegram бот"));
    assert!(setup.contains("тестовый фреймворк"));
    assert!(prompts["deployVercel"].as_str().unwrap().contains("webhook"));
}

#[tokio::test]
async fn test_generate_prompts_for_learning_skip_tests() {
    let app = idle_app();

    let (_, body) = send(
        &app,
        "POST",
        "/api/generate-prompts",
        Some(json!({
            "prd": "# PRD",
            "goal": "Обучение и практика",
            "category": "WEB_APP"
        })),
    )
    .await;

    let setup = body["prompts"]["setup"].as_str().unwrap();
    assert!(!setup.contains("тестовый фреймворк"));
    assert!(setup.contains("local"));
}

#[tokio::test]
async fn test_debug_prompt() {
    let app = idle_app();

    let (status, body) = send(
        &app,
        "POST",
        "/api/generate-debug-prompt",
        Some(json!({ "errorDescription": "TypeError: undefined is not a function" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let prompt = body["debugPrompt"].as_str().unwrap();
    assert!(prompt.contains("TypeError: undefined is not a function"));
    assert!(!prompt.contains("Контекст проекта"));
}

#[tokio::test]
async fn test_export_archive() {
    let app = idle_app();
    let (_, created) = send(&app, "POST", "/api/sessions", None).await;
    let id = created["id"].as_str().unwrap().to_string();

    send(
        &app,
        "PUT",
        &format!("/api/sessions/{}", id),
        Some(json!({
            "prd": "# PRD",
            "category": "WEB_APP",
            "prompts": { "setup": "setup text", "deployDocker": "docker text" }
        })),
    )
    .await;

    let (status, headers, bytes) =
        send_raw(&app, "GET", &format!("/api/export/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "application/zip");
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        format!("attachment; filename=\"cursor-guide-{}.zip\"", id).as_str()
    );

    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let names: Vec<String> = archive.file_names().map(str::to_string).collect();
    assert!(names.contains(&"PRD.md".to_string()));
    assert!(names.contains(&"setup-prompt.txt".to_string()));
    assert!(names.contains(&"deploy-instructions.txt".to_string()));
    assert!(!names.contains(&"planning-prompt.txt".to_string()));

    let mut deploy = String::new();
    archive
        .by_name("deploy-instructions.txt")
        .unwrap()
        .read_to_string(&mut deploy)
        .unwrap();
    assert_eq!(deploy, "# Docker\n\ndocker text");
}

#[tokio::test]
async fn test_export_unknown_session() {
    let app = idle_app();
    let uri = format!("/api/export/{}", uuid::Uuid::new_v4());
    let (status, body) = send(&app, "GET", &uri, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Сессия не найдена");
}

#[tokio::test]
async fn test_idea_to_plan_flow() {
    let backend = ScriptedBackend::with_replies(vec![
        Ok(r#"{"problem": "Забываю поливать цветы", "productVision": "Напоминалка о поливе", "keyFeatures": ["Список растений", "Напоминания"]}"#.to_string()),
        Ok(r#"[
            {"order": 1, "title": "Каркас", "prompt": "Создай проект", "dod": ["Запускается"], "estimatedMinutes": 20},
            {"order": 2, "title": "Растения", "prompt": "Добавь список", "dod": [], "estimatedMinutes": 40}
        ]"#.to_string()),
    ]);
    let app = test_app(backend.clone());

    let (status, analyzed) = send(
        &app,
        "POST",
        "/api/analyze-idea",
        Some(json!({ "idea": "Приложение, которое напоминает поливать комнатные растения" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(analyzed["success"], true);
    assert_eq!(analyzed["data"]["productVision"], "Напоминалка о поливе");
    let project_id = analyzed["data"]["projectId"].as_str().unwrap().to_string();

    let (status, plan) = send(
        &app,
        "POST",
        "/api/generate-plan",
        Some(json!({ "projectId": project_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(plan["data"]["totalSteps"], 2);
    assert!(backend.requests()[1].user.contains("- Напоминания"));

    let step_id = plan["data"]["steps"][0]["id"].as_str().unwrap().to_string();

    let (status, completed) =
        send(&app, "POST", &format!("/api/steps/{}/complete", step_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(completed["data"]["step"]["completed"], true);
    assert_eq!(completed["data"]["progress"]["completed"], 1);
    assert_eq!(completed["data"]["progress"]["total"], 2);

    let (_, step) = send(&app, "GET", &format!("/api/steps/step/{}", step_id), None).await;
    assert_eq!(step["data"]["title"], "Каркас");

    let (_, steps) = send(&app, "GET", &format!("/api/steps/{}", project_id), None).await;
    assert_eq!(steps["data"]["steps"].as_array().unwrap().len(), 2);
    assert_eq!(steps["data"]["progress"]["completed"], 1);

    let (_, uncompleted) =
        send(&app, "POST", &format!("/api/steps/{}/uncomplete", step_id), None).await;
    assert_eq!(uncompleted["data"]["step"]["completed"], false);
    assert_eq!(uncompleted["data"]["progress"]["completed"], 0);

    let (status, current) =
        send(&app, "GET", &format!("/api/generate-plan/{}", project_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(current["data"]["keyFeatures"][0], "Список растений");
}

#[tokio::test]
async fn test_short_idea_is_rejected() {
    let app = idle_app();
    let (status, body) = send(&app, "POST", "/api/analyze-idea", Some(json!({ "idea": "бот" }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Идея слишком короткая. Опишите подробнее (минимум 20 символов)"
    );
}

#[tokio::test]
async fn test_unknown_step_is_not_found() {
    let app = idle_app();
    let uri = format!("/api/steps/{}/complete", uuid::Uuid::new_v4());
    let (status, body) = send(&app, "POST", &uri, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Шаг не найден");
}

#[tokio::test]
async fn test_template_diagnostics() {
    let app = idle_app();

    send(
        &app,
        "POST",
        "/api/generate-debug-prompt",
        Some(json!({ "errorDescription": "panic" })),
    )
    .await;

    let (status, body) = send(&app, "GET", "/api/templates", None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["templates"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert!(names.contains(&"debug-prompt"));
    assert!(names.contains(&"generate-prd"));
    assert_eq!(body["cached"], 1);

    let (_, cleared) = send(&app, "POST", "/api/templates/cache/clear", None).await;
    assert_eq!(cleared["cleared"], 1);
}
