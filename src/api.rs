use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;

use crate::app::{App, GenerationOutcome, GenerationRequest};
use crate::content::ContentService;
use crate::error::SessionError;
use crate::models::{ItemKind, Mood};

#[derive(Clone)]
pub struct ApiState {
    pub app: Arc<Mutex<App>>,
    pub content: Arc<ContentService>,
}

impl ApiState {
    pub fn new(app: App, content: ContentService) -> Self {
        Self {
            app: Arc::new(Mutex::new(app)),
            content: Arc::new(content),
        }
    }
}

pub fn app_router(state: ApiState) -> Router {
    Router::new()
        .route("/api/session", get(get_session))
        .route("/api/worlds", post(generate_world))
        .route("/api/worlds/adapt", post(adapt_world))
        .route("/api/worlds/cancel", post(cancel_generation))
        .route("/api/worlds/previous", post(previous_world))
        .route("/api/worlds/next", post(next_world))
        .route("/api/screen/upload", post(go_to_upload))
        .route("/api/screen/world", post(back_to_world))
        .route("/api/reviews/due", get(get_due_reviews))
        .route("/api/compendium", get(get_compendium))
        .route("/api/mastery", post(update_mastery))
        .route("/api/boss/attempt", post(attempt_boss))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn session_response(app: &mut App, status: StatusCode) -> Response {
    let now = Instant::now();
    app.tick(now);
    (status, Json(app.snapshot(now))).into_response()
}

fn error_response(err: SessionError) -> Response {
    let status = match err {
        SessionError::Validation(_) => StatusCode::BAD_REQUEST,
        SessionError::GenerationInProgress => StatusCode::CONFLICT,
        SessionError::NoCurrentWorld => StatusCode::NOT_FOUND,
    };
    (status, Json(json!({ "error": err.to_string() }))).into_response()
}

async fn get_session(State(state): State<ApiState>) -> Response {
    let mut app = state.app.lock().await;
    session_response(&mut app, StatusCode::OK)
}

#[derive(Deserialize)]
struct GenerateRequestBody {
    notes: String,
    #[serde(default)]
    mood: Mood,
}

/// Runs a generation on its own task without holding the session lock. The
/// task owns the session handle, so a client hanging up cannot leave the
/// session stuck in its loading state.
async fn run_generation(state: &ApiState, request: GenerationRequest) -> Response {
    let state = state.clone();
    let task = tokio::spawn(async move {
        let result = request.run(&state.content).await;

        let mut app = state.app.lock().await;
        match app.finish_generation(request.id, result) {
            GenerationOutcome::Applied => session_response(&mut app, StatusCode::OK),
            GenerationOutcome::Failed(_) => session_response(&mut app, StatusCode::BAD_GATEWAY),
            GenerationOutcome::Stale => session_response(&mut app, StatusCode::CONFLICT),
        }
    });

    match task.await {
        Ok(response) => response,
        Err(e) => {
            log::error!("Generation task failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "generation task failed" })),
            )
                .into_response()
        }
    }
}

async fn generate_world(
    State(state): State<ApiState>,
    Json(payload): Json<GenerateRequestBody>,
) -> Response {
    let request = {
        let mut app = state.app.lock().await;
        match app.begin_generate(&payload.notes, payload.mood) {
            Ok(request) => request,
            Err(e) => return error_response(e),
        }
    };
    run_generation(&state, request).await
}

async fn adapt_world(State(state): State<ApiState>) -> Response {
    let request = {
        let mut app = state.app.lock().await;
        match app.begin_adapt() {
            Ok(request) => request,
            Err(e) => return error_response(e),
        }
    };
    run_generation(&state, request).await
}

async fn cancel_generation(State(state): State<ApiState>) -> Response {
    let mut app = state.app.lock().await;
    app.cancel_generation();
    session_response(&mut app, StatusCode::OK)
}

async fn previous_world(State(state): State<ApiState>) -> Response {
    let mut app = state.app.lock().await;
    app.previous_world();
    session_response(&mut app, StatusCode::OK)
}

async fn next_world(State(state): State<ApiState>) -> Response {
    let mut app = state.app.lock().await;
    app.next_world();
    session_response(&mut app, StatusCode::OK)
}

async fn go_to_upload(State(state): State<ApiState>) -> Response {
    let mut app = state.app.lock().await;
    app.go_to_upload();
    session_response(&mut app, StatusCode::OK)
}

async fn back_to_world(State(state): State<ApiState>) -> Response {
    let mut app = state.app.lock().await;
    app.back_to_world();
    session_response(&mut app, StatusCode::OK)
}

async fn get_due_reviews(State(state): State<ApiState>) -> impl IntoResponse {
    let app = state.app.lock().await;
    Json(app.due_reviews())
}

async fn get_compendium(State(state): State<ApiState>) -> impl IntoResponse {
    let app = state.app.lock().await;
    Json(app.compendium())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MasteryRequest {
    item_id: String,
    success: bool,
    kind: ItemKind,
}

/// Unknown items answer `null`; the session is left untouched.
async fn update_mastery(
    State(state): State<ApiState>,
    Json(payload): Json<MasteryRequest>,
) -> impl IntoResponse {
    let mut app = state.app.lock().await;
    Json(app.handle_update_mastery(&payload.item_id, payload.success, payload.kind))
}

async fn attempt_boss(State(state): State<ApiState>) -> impl IntoResponse {
    let mut app = state.app.lock().await;
    Json(json!({ "completedQuests": app.attempt_boss() }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use chrono::NaiveDate;
    use serde_json::Value;
    use std::future::Future;
    use std::task::Poll;
    use tower::ServiceExt;

    fn state() -> ApiState {
        let app = App::new().with_today(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
        ApiState::new(app, ContentService::offline())
    }

    fn router() -> Router {
        app_router(state())
    }

    async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(match body {
                Some(body) => Body::from(body.to_string()),
                None => Body::empty(),
            })
            .unwrap();
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_generate_then_review() {
        let router = router();

        let (status, session) = send(
            &router,
            "POST",
            "/api/worlds",
            Some(json!({ "notes": "Newton's laws describe motion", "mood": "sleepy" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(session["screen"], "world");
        assert_eq!(session["mood"], "sleepy");
        assert_eq!(session["history"]["len"], 1);
        let quest_id = session["world"]["zones"][0]["quest"]["id"].as_str().unwrap().to_string();

        let (status, outcome) = send(
            &router,
            "POST",
            "/api/mastery",
            Some(json!({ "itemId": quest_id, "success": true, "kind": "quest" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(outcome["masteryLevel"], 1);
        assert_eq!(outcome["nextReviewDate"], "2024-01-12");

        let (_, due) = send(&router, "GET", "/api/reviews/due", None).await;
        let due = due.as_array().unwrap();
        assert!(due.iter().all(|entry| entry["item"]["id"] != quest_id.as_str()));
    }

    #[tokio::test]
    async fn test_blank_notes_are_bad_request() {
        let router = router();
        let (status, body) = send(&router, "POST", "/api/worlds", Some(json!({ "notes": "  " }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], crate::app::EMPTY_NOTES_MESSAGE);

        let (_, session) = send(&router, "GET", "/api/session", None).await;
        assert_eq!(session["screen"], "upload");
        assert_eq!(session["error"], crate::app::EMPTY_NOTES_MESSAGE);
    }

    #[tokio::test]
    async fn test_adapt_without_world_is_not_found() {
        let router = router();
        let (status, _) = send(&router, "POST", "/api/worlds/adapt", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_item_returns_null() {
        let router = router();
        send(&router, "POST", "/api/worlds", Some(json!({ "notes": "Some notes" }))).await;

        let (status, outcome) = send(
            &router,
            "POST",
            "/api/mastery",
            Some(json!({ "itemId": "missing", "success": true, "kind": "treasure" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(outcome, Value::Null);

        let (_, session) = send(&router, "GET", "/api/session", None).await;
        assert_eq!(session["player"]["xp"], 0);
    }

    #[tokio::test]
    async fn test_dropped_request_still_finishes_generation() {
        let state = state();
        let body = GenerateRequestBody {
            notes: "Mitochondria make ATP".to_string(),
            mood: Mood::Motivated,
        };

        // One poll starts the generation, then the client goes away.
        let mut handler = Box::pin(generate_world(State(state.clone()), Json(body)));
        std::future::poll_fn(|cx| {
            let _ = handler.as_mut().poll(cx);
            Poll::Ready(())
        })
        .await;
        drop(handler);

        for _ in 0..100 {
            if !state.app.lock().await.is_generating() {
                break;
            }
            tokio::task::yield_now().await;
        }
        {
            let app = state.app.lock().await;
            assert!(!app.is_generating());
            assert_eq!(app.history().len(), 1);
        }

        let router = app_router(state);
        let (status, session) = send(
            &router,
            "POST",
            "/api/worlds",
            Some(json!({ "notes": "Ribosomes build proteins" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(session["generating"], false);
        assert_eq!(session["history"]["len"], 2);
    }
}
