//! Student handlers
//!
//! Each handler validates its payload, performs exactly one logical store
//! operation, and maps the outcome into an HTTP response. Storage failures
//! are logged and translated here; nothing below this layer touches HTTP.

use crate::storage::StoreError;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gradebook_types::{Student, StudentPayload, ValidationError};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    error: String,
}

/// Handler-level outcome for anything that is not a record.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("student not found")]
    NotFound,

    #[error("no students")]
    NoStudents,

    #[error("{0}")]
    Internal(String),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => ApiError::NotFound,
            StoreError::Empty => ApiError::NoStudents,
            StoreError::Storage(e) => {
                tracing::error!("Storage operation failed: {}", e);
                ApiError::Internal(e.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound | ApiError::NoStudents => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<StudentPayload>,
) -> Result<(StatusCode, Json<Student>), ApiError> {
    payload.validate()?;
    let student = state.store.create(payload).await?;
    Ok((StatusCode::CREATED, Json(student)))
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Student>>, ApiError> {
    Ok(Json(state.store.list().await?))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Student>, ApiError> {
    Ok(Json(state.store.get(id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<StudentPayload>,
) -> Result<Json<Student>, ApiError> {
    payload.validate()?;
    Ok(Json(state.store.update(id, payload).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.store.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn topper(State(state): State<AppState>) -> Result<Json<Student>, ApiError> {
    Ok(Json(state.store.topper().await?))
}

#[cfg(test)]
mod tests {
    use crate::storage::MemoryStore;
    use crate::AppState;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app() -> Router {
        let state = AppState {
            store: Arc::new(MemoryStore::new()),
        };
        crate::api_routes().with_state(state)
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = match body {
            Some(json) => Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn alice() -> Value {
        json!({"name": "Alice", "age": 20, "course": "Systems", "score": 92.5})
    }

    fn bob() -> Value {
        json!({"name": "Bob", "age": 22, "course": "Data Science", "score": 88.0})
    }

    #[tokio::test]
    async fn create_returns_201_with_the_assigned_id() {
        let app = app();

        let (status, body) = send(&app, "POST", "/students", Some(alice())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["name"], "Alice");
        assert!(body["id"].as_i64().is_some());
    }

    #[tokio::test]
    async fn create_rejects_out_of_range_scores() {
        let app = app();

        let payload = json!({"name": "Zed", "age": 30, "course": "Systems", "score": 101.0});
        let (status, body) = send(&app, "POST", "/students", Some(payload)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap().contains("score"));

        // Nothing was stored.
        let (_, listed) = send(&app, "GET", "/students", None).await;
        assert_eq!(listed.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn get_unknown_id_is_404() {
        let app = app();

        let (status, body) = send(&app, "GET", "/students/42", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "student not found");
    }

    #[tokio::test]
    async fn update_unknown_id_is_404() {
        let app = app();

        let (status, _) = send(&app, "PUT", "/students/42", Some(alice())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_returns_204_and_is_404_afterwards() {
        let app = app();

        let (_, created) = send(&app, "POST", "/students", Some(alice())).await;
        let id = created["id"].as_i64().unwrap();

        let (status, body) = send(&app, "DELETE", &format!("/students/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, Value::Null);

        let (status, _) = send(&app, "DELETE", &format!("/students/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn topper_on_an_empty_store_is_404() {
        let app = app();

        let (status, body) = send(&app, "GET", "/students/topper", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "no students");
    }

    // The literal route must win over "/students/:id" once records exist.
    #[tokio::test]
    async fn topper_route_is_not_shadowed_by_the_id_route() {
        let app = app();

        send(&app, "POST", "/students", Some(alice())).await;
        let (status, body) = send(&app, "GET", "/students/topper", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Alice");
    }

    #[tokio::test]
    async fn full_scenario_over_http() {
        let app = app();

        // Create Alice (92.5) and Bob (88.0).
        let (status, alice_rec) = send(&app, "POST", "/students", Some(alice())).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, bob_rec) = send(&app, "POST", "/students", Some(bob())).await;
        assert_eq!(status, StatusCode::CREATED);
        let alice_id = alice_rec["id"].as_i64().unwrap();
        let bob_id = bob_rec["id"].as_i64().unwrap();

        // Both listed.
        let (status, listed) = send(&app, "GET", "/students", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed.as_array().unwrap().len(), 2);

        // Fetch by id.
        let (status, got) = send(&app, "GET", &format!("/students/{alice_id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(got["name"], "Alice");

        // Raise Bob to 89.0; Alice still tops.
        let updated = json!({"name": "Bobby", "age": 23, "course": "Data Science", "score": 89.0});
        let (status, bob_rec) =
            send(&app, "PUT", &format!("/students/{bob_id}"), Some(updated)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(bob_rec["name"], "Bobby");
        assert_eq!(bob_rec["score"], 89.0);

        let (status, top) = send(&app, "GET", "/students/topper", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(top["name"], "Alice");

        // Delete Alice and confirm she is gone.
        let (status, _) = send(&app, "DELETE", &format!("/students/{alice_id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, "GET", &format!("/students/{alice_id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
