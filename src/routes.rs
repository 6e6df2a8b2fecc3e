use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{ExamOverride, StudentProfile};
use crate::profile::{profile_for_student, profile_for_user};
use crate::schedule;
use crate::state::AppState;

pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// Profile of the student behind the current session.
pub async fn my_profile_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StudentProfile>, ApiError> {
    let user = state.session().require_student(state.store.as_ref()).await?;

    profile_for_user(state.store.as_ref(), &user.id.to_string())
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Student profile not found"))
}

pub async fn student_profile_handler(
    State(state): State<Arc<AppState>>,
    Path(student_id): Path<String>,
) -> Result<Json<StudentProfile>, ApiError> {
    profile_for_student(state.store.as_ref(), &student_id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Student not found"))
}

pub async fn list_exams_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ExamOverride>>, ApiError> {
    let teacher = state.session().current_teacher(state.store.as_ref()).await?;
    let exams = schedule::list_exams(state.store.as_ref(), teacher.id).await?;
    Ok(Json(exams))
}

pub async fn add_exam_handler(
    State(state): State<Arc<AppState>>,
    Json(exam): Json<ExamOverride>,
) -> Result<Json<ExamOverride>, ApiError> {
    let teacher = state.session().current_teacher(state.store.as_ref()).await?;
    let exam = schedule::add_exam(state.store.as_ref(), teacher.id, exam).await?;
    Ok(Json(exam))
}

pub async fn update_exam_handler(
    State(state): State<Arc<AppState>>,
    Path(exam_id): Path<Uuid>,
    Json(exam): Json<ExamOverride>,
) -> Result<Json<ExamOverride>, ApiError> {
    let teacher = state.session().current_teacher(state.store.as_ref()).await?;
    let exam = schedule::update_exam(state.store.as_ref(), teacher.id, exam_id, exam).await?;
    Ok(Json(exam))
}

pub async fn delete_exam_handler(
    State(state): State<Arc<AppState>>,
    Path(exam_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let teacher = state.session().current_teacher(state.store.as_ref()).await?;
    schedule::delete_exam(state.store.as_ref(), teacher.id, exam_id).await?;
    Ok(Json(json!({ "message": "Exam deleted successfully" })))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{header::CONTENT_TYPE, Method, Request},
        Router,
    };
    use chrono::NaiveDate;
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::memory::MemoryStore;
    use crate::models::Role;
    use crate::server::router;

    fn app(store: Arc<MemoryStore>, user_id: Uuid) -> Router {
        let mut config = Config::default();
        config.session.user_id = user_id.to_string();
        router(AppState::with_store(config, store))
    }

    async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                request = request.header(CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = app.oneshot(request.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    fn teacher_app() -> (Arc<MemoryStore>, Router) {
        let store = Arc::new(MemoryStore::new());
        let user = store.add_user("Kiara Patel", "kiara@example.com", None, Role::Teacher);
        store.add_teacher(user.id);
        let app = app(store.clone(), user.id);
        (store, app)
    }

    #[tokio::test]
    async fn my_profile_returns_session_student() {
        let store = Arc::new(MemoryStore::new());
        let user = store.add_user("Avery Lee", "avery@example.com", Some("CSE"), Role::Student);
        let student = store.add_student(user.id, 2, &["CS201"], None);
        store.add_record(student.id, NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(), "1", true);

        let (status, body) = send(
            app(store, user.id),
            Method::GET,
            "/students/me/profile",
            None,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], student.id.to_string());
        assert_eq!(body["attendance"]["percentage"], 100.0);
        assert_eq!(body["attendance"]["forecasted_score"], 5);
        assert_eq!(body["recent_attendance"], body["attendance"]["recent_attendance"]);
    }

    #[tokio::test]
    async fn my_profile_rejects_teachers() {
        let (_, app) = teacher_app();
        let (status, body) = send(app, Method::GET, "/students/me/profile", None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["detail"], "Not a student");
    }

    #[tokio::test]
    async fn my_profile_checks_the_stored_role() {
        let store = Arc::new(MemoryStore::new());
        let user = store.add_user("Kiara Patel", "kiara@example.com", None, Role::Teacher);
        // enrollment data exists, but the account itself is a teacher
        store.add_student(user.id, 2, &["CS201"], None);

        let (status, body) = send(app(store, user.id), Method::GET, "/students/me/profile", None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["detail"], "Not a student");
    }

    #[tokio::test]
    async fn unknown_session_user_is_not_found() {
        let store = Arc::new(MemoryStore::new());

        let (status, body) = send(
            app(store, Uuid::new_v4()),
            Method::GET,
            "/students/me/profile",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "User not found");
    }

    #[tokio::test]
    async fn my_profile_without_student_record_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let user = store.add_user("Avery Lee", "avery@example.com", None, Role::Student);

        let (status, _) = send(
            app(store, user.id),
            Method::GET,
            "/students/me/profile",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn profile_by_student_id() {
        let store = Arc::new(MemoryStore::new());
        let user = store.add_user("Jules Moreno", "jules@example.com", None, Role::Student);
        let student = store.add_student(user.id, 3, &[], Some("EEE"));
        let app = app(store, Uuid::new_v4());

        let uri = format!("/students/{}/profile", student.id);
        let (status, body) = send(app.clone(), Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["branch"], "EEE");

        let uri = format!("/students/{}/profile", Uuid::new_v4());
        let (status, body) = send(app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Student not found");
    }

    #[tokio::test]
    async fn malformed_student_id_is_a_server_error() {
        let store = Arc::new(MemoryStore::new());
        let app = app(store, Uuid::new_v4());

        let (status, _) = send(app, Method::GET, "/students/abc/profile", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn exam_lifecycle() {
        let (_, app) = teacher_app();

        let (status, created) = send(
            app.clone(),
            Method::POST,
            "/api/schedule/exams",
            Some(json!({ "date": "2024-12-25", "name": "Christmas" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(created["name"], "Christmas");
        let exam_id = created["id"].as_str().expect("generated id").to_string();

        let (status, exams) = send(app.clone(), Method::GET, "/api/schedule/exams", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(exams.as_array().map(Vec::len), Some(1));

        let uri = format!("/api/schedule/exams/{exam_id}");
        let (status, updated) = send(
            app.clone(),
            Method::PUT,
            &uri,
            Some(json!({ "date": "2024-01-02", "name": "Updated Name" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["id"], exam_id);
        assert_eq!(updated["name"], "Updated Name");

        let (status, deleted) = send(app.clone(), Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(deleted["message"], "Exam deleted successfully");

        let (status, _) = send(app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn updating_unknown_exam_is_not_found() {
        let (_, app) = teacher_app();
        let uri = format!("/api/schedule/exams/{}", Uuid::new_v4());

        let (status, body) = send(
            app,
            Method::PUT,
            &uri,
            Some(json!({ "date": "2024-01-02", "name": "Ghost" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Exam not found");
    }

    #[tokio::test]
    async fn exams_require_a_teacher_account() {
        let store = Arc::new(MemoryStore::new());
        let user = store.add_user("Avery Lee", "avery@example.com", None, Role::Student);
        store.add_teacher(user.id);
        let app = app(store, user.id);

        let (status, body) = send(app, Method::GET, "/api/schedule/exams", None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["detail"], "Not a teacher");
    }
}
