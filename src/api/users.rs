//! User CRUD endpoints
//!
//! ```text
//! GET    /users
//! GET    /users/{id}
//! POST   /users        {"name":"Charlie","age":30,"email":"charlie@example.com"}
//! PUT    /users/{id}   {"name":"Charlie Updated"}
//! PATCH  /users/{id}
//! DELETE /users/{id}
//! ```
//!
//! Create and update bodies may be JSON or `application/x-www-form-urlencoded`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use serde_json::Number;
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, JsonOrForm, NumberField};
use crate::domain::user::{Patch, User, UserUpdate};
use crate::infrastructure::user::CreateUserRequest;

/// Request to create a user
///
/// Every field is optional at the wire level; the service reports missing
/// required fields with a single validation message.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserApiRequest {
    pub name: Option<String>,
    pub age: Option<NumberField>,
    pub address: Option<String>,
    pub profession: Option<String>,
    pub email: Option<String>,
}

impl From<CreateUserApiRequest> for CreateUserRequest {
    fn from(request: CreateUserApiRequest) -> Self {
        Self {
            name: request.name,
            age: request.age.map(NumberField::into_inner),
            address: request.address,
            profession: request.profession,
            email: request.email,
        }
    }
}

/// Request to update a user. Omitted fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserApiRequest {
    #[serde(default)]
    pub name: Patch<String>,
    #[serde(default)]
    pub age: Patch<NumberField>,
    #[serde(default)]
    pub address: Patch<String>,
    #[serde(default)]
    pub profession: Patch<String>,
    #[serde(default)]
    pub email: Patch<String>,
}

impl From<UpdateUserApiRequest> for UserUpdate {
    fn from(request: UpdateUserApiRequest) -> Self {
        Self {
            name: request.name,
            age: request.age.map(NumberField::into_inner),
            address: request.address,
            profession: request.profession,
            email: request.email,
        }
    }
}

/// User response body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub age: Number,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profession: Option<String>,
    pub email: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().as_str().to_string(),
            name: user.name().to_string(),
            age: user.age().clone(),
            address: user.address().map(String::from),
            profession: user.profession().map(String::from),
            email: user.email().to_string(),
        }
    }
}

fn user_not_found() -> ApiError {
    ApiError::not_found("User not found")
}

/// GET /users
pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    debug!("Listing users");

    let users = state.user_service.list().await?;

    Ok(Json(users.iter().map(UserResponse::from).collect()))
}

/// GET /users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    debug!(user_id = %user_id, "Getting user");

    let user = state
        .user_service
        .get(&user_id)
        .await?
        .ok_or_else(user_not_found)?;

    Ok(Json(UserResponse::from(&user)))
}

/// POST /users
pub async fn create_user(
    State(state): State<AppState>,
    JsonOrForm(request): JsonOrForm<CreateUserApiRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    debug!("Creating user");

    let user = state.user_service.create(request.into()).await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// PUT /users/{id} and PATCH /users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    JsonOrForm(request): JsonOrForm<UpdateUserApiRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    debug!(user_id = %user_id, "Updating user");

    let user = state.user_service.update(&user_id, request.into()).await?;

    Ok(Json(UserResponse::from(&user)))
}

/// DELETE /users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    debug!(user_id = %user_id, "Deleting user");

    if state.user_service.delete(&user_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(user_not_found())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Method, Request, header::CONTENT_TYPE};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::api::router::create_router;
    use crate::domain::DomainError;
    use crate::domain::user::MockUserRepository;
    use crate::infrastructure::user::UserService;

    fn test_app() -> Router {
        create_router(crate::create_in_memory_app_state())
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        let body = match body {
            Some(value) => {
                builder = builder.header(CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

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

    async fn create_charlie(app: &Router) -> Value {
        let (status, body) = send(
            app,
            Method::POST,
            "/users",
            Some(json!({"name": "Charlie", "age": 30, "email": "charlie@example.com"})),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        body
    }

    #[tokio::test]
    async fn test_create_user_echoes_fields() {
        let app = test_app();

        let (status, body) = send(
            &app,
            Method::POST,
            "/users",
            Some(json!({
                "name": "Dana",
                "age": 41,
                "address": "2 High St",
                "profession": "Pilot",
                "email": "dana@example.com"
            })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert!(!body["id"].as_str().unwrap().is_empty());
        assert_eq!(body["name"], "Dana");
        assert_eq!(body["age"], 41);
        assert_eq!(body["address"], "2 High St");
        assert_eq!(body["profession"], "Pilot");
        assert_eq!(body["email"], "dana@example.com");
    }

    #[tokio::test]
    async fn test_create_user_missing_required_fields() {
        let app = test_app();

        for body in [
            json!({"age": 30, "email": "a@example.com"}),
            json!({"name": "A", "email": "a@example.com"}),
            json!({"name": "A", "age": 30}),
        ] {
            let (status, response) = send(&app, Method::POST, "/users", Some(body)).await;

            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(
                response,
                json!({"message": "Name, age, and email are required."})
            );
        }

        let (_, users) = send(&app, Method::GET, "/users", None).await;
        assert_eq!(users, json!([]));
    }

    #[tokio::test]
    async fn test_create_user_malformed_email() {
        let app = test_app();

        let (status, body) = send(
            &app,
            Method::POST,
            "/users",
            Some(json!({"name": "A", "age": 30, "email": "not-an-email"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().contains("not-an-email"));
    }

    #[tokio::test]
    async fn test_create_user_wrong_age_type() {
        let app = test_app();

        let (status, body) = send(
            &app,
            Method::POST,
            "/users",
            Some(json!({"name": "A", "age": "thirty", "email": "a@example.com"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn test_create_user_duplicate_email() {
        let app = test_app();
        create_charlie(&app).await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/users",
            Some(json!({"name": "Other", "age": 22, "email": "charlie@example.com"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().contains("charlie@example.com"));

        let (_, users) = send(&app, Method::GET, "/users", None).await;
        let matching = users
            .as_array()
            .unwrap()
            .iter()
            .filter(|u| u["email"] == "charlie@example.com")
            .count();
        assert_eq!(matching, 1);
    }

    #[tokio::test]
    async fn test_get_user() {
        let app = test_app();
        let created = create_charlie(&app).await;
        let id = created["id"].as_str().unwrap();

        let (status, body) = send(&app, Method::GET, &format!("/users/{}", id), None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, created);
    }

    #[tokio::test]
    async fn test_get_unknown_user() {
        let app = test_app();
        let unknown = uuid::Uuid::new_v4();

        for uri in [format!("/users/{}", unknown), "/users/garbage".to_string()] {
            let (status, body) = send(&app, Method::GET, &uri, None).await;

            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(body, json!({"message": "User not found"}));
        }
    }

    #[tokio::test]
    async fn test_update_user_changes_only_supplied_fields() {
        let app = test_app();
        let created = create_charlie(&app).await;
        let uri = format!("/users/{}", created["id"].as_str().unwrap());

        let (status, body) = send(&app, Method::PUT, &uri, Some(json!({"name": "X"}))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], created["id"]);
        assert_eq!(body["name"], "X");
        assert_eq!(body["age"], 30);
        assert_eq!(body["email"], "charlie@example.com");
    }

    #[tokio::test]
    async fn test_patch_applies_falsy_values() {
        let app = test_app();
        let created = create_charlie(&app).await;
        let uri = format!("/users/{}", created["id"].as_str().unwrap());

        let (status, body) = send(
            &app,
            Method::PATCH,
            &uri,
            Some(json!({"age": 0, "address": ""})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["age"], 0);
        assert_eq!(body["address"], "");
        assert_eq!(body["name"], "Charlie");
    }

    #[tokio::test]
    async fn test_update_user_validation_failure() {
        let app = test_app();
        let created = create_charlie(&app).await;
        let uri = format!("/users/{}", created["id"].as_str().unwrap());

        for body in [
            json!({"email": "broken"}),
            json!({"name": ""}),
            json!({"age": null}),
        ] {
            let (status, response) = send(&app, Method::PUT, &uri, Some(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(response["message"].is_string());
        }

        let (_, stored) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(stored, created);
    }

    #[tokio::test]
    async fn test_update_unknown_user() {
        let app = test_app();
        let uri = format!("/users/{}", uuid::Uuid::new_v4());

        let (status, body) = send(&app, Method::PUT, &uri, Some(json!({"email": "broken"}))).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"message": "User not found"}));
    }

    #[tokio::test]
    async fn test_delete_user() {
        let app = test_app();
        let created = create_charlie(&app).await;
        let uri = format!("/users/{}", created["id"].as_str().unwrap());

        let (status, body) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, Value::Null);

        let (status, _) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, users) = send(&app, Method::GET, "/users", None).await;
        assert_eq!(users, json!([]));

        let (status, body) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"message": "User not found"}));
    }

    #[tokio::test]
    async fn test_end_to_end_scenario() {
        let app = test_app();

        let created = create_charlie(&app).await;
        let id = created["id"].as_str().unwrap().to_string();
        assert!(!id.is_empty());
        let uri = format!("/users/{}", id);

        let (status, users) = send(&app, Method::GET, "/users", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(users.as_array().unwrap().iter().any(|u| u["id"] == id.as_str()));

        let (status, fetched) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, created);

        let (status, updated) = send(
            &app,
            Method::PUT,
            &uri,
            Some(json!({"name": "Charlie Updated"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["name"], "Charlie Updated");
        assert_eq!(updated["age"], 30);
        assert_eq!(updated["email"], "charlie@example.com");

        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_storage_error_is_internal_server_error() {
        let mut repository = MockUserRepository::new();
        repository
            .expect_list()
            .returning(|| Err(DomainError::storage("connection refused")));
        repository
            .expect_get()
            .returning(|_| Err(DomainError::storage("connection refused")));
        repository
            .expect_delete()
            .returning(|_| Err(DomainError::storage("connection refused")));

        let service = UserService::new(Arc::new(repository));
        let app = create_router(AppState::new(Arc::new(service)));
        let uri = format!("/users/{}", uuid::Uuid::new_v4());

        for (method, uri) in [
            (Method::GET, "/users".to_string()),
            (Method::GET, uri.clone()),
            (Method::DELETE, uri),
        ] {
            let (status, body) = send(&app, method, &uri, None).await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body, json!({"message": "connection refused"}));
        }
    }

    async fn send_form(app: &Router, method: Method, uri: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_create_user_fractional_and_negative_age() {
        let app = test_app();

        let (status, body) = send(
            &app,
            Method::POST,
            "/users",
            Some(json!({"name": "A", "age": 30.5, "email": "a@b.co"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["age"], 30.5);

        let (status, body) = send(
            &app,
            Method::POST,
            "/users",
            Some(json!({"name": "B", "age": -1, "email": "b@b.co"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["age"], -1);
    }

    #[tokio::test]
    async fn test_create_user_from_form() {
        let app = test_app();

        let (status, body) = send_form(
            &app,
            Method::POST,
            "/users",
            "name=Charlie&age=30&email=charlie%40example.com&profession=Chef",
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["name"], "Charlie");
        assert_eq!(body["age"], 30);
        assert_eq!(body["email"], "charlie@example.com");
        assert_eq!(body["profession"], "Chef");
        assert!(body.get("address").is_none());
    }

    #[tokio::test]
    async fn test_create_user_from_form_missing_fields() {
        let app = test_app();

        let (status, body) = send_form(&app, Method::POST, "/users", "name=Charlie").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"message": "Name, age, and email are required."}));
    }

    #[tokio::test]
    async fn test_update_user_from_form() {
        let app = test_app();
        let created = create_charlie(&app).await;
        let uri = format!("/users/{}", created["id"].as_str().unwrap());

        let (status, body) =
            send_form(&app, Method::PUT, &uri, "name=Charlie+Updated&age=30.5").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Charlie Updated");
        assert_eq!(body["age"], 30.5);
        assert_eq!(body["email"], "charlie@example.com");

        let (status, body) = send_form(&app, Method::PATCH, &uri, "age=soon").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().starts_with("Invalid form data"));
    }

    #[test]
    fn test_update_request_distinguishes_absent_and_null() {
        let request: UpdateUserApiRequest =
            serde_json::from_str(r#"{"address": null, "age": 0}"#).unwrap();

        assert!(request.name.is_absent());
        assert_eq!(request.address, Patch::Null);
        assert_eq!(request.age, Patch::Value(NumberField(Number::from(0))));
    }

    #[test]
    fn test_user_response_omits_missing_optional_fields() {
        let user = User::new(
            crate::domain::UserId::generate(),
            "Charlie",
            30,
            "charlie@example.com",
        );

        let json = serde_json::to_value(UserResponse::from(&user)).unwrap();
        assert!(json.get("address").is_none());
        assert!(json.get("profession").is_none());
        assert_eq!(json["id"], user.id().as_str());
    }
}
