//! Custom JSON and form extractors that return errors in the API error shape

use axum::{
    Form, Json as AxumJson,
    extract::{
        FromRequest, Request,
        rejection::{FormRejection, JsonRejection as AxumJsonRejection},
    },
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;

use super::error::ApiErrorResponse;

/// Wrapper around `axum::Json` whose rejections are `{"message": ...}` bodies.
///
/// Bodies that are not valid JSON or do not match the expected shape are 400,
/// a missing `Content-Type: application/json` header is 415.
#[derive(Debug, Clone, Copy, Default)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    /// Consume the extractor and return the inner value
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> std::ops::Deref for Json<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// JSON rejection error that returns the API error format
#[derive(Debug)]
pub struct JsonRejection {
    status: StatusCode,
    message: String,
}

impl IntoResponse for JsonRejection {
    fn into_response(self) -> Response {
        let response = ApiErrorResponse {
            message: self.message,
        };

        (self.status, AxumJson(response)).into_response()
    }
}

impl<S, T> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = JsonRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match AxumJson::<T>::from_request(req, state).await {
            Ok(AxumJson(value)) => Ok(Json(value)),
            Err(rejection) => Err(JsonRejection {
                status: rejection_status(&rejection),
                message: format_rejection_message(&rejection),
            }),
        }
    }
}

fn rejection_status(rejection: &AxumJsonRejection) -> StatusCode {
    match rejection {
        AxumJsonRejection::JsonDataError(_) | AxumJsonRejection::JsonSyntaxError(_) => {
            StatusCode::BAD_REQUEST
        }
        other => other.status(),
    }
}

/// Format the rejection message to be more user-friendly
fn format_rejection_message(rejection: &AxumJsonRejection) -> String {
    match rejection {
        AxumJsonRejection::JsonDataError(err) => format!("Invalid JSON data: {}", err.body_text()),
        AxumJsonRejection::JsonSyntaxError(err) => {
            format!("Invalid JSON syntax: {}", err.body_text())
        }
        AxumJsonRejection::MissingJsonContentType(_) => {
            "Missing Content-Type header. Expected 'application/json'.".to_string()
        }
        AxumJsonRejection::BytesRejection(err) => {
            format!("Failed to read request body: {}", err.body_text())
        }
        _ => "Invalid JSON request".to_string(),
    }
}

/// Request body accepted as JSON or as `application/x-www-form-urlencoded`.
///
/// Form bodies are routed through axum's `Form`, everything else through
/// [`Json`], so a body with neither content type is rejected with 415.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonOrForm<T>(pub T);

impl<S, T> FromRequest<S> for JsonOrForm<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = JsonRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_form(req.headers()) {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(|rejection| JsonRejection {
                    status: form_rejection_status(&rejection),
                    message: format_form_rejection_message(&rejection),
                })?;

            return Ok(Self(value));
        }

        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|essence| {
            essence
                .trim()
                .eq_ignore_ascii_case("application/x-www-form-urlencoded")
        })
}

fn form_rejection_status(rejection: &FormRejection) -> StatusCode {
    match rejection {
        FormRejection::FailedToDeserializeForm(_)
        | FormRejection::FailedToDeserializeFormBody(_) => StatusCode::BAD_REQUEST,
        other => other.status(),
    }
}

fn format_form_rejection_message(rejection: &FormRejection) -> String {
    match rejection {
        FormRejection::FailedToDeserializeForm(err) => {
            format!("Invalid form data: {}", err.body_text())
        }
        FormRejection::FailedToDeserializeFormBody(err) => {
            format!("Invalid form data: {}", err.body_text())
        }
        FormRejection::BytesRejection(err) => {
            format!("Failed to read request body: {}", err.body_text())
        }
        _ => "Invalid form request".to_string(),
    }
}

impl<T> IntoResponse for Json<T>
where
    T: serde::Serialize,
{
    fn into_response(self) -> Response {
        AxumJson(self.0).into_response()
    }
}
