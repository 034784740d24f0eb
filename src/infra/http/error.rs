use std::borrow::Cow;
use std::error::Error as StdError;

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::admin::posts::AdminPostError;
use crate::application::error::ErrorReport;
use crate::application::posts::PostQueryError;
use crate::application::repos::RepoError;

#[derive(Debug, Serialize)]
pub struct ApiErrorBody<'a> {
    pub error: &'a str,
}

/// An HTTP error with a public message and an internal report.
///
/// Only `message` reaches the client; the report travels as a response
/// extension for [`log_responses`](super::middleware::log_responses).
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: Cow<'static, str>,
    report: ErrorReport,
}

impl ApiError {
    pub fn new(
        source: &'static str,
        status: StatusCode,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        let message = message.into();
        let report = ErrorReport::from_message(source, status, message.to_string());
        Self {
            status,
            message,
            report,
        }
    }

    pub fn from_error(
        source: &'static str,
        status: StatusCode,
        message: impl Into<Cow<'static, str>>,
        error: &dyn StdError,
    ) -> Self {
        Self {
            status,
            message: message.into(),
            report: ErrorReport::from_error(source, status, error),
        }
    }

    pub fn bad_request(source: &'static str, message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(source, StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(source: &'static str, message: &'static str) -> Self {
        Self::new(source, StatusCode::NOT_FOUND, message)
    }

    pub fn unauthorized(source: &'static str) -> Self {
        Self::new(source, StatusCode::UNAUTHORIZED, "Unauthorized")
    }

    pub fn internal(source: &'static str, error: &dyn StdError) -> Self {
        Self::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error",
            error,
        )
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (
            self.status,
            Json(ApiErrorBody {
                error: &self.message,
            }),
        )
            .into_response();
        response
            .headers_mut()
            .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
        self.report.attach(&mut response);
        response
    }
}

pub fn repo_error_to_http(source: &'static str, err: RepoError) -> ApiError {
    match &err {
        RepoError::NotFound => ApiError::from_error(
            source,
            StatusCode::NOT_FOUND,
            "Resource not found",
            &err,
        ),
        RepoError::Duplicate { .. } => ApiError::from_error(
            source,
            StatusCode::BAD_REQUEST,
            "Duplicate record",
            &err,
        ),
        RepoError::InvalidInput { .. } => {
            ApiError::from_error(source, StatusCode::BAD_REQUEST, "Invalid input", &err)
        }
        RepoError::Timeout => ApiError::from_error(
            source,
            StatusCode::SERVICE_UNAVAILABLE,
            "Database timeout",
            &err,
        ),
        RepoError::Persistence(_) => ApiError::internal(source, &err),
    }
}

pub fn admin_post_error_to_http(source: &'static str, err: AdminPostError) -> ApiError {
    match err {
        AdminPostError::Validation { ref message, .. } => {
            let message = message.clone();
            ApiError::from_error(source, StatusCode::BAD_REQUEST, message, &err)
        }
        AdminPostError::Conflict { .. } => ApiError::from_error(
            source,
            StatusCode::BAD_REQUEST,
            "Slug already exists",
            &err,
        ),
        AdminPostError::NotFound => ApiError::not_found(source, "Post not found"),
        AdminPostError::Repo(repo) => repo_error_to_http(source, repo),
    }
}

pub fn post_query_error_to_http(source: &'static str, err: PostQueryError) -> ApiError {
    ApiError::internal(source, &err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes();
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn error_body_hides_internal_detail() {
        let err = RepoError::from_persistence("password authentication failed for user");
        let response = repo_error_to_http("test", err).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).unwrap(),
            "no-store"
        );
        let report = response
            .extensions()
            .get::<ErrorReport>()
            .cloned()
            .expect("report attached");
        assert!(report.messages[0].contains("password authentication failed"));

        let body = body_json(response).await;
        assert_eq!(body, serde_json::json!({ "error": "Internal server error" }));
    }

    #[tokio::test]
    async fn validation_surfaces_the_field_message() {
        let err = AdminPostError::validation("title", "title is required");
        let response = admin_post_error_to_http("test", err).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "title is required");
    }

    #[test]
    fn conflict_and_not_found_statuses() {
        let conflict = admin_post_error_to_http(
            "test",
            AdminPostError::Conflict {
                slug: "taken".into(),
            },
        );
        assert_eq!(conflict.status(), StatusCode::BAD_REQUEST);
        assert_eq!(conflict.message(), "Slug already exists");

        let missing = admin_post_error_to_http("test", AdminPostError::NotFound);
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        assert_eq!(missing.message(), "Post not found");
    }
}
