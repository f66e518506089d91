use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use models::errors::FieldError;
use serde::Serialize;
use service::errors::ServiceError;
use thiserror::Error;
use tracing::error;

/// JSON error body: `{"error": title, "message": detail?, "fields": [...]?}`
#[derive(Debug, Serialize)]
pub struct JsonApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldError>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, error: &'static str, message: Option<String>) -> Self {
        Self { status, error, message, fields: Vec::new() }
    }

    pub fn with_fields(mut self, fields: Vec<FieldError>) -> Self {
        self.fields = fields;
        self
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(e) => {
                Self::Service(ServiceError::Validation(vec![field_error_from_decoder(&e.body_text())]))
            }
            JsonRejection::MissingJsonContentType(e) => Self::UnsupportedMediaType(e.body_text()),
            other => Self::BadRequest(other.body_text()),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        let mut field = field_error_from_decoder(&rejection.body_text());
        // serde_urlencoded 不带字段路径
        if field.field == "body" {
            field.field = "query".into();
        }
        Self::Service(ServiceError::Validation(vec![field]))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self {
            ApiError::Service(ServiceError::Validation(fields)) => {
                let summary = fields
                    .iter()
                    .map(|f| format!("{}: {}", f.field, f.reason))
                    .collect::<Vec<_>>()
                    .join("; ");
                JsonApiError::new(StatusCode::UNPROCESSABLE_ENTITY, "Validation Error", Some(summary)).with_fields(fields)
            }
            // 非法 id 与不存在的 id 对调用方表现一致：404
            ApiError::Service(ServiceError::NotFound(id) | ServiceError::MalformedId(id)) => {
                JsonApiError::new(StatusCode::NOT_FOUND, "Not Found", Some(format!("Student {id} not found")))
            }
            ApiError::Service(ServiceError::Store(msg)) => {
                error!(error = %msg, "document store failure");
                JsonApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", None)
            }
            ApiError::BadRequest(msg) => JsonApiError::new(StatusCode::BAD_REQUEST, "Bad Request", Some(msg)),
            ApiError::UnsupportedMediaType(msg) => {
                JsonApiError::new(StatusCode::UNSUPPORTED_MEDIA_TYPE, "Unsupported Media Type", Some(msg))
            }
        };
        body.into_response()
    }
}

/// Turn a decoder message such as
/// `Failed to deserialize the JSON body into the target type: address: missing field `city` at line 1 column 40`
/// into `{field: "address.city", reason: "missing field"}`.
pub(crate) fn field_error_from_decoder(text: &str) -> FieldError {
    let detail = match text.split_once(": ") {
        Some((head, rest)) if head.starts_with("Failed to deserialize") => rest,
        _ => text,
    };
    let detail = detail.rsplit_once(" at line ").map_or(detail, |(head, _)| head);

    let (path, reason) = match detail.split_once(": ") {
        Some((head, rest)) if !head.is_empty() && !head.contains(char::is_whitespace) => (Some(head), rest),
        _ => (None, detail),
    };

    if let Some(missing) = reason.strip_prefix("missing field `").and_then(|r| r.split('`').next()) {
        let field = match path {
            Some(p) => format!("{p}.{missing}"),
            None => missing.to_string(),
        };
        return FieldError::new(field, "missing field");
    }

    FieldError::new(path.unwrap_or("body"), reason)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decoder_message_with_root_missing_field() {
        let f = field_error_from_decoder(
            "Failed to deserialize the JSON body into the target type: missing field `name` at line 1 column 52",
        );
        assert_eq!(f, FieldError::new("name", "missing field"));
    }

    #[test]
    fn decoder_message_with_nested_missing_field() {
        let f = field_error_from_decoder(
            "Failed to deserialize the JSON body into the target type: address: missing field `city` at line 1 column 40",
        );
        assert_eq!(f, FieldError::new("address.city", "missing field"));
    }

    #[test]
    fn decoder_message_with_wrong_type() {
        let f = field_error_from_decoder(
            "Failed to deserialize the JSON body into the target type: age: invalid type: string \"ten\", expected i64 at line 1 column 30",
        );
        assert_eq!(f, FieldError::new("age", "invalid type: string \"ten\", expected i64"));
    }

    #[test]
    fn decoder_message_without_path_falls_back_to_body() {
        let f = field_error_from_decoder("Failed to deserialize query string: invalid type: sequence");
        assert_eq!(f.field, "body");
        assert_eq!(f.reason, "invalid type: sequence");
    }

    #[test]
    fn store_errors_hide_driver_detail() {
        let resp = ApiError::Service(ServiceError::Store("connection refused to 10.0.0.7".into())).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn malformed_id_maps_to_not_found() {
        let resp = ApiError::Service(ServiceError::MalformedId("xyz".into())).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
