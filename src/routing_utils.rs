use axum::extract::rejection::FormRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_macros::FromRequest;

use serde::Serialize;
use tracing::error;
use utoipa::openapi::{RefOr, Schema};
use utoipa::{openapi, ToResponse, ToSchema};

use validator::ValidationErrors;

/// Contains diagnostic information about an API failure
#[derive(Serialize, Debug, ToResponse)]
#[response(examples(
    ("Internal Failure" = (
        summary = "Something unexpected went wrong inside the server (500)",
        value = json!({
            "error_code": "internal_error",
            "error_description": "Could not access data to complete your request",
            "extra_info": null
        })
    )),

    ("Malformed Form" = (
        summary = "Unreadable form body passed to server (400)",
        value = json!({
            "error_code": "invalid_form",
            "error_description": "The passed request body was not a readable form submission.",
            "extra_info": "Failed to deserialize form body: invalid utf-8 sequence"
        })
    ))
))]
pub struct BasicErrorResponse {
    pub error_code: String,
    pub error_description: String,
    pub extra_info: Option<ExtraInfo>,
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(untagged)]
pub enum ExtraInfo {
    Message(String),
}

/// Stand-in OpenAPI schema for [ValidationErrors] which just provides an empty object
#[derive(Serialize, Debug)]
#[serde(transparent)]
pub struct ValidationErrorSchema(pub ValidationErrors);

impl<'schem> ToSchema<'schem> for ValidationErrorSchema {
    fn schema() -> (&'schem str, RefOr<Schema>) {
        (
            "ValidationErrorSchema",
            openapi::ObjectBuilder::new().into(),
        )
    }
}

impl From<ValidationErrors> for ValidationErrorSchema {
    fn from(value: ValidationErrors) -> Self {
        Self(value)
    }
}

/// Response type for failures talking to the task store. The cause is logged and the
/// caller gets a generic 500.
pub struct GenericErrorResponse(pub anyhow::Error);

impl IntoResponse for GenericErrorResponse {
    fn into_response(self) -> Response {
        error!("Could not complete request: {:#}", self.0);

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            axum::Json(BasicErrorResponse {
                error_code: "internal_error".into(),
                error_description: "Could not access data to complete your request".into(),
                extra_info: None,
            }),
        )
            .into_response()
    }
}

impl From<anyhow::Error> for GenericErrorResponse {
    fn from(value: anyhow::Error) -> Self {
        Self(value)
    }
}

/// Wrapper for [axum::Form] which customizes the error response to use our
/// data structure for API errors
#[derive(FromRequest)]
#[from_request(via(axum::Form), rejection(FormErrorResponse))]
pub struct Form<T>(pub T);

/// Response type representing form bodies which couldn't be read at all
pub struct FormErrorResponse {
    parse_problem: String,
}

impl From<FormRejection> for FormErrorResponse {
    fn from(value: FormRejection) -> Self {
        FormErrorResponse {
            parse_problem: value.body_text(),
        }
    }
}

impl IntoResponse for FormErrorResponse {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            axum::Json(BasicErrorResponse {
                error_code: "invalid_form".into(),
                error_description: "The passed request body was not a readable form submission."
                    .into(),
                extra_info: Some(ExtraInfo::Message(self.parse_problem)),
            }),
        )
            .into_response()
    }
}
