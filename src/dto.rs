pub mod task;

pub use task::*;

use crate::routing_utils::{BasicErrorResponse, ExtraInfo};
use utoipa::OpenApi;

/// OpenAPI components for every DTO the API sends or receives
#[derive(OpenApi)]
#[openapi(
    components(
        schemas(
            task::Priority,
            task::ViewName,
            task::TodoTask,
            task::TaskListView,
            task::TaskForm,
            task::TaskFormView,
            ExtraInfo,
        ),
        responses(BasicErrorResponse),
    )
)]
pub struct OpenApiSchemas;
