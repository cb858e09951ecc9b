use crate::api::principal::Principal;
use crate::domain::task::driven_ports::{TaskReader, TaskWriter};
use crate::domain::task::driving_ports::TaskPort;
use crate::domain::task::{TaskDetails, TaskToSave, TodoTask};
use crate::domain::user::driven_ports::UserReader;
use crate::domain::user::{self, TodoUser};
use crate::dto::{TaskForm, TaskFormView, TaskListView};
use crate::external_connections::ExternalConnectivity;
use crate::persistence::db_task_driven_ports::{DbTaskReader, DbTaskWriter};
use crate::persistence::db_user_driven_ports::DbUserReader;
use crate::routing_utils::{BasicErrorResponse, Form, GenericErrorResponse};
use crate::{AppState, SharedData, domain, dto};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::OpenApi;
use validator::ValidationErrors;

#[derive(OpenApi)]
#[openapi(paths(
    list_tasks,
    show_add_form,
    add_task,
    show_edit_form,
    edit_task,
    delete_task
))]
/// Defines the OpenAPI documentation for the task list pages
pub struct TaskApi;
/// Constant used to group task endpoints in OpenAPI documentation
pub const TASK_API_GROUP: &str = "Tasks";

const TASK_LIST_PATH: &str = "/tasks";
const LOGIN_PATH: &str = "/login";

/// Creates a router for endpoints under the "/tasks" group of APIs
pub fn task_routes() -> Router<Arc<SharedData>> {
    Router::new()
        .route(
            "/",
            get(|State(app_state): AppState, principal: Principal| async move {
                let mut ext_cxn = app_state.ext_cxn.clone();
                let task_service = domain::task::TaskService {};

                list_tasks(
                    principal.username(),
                    &mut ext_cxn,
                    &DbUserReader,
                    &task_service,
                    &DbTaskReader,
                )
                .await
            }),
        )
        .route(
            "/add",
            get(show_add_form).post(
                |State(app_state): AppState,
                 principal: Principal,
                 Form(form): Form<TaskForm>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let task_service = domain::task::TaskService {};

                    add_task(
                        principal.username(),
                        form,
                        &mut ext_cxn,
                        &DbUserReader,
                        &task_service,
                        &DbTaskWriter,
                    )
                    .await
                },
            ),
        )
        .route(
            "/edit/:task_id",
            get(
                |State(app_state): AppState,
                 principal: Principal,
                 Path(raw_task_id): Path<String>| async move {
                    let Some(task_id) = parse_task_id(&raw_task_id) else {
                        return Ok(to_task_list());
                    };
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let task_service = domain::task::TaskService {};

                    show_edit_form(
                        principal.username(),
                        task_id,
                        &mut ext_cxn,
                        &DbUserReader,
                        &task_service,
                        &DbTaskReader,
                    )
                    .await
                },
            )
            .post(
                |State(app_state): AppState,
                 principal: Principal,
                 Path(raw_task_id): Path<String>,
                 Form(form): Form<TaskForm>| async move {
                    let Some(task_id) = parse_task_id(&raw_task_id) else {
                        return Ok(to_task_list());
                    };
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let task_service = domain::task::TaskService {};

                    edit_task(
                        principal.username(),
                        task_id,
                        form,
                        &mut ext_cxn,
                        &DbUserReader,
                        &task_service,
                        &DbTaskReader,
                        &DbTaskWriter,
                    )
                    .await
                },
            ),
        )
        .route(
            "/delete/:task_id",
            get(
                |State(app_state): AppState,
                 principal: Principal,
                 Path(raw_task_id): Path<String>| async move {
                    let Some(task_id) = parse_task_id(&raw_task_id) else {
                        return Ok(to_task_list());
                    };
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let task_service = domain::task::TaskService {};

                    delete_task(
                        principal.username(),
                        task_id,
                        &mut ext_cxn,
                        &DbUserReader,
                        &task_service,
                        &DbTaskReader,
                        &DbTaskWriter,
                    )
                    .await
                },
            ),
        )
}

/// Task IDs that aren't numbers can't name any task
fn parse_task_id(raw_task_id: &str) -> Option<i32> {
    let parsed = raw_task_id.parse::<i32>().ok();
    if parsed.is_none() {
        warn!(raw_task_id, "Ignoring malformed task ID");
    }

    parsed
}

fn to_task_list() -> Response {
    Redirect::to(TASK_LIST_PATH).into_response()
}

fn to_login() -> Response {
    Redirect::to(LOGIN_PATH).into_response()
}

fn rerender_form(view: TaskFormView) -> Response {
    (StatusCode::BAD_REQUEST, Json(view)).into_response()
}

/// Field validation first, then the calendar check on the due date
fn validated_details(
    form: &TaskForm,
    task_service: &impl TaskPort,
) -> Result<TaskDetails, ValidationErrors> {
    let details = form.details()?;
    if !task_service.is_valid_date(&details.due_date) {
        return Err(dto::invalid_date_errors());
    }

    Ok(details)
}

/// Fetches a task only if it exists and belongs to the user. Missing and foreign tasks
/// are indistinguishable to the caller.
async fn owned_task(
    task_id: i32,
    user: &TodoUser,
    ext_cxn: &mut impl ExternalConnectivity,
    task_service: &impl TaskPort,
    task_read: &impl TaskReader,
) -> Result<Option<TodoTask>, anyhow::Error> {
    let task = task_service
        .task_by_id(task_id, &mut *ext_cxn, task_read)
        .await?;

    match task {
        Some(task) if task.is_owned_by(user) => Ok(Some(task)),
        Some(_) => {
            warn!(task_id, user_id = user.id, "User tried to reach someone else's task");
            Ok(None)
        }
        None => {
            info!(task_id, "Task does not exist");
            Ok(None)
        }
    }
}

#[utoipa::path(
    get,
    path = "/tasks",
    tag = TASK_API_GROUP,
    params(
        ("x-authenticated-user" = Option<String>, Header, description = "Username supplied by the identity layer"),
    ),
    responses(
        (status = 200, description = "The signed in user's tasks, most urgent first", body = TaskListView),
        (status = 303, description = "Nobody is signed in, redirects to /login"),
        (status = 500, response = BasicErrorResponse),
    ),
)]
#[tracing::instrument(skip_all)]
/// Shows every task the current user owns
async fn list_tasks(
    username: Option<&str>,
    ext_cxn: &mut impl ExternalConnectivity,
    user_read: &impl UserReader,
    task_service: &impl TaskPort,
    task_read: &impl TaskReader,
) -> Result<Response, GenericErrorResponse> {
    let Some(current_user) = user::resolve_user(username, &mut *ext_cxn, user_read).await? else {
        info!("No signed in user, sending to login");
        return Ok(to_login());
    };

    let tasks = task_service
        .tasks_for_user(&current_user, &mut *ext_cxn, task_read)
        .await?;
    info!(user_id = current_user.id, task_count = tasks.len(), "Listing tasks");

    Ok(Json(TaskListView::from(tasks)).into_response())
}

#[utoipa::path(
    get,
    path = "/tasks/add",
    tag = TASK_API_GROUP,
    responses(
        (status = 200, description = "An empty task form", body = TaskFormView),
    ),
)]
#[tracing::instrument]
/// Shows the form for creating a task
async fn show_add_form() -> Json<TaskFormView> {
    Json(TaskFormView::add(TaskForm::default(), None))
}

#[utoipa::path(
    post,
    path = "/tasks/add",
    tag = TASK_API_GROUP,
    request_body(content = TaskForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Task was created, redirects to /tasks. Redirects to /login if nobody is signed in."),
        (status = 400, description = "The form had problems and is shown again with messages", body = TaskFormView),
        (status = 500, response = BasicErrorResponse),
    ),
)]
#[tracing::instrument(skip_all)]
/// Creates a task owned by the current user
async fn add_task(
    username: Option<&str>,
    form: TaskForm,
    ext_cxn: &mut impl ExternalConnectivity,
    user_read: &impl UserReader,
    task_service: &impl TaskPort,
    task_write: &impl TaskWriter,
) -> Result<Response, GenericErrorResponse> {
    let details = match validated_details(&form, task_service) {
        Ok(details) => details,
        Err(validation_errors) => {
            info!("New task failed validation");
            return Ok(rerender_form(TaskFormView::add(form, Some(validation_errors))));
        }
    };

    let Some(current_user) = user::resolve_user(username, &mut *ext_cxn, user_read).await? else {
        return Ok(to_login());
    };

    let new_task = TaskToSave::New {
        owner_user_id: current_user.id,
        details,
    };
    let created = task_service
        .save_task(&new_task, &mut *ext_cxn, task_write)
        .await?;
    info!(task_id = created.id, user_id = current_user.id, "Created task");

    Ok(to_task_list())
}

#[utoipa::path(
    get,
    path = "/tasks/edit/{task_id}",
    tag = TASK_API_GROUP,
    params(
        ("task_id" = i32, Path, description = "ID of the task to edit"),
    ),
    responses(
        (status = 200, description = "The task form, filled in with the task's current content", body = TaskFormView),
        (status = 303, description = "The task doesn't exist or isn't yours (redirects to /tasks), or nobody is signed in (redirects to /login)"),
        (status = 500, response = BasicErrorResponse),
    ),
)]
#[tracing::instrument(skip_all, fields(task_id = task_id))]
/// Shows the edit form for one of the current user's tasks
async fn show_edit_form(
    username: Option<&str>,
    task_id: i32,
    ext_cxn: &mut impl ExternalConnectivity,
    user_read: &impl UserReader,
    task_service: &impl TaskPort,
    task_read: &impl TaskReader,
) -> Result<Response, GenericErrorResponse> {
    let Some(current_user) = user::resolve_user(username, &mut *ext_cxn, user_read).await? else {
        return Ok(to_login());
    };
    let Some(task) = owned_task(task_id, &current_user, &mut *ext_cxn, task_service, task_read).await?
    else {
        return Ok(to_task_list());
    };

    Ok(Json(TaskFormView::edit(task.id, TaskForm::from(&task), None)).into_response())
}

#[utoipa::path(
    post,
    path = "/tasks/edit/{task_id}",
    tag = TASK_API_GROUP,
    params(
        ("task_id" = i32, Path, description = "ID of the task to edit"),
    ),
    request_body(content = TaskForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Redirects to /tasks whether or not the task was yours to edit. Redirects to /login if nobody is signed in."),
        (status = 400, description = "The form had problems and is shown again with messages", body = TaskFormView),
        (status = 500, response = BasicErrorResponse),
    ),
)]
#[tracing::instrument(skip_all, fields(task_id = task_id))]
#[allow(clippy::too_many_arguments)]
/// Replaces the content of one of the current user's tasks. The ID and owner never change.
async fn edit_task(
    username: Option<&str>,
    task_id: i32,
    form: TaskForm,
    ext_cxn: &mut impl ExternalConnectivity,
    user_read: &impl UserReader,
    task_service: &impl TaskPort,
    task_read: &impl TaskReader,
    task_write: &impl TaskWriter,
) -> Result<Response, GenericErrorResponse> {
    let details = match validated_details(&form, task_service) {
        Ok(details) => details,
        Err(validation_errors) => {
            info!("Task edit failed validation");
            return Ok(rerender_form(TaskFormView::edit(
                task_id,
                form,
                Some(validation_errors),
            )));
        }
    };

    let Some(current_user) = user::resolve_user(username, &mut *ext_cxn, user_read).await? else {
        return Ok(to_login());
    };
    let Some(existing) =
        owned_task(task_id, &current_user, &mut *ext_cxn, task_service, task_read).await?
    else {
        return Ok(to_task_list());
    };

    let edited = TaskToSave::Existing(existing.with_details(details));
    task_service
        .save_task(&edited, &mut *ext_cxn, task_write)
        .await?;
    info!("Updated task");

    Ok(to_task_list())
}

#[utoipa::path(
    get,
    path = "/tasks/delete/{task_id}",
    tag = TASK_API_GROUP,
    params(
        ("task_id" = i32, Path, description = "ID of the task to delete"),
    ),
    responses(
        (status = 303, description = "Redirects to /tasks whether or not anything was deleted. Redirects to /login if nobody is signed in."),
        (status = 500, response = BasicErrorResponse),
    ),
)]
#[tracing::instrument(skip_all, fields(task_id = task_id))]
/// Deletes one of the current user's tasks. Anything else is silently ignored.
async fn delete_task(
    username: Option<&str>,
    task_id: i32,
    ext_cxn: &mut impl ExternalConnectivity,
    user_read: &impl UserReader,
    task_service: &impl TaskPort,
    task_read: &impl TaskReader,
    task_write: &impl TaskWriter,
) -> Result<Response, GenericErrorResponse> {
    let Some(current_user) = user::resolve_user(username, &mut *ext_cxn, user_read).await? else {
        return Ok(to_login());
    };

    if let Some(task) =
        owned_task(task_id, &current_user, &mut *ext_cxn, task_service, task_read).await?
    {
        task_service
            .delete_task(task.id, &mut *ext_cxn, task_write)
            .await?;
        info!("Deleted task");
    }

    Ok(to_task_list())
}
