use crate::domain;
use crate::routing_utils::ValidationErrorSchema;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

/// Field name used when reporting due date problems, matching the form's wire name
pub const DUE_DATE_FIELD: &str = "dueDate";

/// Message shown when a due date has the right shape but isn't on the calendar
pub const INVALID_DATE_MESSAGE: &str =
    "Invalid date format. Please enter the date in yyyy-MM-dd format.";

/// Task priority as it appears on the wire
#[derive(Serialize, ToSchema, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl From<domain::task::Priority> for Priority {
    fn from(value: domain::task::Priority) -> Self {
        match value {
            domain::task::Priority::High => Priority::High,
            domain::task::Priority::Medium => Priority::Medium,
            domain::task::Priority::Low => Priority::Low,
        }
    }
}

impl Priority {
    /// The choices offered on the add and edit forms, in listing order
    pub fn choices() -> Vec<Priority> {
        domain::task::Priority::ALL
            .into_iter()
            .map(Priority::from)
            .collect()
    }
}

/// The template a view model is meant to be rendered with
#[derive(Serialize, ToSchema, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ViewName {
    Tasks,
    AddTask,
    EditTask,
}

/// DTO for a task shown in the task list
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TodoTask {
    #[schema(example = 10)]
    pub id: i32,
    #[schema(example = "Renew passport")]
    pub title: String,
    #[schema(example = "Bring two photos to the post office")]
    pub description: String,
    pub priority: Priority,
    #[schema(example = "2024-06-01")]
    pub due_date: String,
}

impl From<domain::task::TodoTask> for TodoTask {
    fn from(value: domain::task::TodoTask) -> Self {
        TodoTask {
            id: value.id,
            title: value.details.title,
            description: value.details.description,
            priority: value.details.priority.into(),
            due_date: value.details.due_date,
        }
    }
}

/// View model for the "tasks" template
#[derive(Serialize, ToSchema)]
pub struct TaskListView {
    pub view: ViewName,
    pub tasks: Vec<TodoTask>,
}

impl From<Vec<domain::task::TodoTask>> for TaskListView {
    fn from(value: Vec<domain::task::TodoTask>) -> Self {
        TaskListView {
            view: ViewName::Tasks,
            tasks: value.into_iter().map(TodoTask::from).collect(),
        }
    }
}

/// Fields submitted from the add and edit task forms. Every field is optional at the
/// wire level so a missing field becomes a validation message instead of a parse failure.
#[derive(Debug, Default, Clone, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskForm {
    #[serde(default)]
    #[validate(required, custom = "not_blank")]
    #[schema(example = "Renew passport")]
    pub title: Option<String>,
    #[serde(default)]
    #[validate(required, custom = "not_blank")]
    #[schema(example = "Bring two photos to the post office")]
    pub description: Option<String>,
    #[serde(default)]
    #[validate(required, custom = "known_priority")]
    #[schema(example = "high")]
    pub priority: Option<String>,
    #[serde(default)]
    #[validate(required, custom = "due_date_shape")]
    #[schema(example = "2024-06-01")]
    pub due_date: Option<String>,
}

impl TaskForm {
    /// Runs field validation and converts the form into domain task details. Errors are
    /// keyed by the fields' wire names.
    pub fn details(&self) -> Result<domain::task::TaskDetails, ValidationErrors> {
        self.validate().map_err(as_form_errors)?;

        let priority = self
            .priority
            .as_deref()
            .and_then(|token| token.parse::<domain::task::Priority>().ok());
        match (&self.title, &self.description, priority, &self.due_date) {
            (Some(title), Some(description), Some(priority), Some(due_date)) => {
                Ok(domain::task::TaskDetails {
                    title: title.clone(),
                    description: description.clone(),
                    priority,
                    due_date: due_date.clone(),
                })
            }
            // validate() has already reported any missing field
            _ => Err(ValidationErrors::new()),
        }
    }
}

impl From<&domain::task::TodoTask> for TaskForm {
    fn from(value: &domain::task::TodoTask) -> Self {
        TaskForm {
            title: Some(value.details.title.clone()),
            description: Some(value.details.description.clone()),
            priority: Some(value.details.priority.to_string()),
            due_date: Some(value.details.due_date.clone()),
        }
    }
}

/// Wire name of a form field and the message shown when it's left out
fn form_field(field: &'static str) -> (&'static str, Option<&'static str>) {
    match field {
        "title" => ("title", Some("Title is required")),
        "description" => ("description", Some("Description is required")),
        "priority" => ("priority", Some("Priority is required")),
        "due_date" => (DUE_DATE_FIELD, Some("Due date is required")),
        other => (other, None),
    }
}

/// Re-keys derive output by wire name and fills in the missing-field messages
fn as_form_errors(errors: ValidationErrors) -> ValidationErrors {
    let mut form_errors = ValidationErrors::new();
    for (field, kind) in errors.into_errors() {
        let ValidationErrorsKind::Field(field_errors) = kind else {
            continue;
        };
        let (wire_name, required_message) = form_field(field);

        for mut error in field_errors {
            if error.code == "required" {
                error.message = required_message.map(Cow::Borrowed);
            }
            form_errors.add(wire_name, error);
        }
    }

    form_errors
}

fn message_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(message_error("blank", "must not be blank"));
    }

    Ok(())
}

fn known_priority(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<domain::task::Priority>()
        .map(|_| ())
        .map_err(|_| message_error("priority", "Priority must be one of high, medium, low"))
}

fn due_date_shape(value: &str) -> Result<(), ValidationError> {
    if !domain::task::has_due_date_shape(value) {
        return Err(message_error(
            "pattern",
            "Due date must be in yyyy-MM-dd format",
        ));
    }

    Ok(())
}

/// Builds the error reported when a due date isn't a real calendar date
pub fn invalid_date_errors() -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.add(DUE_DATE_FIELD, message_error("date", INVALID_DATE_MESSAGE));
    errors
}

/// View model for the "add-task" and "edit-task" templates
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskFormView {
    pub view: ViewName,
    /// Only present when editing
    #[schema(example = 10)]
    pub task_id: Option<i32>,
    pub task: TaskForm,
    pub priorities: Vec<Priority>,
    #[schema(value_type = Option<Object>)]
    pub errors: Option<ValidationErrorSchema>,
}

impl TaskFormView {
    pub fn add(task: TaskForm, errors: Option<ValidationErrors>) -> Self {
        TaskFormView {
            view: ViewName::AddTask,
            task_id: None,
            task,
            priorities: Priority::choices(),
            errors: errors.map(ValidationErrorSchema::from),
        }
    }

    pub fn edit(task_id: i32, task: TaskForm, errors: Option<ValidationErrors>) -> Self {
        TaskFormView {
            view: ViewName::EditTask,
            task_id: Some(task_id),
            task,
            priorities: Priority::choices(),
            errors: errors.map(ValidationErrorSchema::from),
        }
    }
}
