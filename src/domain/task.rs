use crate::domain::task::driven_ports::{TaskReader, TaskWriter};
use crate::domain::user::TodoUser;
use crate::external_connections::ExternalConnectivity;
use anyhow::Context;
use chrono::{Datelike, NaiveDate};
use derive_more::Display;
use regex::Regex;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

/// chrono format string for a task's due date (yyyy-MM-dd)
pub const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

static DUE_DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("Invalid due date regex pattern")
});

/// How urgent a task is. Variants are declared from most to least urgent, and the derived
/// ordering follows that declaration, so sorting ascending puts high priority tasks first.
#[derive(Display, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    #[display("high")]
    High,
    #[display("medium")]
    Medium,
    #[display("low")]
    Low,
}

impl Priority {
    /// Every priority in listing order
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("\"{0}\" is not a priority, expected one of high, medium, low")]
pub struct UnknownPriority(pub String);

impl FromStr for Priority {
    type Err = UnknownPriority;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        Priority::ALL
            .into_iter()
            .find(|priority| priority.to_string() == token)
            .ok_or_else(|| UnknownPriority(token.to_owned()))
    }
}

/// The user-editable content of a task
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct TaskDetails {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub due_date: String,
}

/// A persisted task. Values are immutable: edits go through [TodoTask::with_details],
/// which can never touch the ID or the owner.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct TodoTask {
    pub id: i32,
    pub owner_user_id: i32,
    pub details: TaskDetails,
}

impl TodoTask {
    /// Produces the edited version of this task
    pub fn with_details(self, details: TaskDetails) -> TodoTask {
        TodoTask { details, ..self }
    }

    pub fn is_owned_by(&self, user: &TodoUser) -> bool {
        self.owner_user_id == user.id
    }
}

/// A task on its way to the store. New tasks have no ID yet and are inserted;
/// existing tasks overwrite the stored content for their ID.
#[derive(PartialEq, Eq, Debug, Clone)]
pub enum TaskToSave {
    New {
        owner_user_id: i32,
        details: TaskDetails,
    },
    Existing(TodoTask),
}

/// Checks only the shape of a due date (four digit year, two digit month and day)
pub fn has_due_date_shape(date: &str) -> bool {
    DUE_DATE_PATTERN.is_match(date)
}

pub mod driven_ports {
    use super::*;

    pub trait TaskReader: Sync {
        /// Lists a user's tasks, most urgent first. Tasks of equal priority keep the order
        /// they were created in.
        async fn tasks_for_owner(
            &self,
            owner_user_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Vec<TodoTask>, anyhow::Error>;

        async fn task_by_id(
            &self,
            task_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<TodoTask>, anyhow::Error>;
    }

    pub trait TaskWriter: Sync {
        /// Inserts or updates a task, returning it as stored
        async fn save_task(
            &self,
            task: &TaskToSave,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<TodoTask, anyhow::Error>;

        /// Removes a task. Deleting a task that doesn't exist is not an error.
        async fn delete_task(
            &self,
            task_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<(), anyhow::Error>;
    }
}

pub mod driving_ports {
    use super::*;

    pub trait TaskPort {
        async fn tasks_for_user(
            &self,
            user: &TodoUser,
            ext_cxn: &mut impl ExternalConnectivity,
            task_read: &impl driven_ports::TaskReader,
        ) -> Result<Vec<TodoTask>, anyhow::Error>;
        async fn task_by_id(
            &self,
            task_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
            task_read: &impl driven_ports::TaskReader,
        ) -> Result<Option<TodoTask>, anyhow::Error>;
        async fn save_task(
            &self,
            task: &TaskToSave,
            ext_cxn: &mut impl ExternalConnectivity,
            task_write: &impl driven_ports::TaskWriter,
        ) -> Result<TodoTask, anyhow::Error>;
        async fn delete_task(
            &self,
            task_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
            task_write: &impl driven_ports::TaskWriter,
        ) -> Result<(), anyhow::Error>;
        /// True when the date is written as yyyy-MM-dd and names a real calendar day
        fn is_valid_date(&self, date: &str) -> bool;
    }
}

pub struct TaskService {}

impl driving_ports::TaskPort for TaskService {
    async fn tasks_for_user(
        &self,
        user: &TodoUser,
        ext_cxn: &mut impl ExternalConnectivity,
        task_read: &impl TaskReader,
    ) -> Result<Vec<TodoTask>, anyhow::Error> {
        task_read
            .tasks_for_owner(user.id, &mut *ext_cxn)
            .await
            .context("listing a user's tasks")
    }

    async fn task_by_id(
        &self,
        task_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
        task_read: &impl TaskReader,
    ) -> Result<Option<TodoTask>, anyhow::Error> {
        task_read
            .task_by_id(task_id, &mut *ext_cxn)
            .await
            .context("fetching a task")
    }

    async fn save_task(
        &self,
        task: &TaskToSave,
        ext_cxn: &mut impl ExternalConnectivity,
        task_write: &impl TaskWriter,
    ) -> Result<TodoTask, anyhow::Error> {
        task_write
            .save_task(task, &mut *ext_cxn)
            .await
            .context("saving a task")
    }

    async fn delete_task(
        &self,
        task_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
        task_write: &impl TaskWriter,
    ) -> Result<(), anyhow::Error> {
        task_write
            .delete_task(task_id, &mut *ext_cxn)
            .await
            .context("deleting a task")
    }

    fn is_valid_date(&self, date: &str) -> bool {
        // Year zero parses in chrono but isn't a calendar year
        has_due_date_shape(date)
            && NaiveDate::parse_from_str(date, DUE_DATE_FORMAT)
                .is_ok_and(|parsed| parsed.year() >= 1)
    }
}
