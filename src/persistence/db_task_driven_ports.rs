use crate::domain;
use crate::domain::task::{Priority, TaskToSave, TodoTask};
use crate::external_connections::{ConnectionHandle, ExternalConnectivity};
use anyhow::{Context, Error, anyhow};
use sqlx::{FromRow, query, query_as};

/// Ranks priorities in declaration order so "high" sorts ahead of "medium" and "low"
/// instead of alphabetically. IDs break ties, keeping creation order.
const OWNER_TASKS_QUERY: &str = "SELECT t.id, t.user_id, t.title, t.description, t.priority, t.due_date \
    FROM task t \
    WHERE t.user_id = $1 \
    ORDER BY CASE t.priority WHEN 'high' THEN 0 WHEN 'medium' THEN 1 ELSE 2 END, t.id";

pub struct DbTaskReader;

#[derive(FromRow)]
struct TaskRow {
    id: i32,
    user_id: i32,
    title: String,
    description: String,
    priority: String,
    due_date: String,
}

impl TryFrom<TaskRow> for TodoTask {
    type Error = anyhow::Error;

    fn try_from(value: TaskRow) -> Result<Self, Self::Error> {
        let priority: Priority = value
            .priority
            .parse()
            .with_context(|| format!("reading the priority of task {}", value.id))?;

        Ok(TodoTask {
            id: value.id,
            owner_user_id: value.user_id,
            details: domain::task::TaskDetails {
                title: value.title,
                description: value.description,
                priority,
                due_date: value.due_date,
            },
        })
    }
}

impl domain::task::driven_ports::TaskReader for DbTaskReader {
    async fn tasks_for_owner(
        &self,
        owner_user_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Vec<TodoTask>, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        query_as::<_, TaskRow>(OWNER_TASKS_QUERY)
            .bind(owner_user_id)
            .fetch_all(cxn.borrow_connection())
            .await
            .context("trying to fetch tasks for a user")?
            .into_iter()
            .map(TodoTask::try_from)
            .collect()
    }

    async fn task_by_id(
        &self,
        task_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<TodoTask>, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        query_as::<_, TaskRow>(
            "SELECT t.id, t.user_id, t.title, t.description, t.priority, t.due_date FROM task t WHERE t.id = $1",
        )
        .bind(task_id)
        .fetch_optional(cxn.borrow_connection())
        .await
        .context("trying to fetch a task by ID")?
        .map(TodoTask::try_from)
        .transpose()
    }
}

pub struct DbTaskWriter;

impl domain::task::driven_ports::TaskWriter for DbTaskWriter {
    async fn save_task(
        &self,
        task: &TaskToSave,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<TodoTask, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let saved_row = match task {
            TaskToSave::New {
                owner_user_id,
                details,
            } => query_as::<_, TaskRow>(
                "INSERT INTO task(user_id, title, description, priority, due_date) VALUES ($1, $2, $3, $4, $5) \
                RETURNING id, user_id, title, description, priority, due_date",
            )
            .bind(*owner_user_id)
            .bind(&details.title)
            .bind(&details.description)
            .bind(details.priority.to_string())
            .bind(&details.due_date)
            .fetch_one(cxn.borrow_connection())
            .await
            .context("trying to insert a new task into the database")?,

            // Owner is never written on update
            TaskToSave::Existing(existing) => query_as::<_, TaskRow>(
                "UPDATE task SET title = $1, description = $2, priority = $3, due_date = $4 WHERE id = $5 \
                RETURNING id, user_id, title, description, priority, due_date",
            )
            .bind(&existing.details.title)
            .bind(&existing.details.description)
            .bind(existing.details.priority.to_string())
            .bind(&existing.details.due_date)
            .bind(existing.id)
            .fetch_optional(cxn.borrow_connection())
            .await
            .context("trying to update a task in the database")?
            .ok_or_else(|| anyhow!("task {} no longer exists", existing.id))?,
        };

        TodoTask::try_from(saved_row)
    }

    async fn delete_task(
        &self,
        task_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<(), Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        query("DELETE FROM task WHERE id = $1")
            .bind(task_id)
            .execute(cxn.borrow_connection())
            .await
            .context("trying to remove a task from the database")?;

        Ok(())
    }
}
