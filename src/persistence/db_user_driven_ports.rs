use crate::domain;
use crate::domain::user::TodoUser;
use crate::external_connections::{ConnectionHandle, ExternalConnectivity};
use anyhow::{Context, Error};
use sqlx::{FromRow, query_as};

pub struct DbUserReader;

#[derive(FromRow)]
struct TodoUserRow {
    id: i32,
    username: String,
}

impl From<TodoUserRow> for TodoUser {
    fn from(value: TodoUserRow) -> Self {
        TodoUser {
            id: value.id,
            username: value.username,
        }
    }
}

impl domain::user::driven_ports::UserReader for DbUserReader {
    async fn user_by_username(
        &self,
        username: &str,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<TodoUser>, Error> {
        let mut cxn_handle = ext_cxn.database_cxn().await?;

        let user = query_as::<_, TodoUserRow>(
            "SELECT tu.id, tu.username FROM todo_user tu WHERE tu.username = $1",
        )
        .bind(username)
        .fetch_optional(cxn_handle.borrow_connection())
        .await
        .context("Fetching a user by username")?;

        Ok(user.map(TodoUser::from))
    }
}
