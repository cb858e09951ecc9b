use crate::external_connections::ExternalConnectivity;
use anyhow::Context;

/// A user known to the identity layer. Only the stable [id](TodoUser::id) is used
/// to decide ownership; the username can change underneath us.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct TodoUser {
    pub id: i32,
    pub username: String,
}

pub mod driven_ports {
    use super::*;

    pub trait UserReader: Sync {
        async fn user_by_username(
            &self,
            username: &str,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<TodoUser>, anyhow::Error>;
    }
}

/// Looks up the user behind an authenticated principal. Yields `None` when there is no
/// principal or when the identity layer never provisioned the user.
pub async fn resolve_user(
    username: Option<&str>,
    ext_cxn: &mut impl ExternalConnectivity,
    user_read: &impl driven_ports::UserReader,
) -> Result<Option<TodoUser>, anyhow::Error> {
    let Some(username) = username else {
        return Ok(None);
    };

    user_read
        .user_by_username(username, &mut *ext_cxn)
        .await
        .context("resolving the current user")
}
