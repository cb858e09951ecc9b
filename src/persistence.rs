pub mod db_task_driven_ports;
pub mod db_user_driven_ports;

use crate::external_connections;
use crate::external_connections::ConnectionHandle;
use sqlx::migrate::MigrateError;
use sqlx::pool::PoolConnection;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgConnection, PgPool, Postgres};
use std::time::Duration;

/// Upper bound on pooled database connections
const MAX_DB_CONNECTIONS: u32 = 20;
/// How long a request waits for a free pooled connection before failing
const DB_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(2);

/// Data structure which owns clients for connecting to external systems.
/// Allows business logic to be agnostic of the external systems it communicates with
/// so driven adapters can easily be swapped out for other implementations
#[derive(Clone)]
pub struct ExternalConnectivity {
    db: PgPool,
}

impl ExternalConnectivity {
    pub fn new(db: PgPool) -> Self {
        ExternalConnectivity { db }
    }
}

/// A handle from ExternalConnectivity which holds a pooled database connection
pub struct PoolConnectionHandle {
    active_connection: PoolConnection<Postgres>,
}

impl ConnectionHandle for PoolConnectionHandle {
    fn borrow_connection(&mut self) -> &mut PgConnection {
        &mut self.active_connection
    }
}

impl external_connections::ExternalConnectivity for ExternalConnectivity {
    type DbHandle<'cxn_borrow> = PoolConnectionHandle;

    async fn database_cxn(&mut self) -> Result<Self::DbHandle<'_>, anyhow::Error> {
        let handle = PoolConnectionHandle {
            active_connection: self.db.acquire().await?,
        };

        Ok(handle)
    }
}

/// Builds the connection pool for the task store
pub async fn connect_sqlx(db_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(MAX_DB_CONNECTIONS)
        .acquire_timeout(DB_ACQUIRE_TIMEOUT)
        .connect(db_url)
        .await
}

/// Brings the schema up to date with the migrations bundled into the binary
pub async fn run_migrations(db: &PgPool) -> Result<(), MigrateError> {
    sqlx::migrate!().run(db).await
}
