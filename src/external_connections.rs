use sqlx::PgConnection;

/// Gives business logic access to the systems outside this service without tying it to
/// the concrete clients used to reach them
pub trait ExternalConnectivity: Sync {
    type DbHandle<'cxn_borrow>: ConnectionHandle + Send
    where
        Self: 'cxn_borrow;

    /// Acquires a handle which can be used to run queries against the database
    async fn database_cxn(&mut self) -> Result<Self::DbHandle<'_>, anyhow::Error>;
}

/// A live database connection acquired from [ExternalConnectivity]
pub trait ConnectionHandle {
    fn borrow_connection(&mut self) -> &mut PgConnection;
}
