use crate::app_env::test::TEST_DB_URL;
use crate::persistence;
use dotenv::dotenv;
use lazy_static::lazy_static;
use rand::{Rng, thread_rng};
use sqlx::{Connection, PgConnection, PgPool};
use std::env;
use std::future::Future;
use tokio::runtime::Runtime;

lazy_static! {
    static ref TOKIO_RT: Runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Tokio runtime failed to initialize");
}

/// Creates a uniquely named, empty database so tests never see each other's rows
async fn create_test_db(base_url: &str) -> Result<String, sqlx::Error> {
    let db_suffix: u32 = thread_rng().gen_range(10_000..99_999);
    let db_name = format!("task_test_{db_suffix}");

    let mut conn = PgConnection::connect(base_url).await?;
    sqlx::query(format!("CREATE DATABASE {db_name}").as_str())
        .execute(&mut conn)
        .await?;
    conn.close().await?;

    Ok(db_name)
}

async fn drop_test_db(base_url: &str, db_name: &str) {
    let drop_result = async {
        let mut conn = PgConnection::connect(base_url).await?;
        sqlx::query(format!("DROP DATABASE IF EXISTS {db_name} WITH (FORCE)").as_str())
            .execute(&mut conn)
            .await?;
        conn.close().await
    }
    .await;

    if let Err(error) = drop_result {
        println!("Warning: could not drop test database {db_name}, you may need to do it manually. Error: {error}");
    }
}

/// Runs a test against a freshly migrated database, dropping the database afterwards.
///
/// Expects that the TEST_DB_URL environment variable is populated with a postgres connection
/// string that has no database name in its path
pub fn prepare_db_and_test<F, R>(test_fn: F)
where
    R: Future<Output = ()>,
    F: FnOnce(PgPool) -> R,
{
    if dotenv().is_err() {
        println!("Test is running without .env file.");
    }

    TOKIO_RT.block_on(async move {
        let base_url = env::var(TEST_DB_URL).unwrap_or_else(|_| {
            panic!("You must provide the {TEST_DB_URL} environment variable as the base postgres connection string")
        });
        let db_name = create_test_db(&base_url)
            .await
            .unwrap_or_else(|db_err| panic!("Failed to create test database: {db_err}"));

        let pool = persistence::connect_sqlx(format!("{base_url}/{db_name}").as_str())
            .await
            .expect("could not connect to the test database");
        persistence::run_migrations(&pool)
            .await
            .expect("could not migrate the test database");

        test_fn(pool.clone()).await;

        pool.close().await;
        drop_test_db(&base_url, &db_name).await;
    });
}

/// Provisions a user the way the identity layer would, returning its ID
pub async fn insert_user(db: &PgPool, username: &str) -> i32 {
    sqlx::query_scalar("INSERT INTO todo_user (username) VALUES ($1) RETURNING id")
        .bind(username)
        .fetch_one(db)
        .await
        .expect("could not insert test user")
}
