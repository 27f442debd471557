pub mod assert;
pub mod sequences;

use std::time::Duration;

use actix_web::web;
use anyhow::Context;
use diesel::{
    connection::SimpleConnection,
    r2d2::ConnectionManager,
    result::{DatabaseErrorKind, Error as DieselError},
    SqliteConnection,
};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use r2d2::PooledConnection;

use crate::error::ApiError;

pub type DbPool = r2d2::Pool<ConnectionManager<SqliteConnection>>;
pub type DbConn = PooledConnection<ConnectionManager<SqliteConnection>>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

const BUSY_TIMEOUT_MS: u64 = 5000;

/// Per-connection pragmas; SQLite forgets them between connections. The busy
/// timeout goes first so switching to WAL waits out other new connections.
#[derive(Debug)]
struct ConnectionOptions {
    busy_timeout: Duration,
}

impl r2d2::CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute(&format!(
            "PRAGMA busy_timeout = {}; PRAGMA foreign_keys = ON; PRAGMA journal_mode = WAL;",
            self.busy_timeout.as_millis()
        ))
        .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// `:memory:` databases live and die with their connection, so they get a
/// single, never-recycled connection.
pub fn build_pool(database_url: &str) -> anyhow::Result<DbPool> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    let builder = r2d2::Pool::builder().connection_customizer(Box::new(ConnectionOptions {
        busy_timeout: Duration::from_millis(BUSY_TIMEOUT_MS),
    }));
    let builder = if database_url.contains(":memory:") {
        builder.max_size(1).idle_timeout(None).max_lifetime(None)
    } else {
        builder
    };
    builder.build(manager).context("Failed to create pool")
}

pub fn run_migrations(pool: &DbPool) -> anyhow::Result<()> {
    let mut conn = pool.get().context("DB connection")?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| anyhow::anyhow!(err))
        .context("Failed to run migrations")?;
    for version in applied {
        log::info!("applied migration {}", version);
    }
    Ok(())
}

/// A unique-constraint violation becomes `409 msg`; anything else is internal.
pub fn conflict_on_unique(err: DieselError, msg: &str) -> ApiError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            ApiError::Conflict(msg.to_string())
        }
        err => err.into(),
    }
}

pub fn get_db_conn(pool: &DbPool) -> Result<DbConn, ApiError> {
    Ok(pool.get()?)
}

/// Runs `f` with a pooled connection on the blocking thread pool.
pub async fn run<F, T>(pool: &web::Data<DbPool>, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&mut SqliteConnection) -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    let pool = pool.clone();
    web::block(move || {
        let mut conn = get_db_conn(&pool)?;
        f(&mut conn)
    })
    .await?
}
