use std::{
    ops::{Deref, DerefMut},
    sync::Arc,
    time::Duration,
};

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use diesel::{
    QueryResult, SqliteConnection,
    connection::{AnsiTransactionManager, SimpleConnection, TransactionManager},
    r2d2::{ConnectionManager, CustomizeConnection, Pool, PooledConnection},
};
use diesel_migrations::MigrationHarness;

use crate::{MIGRATIONS, util_resp::FailureResponse};

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

type PooledConn = PooledConnection<ConnectionManager<SqliteConnection>>;

pub const IN_MEMORY: &str = ":memory:";

/// Applied to every connection as it is handed out by the pool. SQLite only
/// enforces `references` clauses when asked to, per connection.
#[derive(Debug)]
struct ConnectionPragmas;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error>
    for ConnectionPragmas
{
    fn on_acquire(
        &self,
        conn: &mut SqliteConnection,
    ) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute(
            "PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;",
        )
        .map_err(diesel::r2d2::Error::QueryError)
    }
}

pub fn make_pool(db_url: &str) -> Result<DbPool, diesel::r2d2::PoolError> {
    let builder = DbPool::builder()
        .connection_customizer(Box::new(ConnectionPragmas))
        .connection_timeout(Duration::from_secs(10));

    // Every in-memory connection is its own database, so the single
    // connection must never be recycled.
    let builder = if db_url == IN_MEMORY {
        builder.max_size(1).idle_timeout(None).max_lifetime(None)
    } else {
        builder.max_size(10)
    };

    builder.build(ConnectionManager::<SqliteConnection>::new(db_url))
}

pub fn run_migrations(
    pool: &DbPool,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut conn = pool.get()?;
    let applied = conn.run_pending_migrations(MIGRATIONS)?;
    tracing::info!("applied {} pending migration(s)", applied.len());
    Ok(())
}

/// Opens a write transaction holding SQLite's reserved lock from the start.
/// A second writer then waits in `BEGIN` for up to `busy_timeout`, rather
/// than failing when it upgrades a read lock halfway through the request.
fn begin_write(conn: &mut SqliteConnection) -> QueryResult<()> {
    AnsiTransactionManager::begin_transaction_sql(conn, "BEGIN IMMEDIATE")
}

fn commit(conn: &mut SqliteConnection) -> QueryResult<()> {
    AnsiTransactionManager::commit_transaction(conn)
}

fn rollback(conn: &mut SqliteConnection) -> QueryResult<()> {
    AnsiTransactionManager::rollback_transaction(conn)
}

struct OpenedConn {
    conn: Arc<tokio::sync::Mutex<PooledConn>>,
    tx: bool,
}

/// Slot shared between [`commit_transactions`] and the connection
/// extractors, holding the connection used while handling one request.
#[derive(Clone, Default)]
struct RequestConn(Arc<tokio::sync::Mutex<Option<OpenedConn>>>);

/// This layer commits opened transactions after each request has been
/// handled, or rolls them back if the response is not a success.
pub async fn commit_transactions(mut req: Request, next: Next) -> Response {
    let slot = RequestConn::default();
    req.extensions_mut().insert(slot.clone());

    let res = next.run(req).await;

    let opened = slot.0.lock().await.take();
    let Some(OpenedConn { conn, tx: true }) = opened else {
        return res;
    };

    let mut conn = conn.lock().await;
    let status = res.status();
    if status.is_success()
        || status.is_redirection()
        || status.is_informational()
    {
        if let Err(e) = commit(&mut conn) {
            tracing::error!("failed to commit transaction: {e}");
            return FailureResponse::ServerError.into_response();
        }
    } else if let Err(e) = rollback(&mut conn) {
        tracing::error!("failed to roll back transaction: {e}");
    }

    res
}

/// A connection checked out for the current request. With `TX` set, a
/// transaction is opened when the connection is first extracted and is
/// resolved by [`commit_transactions`].
pub struct Conn<const TX: bool> {
    inner: tokio::sync::OwnedMutexGuard<PooledConn>,
}

impl<const TX: bool> Deref for Conn<TX> {
    type Target = PooledConn;

    fn deref(&self) -> &Self::Target {
        self.inner.deref()
    }
}

impl<const TX: bool> DerefMut for Conn<TX> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.inner.deref_mut()
    }
}

#[async_trait]
impl<const TX: bool, S> FromRequestParts<S> for Conn<TX>
where
    S: Send + Sync,
    DbPool: FromRef<S>,
{
    type Rejection = FailureResponse;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let conn = ThreadSafeConn::<TX>::from_request_parts(parts, state).await?;
        Ok(Conn {
            inner: conn.inner.lock_owned().await,
        })
    }
}

#[derive(Clone)]
pub struct ThreadSafeConn<const TX: bool> {
    pub inner: Arc<tokio::sync::Mutex<PooledConn>>,
}

#[async_trait]
impl<const TX: bool, S> FromRequestParts<S> for ThreadSafeConn<TX>
where
    S: Send + Sync,
    DbPool: FromRef<S>,
{
    type Rejection = FailureResponse;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let Some(slot) = parts.extensions.get::<RequestConn>().cloned() else {
            tracing::error!(
                "database connection requested outside of the commit layer"
            );
            return Err(FailureResponse::ServerError);
        };

        let mut slot = slot.0.lock().await;
        if let Some(opened) = slot.as_ref() {
            return Ok(ThreadSafeConn {
                inner: opened.conn.clone(),
            });
        }

        let pool = DbPool::from_ref(state);
        let mut conn = tokio::task::spawn_blocking(move || pool.get())
            .await
            .map_err(|e| {
                tracing::error!("connection checkout task failed: {e}");
                FailureResponse::ServerError
            })??;

        if TX {
            begin_write(&mut conn)?;
        }

        let inner = Arc::new(tokio::sync::Mutex::new(conn));
        *slot = Some(OpenedConn {
            conn: inner.clone(),
            tx: TX,
        });

        Ok(ThreadSafeConn { inner })
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::mpsc, thread};

    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
        routing::post,
    };
    use diesel::prelude::*;
    use tower::ServiceExt;

    use super::*;
    use crate::{
        schema::{funcionarios, professores, turmas},
        util_resp::{StandardResponse, created},
    };

    fn add_teacher(conn: &mut SqliteConnection, name: &str) -> QueryResult<()> {
        turmas::table
            .find(1)
            .select(turmas::nome)
            .first::<String>(conn)?;
        diesel::insert_into(professores::table)
            .values(professores::nome.eq(name))
            .execute(conn)?;
        Ok(())
    }

    #[test]
    fn overlapping_writers_wait_for_each_other() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("avaliacoes.db");
        let pool = make_pool(path.to_str().unwrap()).unwrap();
        run_migrations(&pool).unwrap();
        diesel::insert_into(turmas::table)
            .values(turmas::nome.eq("Turma A"))
            .execute(&mut pool.get().unwrap())
            .unwrap();

        let (began, first_began) = mpsc::channel();
        let pool = &pool;
        let (first, second) = thread::scope(|s| {
            let first = s.spawn(move || -> QueryResult<()> {
                let mut conn = pool.get().unwrap();
                begin_write(&mut conn)?;
                add_teacher(&mut conn, "Ana")?;
                began.send(()).unwrap();
                thread::sleep(Duration::from_millis(200));
                commit(&mut conn)
            });
            let second = s.spawn(move || -> QueryResult<()> {
                first_began.recv().unwrap();
                let mut conn = pool.get().unwrap();
                begin_write(&mut conn)?;
                add_teacher(&mut conn, "Bruno")?;
                commit(&mut conn)
            });
            (first.join().unwrap(), second.join().unwrap())
        });
        first.unwrap();
        second.unwrap();

        let names = professores::table
            .order_by(professores::id)
            .select(professores::nome)
            .load::<String>(&mut pool.get().unwrap())
            .unwrap();
        assert_eq!(names, vec!["Ana", "Bruno"]);
    }

    /// Inserts an employee with a dangling role, with the foreign key check
    /// postponed until the transaction commits.
    async fn dangling_employee(mut conn: Conn<true>) -> StandardResponse {
        conn.batch_execute("PRAGMA defer_foreign_keys = ON;")?;
        diesel::insert_into(funcionarios::table)
            .values((funcionarios::nome.eq("Ivo"), funcionarios::funcao_id.eq(99)))
            .execute(&mut *conn)?;

        created("Funcionário adicionado com sucesso!")
    }

    #[tokio::test]
    async fn failed_commit_becomes_server_error() {
        let pool = make_pool(IN_MEMORY).unwrap();
        run_migrations(&pool).unwrap();
        let app = Router::new()
            .route("/", post(dangling_employee))
            .layer(axum::middleware::from_fn(commit_transactions))
            .with_state(pool.clone());

        let res = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let employees = funcionarios::table
            .count()
            .get_result::<i64>(&mut pool.get().unwrap())
            .unwrap();
        assert_eq!(employees, 0);
    }
}
