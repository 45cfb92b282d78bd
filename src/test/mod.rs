//! End-to-end tests. Each test drives a fresh router backed by its own
//! in-memory database.

use axum::http::StatusCode;
use axum_test::{TestResponse, TestServer};
use serde_json::{Value, json};

use crate::{
    config::create_app,
    state::{DbPool, IN_MEMORY, make_pool, run_migrations},
};

// This is a macro rather than a function because the `assert!` panic
// then directly notes the span of the call site.
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status_code(),
            $status,
            "body = {}",
            $response.text()
        );
    };
}


pub struct TestApp {
    pub server: TestServer,
    pub pool: DbPool,
}

impl TestApp {
    pub fn new() -> Self {
        let pool = make_pool(IN_MEMORY).unwrap();
        run_migrations(&pool).unwrap();
        let server = TestServer::new(create_app(pool.clone())).unwrap();
        TestApp { server, pool }
    }

    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.server.post(path).json(&body).await
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        self.server.get(path).await
    }

    /// Posts and asserts the resource was created.
    pub async fn create(&self, path: &str, body: Value) {
        let res = self.post(path, body).await;
        assert_status!(res, StatusCode::CREATED);
    }

    /// The pool holds a single connection; it is released before the next
    /// request is made.
    pub fn with_conn<R>(
        &self,
        f: impl FnOnce(&mut diesel::SqliteConnection) -> R,
    ) -> R {
        let mut conn = self.pool.get().unwrap();
        f(&mut conn)
    }
}

pub fn error_of(res: &TestResponse) -> String {
    let body: Value = res.json();
    body["error"]
        .as_str()
        .unwrap_or_else(|| panic!("no error message in {body}"))
        .to_string()
}

/// Creates the class, role and people most tests need.
///
/// Classes: 1 "Turma A", 2 "Turma B". Roles: 1 "Gestor Escolar",
/// 2 "Secretaria". Teachers: 1 "Ana" (Turma A). Employees: 1 "Carlos"
/// (manager), 2 "Dora" (Secretaria).
pub async fn populate(app: &TestApp) {
    app.create("/add_turma", json!({ "nome": "Turma A" })).await;
    app.create("/add_turma", json!({ "nome": "Turma B" })).await;
    app.create("/add_funcao", json!({ "nome": "Gestor Escolar" })).await;
    app.create("/add_funcao", json!({ "nome": "Secretaria" })).await;
    app.create("/add_professor", json!({ "nome": "Ana", "turmas": [1] }))
        .await;
    app.create("/add_gestor", json!({ "nome": "Carlos", "funcao_id": 1 }))
        .await;
    app.create("/add_funcionario", json!({ "nome": "Dora", "funcao_id": 2 }))
        .await;
}
