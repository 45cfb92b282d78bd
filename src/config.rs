use std::net::SocketAddr;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use clap::Parser;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::EnvFilter;

use crate::{
    evaluations::{
        employee::submit_employee_evaluation,
        manager::submit_manager_evaluation, teacher::submit_teacher_evaluation,
    },
    registry::{
        classes::{add_class, list_classes, teachers_of_class},
        employees::{add_employee, add_manager, list_managers},
        roles::{add_role, employees_of_role, list_roles},
        teachers::{add_teacher, list_teachers},
    },
    state::{DbPool, commit_transactions},
    util_resp::FailureResponse,
};

#[derive(Parser, Debug, Clone)]
#[command(about = "Staff evaluation service")]
pub struct Settings {
    /// SQLite database file, or `:memory:`.
    #[arg(long, env = "DATABASE_URL", default_value = "avaliacoes.db")]
    pub database_url: String,
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,
    /// Used when `RUST_LOG` is not set.
    #[arg(long, env = "LOG_FILTER", default_value = "info,tower_http=debug")]
    pub log_filter: String,
}

pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn unknown_route() -> FailureResponse {
    FailureResponse::NotFound("Rota não encontrada".to_string())
}

pub fn create_app(pool: DbPool) -> Router {
    Router::new()
        .route("/turmas", get(list_classes))
        .route("/turmas/:id/professores", get(teachers_of_class))
        .route("/funcoes", get(list_roles))
        .route("/funcoes/:id/funcionarios", get(employees_of_role))
        .route("/professores", get(list_teachers))
        .route("/gestores", get(list_managers))
        .route("/add_professor", post(add_teacher))
        .route("/add_turma", post(add_class))
        .route("/add_funcao", post(add_role))
        .route("/add_funcionario", post(add_employee))
        .route("/add_gestor", post(add_manager))
        .route("/avaliacao_professor", post(submit_teacher_evaluation))
        .route("/avaliacao_funcionario", post(submit_employee_evaluation))
        .route("/avaliacao_gestor", post(submit_manager_evaluation))
        .fallback(unknown_route)
        .layer(
            // Outermost first: transactions are resolved before the request
            // span closes.
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                )
                .layer(middleware::from_fn(commit_transactions)),
        )
        .with_state(pool)
}
