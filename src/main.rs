use avaliacoes::{
    config::{Settings, create_app, init_tracing},
    state::{make_pool, run_migrations},
};
use clap::Parser;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = Settings::parse();
    init_tracing(&settings.log_filter);

    tracing::info!(location = %settings.database_url, "opening database");
    let pool = make_pool(&settings.database_url)?;

    let migration_pool = pool.clone();
    tokio::task::spawn_blocking(move || run_migrations(&migration_pool))
        .await??;

    let listener = TcpListener::bind(settings.bind).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, create_app(pool))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("failed to listen for shutdown signal: {e}");
            }
        })
        .await?;

    Ok(())
}
