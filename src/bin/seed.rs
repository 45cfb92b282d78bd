use std::path::PathBuf;

use avaliacoes::{
    config::init_tracing,
    seed::SeedFile,
    state::{make_pool, run_migrations},
};
use clap::Parser;

/// Loads classes, roles, teachers and employees from a TOML file.
#[derive(Parser)]
struct Seed {
    file: PathBuf,
    #[arg(long, env = "DATABASE_URL", default_value = "avaliacoes.db")]
    database_url: String,
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_tracing("info");
    let args = Seed::parse();

    let seed = SeedFile::parse(&std::fs::read_to_string(&args.file)?)?;

    let pool = make_pool(&args.database_url)?;
    run_migrations(&pool)?;

    let mut conn = pool.get()?;
    let report = seed.apply(&mut *conn)?;

    println!(
        "inserted {} classes, {} roles, {} teachers ({} class links), {} employees",
        report.classes,
        report.roles,
        report.teachers,
        report.links,
        report.employees
    );

    Ok(())
}
