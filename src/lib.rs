use diesel_migrations::{EmbeddedMigrations, embed_migrations};

pub mod config;
pub mod evaluations;
pub mod registry;
pub mod schema;
pub mod seed;
pub mod state;
pub mod util_resp;
pub mod validation;

#[cfg(test)]
mod test;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();
