//! Database layer: pool and the repository for PostgreSQL.

mod pool;
mod repositories;

pub use pool::{create_pool, run_migrations, DbPool, PoolSettings};
pub use repositories::*;
