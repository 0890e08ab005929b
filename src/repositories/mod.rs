use sqlx::PgPool;

pub mod board_repo;
#[cfg(test)]
pub mod memory;

#[derive(Clone)]
pub struct PostgresRepo {
    pool: PgPool,
}

impl PostgresRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}
