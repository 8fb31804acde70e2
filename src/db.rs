pub mod crm_store;
pub use crm_store::CrmStore;
pub mod crm_repo;
pub use crm_repo::CrmRepository;
pub mod memory_store;
pub use memory_store::MemoryCrmStore;

use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::config::Config;

/// Conecta ao Postgres e aplica as migrações pendentes.
pub async fn connect_and_migrate(config: &Config) -> anyhow::Result<PgPool> {
    // Conecta ao banco de dados, usando '?' para propagar erros
    let db_pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(3))
        .connect(&config.database_url)
        .await?;

    tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

    sqlx::migrate!().run(&db_pool).await?;

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    Ok(db_pool)
}
