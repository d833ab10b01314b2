use crate::{
    config::AppConfig,
    db::{DbPool, OrmConn, create_orm_conn},
    jwt::{JwtConfig, JwtService},
    storage::Storage,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub jwt: JwtService,
    pub storage: Storage,
}

impl AppState {
    /// Assemble the shared state from a connected pool and the loaded configuration.
    pub fn build(pool: DbPool, config: &AppConfig) -> anyhow::Result<Self> {
        let jwt = JwtService::new(JwtConfig::from_app_config(config)?);
        let storage = Storage::filesystem(&config.storage_root)?;
        Ok(Self::new(pool, jwt, storage))
    }

    pub fn new(pool: DbPool, jwt: JwtService, storage: Storage) -> Self {
        let orm = create_orm_conn(&pool);
        Self {
            pool,
            orm,
            jwt,
            storage,
        }
    }
}
