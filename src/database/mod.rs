pub mod schema;

use crate::config::DatabaseConfig;
use crate::errors::DbError;
use sqlx::mysql::MySqlPoolOptions;
use sqlx::{MySql, Pool};

pub type DbPool = Pool<MySql>;

/// Opens a pooled MySQL connection, pinning every new connection's session
/// charset/collation to the configured values, then bootstraps the schema.
pub async fn connect(config: &DatabaseConfig) -> Result<DbPool, DbError> {
    let charset = config.charset.clone();
    let collation = config.collation.clone();

    let pool = MySqlPoolOptions::new()
        .max_connections(10)
        .after_connect(move |conn, _meta| {
            let charset = charset.clone();
            let collation = collation.clone();
            Box::pin(async move {
                let stmt = format!("SET NAMES {} COLLATE {}", charset, collation);
                sqlx::Executor::execute(conn, stmt.as_str()).await?;
                Ok(())
            })
        })
        .connect(&config.connection_string())
        .await
        .map_err(|e| DbError::ConnectionPool(e.to_string()))?;

    schema::bootstrap(&pool, &config.name).await?;

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_string_embeds_configured_database_name() {
        let config = DatabaseConfig::default();
        assert!(config.connection_string().ends_with(&config.name));
    }
}
