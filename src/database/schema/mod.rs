use crate::database::DbPool;
use crate::errors::DbError;
use sqlx::Row;

/// Fixed bootstrap order: children reference parents created earlier in the
/// list, so FK `ON DELETE` clauses always resolve against an existing table
/// (spec.md §4.2).
const TABLES: &[(&str, &str)] = &[
    ("operators", include_str!("operators.sql")),
    ("entities", include_str!("entities.sql")),
    ("evidence", include_str!("evidence.sql")),
    ("attachments", include_str!("attachments.sql")),
    ("blacklist", include_str!("blacklist.sql")),
    ("audit_log", include_str!("audit_log.sql")),
];

/// Creates every table that does not yet exist, in dependency order, then
/// re-checks `information_schema` to confirm each one landed.
pub async fn bootstrap(pool: &DbPool, database_name: &str) -> Result<(), DbError> {
    for (table, ddl) in TABLES {
        if !table_exists(pool, database_name, table).await? {
            sqlx::query(ddl)
                .execute(pool)
                .await
                .map_err(|e| DbError::Schema(format!("creating table {table}: {e}")))?;
        }

        if !table_exists(pool, database_name, table).await? {
            return Err(DbError::Schema(format!(
                "table {table} missing after bootstrap attempt"
            )));
        }
    }
    Ok(())
}

async fn table_exists(pool: &DbPool, database_name: &str, table: &str) -> Result<bool, DbError> {
    let row = sqlx::query(
        "SELECT COUNT(*) AS count FROM information_schema.tables \
         WHERE table_schema = ? AND table_name = ?",
    )
    .bind(database_name)
    .bind(table)
    .fetch_one(pool)
    .await
    .map_err(|e| DbError::Schema(format!("checking table {table}: {e}")))?;

    let count: i64 = row.try_get("count").map_err(|e| DbError::Schema(e.to_string()))?;
    Ok(count > 0)
}
