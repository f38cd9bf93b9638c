// ==========================================
// 车队数据装载系统 - SQLite 存储实现
// ==========================================
// 职责: 以 rusqlite 实现 StoreConnection
// 约束: 单连接 + Mutex 串行化，不支持多写者并发
// ==========================================

use crate::db::open_sqlite_connection;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::store::{SqlParam, StoreConnection, StoreRow};
use async_trait::async_trait;
use rusqlite::{params_from_iter, Connection};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// 打开数据库文件
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self::from_connection(Arc::new(Mutex::new(conn))))
    }

    /// 复用已有连接
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn lock(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }
}

#[async_trait]
impl StoreConnection for SqliteStore {
    async fn execute_read(&self, sql: &str, params: Vec<SqlParam>) -> RepositoryResult<Vec<StoreRow>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();

        let rows = stmt.query_map(params_from_iter(params.iter()), |row| {
            let mut out = StoreRow::with_capacity(columns.len());
            for (idx, name) in columns.iter().enumerate() {
                out.insert(name.clone(), row.get::<_, SqlParam>(idx)?);
            }
            Ok(out)
        })?;

        let out = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(out)
    }

    async fn execute_write(&self, sql: &str, params: Vec<SqlParam>) -> RepositoryResult<usize> {
        let conn = self.lock()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(RepositoryError::transaction)?;
        let affected = tx.execute(sql, params_from_iter(params.iter()))?;
        tx.commit().map_err(RepositoryError::transaction)?;
        Ok(affected)
    }

    async fn execute_batch_write(
        &self,
        sql: &str,
        rows: Vec<Vec<SqlParam>>,
    ) -> RepositoryResult<usize> {
        if rows.is_empty() {
            return Ok(0);
        }

        let conn = self.lock()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(RepositoryError::transaction)?;
        let mut affected = 0;
        {
            let mut stmt = tx.prepare(sql)?;
            for row in &rows {
                affected += stmt.execute(params_from_iter(row.iter()))?;
            }
        }
        tx.commit().map_err(RepositoryError::transaction)?;

        debug!(rows = rows.len(), affected = affected, "批量写入已提交");
        Ok(affected)
    }

    async fn set_referential_integrity(&self, enabled: bool) -> RepositoryResult<()> {
        let conn = self.lock()?;
        let pragma = if enabled {
            "PRAGMA foreign_keys = ON;"
        } else {
            "PRAGMA foreign_keys = OFF;"
        };
        conn.execute_batch(pragma)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{configure_sqlite_connection, init_schema};
    use rusqlite::types::Value;

    fn store() -> SqliteStore {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();
        SqliteStore::from_connection(Arc::new(Mutex::new(conn)))
    }

    #[tokio::test]
    async fn test_batch_write_and_read() {
        let store = store();
        let sql = "INSERT INTO almacen (posicionx, posiciony, capacidad_efectivam3, es_principal, horario_abastecimiento) VALUES (?1, ?2, ?3, ?4, ?5)";
        let rows = vec![
            vec![Value::Integer(12), Value::Integer(8), Value::Real(1e9), Value::Integer(1), Value::Text("Siempre".into())],
            vec![Value::Integer(42), Value::Integer(42), Value::Real(160.0), Value::Integer(0), Value::Text("00:00".into())],
        ];
        assert_eq!(store.execute_batch_write(sql, rows).await.unwrap(), 2);

        let read = store
            .execute_read("SELECT posicionx FROM almacen WHERE es_principal = ?1", vec![Value::Integer(1)])
            .await
            .unwrap();
        assert_eq!(read.len(), 1);
        assert_eq!(read[0].get("posicionx"), Some(&Value::Integer(12)));
    }

    #[tokio::test]
    async fn test_batch_write_rolls_back_on_error() {
        let store = store();
        let sql = "INSERT INTO mantenimiento (vehiculo_id, start_time, end_time) VALUES (?1, ?2, ?3)";
        let rows = vec![vec![
            Value::Integer(999),
            Value::Text("2025-04-01 00:00:00".into()),
            Value::Text("2025-04-01 23:59:00".into()),
        ]];

        let err = store.execute_batch_write(sql, rows).await.unwrap_err();
        assert!(matches!(err, RepositoryError::ForeignKeyViolation(_)));

        let count = store
            .execute_read("SELECT COUNT(*) AS n FROM mantenimiento", vec![])
            .await
            .unwrap();
        assert_eq!(count[0].get("n"), Some(&Value::Integer(0)));
    }

    #[tokio::test]
    async fn test_write_inside_open_transaction_is_transaction_error() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();
        let conn = Arc::new(Mutex::new(conn));
        let store = SqliteStore::from_connection(Arc::clone(&conn));

        conn.lock().unwrap().execute_batch("BEGIN;").unwrap();
        let err = store
            .execute_write("DELETE FROM almacen", vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::DatabaseTransactionError(_)));

        conn.lock().unwrap().execute_batch("ROLLBACK;").unwrap();
        assert_eq!(store.execute_write("DELETE FROM almacen", vec![]).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_toggle_referential_integrity() {
        let store = store();
        store.set_referential_integrity(false).await.unwrap();
        let off = store.execute_read("PRAGMA foreign_keys", vec![]).await.unwrap();
        assert_eq!(off[0].get("foreign_keys"), Some(&Value::Integer(0)));

        store.set_referential_integrity(true).await.unwrap();
        let on = store.execute_read("PRAGMA foreign_keys", vec![]).await.unwrap();
        assert_eq!(on[0].get("foreign_keys"), Some(&Value::Integer(1)));
    }
}
