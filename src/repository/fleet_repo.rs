// ==========================================
// 车队数据装载系统 - 车队数据 Repository
// ==========================================
// 职责: 六类实体 ↔ SQL 行映射，清表 / 批量插入 / 计数 / 车牌引用读取
// 红线: Repository 不含业务规则，只做数据 CRUD
// 表名只来自 EntityKind::table_name()，不拼接外部输入
// ==========================================

use crate::domain::fleet::{Blockage, Failure, Maintenance, Order, Vehicle, VehicleId, Warehouse};
use crate::domain::types::EntityKind;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::store::{SqlParam, StoreConnection, StoreRow};
use chrono::{NaiveDate, NaiveDateTime};
use std::sync::Arc;
use tracing::{debug, info};

/// 时间列存储格式
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 日期列存储格式
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const INSERT_ORDER_SQL: &str = r#"
    INSERT INTO pedido (
        codigo_cliente, fecha_registro, posicionx, posiciony, cantidadglp, tiempo_tolerancia
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
"#;

const INSERT_VEHICLE_SQL: &str = r#"
    INSERT INTO vehiculo (
        tipo, placa, peso, max_combustible, curr_combustible,
        max_glp, curr_glp, posicionx, posiciony, disponible
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
"#;

const INSERT_WAREHOUSE_SQL: &str = r#"
    INSERT INTO almacen (
        posicionx, posiciony, capacidad_efectivam3, es_principal, horario_abastecimiento
    ) VALUES (?1, ?2, ?3, ?4, ?5)
"#;

const INSERT_FAILURE_SQL: &str = r#"
    INSERT INTO incidencia (fecha, turno, vehiculo_id, ocurrido) VALUES (?1, ?2, ?3, ?4)
"#;

const INSERT_BLOCKAGE_SQL: &str = r#"
    INSERT INTO bloqueo (start_time, end_time, vertices_json) VALUES (?1, ?2, ?3)
"#;

const INSERT_MAINTENANCE_SQL: &str = r#"
    INSERT INTO mantenimiento (vehiculo_id, start_time, end_time) VALUES (?1, ?2, ?3)
"#;

fn text(value: impl Into<String>) -> SqlParam {
    SqlParam::Text(value.into())
}

fn int(value: impl Into<i64>) -> SqlParam {
    SqlParam::Integer(value.into())
}

fn real(value: f64) -> SqlParam {
    SqlParam::Real(value)
}

fn flag(value: bool) -> SqlParam {
    SqlParam::Integer(i64::from(value))
}

fn timestamp(value: NaiveDateTime) -> SqlParam {
    text(value.format(TIMESTAMP_FORMAT).to_string())
}

fn date(value: NaiveDate) -> SqlParam {
    text(value.format(DATE_FORMAT).to_string())
}

fn required<'a>(row: &'a StoreRow, column: &str) -> RepositoryResult<&'a SqlParam> {
    row.get(column).ok_or_else(|| RepositoryError::FieldValueError {
        field: column.to_string(),
        message: "列缺失".to_string(),
    })
}

// ==========================================
// FleetRepository
// ==========================================
pub struct FleetRepository<S: StoreConnection> {
    store: Arc<S>,
}

impl<S: StoreConnection> FleetRepository<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// 清空一张表
    ///
    /// # 返回
    /// - 删除行数
    pub async fn purge_table(&self, kind: EntityKind) -> RepositoryResult<usize> {
        let sql = format!("DELETE FROM {}", kind.table_name());
        let deleted = self.store.execute_write(&sql, Vec::new()).await?;
        debug!(table = kind.table_name(), deleted = deleted, "清表完成");
        Ok(deleted)
    }

    /// 开启 / 关闭外键约束
    pub async fn set_referential_integrity(&self, enabled: bool) -> RepositoryResult<()> {
        self.store.set_referential_integrity(enabled).await
    }

    async fn insert_rows(
        &self,
        kind: EntityKind,
        sql: &str,
        rows: Vec<Vec<SqlParam>>,
    ) -> RepositoryResult<usize> {
        if rows.is_empty() {
            debug!(table = kind.table_name(), "空批次，跳过插入");
            return Ok(0);
        }

        let count = rows.len();
        self.store.execute_batch_write(sql, rows).await?;
        info!(table = kind.table_name(), rows = count, "批量插入完成");
        Ok(count)
    }

    pub async fn insert_orders(&self, orders: &[Order]) -> RepositoryResult<usize> {
        let rows = orders
            .iter()
            .map(|o| {
                vec![
                    text(o.client_code.as_str()),
                    timestamp(o.registered_at),
                    int(o.position.x),
                    int(o.position.y),
                    int(o.quantity_m3),
                    int(o.tolerance_hours),
                ]
            })
            .collect();
        self.insert_rows(EntityKind::Order, INSERT_ORDER_SQL, rows).await
    }

    pub async fn insert_vehicles(&self, vehicles: &[Vehicle]) -> RepositoryResult<usize> {
        let rows = vehicles
            .iter()
            .map(|v| {
                vec![
                    text(v.category.as_str()),
                    text(v.plate.as_str()),
                    int(v.tare_kg),
                    real(v.fuel_capacity),
                    real(v.fuel_level),
                    real(v.cargo_capacity),
                    real(v.cargo_level),
                    real(v.position_x),
                    real(v.position_y),
                    flag(v.available),
                ]
            })
            .collect();
        self.insert_rows(EntityKind::Vehicle, INSERT_VEHICLE_SQL, rows).await
    }

    pub async fn insert_warehouses(&self, warehouses: &[Warehouse]) -> RepositoryResult<usize> {
        let rows = warehouses
            .iter()
            .map(|w| {
                vec![
                    int(w.position.x),
                    int(w.position.y),
                    real(w.effective_capacity_m3),
                    flag(w.is_principal),
                    text(w.supply_schedule.as_str()),
                ]
            })
            .collect();
        self.insert_rows(EntityKind::Warehouse, INSERT_WAREHOUSE_SQL, rows).await
    }

    pub async fn insert_failures(&self, failures: &[Failure]) -> RepositoryResult<usize> {
        let rows = failures
            .iter()
            .map(|f| {
                vec![
                    date(f.date),
                    text(f.shift.label()),
                    int(f.vehicle_id),
                    flag(f.occurred),
                ]
            })
            .collect();
        self.insert_rows(EntityKind::Failure, INSERT_FAILURE_SQL, rows).await
    }

    pub async fn insert_blockages(&self, blockages: &[Blockage]) -> RepositoryResult<usize> {
        let mut rows = Vec::with_capacity(blockages.len());
        for b in blockages {
            rows.push(vec![timestamp(b.start), timestamp(b.end), text(b.vertices_json()?)]);
        }
        self.insert_rows(EntityKind::Blockage, INSERT_BLOCKAGE_SQL, rows).await
    }

    pub async fn insert_maintenances(&self, maintenances: &[Maintenance]) -> RepositoryResult<usize> {
        let rows = maintenances
            .iter()
            .map(|m| vec![int(m.vehicle_id), timestamp(m.start), timestamp(m.end)])
            .collect();
        self.insert_rows(EntityKind::Maintenance, INSERT_MAINTENANCE_SQL, rows).await
    }

    /// 读取全部 (车牌, 主键)
    pub async fn fetch_vehicle_refs(&self) -> RepositoryResult<Vec<(String, VehicleId)>> {
        let rows = self
            .store
            .execute_read("SELECT id, placa FROM vehiculo", Vec::new())
            .await?;

        rows.iter()
            .map(|row| {
                let id = match required(row, "id")? {
                    SqlParam::Integer(id) => *id,
                    other => {
                        return Err(RepositoryError::FieldValueError {
                            field: "id".to_string(),
                            message: format!("期望整数，实际 {:?}", other),
                        })
                    }
                };
                let plate = match required(row, "placa")? {
                    SqlParam::Text(plate) => plate.clone(),
                    other => {
                        return Err(RepositoryError::FieldValueError {
                            field: "placa".to_string(),
                            message: format!("期望文本，实际 {:?}", other),
                        })
                    }
                };
                Ok((plate, id))
            })
            .collect()
    }

    /// 表行数
    pub async fn count_rows(&self, kind: EntityKind) -> RepositoryResult<usize> {
        let sql = format!("SELECT COUNT(*) AS n FROM {}", kind.table_name());
        let rows = self.store.execute_read(&sql, Vec::new()).await?;
        match rows.first().map(|row| required(row, "n")).transpose()? {
            Some(SqlParam::Integer(n)) => Ok(*n as usize),
            other => Err(RepositoryError::FieldValueError {
                field: "n".to_string(),
                message: format!("计数结果异常: {:?}", other),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{configure_sqlite_connection, init_schema};
    use crate::domain::fleet::GridPosition;
    use crate::domain::types::Shift;
    use crate::repository::sqlite_store::SqliteStore;
    use rusqlite::Connection;
    use std::sync::Mutex;

    fn repo() -> FleetRepository<SqliteStore> {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();
        FleetRepository::new(Arc::new(SqliteStore::from_connection(Arc::new(Mutex::new(conn)))))
    }

    #[tokio::test]
    async fn test_insert_vehicles_and_fetch_refs() {
        let repo = repo();
        let vehicles = vec![
            Vehicle::new_unit("TA", 1, 2500, 25.0),
            Vehicle::new_unit("TA", 2, 2500, 25.0),
        ];
        assert_eq!(repo.insert_vehicles(&vehicles).await.unwrap(), 2);

        let mut refs = repo.fetch_vehicle_refs().await.unwrap();
        refs.sort();
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].0, "TA01");
        assert_eq!(refs[1].0, "TA02");
        assert_ne!(refs[0].1, refs[1].1);
    }

    #[tokio::test]
    async fn test_empty_batch_is_noop() {
        let repo = repo();
        assert_eq!(repo.insert_orders(&[]).await.unwrap(), 0);
        assert_eq!(repo.insert_maintenances(&[]).await.unwrap(), 0);
        assert_eq!(repo.count_rows(EntityKind::Order).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_plate_fails_whole_batch() {
        let repo = repo();
        let vehicles = vec![
            Vehicle::new_unit("TA", 1, 2500, 25.0),
            Vehicle::new_unit("TA", 1, 2500, 25.0),
        ];
        let err = repo.insert_vehicles(&vehicles).await.unwrap_err();
        assert!(matches!(err, RepositoryError::UniqueConstraintViolation(_)));
        assert_eq!(repo.count_rows(EntityKind::Vehicle).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_purge_dependents_before_vehicles() {
        let repo = repo();
        repo.insert_vehicles(&[Vehicle::new_unit("TB", 1, 2000, 15.0)])
            .await
            .unwrap();
        let id = repo.fetch_vehicle_refs().await.unwrap()[0].1;
        let day = NaiveDate::from_ymd_opt(2025, 5, 3).unwrap();
        repo.insert_failures(&[Failure {
            date: day,
            shift: Shift::T1,
            vehicle_id: id,
            occurred: false,
        }])
        .await
        .unwrap();

        // 外键开启时先删车辆会失败
        assert!(repo.purge_table(EntityKind::Vehicle).await.is_err());

        for kind in EntityKind::PURGE_ORDER {
            repo.purge_table(kind).await.unwrap();
        }
        assert_eq!(repo.count_rows(EntityKind::Failure).await.unwrap(), 0);
        assert_eq!(repo.count_rows(EntityKind::Vehicle).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_insert_blockage_serializes_vertices() {
        let repo = repo();
        let day = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let blockage = Blockage {
            start: day.and_hms_opt(6, 0, 0).unwrap(),
            end: day.and_hms_opt(15, 0, 0).unwrap(),
            vertices: vec![GridPosition::new(31, 21), GridPosition::new(34, 21)],
        };
        assert_eq!(repo.insert_blockages(&[blockage]).await.unwrap(), 1);
        assert_eq!(repo.count_rows(EntityKind::Blockage).await.unwrap(), 1);
    }
}
