// ==========================================
// 车队数据装载系统 - 车牌引用解析
// ==========================================
// 职责: 车牌 → 存储主键 的只读快照
// 时机: 车辆入库之后、故障/保养入库之前，每次运行构建一次
// 红线: 快照构建后不刷新；查不到是解析失败，不是错误
// ==========================================

use crate::domain::fleet::VehicleId;
use crate::repository::error::RepositoryResult;
use crate::repository::fleet_repo::FleetRepository;
use crate::repository::store::StoreConnection;
use std::collections::HashMap;
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct VehicleRefSnapshot {
    by_plate: HashMap<String, VehicleId>,
}

impl VehicleRefSnapshot {
    /// 由 (车牌, 主键) 对构建
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, VehicleId)>,
    {
        Self {
            by_plate: pairs.into_iter().collect(),
        }
    }

    /// 从存储读取当前全部车辆，构建快照
    pub async fn load<S: StoreConnection>(repo: &FleetRepository<S>) -> RepositoryResult<Self> {
        let pairs = repo.fetch_vehicle_refs().await?;
        let snapshot = Self::from_pairs(pairs);
        info!(vehicles = snapshot.len(), "车牌引用快照已构建");
        Ok(snapshot)
    }

    /// 精确匹配车牌（区分大小写，不做 TRIM）
    pub fn resolve(&self, plate: &str) -> Option<VehicleId> {
        self.by_plate.get(plate).copied()
    }

    pub fn len(&self) -> usize {
        self.by_plate.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_plate.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_exact_match_only() {
        let snapshot = VehicleRefSnapshot::from_pairs(vec![
            ("TA01".to_string(), 1),
            ("TA02".to_string(), 2),
        ]);

        assert_eq!(snapshot.resolve("TA01"), Some(1));
        assert_eq!(snapshot.resolve("TA02"), Some(2));
        assert_eq!(snapshot.resolve("ta01"), None);
        assert_eq!(snapshot.resolve("TA03"), None);
        assert_eq!(snapshot.len(), 2);
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = VehicleRefSnapshot::default();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.resolve("TA01"), None);
    }
}
