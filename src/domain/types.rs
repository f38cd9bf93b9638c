// ==========================================
// 车队数据装载系统 - 领域类型定义
// ==========================================
// 职责: 实体种类 / 班次 / 补给时刻 / 周期规则 / 锚定年月
// 序列化格式: 与数据库存储值一致
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 实体种类 (Entity Kind)
// ==========================================
// 每种实体对应一张表、一种输入格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Order,
    Vehicle,
    Warehouse,
    Failure,
    Blockage,
    Maintenance,
}

impl EntityKind {
    /// 清空顺序: 依赖方在前，被依赖方在后
    pub const PURGE_ORDER: [EntityKind; 6] = [
        EntityKind::Maintenance,
        EntityKind::Failure,
        EntityKind::Blockage,
        EntityKind::Order,
        EntityKind::Vehicle,
        EntityKind::Warehouse,
    ];

    /// 无外键依赖的实体（先装载）
    pub const INDEPENDENT: [EntityKind; 4] = [
        EntityKind::Warehouse,
        EntityKind::Vehicle,
        EntityKind::Order,
        EntityKind::Blockage,
    ];

    /// 依赖车辆主键的实体（车辆入库后装载）
    pub const DEPENDENT: [EntityKind; 2] = [EntityKind::Failure, EntityKind::Maintenance];

    /// 目标表名
    pub fn table_name(&self) -> &'static str {
        match self {
            EntityKind::Order => "pedido",
            EntityKind::Vehicle => "vehiculo",
            EntityKind::Warehouse => "almacen",
            EntityKind::Failure => "incidencia",
            EntityKind::Blockage => "bloqueo",
            EntityKind::Maintenance => "mantenimiento",
        }
    }

    /// 是否按周期拆分文件（文件名携带 YYYYMM）
    pub fn is_period_partitioned(&self) -> bool {
        matches!(
            self,
            EntityKind::Order | EntityKind::Blockage | EntityKind::Maintenance
        )
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Order => write!(f, "orders"),
            EntityKind::Vehicle => write!(f, "vehicles"),
            EntityKind::Warehouse => write!(f, "warehouses"),
            EntityKind::Failure => write!(f, "failures"),
            EntityKind::Blockage => write!(f, "blockages"),
            EntityKind::Maintenance => write!(f, "maintenances"),
        }
    }
}

// ==========================================
// 班次 (Shift)
// ==========================================
// T1=00:00-08:00, T2=08:00-16:00, T3=16:00-24:00
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shift {
    T1,
    T2,
    T3,
}

impl Shift {
    /// 按标签解析（严格匹配 T1/T2/T3）
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "T1" => Some(Shift::T1),
            "T2" => Some(Shift::T2),
            "T3" => Some(Shift::T3),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Shift::T1 => "T1",
            Shift::T2 => "T2",
            Shift::T3 => "T3",
        }
    }

    /// 班次时段（起始小时, 结束小时）
    pub fn hour_window(&self) -> (u32, u32) {
        match self {
            Shift::T1 => (0, 8),
            Shift::T2 => (8, 16),
            Shift::T3 => (16, 24),
        }
    }
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ==========================================
// 补给时刻 (Supply Schedule)
// ==========================================
// 主仓库随时可补给；中间仓库每日零点补满
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SupplySchedule {
    Always,
    Midnight,
}

impl SupplySchedule {
    /// 数据库存储值
    pub fn as_str(&self) -> &'static str {
        match self {
            SupplySchedule::Always => "Siempre",
            SupplySchedule::Midnight => "00:00",
        }
    }
}

impl fmt::Display for SupplySchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 周期规则 (Recurrence)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recurrence {
    /// 单次: 一行输入对应一条记录
    Once,
    /// 周期: 一行输入展开为多条记录
    Periodic,
}

// ==========================================
// 锚定年月 (Period Anchor)
// ==========================================
// 订单/封路时间串只含 日/时/分，年月由外部（文件名）提供
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PeriodAnchor {
    pub year: i32,
    pub month: u32,
}

impl PeriodAnchor {
    /// 创建锚点，月份必须在 1..=12
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    /// 解析 "YYYYMM"
    pub fn parse_yyyymm(value: &str) -> Option<Self> {
        if value.len() != 6 || !value.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let year = value[..4].parse().ok()?;
        let month = value[4..].parse().ok()?;
        Self::new(year, month)
    }

    /// 在锚定月份内定位 日/时/分
    ///
    /// # 返回
    /// - None: 日期在该月不存在，或时/分越界
    pub fn at(&self, day: u32, hour: u32, minute: u32) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year, self.month, day)?.and_hms_opt(hour, minute, 0)
    }
}

impl Default for PeriodAnchor {
    fn default() -> Self {
        Self {
            year: 2025,
            month: 1,
        }
    }
}

impl fmt::Display for PeriodAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_purge_order_puts_dependents_first() {
        let pos = |k: EntityKind| EntityKind::PURGE_ORDER.iter().position(|x| *x == k).unwrap();
        assert!(pos(EntityKind::Maintenance) < pos(EntityKind::Vehicle));
        assert!(pos(EntityKind::Failure) < pos(EntityKind::Vehicle));
        assert_eq!(EntityKind::PURGE_ORDER.len(), 6);
    }

    #[test]
    fn test_shift_from_label() {
        assert_eq!(Shift::from_label("T2"), Some(Shift::T2));
        assert_eq!(Shift::from_label("T4"), None);
        assert_eq!(Shift::from_label("t1"), None);
        assert_eq!(Shift::T3.hour_window(), (16, 24));
    }

    #[test]
    fn test_period_anchor_parse() {
        assert_eq!(
            PeriodAnchor::parse_yyyymm("202511"),
            Some(PeriodAnchor { year: 2025, month: 11 })
        );
        assert_eq!(PeriodAnchor::parse_yyyymm("202513"), None);
        assert_eq!(PeriodAnchor::parse_yyyymm("202500"), None);
        assert_eq!(PeriodAnchor::parse_yyyymm("2025-1"), None);
        assert_eq!(PeriodAnchor::default().to_string(), "202501");
    }

    #[test]
    fn test_period_anchor_at_rejects_missing_day() {
        let feb = PeriodAnchor::new(2025, 2).unwrap();
        assert!(feb.at(28, 23, 59).is_some());
        assert!(feb.at(30, 0, 0).is_none());
        assert!(feb.at(1, 24, 0).is_none());
    }
}
