// ==========================================
// 车队数据装载系统 - 车队领域模型
// ==========================================
// 职责: 订单 / 车辆 / 仓库 / 故障 / 封路 / 保养 六类记录
// 对齐: scripts/schema.sql
// 约束: 记录解码后不可变，展开只产生新实例
// ==========================================

use crate::domain::types::{Shift, SupplySchedule};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// 车辆在存储中的主键
pub type VehicleId = i64;

/// 车辆油量上限（加仑），入库时油量为满
pub const VEHICLE_FUEL_CAPACITY: f64 = 25.0;

/// 车辆初始位置（主仓库所在格点）
pub const VEHICLE_START_POSITION: (f64, f64) = (12.0, 8.0);

/// 主仓库"无上限"容量哨兵值
pub const UNBOUNDED_CAPACITY_M3: f64 = 1e9;

/// 保养窗口时长: 当天 00:00 至 23:59
pub fn maintenance_window() -> Duration {
    Duration::hours(23) + Duration::minutes(59)
}

// ==========================================
// GridPosition - 网格坐标
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPosition {
    pub x: i32,
    pub y: i32,
}

impl GridPosition {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

// ==========================================
// Order - 客户订单
// ==========================================
// 截止时间 = 登记时间 + 容忍小时，只派生不存储
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub client_code: String,            // 客户标签（如 c-198）
    pub registered_at: NaiveDateTime,   // 登记时间
    pub position: GridPosition,         // 交付位置
    pub quantity_m3: i32,               // 需求量（m3）
    pub tolerance_hours: i32,           // 容忍时长（小时）
}

impl Order {
    /// 交付截止时间
    pub fn deadline(&self) -> NaiveDateTime {
        self.registered_at + Duration::hours(i64::from(self.tolerance_hours))
    }
}

// ==========================================
// Vehicle - 车辆
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub category: String,     // 车型（TA/TB/TC/TD）
    pub plate: String,        // 车牌 = 车型 + 两位序号
    pub tare_kg: i32,         // 皮重（kg）
    pub fuel_capacity: f64,   // 油箱容量
    pub fuel_level: f64,      // 当前油量
    pub cargo_capacity: f64,  // 载量上限（m3）
    pub cargo_level: f64,     // 当前载量（m3）
    pub position_x: f64,
    pub position_y: f64,
    pub available: bool,
}

impl Vehicle {
    /// 按车型与序号生成一辆满油满载的车辆
    pub fn new_unit(category: &str, sequence: u32, tare_kg: i32, cargo_capacity: f64) -> Self {
        Self {
            category: category.to_string(),
            plate: format!("{}{:02}", category, sequence),
            tare_kg,
            fuel_capacity: VEHICLE_FUEL_CAPACITY,
            fuel_level: VEHICLE_FUEL_CAPACITY,
            cargo_capacity,
            cargo_level: cargo_capacity,
            position_x: VEHICLE_START_POSITION.0,
            position_y: VEHICLE_START_POSITION.1,
            available: true,
        }
    }
}

// ==========================================
// Warehouse - 仓库
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warehouse {
    pub position: GridPosition,
    pub effective_capacity_m3: f64,     // 主仓库为 UNBOUNDED_CAPACITY_M3
    pub is_principal: bool,
    pub supply_schedule: SupplySchedule,
}

impl Warehouse {
    pub fn principal(position: GridPosition) -> Self {
        Self {
            position,
            effective_capacity_m3: UNBOUNDED_CAPACITY_M3,
            is_principal: true,
            supply_schedule: SupplySchedule::Always,
        }
    }

    pub fn intermediate(position: GridPosition, capacity_m3: f64) -> Self {
        Self {
            position,
            effective_capacity_m3: capacity_m3,
            is_principal: false,
            supply_schedule: SupplySchedule::Midnight,
        }
    }
}

// ==========================================
// Failure - 计划故障（incidencia）
// ==========================================
// occurred 入库时恒为 false: 这里登记的是计划内故障，实际发生的故障另行记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Failure {
    pub date: NaiveDate,
    pub shift: Shift,
    pub vehicle_id: VehicleId,
    pub occurred: bool,
}

// ==========================================
// Blockage - 道路封锁
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blockage {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub vertices: Vec<GridPosition>,    // 封锁折线顶点（有序）
}

impl Blockage {
    /// 顶点序列化为 [{"x":..,"y":..}, ...]
    pub fn vertices_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.vertices)
    }
}

// ==========================================
// Maintenance - 预防性保养
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Maintenance {
    pub vehicle_id: VehicleId,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Maintenance {
    /// 以某日 00:00 起始、持续一整天的保养
    pub fn for_day(vehicle_id: VehicleId, day: NaiveDate) -> Self {
        let start = day.and_time(chrono::NaiveTime::MIN);
        Self {
            vehicle_id,
            start,
            end: start + maintenance_window(),
        }
    }
}
