// ==========================================
// 车队数据装载系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、运行报告
// 红线: 不含数据访问逻辑,不含解码逻辑
// ==========================================

pub mod fleet;
pub mod report;
pub mod types;

// 重导出核心类型
pub use fleet::{
    Blockage, Failure, GridPosition, Maintenance, Order, Vehicle, VehicleId, Warehouse,
};
pub use report::{
    FileError, LoadCounts, LoadReport, LoadStage, RunStatus, SkippedLine, StoreFailure,
};
pub use types::{EntityKind, PeriodAnchor, Recurrence, Shift, SupplySchedule};
