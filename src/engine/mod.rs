// ==========================================
// 车队数据装载系统 - 引擎层
// ==========================================
// 职责: 周期展开 / 车牌引用解析 / 装载编排
// 红线: Engine 不拼 SQL，数据访问经由 FleetRepository
// ==========================================

pub mod load_orchestrator;
pub mod recurrence;
pub mod reference_resolver;

// 重导出核心引擎
pub use load_orchestrator::{LoadError, LoadOrchestrator};
pub use recurrence::RecurrenceExpander;
pub use reference_resolver::VehicleRefSnapshot;
