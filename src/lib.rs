// ==========================================
// 车队数据装载系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 将紧凑编码的车队文本数据全量装载到关系库
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 周期展开 / 引用解析 / 装载编排
pub mod engine;

// 导入层 - 文件发现与逐行解码
pub mod importer;

// 配置层 - 装载配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{EntityKind, PeriodAnchor, Recurrence, Shift, SupplySchedule};

// 领域实体
pub use domain::{
    Blockage, Failure, GridPosition, LoadCounts, LoadReport, Maintenance, Order, RunStatus,
    Vehicle, Warehouse,
};

// 引擎
pub use engine::{LoadError, LoadOrchestrator, RecurrenceExpander, VehicleRefSnapshot};

// 配置与存储
pub use config::IngestConfig;
pub use repository::{FleetRepository, SqliteStore, StoreConnection};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "车队数据装载系统";
