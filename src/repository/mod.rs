// ==========================================
// 车队数据装载系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有值使用参数化绑定
// ==========================================

pub mod error;
pub mod fleet_repo;
pub mod sqlite_store;
pub mod store;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use fleet_repo::FleetRepository;
pub use sqlite_store::SqliteStore;
pub use store::{SqlParam, StoreConnection, StoreRow};
