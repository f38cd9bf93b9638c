// ==========================================
// 车队数据装载系统 - 存储连接抽象
// ==========================================
// 职责: 定义编排器消费的存储接口（不包含实现）
// 约束: 每次写调用自带事务边界，失败即整体回滚
// 实现者: SqliteStore
// ==========================================

use crate::repository::error::RepositoryResult;
use async_trait::async_trait;
use std::collections::HashMap;

/// SQL 参数值
pub type SqlParam = rusqlite::types::Value;

/// 查询结果行（列名 → 值）
pub type StoreRow = HashMap<String, SqlParam>;

#[async_trait]
pub trait StoreConnection: Send + Sync {
    /// 只读查询
    async fn execute_read(&self, sql: &str, params: Vec<SqlParam>) -> RepositoryResult<Vec<StoreRow>>;

    /// 单条写语句（事务内）
    ///
    /// # 返回
    /// - 受影响行数
    async fn execute_write(&self, sql: &str, params: Vec<SqlParam>) -> RepositoryResult<usize>;

    /// 同一语句的批量写（单事务，全部成功或全部回滚）
    ///
    /// # 返回
    /// - 受影响行数合计
    async fn execute_batch_write(
        &self,
        sql: &str,
        rows: Vec<Vec<SqlParam>>,
    ) -> RepositoryResult<usize>;

    /// 开启 / 关闭外键约束检查（事务外执行）
    async fn set_referential_integrity(&self, enabled: bool) -> RepositoryResult<()>;
}
