// ==========================================
// 车队数据装载系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分类:
// - ImportError: 文件级错误（致命，终止该文件的解码）
// - SkipReason: 行级原因（可恢复，跳过该行并告警）
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("目录读取失败 ({path}): {message}")]
    DirectoryReadError { path: String, message: String },

    #[error("字段拆分失败: {0}")]
    FieldSplitError(String),

    // ===== 配置错误 =====
    #[error("配置读取失败 ({path}): {message}")]
    ConfigReadError { path: String, message: String },

    #[error("配置值错误 (key: {key}, value: {value}): {message}")]
    ConfigValueError {
        key: String,
        value: String,
        message: String,
    },

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::FieldSplitError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;

// ==========================================
// SkipReason - 行级跳过原因
// ==========================================
// 解码器对单行返回 Err(SkipReason)，由调用方聚合告警，不向上传播
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    #[error("缺少分隔符 '{0}'")]
    MissingSeparator(char),

    #[error("时间串格式错误: {0}（期望 DDdHHhMMm）")]
    InvalidTimeToken(String),

    #[error("时间范围格式错误: {0}（期望 <起>-<止>）")]
    InvalidTimeRange(String),

    #[error("时间不存在于锚定月份 {anchor}: {token}")]
    DateOutOfPeriod { token: String, anchor: String },

    #[error("字段数错误: 期望 {expected}，实际 {actual}")]
    FieldCount { expected: String, actual: usize },

    #[error("数值格式错误 (字段 {field}): {value}")]
    InvalidNumber { field: String, value: String },

    #[error("数值越界 (字段 {field}): {value}")]
    InvalidValue { field: String, value: String },

    #[error("字段为空: {0}")]
    EmptyField(String),

    #[error("班次无效: {0}（期望 T1/T2/T3）")]
    InvalidShift(String),

    #[error("日期格式错误: {0}（期望 YYYYMMDD）")]
    InvalidDate(String),

    #[error("封锁区域无顶点")]
    EmptyPolygon,

    #[error("起止时间无效: 起 {start} 不早于止 {end}")]
    NonIncreasingRange { start: String, end: String },

    #[error("车牌重复: {0}")]
    DuplicatePlate(String),

    #[error("车牌未找到: {0}")]
    UnresolvedVehicle(String),
}

impl SkipReason {
    /// 是否为引用解析失败（区别于格式错误）
    pub fn is_unresolved_reference(&self) -> bool {
        matches!(self, SkipReason::UnresolvedVehicle(_))
    }

    pub(crate) fn field_count(expected: &str, actual: usize) -> Self {
        SkipReason::FieldCount {
            expected: expected.to_string(),
            actual,
        }
    }

    pub(crate) fn invalid_number(field: &str, value: &str) -> Self {
        SkipReason::InvalidNumber {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    pub(crate) fn invalid_value(field: &str, value: impl ToString) -> Self {
        SkipReason::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
        }
    }
}
