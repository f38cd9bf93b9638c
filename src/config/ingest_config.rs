// ==========================================
// 车队数据装载系统 - 装载配置
// ==========================================
// 职责: 数据库路径 / 输入目录 / 文件命名 / 锚定年月 / 周期规则
// 约束: 配置值在构造编排器时显式传入，不使用全局状态
// 来源: 默认值 → JSON 文件 → 环境变量（仅路径类）
// ==========================================

use crate::domain::types::{EntityKind, PeriodAnchor, Recurrence};
use crate::importer::error::{ImportError, ImportResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "FLEET_LOADER_DB_PATH";

/// 输入目录环境变量
pub const DATA_DIR_ENV: &str = "FLEET_LOADER_DATA_DIR";

const APP_DIR_NAME: &str = "fleet-data-loader";
const DB_FILE_NAME: &str = "fleet.db";

// ==========================================
// LogFormat - 日志输出格式
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

// ==========================================
// FileNaming - 输入文件命名
// ==========================================
// 周期类（订单/封路/保养）: <prefix><YYYY><MM>.<ext> 或 <prefix>.<ext>
// 固定类（车辆/仓库/故障）: 固定文件名
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileNaming {
    pub orders_prefix: String,
    pub blockages_prefix: String,
    pub maintenances_prefix: String,
    pub vehicles_file: String,
    pub warehouses_file: String,
    pub failures_file: String,
}

impl Default for FileNaming {
    fn default() -> Self {
        Self {
            orders_prefix: "orders".to_string(),
            blockages_prefix: "blockages".to_string(),
            maintenances_prefix: "maintenances".to_string(),
            vehicles_file: "vehicles.csv".to_string(),
            warehouses_file: "warehouses.csv".to_string(),
            failures_file: "failures.csv".to_string(),
        }
    }
}

impl FileNaming {
    /// 周期类文件名前缀
    pub fn prefix_for(&self, kind: EntityKind) -> Option<&str> {
        match kind {
            EntityKind::Order => Some(self.orders_prefix.as_str()),
            EntityKind::Blockage => Some(self.blockages_prefix.as_str()),
            EntityKind::Maintenance => Some(self.maintenances_prefix.as_str()),
            _ => None,
        }
    }

    /// 固定类文件名
    pub fn fixed_name_for(&self, kind: EntityKind) -> Option<&str> {
        match kind {
            EntityKind::Vehicle => Some(self.vehicles_file.as_str()),
            EntityKind::Warehouse => Some(self.warehouses_file.as_str()),
            EntityKind::Failure => Some(self.failures_file.as_str()),
            _ => None,
        }
    }
}

// ==========================================
// RecurrenceSettings - 周期规则
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecurrenceSettings {
    pub blockages: Recurrence,
    pub maintenances: Recurrence,
}

impl Default for RecurrenceSettings {
    fn default() -> Self {
        Self {
            blockages: Recurrence::Once,
            maintenances: Recurrence::Periodic,
        }
    }
}

// ==========================================
// IngestConfig - 装载配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub db_path: String,
    pub data_dir: PathBuf,
    pub files: FileNaming,
    pub default_anchor: PeriodAnchor,
    pub recurrence: RecurrenceSettings,
    /// 故障日期；None 时取本地当天
    pub run_date: Option<NaiveDate>,
    pub log_format: LogFormat,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            db_path: get_default_db_path(),
            data_dir: default_data_dir(),
            files: FileNaming::default(),
            default_anchor: PeriodAnchor::default(),
            recurrence: RecurrenceSettings::default(),
            run_date: None,
            log_format: LogFormat::default(),
        }
    }
}

impl IngestConfig {
    /// 从 JSON 文件加载（缺省字段取默认值）
    ///
    /// # 返回
    /// - Err(ConfigReadError): 文件不可读或 JSON 无效
    /// - Err(ConfigValueError): 校验失败
    pub fn from_json_file(path: &Path) -> ImportResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| ImportError::ConfigReadError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let config: IngestConfig =
            serde_json::from_str(&text).map_err(|e| ImportError::ConfigReadError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        config.validate()?;
        Ok(config)
    }

    /// 配置校验
    pub fn validate(&self) -> ImportResult<()> {
        if PeriodAnchor::new(self.default_anchor.year, self.default_anchor.month).is_none() {
            return Err(ImportError::ConfigValueError {
                key: "default_anchor.month".to_string(),
                value: self.default_anchor.month.to_string(),
                message: "月份必须在 1..=12".to_string(),
            });
        }

        let prefixes = [
            ("files.orders_prefix", &self.files.orders_prefix),
            ("files.blockages_prefix", &self.files.blockages_prefix),
            ("files.maintenances_prefix", &self.files.maintenances_prefix),
        ];
        for (key, value) in prefixes {
            if value.trim().is_empty() {
                return Err(ImportError::ConfigValueError {
                    key: key.to_string(),
                    value: value.clone(),
                    message: "前缀不能为空".to_string(),
                });
            }
        }

        let fixed = [
            ("files.vehicles_file", &self.files.vehicles_file),
            ("files.warehouses_file", &self.files.warehouses_file),
            ("files.failures_file", &self.files.failures_file),
        ];
        for (key, value) in fixed {
            if value.trim().is_empty() {
                return Err(ImportError::ConfigValueError {
                    key: key.to_string(),
                    value: value.clone(),
                    message: "文件名不能为空".to_string(),
                });
            }
        }

        Ok(())
    }

    /// 故障日期（未配置时取本地当天）
    pub fn effective_run_date(&self) -> NaiveDate {
        self.run_date
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    /// 某类实体的周期规则
    pub fn recurrence_for(&self, kind: EntityKind) -> Recurrence {
        match kind {
            EntityKind::Blockage => self.recurrence.blockages,
            EntityKind::Maintenance => self.recurrence.maintenances,
            _ => Recurrence::Once,
        }
    }
}

/// 获取默认数据库路径
///
/// 优先级: 环境变量 → 用户数据目录 → 当前目录
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    match dirs::data_dir() {
        Some(dir) => dir
            .join(APP_DIR_NAME)
            .join(DB_FILE_NAME)
            .to_string_lossy()
            .to_string(),
        None => format!("./{}", DB_FILE_NAME),
    }
}

fn default_data_dir() -> PathBuf {
    match std::env::var(DATA_DIR_ENV) {
        Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir.trim()),
        _ => PathBuf::from("data"),
    }
}
